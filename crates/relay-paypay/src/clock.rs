//! Time and randomness sources used when signing.
//!
//! Both are traits so tests can pin the timestamp and nonce that end up in a
//! signature.

use rand::RngCore;

/// Source of the current Unix time.
pub trait Clock: Send + Sync {
    /// Whole seconds since the Unix epoch.
    fn unix_seconds(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn unix_seconds(&self) -> i64 {
        self.0
    }
}

/// Source of random bytes for nonces.
///
/// Implementations must be unpredictable in production; a repeated or
/// sequential nonce lets requests be replayed.
pub trait RandomSource: Send + Sync {
    fn fill(&self, dest: &mut [u8]);
}

/// Thread-local CSPRNG from `rand`, seeded from the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureRandom;

impl RandomSource for SecureRandom {
    fn fill(&self, dest: &mut [u8]) {
        rand::rng().fill_bytes(dest);
    }
}

/// Repeats a fixed byte pattern. Tests only.
#[derive(Debug, Clone)]
pub struct FixedRandom(pub Vec<u8>);

impl FixedRandom {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

impl RandomSource for FixedRandom {
    fn fill(&self, dest: &mut [u8]) {
        if self.0.is_empty() {
            dest.fill(0);
            return;
        }
        for (i, byte) in dest.iter_mut().enumerate() {
            *byte = self.0[i % self.0.len()];
        }
    }
}

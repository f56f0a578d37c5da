//! # OPA-Auth Request Signing
//!
//! Every call to the PayPay API carries an `Authorization` header computed as:
//!
//! ```text
//! contentHash = "empty"                                   if GET or blank body
//!             = base64(MD5("application/json" + body))    otherwise
//!
//! base        = method \n path \n apiKey \n epoch \n nonce \n contentHash \n
//!
//! signature   = base64(HMAC-SHA256(apiSecret, base))
//!
//! Authorization: hmac OPA-Auth:<apiKey>:<signature>:<nonce>:<epoch>
//! ```
//!
//! A GET never hashes its body, even a non-blank one. The rule is pinned by
//! `test_get_with_body_uses_empty_hash`.

use crate::clock::{Clock, RandomSource, SecureRandom, SystemClock};
use crate::credentials::Credentials;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use relay_core::{RelayError, RelayResult};
use sha2::Sha256;
use std::sync::Arc;
use tracing::trace;

type HmacSha256 = Hmac<Sha256>;

/// Content type bound into the content hash and sent on every request
pub const CONTENT_TYPE: &str = "application/json";

/// Content hash used when there is no body to bind
pub const EMPTY_CONTENT_HASH: &str = "empty";

/// Prefix of the Authorization header value
pub const AUTH_PREFIX: &str = "hmac OPA-Auth:";

/// Header naming the merchant a request acts for
pub const ASSUME_MERCHANT_HEADER: &str = "X-ASSUME-MERCHANT";

/// Random bytes per nonce (rendered as twice as many hex characters)
pub const NONCE_BYTES: usize = 16;

/// HTTP methods the provider API is called with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Headers to attach to one outbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub authorization: String,
    pub content_type: &'static str,
    pub assume_merchant: String,
}

impl SignedHeaders {
    /// Header name/value pairs in the order they are sent.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("Authorization", self.authorization.as_str()),
            ("Content-Type", self.content_type),
            (ASSUME_MERCHANT_HEADER, self.assume_merchant.as_str()),
        ]
        .into_iter()
    }
}

/// Hash binding the body and content type into the signature.
pub fn content_hash(method: HttpMethod, body: &[u8]) -> String {
    if method == HttpMethod::Get || body.iter().all(u8::is_ascii_whitespace) {
        return EMPTY_CONTENT_HASH.to_string();
    }

    let mut hasher = Md5::new();
    hasher.update(CONTENT_TYPE.as_bytes());
    hasher.update(body);
    BASE64.encode(hasher.finalize())
}

/// Newline-joined string the HMAC is computed over (trailing newline included).
pub fn signature_base(
    method: HttpMethod,
    resource_path: &str,
    api_key: &str,
    timestamp: i64,
    nonce: &str,
    content_hash: &str,
) -> String {
    let timestamp = timestamp.to_string();
    let mut base = String::new();
    for part in [
        method.as_str(),
        resource_path,
        api_key,
        timestamp.as_str(),
        nonce,
        content_hash,
    ] {
        base.push_str(part);
        base.push('\n');
    }
    base
}

/// Base64 HMAC-SHA256 of `message` keyed with `secret`.
pub fn compute_signature(secret: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Sign with an explicit timestamp and nonce.
///
/// Deterministic: identical inputs always give identical headers.
pub fn sign_with(
    method: HttpMethod,
    resource_path: &str,
    body: &[u8],
    credentials: &Credentials,
    timestamp: i64,
    nonce: &str,
) -> SignedHeaders {
    let hash = content_hash(method, body);
    let base = signature_base(
        method,
        resource_path,
        credentials.api_key(),
        timestamp,
        nonce,
        &hash,
    );
    let signature = compute_signature(credentials.expose_secret(), &base);

    SignedHeaders {
        authorization: format!(
            "{}{}:{}:{}:{}",
            AUTH_PREFIX,
            credentials.api_key(),
            signature,
            nonce,
            timestamp
        ),
        content_type: CONTENT_TYPE,
        assume_merchant: credentials.merchant_id().to_string(),
    }
}

/// Signs outbound requests with fresh timestamps and nonces.
#[derive(Clone)]
pub struct RequestSigner {
    credentials: Credentials,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
}

impl RequestSigner {
    /// Signer backed by the wall clock and a CSPRNG
    pub fn new(credentials: Credentials) -> Self {
        Self::with_sources(credentials, Arc::new(SystemClock), Arc::new(SecureRandom))
    }

    /// Signer with explicit time and randomness (for tests)
    pub fn with_sources(
        credentials: Credentials,
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            credentials,
            clock,
            random,
        }
    }

    /// Current time according to the signer's clock
    pub fn unix_now(&self) -> i64 {
        self.clock.unix_seconds()
    }

    /// Fresh hex nonce of `2 * NONCE_BYTES` characters
    pub fn next_nonce(&self) -> String {
        let mut bytes = [0u8; NONCE_BYTES];
        self.random.fill(&mut bytes);
        hex::encode(bytes)
    }

    /// Build the headers for one request.
    pub fn build_auth_headers(
        &self,
        method: HttpMethod,
        resource_path: &str,
        body: &[u8],
    ) -> SignedHeaders {
        let timestamp = self.unix_now();
        let nonce = self.next_nonce();

        trace!(%method, resource_path, timestamp, "Signing PayPay request");

        sign_with(
            method,
            resource_path,
            body,
            &self.credentials,
            timestamp,
            &nonce,
        )
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Parsed `Authorization: hmac OPA-Auth:...` header value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaAuthorization {
    pub api_key: String,
    pub signature: String,
    pub nonce: String,
    pub timestamp: i64,
}

impl OpaAuthorization {
    /// Split a header value into its parts.
    pub fn parse(value: &str) -> RelayResult<Self> {
        let rest = value.strip_prefix(AUTH_PREFIX).ok_or_else(|| {
            RelayError::Validation("Authorization is not an OPA-Auth header".to_string())
        })?;

        // The signature is base64 and the nonce hex, so any colon belongs to the key
        let mut parts = rest.rsplitn(4, ':');
        let (timestamp, nonce, signature, api_key) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(t), Some(n), Some(s), Some(k)) => (t, n, s, k),
                _ => {
                    return Err(RelayError::Validation(
                        "OPA-Auth header must have key, signature, nonce and timestamp"
                            .to_string(),
                    ))
                }
            };

        let timestamp = timestamp.parse::<i64>().map_err(|_| {
            RelayError::Validation(format!("Invalid OPA-Auth timestamp: {timestamp}"))
        })?;

        Ok(Self {
            api_key: api_key.to_string(),
            signature: signature.to_string(),
            nonce: nonce.to_string(),
            timestamp,
        })
    }

    /// Recompute the signature for a request and compare it with this one.
    pub fn verify(
        &self,
        secret: &str,
        method: HttpMethod,
        resource_path: &str,
        body: &[u8],
    ) -> bool {
        let base = signature_base(
            method,
            resource_path,
            &self.api_key,
            self.timestamp,
            &self.nonce,
            &content_hash(method, body),
        );
        constant_time_compare(&self.signature, &compute_signature(secret, &base))
    }
}

/// Compare two signatures without an early exit on the first differing byte,
/// so response timing leaks nothing about how much of a forged MAC matched.
fn constant_time_compare(expected: &str, actual: &str) -> bool {
    expected.len() == actual.len()
        && expected
            .bytes()
            .zip(actual.bytes())
            .fold(0u8, |diff, (x, y)| diff | (x ^ y))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, FixedRandom};

    const TS: i64 = 1_700_000_000;
    const NONCE: &str = "000102030405060708090a0b0c0d0e0f";
    const BODY: &[u8] = br#"{"amount":100}"#;

    fn creds(secret: &str) -> Credentials {
        Credentials::new("key-1", secret, "merchant-9").unwrap()
    }

    fn fixed_signer(secret: &str) -> RequestSigner {
        RequestSigner::with_sources(
            creds(secret),
            Arc::new(FixedClock(TS)),
            Arc::new(FixedRandom::new((0u8..16).collect::<Vec<_>>())),
        )
    }

    fn signature_of(headers: &SignedHeaders) -> String {
        OpaAuthorization::parse(&headers.authorization)
            .unwrap()
            .signature
    }

    #[test]
    fn test_content_hash_empty_cases() {
        assert_eq!(content_hash(HttpMethod::Get, b""), EMPTY_CONTENT_HASH);
        assert_eq!(content_hash(HttpMethod::Post, b""), EMPTY_CONTENT_HASH);
        assert_eq!(content_hash(HttpMethod::Post, b" \n\t "), EMPTY_CONTENT_HASH);
    }

    #[test]
    fn test_get_with_body_uses_empty_hash() {
        assert_eq!(content_hash(HttpMethod::Get, BODY), EMPTY_CONTENT_HASH);
    }

    #[test]
    fn test_content_hash_known_vector() {
        // base64(MD5("application/json{\"amount\":100}"))
        assert_eq!(
            content_hash(HttpMethod::Post, BODY),
            "Lp6TjfwXemDatz7k6hKxSg=="
        );
    }

    #[test]
    fn test_signature_base_layout() {
        let base = signature_base(HttpMethod::Post, "/v2/codes", "key-1", TS, NONCE, "h");
        assert_eq!(
            base,
            "POST\n/v2/codes\nkey-1\n1700000000\n000102030405060708090a0b0c0d0e0f\nh\n"
        );
    }

    #[test]
    fn test_known_signature_vector() {
        let headers = sign_with(HttpMethod::Post, "/v2/codes", BODY, &creds("s3cret"), TS, NONCE);
        assert_eq!(
            headers.authorization,
            "hmac OPA-Auth:key-1:1+ykwW72ipb+u/IaY7su1CcQ/JfCEN64lwmmCdRY7DQ=:000102030405060708090a0b0c0d0e0f:1700000000"
        );
        assert_eq!(headers.content_type, "application/json");
        assert_eq!(headers.assume_merchant, "merchant-9");
    }

    #[test]
    fn test_signing_is_deterministic() {
        let a = fixed_signer("s3cret").build_auth_headers(HttpMethod::Post, "/v2/codes", BODY);
        let b = fixed_signer("s3cret").build_auth_headers(HttpMethod::Post, "/v2/codes", BODY);
        assert_eq!(a, b);
        assert_eq!(
            a,
            sign_with(HttpMethod::Post, "/v2/codes", BODY, &creds("s3cret"), TS, NONCE)
        );
    }

    #[test]
    fn test_recomputed_hmac_matches() {
        let headers = fixed_signer("s3cret").build_auth_headers(HttpMethod::Post, "/v2/codes", BODY);
        let auth = OpaAuthorization::parse(&headers.authorization).unwrap();

        assert_eq!(auth.api_key, "key-1");
        assert_eq!(auth.nonce, NONCE);
        assert_eq!(auth.timestamp, TS);

        let base = signature_base(
            HttpMethod::Post,
            "/v2/codes",
            "key-1",
            TS,
            NONCE,
            &content_hash(HttpMethod::Post, BODY),
        );
        assert_eq!(auth.signature, compute_signature("s3cret", &base));
        assert!(auth.verify("s3cret", HttpMethod::Post, "/v2/codes", BODY));
        assert!(!auth.verify("other", HttpMethod::Post, "/v2/codes", BODY));
        assert!(!auth.verify("s3cret", HttpMethod::Post, "/v2/codes", b"{}"));
    }

    #[test]
    fn test_every_input_changes_signature() {
        let c = creds("s3cret");
        let reference = signature_of(&sign_with(HttpMethod::Post, "/v2/codes", BODY, &c, TS, NONCE));

        let variants = [
            sign_with(HttpMethod::Post, "/v2/codes", BODY, &creds("s3cret2"), TS, NONCE),
            sign_with(HttpMethod::Get, "/v2/codes", BODY, &c, TS, NONCE),
            sign_with(HttpMethod::Post, "/v2/payments/abc", BODY, &c, TS, NONCE),
            sign_with(HttpMethod::Post, "/v2/codes", br#"{"amount":101}"#, &c, TS, NONCE),
            sign_with(HttpMethod::Post, "/v2/codes", BODY, &c, TS + 1, NONCE),
            sign_with(
                HttpMethod::Post,
                "/v2/codes",
                BODY,
                &c,
                TS,
                "ffffffffffffffffffffffffffffffff",
            ),
        ];

        for variant in &variants {
            assert_ne!(signature_of(variant), reference);
        }
    }

    #[test]
    fn test_nonce_is_32_hex_chars() {
        let signer = RequestSigner::new(creds("s3cret"));
        let a = signer.next_nonce();
        let b = signer.next_nonce();

        assert_eq!(a.len(), 2 * NONCE_BYTES);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
        assert_eq!(fixed_signer("x").next_nonce(), NONCE);
    }

    #[test]
    fn test_live_signer_varies_per_call() {
        let signer = RequestSigner::new(creds("s3cret"));
        let a = signer.build_auth_headers(HttpMethod::Get, "/v2/payments/abc", b"");
        let b = signer.build_auth_headers(HttpMethod::Get, "/v2/payments/abc", b"");
        assert_ne!(a.authorization, b.authorization);
    }

    #[test]
    fn test_header_pairs() {
        let headers = sign_with(HttpMethod::Get, "/v2/payments/abc", b"", &creds("s"), TS, NONCE);
        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Authorization", "Content-Type", "X-ASSUME-MERCHANT"]);
        assert!(headers.authorization.starts_with("hmac OPA-Auth:key-1:"));
        assert!(headers.authorization.ends_with(":000102030405060708090a0b0c0d0e0f:1700000000"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(OpaAuthorization::parse("Bearer abc").is_err());
        assert!(OpaAuthorization::parse("hmac OPA-Auth:key:sig").is_err());
        assert!(OpaAuthorization::parse("hmac OPA-Auth:key:sig:nonce:soon").is_err());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc=", "abc="));
        assert!(!constant_time_compare("abc=", "abd="));
        assert!(!constant_time_compare("abc=", "abc"));
        assert!(!constant_time_compare("", "a"));
    }

    #[test]
    fn test_secret_not_in_debug() {
        let debug_str = format!("{:?}", fixed_signer("s3cret"));
        assert!(!debug_str.contains("s3cret"));
    }
}

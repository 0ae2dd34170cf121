//! Webhook signature verification.
//!
//! ApiPay signs each webhook delivery with HMAC-SHA256 over the raw request
//! body and sends the result as `X-Webhook-Signature: sha256=<hex digest>`.
//!
//! # Security
//!
//! - The digest is computed over the body bytes exactly as received, before
//!   any JSON parsing
//! - Comparison is constant-time (`subtle::ConstantTimeEq`) to prevent
//!   timing attacks
//! - Malformed or truncated headers verify as false, never as an error

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header value prefix for HMAC-SHA256 signatures.
const SIGNATURE_PREFIX: &str = "sha256=";

/// Verify a webhook signature header against the raw payload.
///
/// Computes `sha256=<hex(HMAC_SHA256(secret, payload))>` and compares it to
/// `signature_header` in constant time. Returns false for any mismatch,
/// including a missing `sha256=` prefix or a digest of the wrong length.
///
/// An empty secret is a configuration error; callers reject it at startup
/// (see [`crate::config::WebhookConfig::validate`]) rather than relying on
/// verification to fail.
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let expected = expected_header(payload, secret);
    constant_time_eq(expected.as_bytes(), signature_header.as_bytes())
}

/// Compute the header value ApiPay would send for this payload and secret.
pub fn expected_header(payload: &[u8], secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    let digest = mac.finalize().into_bytes();
    format!("{}{}", SIGNATURE_PREFIX, hex_encode(&digest))
}

/// Encode bytes to a lowercase hex string.
pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Constant-time comparison to prevent timing attacks.
///
/// Inputs of unequal length are non-matching; the length check itself leaks
/// only the length, which an attacker already knows.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &[u8] = b"secret";
    const PAYLOAD: &[u8] = br#"{"event":"invoice.status_changed","invoice":{"id":42,"status":"paid"}}"#;

    #[test]
    fn correct_signature_verifies() {
        let header = expected_header(PAYLOAD, SECRET);
        assert!(verify_signature(PAYLOAD, &header, SECRET));
    }

    #[test]
    fn all_zero_digest_is_rejected() {
        let header = format!("sha256={}", "0".repeat(64));
        assert!(!verify_signature(PAYLOAD, &header, SECRET));
    }

    #[test]
    fn missing_prefix_is_rejected() {
        let header = expected_header(PAYLOAD, SECRET);
        let without_prefix = header.strip_prefix("sha256=").unwrap();
        assert!(!verify_signature(PAYLOAD, without_prefix, SECRET));
    }

    #[test]
    fn wrong_length_digest_is_rejected() {
        let header = expected_header(PAYLOAD, SECRET);
        let truncated = &header[..header.len() - 2];
        assert!(!verify_signature(PAYLOAD, truncated, SECRET));
        let extended = format!("{}ab", header);
        assert!(!verify_signature(PAYLOAD, &extended, SECRET));
    }

    #[test]
    fn empty_header_is_rejected() {
        assert!(!verify_signature(PAYLOAD, "", SECRET));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let header = expected_header(PAYLOAD, b"other_secret");
        assert!(!verify_signature(PAYLOAD, &header, SECRET));
    }

    #[test]
    fn empty_payload_verifies_with_valid_signature() {
        let header = expected_header(b"", SECRET);
        assert!(verify_signature(b"", &header, SECRET));
    }

    #[test]
    fn uppercase_hex_is_rejected() {
        // ApiPay sends lowercase hex; comparison is over the exact header.
        let header = expected_header(PAYLOAD, SECRET).to_uppercase();
        assert!(!verify_signature(PAYLOAD, &header, SECRET));
    }

    #[test]
    fn expected_header_has_fixed_shape() {
        let header = expected_header(PAYLOAD, SECRET);
        assert!(header.starts_with("sha256="));
        // SHA-256 digest is 32 bytes, 64 hex characters.
        assert_eq!(header.len(), "sha256=".len() + 64);
    }

    #[test]
    fn hex_encode_bytes() {
        assert_eq!(hex_encode(&[]), "");
        assert_eq!(hex_encode(&[0x00, 0xff, 0x10]), "00ff10");
    }

    proptest! {
        #[test]
        fn any_payload_round_trips(
            payload in proptest::collection::vec(any::<u8>(), 0..512),
            secret in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            let header = expected_header(&payload, &secret);
            prop_assert!(verify_signature(&payload, &header, &secret));
        }

        #[test]
        fn any_single_bit_flip_is_rejected(
            payload in proptest::collection::vec(any::<u8>(), 1..512),
            secret in proptest::collection::vec(any::<u8>(), 1..64),
            index in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let header = expected_header(&payload, &secret);
            let mut tampered = payload.clone();
            let i = index.index(tampered.len());
            tampered[i] ^= 1 << bit;
            prop_assert!(!verify_signature(&tampered, &header, &secret));
        }
    }
}

//! Webhook Signature Verification
//!
//! Signatures are `sha256=<hex>` where `<hex>` is the lowercase HMAC-SHA256
//! of the raw request body keyed with the endpoint secret. The body must be
//! the exact bytes Stripe sent; re-serialized JSON will not verify.

use hmac::digest::{Key, KeyInit};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Prefix of every signature header value
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Header carrying the signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Build the MAC from a block-sized key
///
/// Secrets longer than the SHA-256 block are hashed first and shorter ones
/// are zero-padded, as HMAC specifies, so every secret maps to a valid key.
fn keyed_mac(secret: &[u8]) -> HmacSha256 {
    let mut key = Key::<HmacSha256>::default();
    if secret.len() > key.len() {
        let digest = Sha256::digest(secret);
        key[..digest.len()].copy_from_slice(&digest);
    } else {
        key[..secret.len()].copy_from_slice(secret);
    }
    <HmacSha256 as KeyInit>::new(&key)
}

/// Compute the signature header value for `body`
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac = keyed_mac(secret.as_bytes());
    mac.update(body);

    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify `signature` against the body and secret
///
/// The comparison runs over the full formatted value in constant time, so
/// the position of the first differing byte is not observable. Any malformed
/// or empty signature simply compares unequal.
pub fn verify(body: &[u8], signature: &str, secret: &str) -> bool {
    let expected = sign(body, secret);
    let valid: bool = expected.as_bytes().ct_eq(signature.as_bytes()).into();
    if !valid {
        tracing::debug!(provided_len = signature.len(), "Webhook signature mismatch");
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";

    #[test]
    fn test_sign_then_verify() {
        for body in [&b""[..], b"{}", b"{\"type\":\"payment_intent.succeeded\"}"] {
            let sig = sign(body, SECRET);
            assert!(verify(body, &sig, SECRET));
        }
    }

    #[test]
    fn test_signature_format() {
        let sig = sign(b"hello", SECRET);
        let hex_part = sig.strip_prefix(SIGNATURE_PREFIX).unwrap();
        assert_eq!(hex_part.len(), 64);
        assert!(hex_part.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_known_digest() {
        // RFC 4231 test case 2
        let sig = sign(b"what do ya want for nothing?", "Jefe");
        assert_eq!(
            sig,
            "sha256=5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_long_key_is_hashed_first() {
        // RFC 4231 test case 6
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&[0xaa; 131]).unwrap();
        mac.update(b"Test Using Larger Than Block-Size Key - Hash Key First");
        let expected = hex::encode(mac.finalize().into_bytes());
        assert_eq!(
            expected,
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );

        let mut mac = keyed_mac(&[0xaa; 131]);
        mac.update(b"Test Using Larger Than Block-Size Key - Hash Key First");
        assert_eq!(hex::encode(mac.finalize().into_bytes()), expected);
    }

    #[test]
    fn test_round_trip_and_tamper_across_inputs() {
        let secrets = [
            String::new(),
            "k".to_string(),
            "whsec_test".to_string(),
            "x".repeat(64),
            "y".repeat(65),
            "clé-secrète-ünïcode".to_string(),
        ];
        let bodies: Vec<Vec<u8>> = vec![
            Vec::new(),
            b"{}".to_vec(),
            "{\"name\":\"Zoë ✓ 支付\"}".as_bytes().to_vec(),
            vec![0xff, 0xfe, 0x00, 0x80],
            (0..=255u8).cycle().take(1000).collect(),
        ];

        for secret in &secrets {
            for body in &bodies {
                let mut reference =
                    <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).unwrap();
                reference.update(body);
                let expected = format!(
                    "{SIGNATURE_PREFIX}{}",
                    hex::encode(reference.finalize().into_bytes())
                );

                let sig = sign(body, secret);
                assert_eq!(sig, expected);
                assert!(verify(body, &sig, secret));

                let mut tampered_body = body.clone();
                tampered_body.push(b' ');
                assert!(!verify(&tampered_body, &sig, secret));

                let other_secret = format!("{secret}!");
                assert!(!verify(body, &sig, &other_secret));
            }
        }
    }

    #[test]
    fn test_wrong_secret_fails() {
        let sig = sign(b"body", "correct-secret");
        assert!(!verify(b"body", &sig, "wrong-secret"));
    }

    #[test]
    fn test_tampered_body_fails() {
        let sig = sign(b"original body", SECRET);
        assert!(!verify(b"tampered body", &sig, SECRET));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let sig = sign(b"body", SECRET);
        let mut chars: Vec<char> = sig.chars().collect();
        for i in [SIGNATURE_PREFIX.len(), sig.len() - 1] {
            let original = chars[i];
            chars[i] = if original == '0' { '1' } else { '0' };
            let tampered: String = chars.iter().collect();
            assert!(!verify(b"body", &tampered, SECRET));
            chars[i] = original;
        }
    }

    #[test]
    fn test_missing_or_malformed_signature_fails() {
        let sig = sign(b"body", SECRET);
        let raw_hex = sig.strip_prefix(SIGNATURE_PREFIX).unwrap();

        assert!(!verify(b"body", "", SECRET));
        assert!(!verify(b"body", raw_hex, SECRET));
        assert!(!verify(b"body", "sha256=", SECRET));
        assert!(!verify(b"body", "sha256=not-valid-hex!", SECRET));
        assert!(!verify(b"body", &sig.to_uppercase(), SECRET));
        assert!(!verify(b"body", &format!("{sig}00"), SECRET));
    }
}

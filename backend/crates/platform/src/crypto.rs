//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use rand::{Rng, rngs::OsRng};
use sha2::{Digest, Sha256};

/// Crockford-style alphabet without look-alikes (no I, L, O, U).
const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Random human-typeable code of `len` characters from an unambiguous alphabet.
pub fn random_code(len: usize) -> String {
    (0..len)
        .map(|_| CODE_ALPHABET[OsRng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Short, non-reversible tag for a secret, safe to put in logs.
///
/// First 8 bytes of SHA-256 as hex.
pub fn fingerprint(secret: &str) -> String {
    sha256(secret.as_bytes())[..8]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Encode bytes as unpadded base64url
pub fn to_base64url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode standard base64 (e.g. secrets supplied through the environment)
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_values() {
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);
    }

    #[test]
    fn test_fingerprint_is_short_and_stable() {
        let a = fingerprint("eyJhbGciOi.payload.sig");
        assert_eq!(a.len(), 16);
        assert_eq!(a, fingerprint("eyJhbGciOi.payload.sig"));
        assert_ne!(a, fingerprint("eyJhbGciOi.payload.sig2"));
    }

    #[test]
    fn test_random_code_alphabet() {
        let code = random_code(64);
        assert_eq!(code.len(), 64);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_base64url_is_unpadded() {
        let encoded = to_base64url(&[0xfb, 0xff, 0x00, 0x10]);
        assert_eq!(encoded, "-_8AEA");
    }

    #[test]
    fn test_from_base64() {
        assert_eq!(from_base64("AAEC").unwrap(), vec![0, 1, 2]);
        assert!(from_base64("not base64!").is_err());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"ABCD", b"ABCD"));
        assert!(!constant_time_eq(b"ABCD", b"ABCE"));
        assert!(!constant_time_eq(b"ABCD", b"ABC"));
    }
}

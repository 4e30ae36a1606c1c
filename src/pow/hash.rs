use sha2::{Digest, Sha256};

/// Width of a digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 64;

/// Lowercase hex SHA-256 of `input`. Must match the ledger service bit for bit.
pub fn digest(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// True iff the first `difficulty` characters of `hex` are all `'0'`.
pub fn meets_target(hex: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    hex.len() >= difficulty && hex.bytes().take(difficulty).all(|b| b == b'0')
}

/// Hashes `payload + decimal(nonce)` for many nonces without re-absorbing the
/// payload each time.
#[derive(Clone)]
pub struct NonceHasher {
    prefix: Sha256,
}

impl NonceHasher {
    pub fn new(payload: &str) -> Self {
        Self {
            prefix: Sha256::new_with_prefix(payload.as_bytes()),
        }
    }

    pub fn digest(&self, nonce: u64) -> String {
        let mut hasher = self.prefix.clone();
        hasher.update(nonce.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_known_sha256() {
        assert_eq!(
            digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(digest("abc").len(), DIGEST_HEX_LEN);
    }

    #[test]
    fn target_counts_leading_zero_chars() {
        assert!(meets_target("00ab", 2));
        assert!(!meets_target("00ab", 3));
        assert!(!meets_target("0a0b", 2));
        assert!(meets_target("abcd", 0));
        assert!(!meets_target("00", 3));
    }

    #[test]
    fn nonce_hasher_agrees_with_plain_digest() {
        let hasher = NonceHasher::new("abc");
        for nonce in [0u64, 1, 9, 10, 252, 1_000_000, u64::MAX] {
            assert_eq!(hasher.digest(nonce), digest(&format!("abc{nonce}")));
        }
    }
}

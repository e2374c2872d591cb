//! Source fingerprinting for load memoization.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 fingerprint of raw source bytes.
///
/// # Returns
/// Hexadecimal string representation of the hash.
pub fn fingerprint(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_consistency() {
        let content = b"date,city,pm2_5\n2024-01-01,Delhi,120\n";
        assert_eq!(fingerprint(content), fingerprint(content));
        assert_eq!(fingerprint(content).len(), 64);
    }

    #[test]
    fn test_different_content_different_fingerprint() {
        let a = fingerprint(b"date,city,pm2_5\n2024-01-01,Delhi,120\n");
        let b = fingerprint(b"date,city,pm2_5\n2024-01-01,Delhi,121\n");
        assert_ne!(a, b);
    }
}

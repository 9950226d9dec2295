//! Content digests for artifact integrity fragments

/// Calculate the SHA256 digest of data as lowercase hex.
///
/// The result is what goes after `#sha256=` in an index link.
///
/// # Examples
///
/// ```
/// # use pyidx_core::digest::sha256_hex;
/// let hash = sha256_hex(b"hello world");
/// assert_eq!(hash.len(), 64);
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Returns true when `value` looks like a hex SHA256 digest.
pub fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex(b"hello world");
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert!(is_sha256_hex(&hash));
    }

    #[test]
    fn test_is_sha256_hex_rejects_garbage() {
        assert!(!is_sha256_hex(""));
        assert!(!is_sha256_hex("abc"));
        assert!(!is_sha256_hex(&"z".repeat(64)));
    }
}

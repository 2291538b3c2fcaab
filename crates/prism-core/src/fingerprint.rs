// crates/prism-core/src/fingerprint.rs
//
// Content fingerprints used as embedding cache keys.
//
// A fingerprint is the hex-encoded SHA-256 digest of a text's exact UTF-8
// bytes. It depends on nothing but the text, so two responses with the same
// content share one cache entry no matter which model or prompt produced them.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of a text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint the exact bytes of `text`.
    pub fn of(text: &str) -> Self {
        Fingerprint(hex::encode(hash_bytes(text.as_bytes())))
    }

    /// The 64-character lowercase hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SHA-256 of `data`.
fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let a = Fingerprint::of("ok");
        let b = Fingerprint::of("ok");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_fingerprint_is_byte_exact() {
        // Whitespace and case are content.
        assert_ne!(Fingerprint::of("ok"), Fingerprint::of("ok "));
        assert_ne!(Fingerprint::of("ok"), Fingerprint::of("OK"));
    }

    #[test]
    fn test_fingerprint_known_digest() {
        // sha256("") is a well-known constant.
        assert_eq!(
            Fingerprint::of("").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fingerprint_serializes_as_plain_string() {
        let fp = Fingerprint::of("hello");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{}\"", fp.as_str()));
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
    }
}

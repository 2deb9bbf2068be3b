//! Content digests for input resources

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SHA256 digest of a metamodel resource, printed in generated headers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute digest from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute digest of text content
    pub fn of_content(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, enough to tell resources apart in a header
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        &self.0[..end]
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let content = r#"{"packages": []}"#;
        assert_eq!(Checksum::of_content(content), Checksum::of_content(content));
        assert_ne!(Checksum::of_content(content), Checksum::of_content("{}"));
    }

    #[test]
    fn test_short_digest() {
        let digest = Checksum::of_content("abc");
        assert_eq!(digest.as_str().len(), 64);
        assert_eq!(digest.short(), "ba7816bf8f01");
    }
}

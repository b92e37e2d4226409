//! Canonical state fingerprints with domain separation.
//!
//! **Exactly one place defines canonical hashing.** Every fingerprint in the
//! engine is `sha256(domain_prefix || identity_bytes)`, where the domain
//! prefix is a typed, null-terminated byte string selected via [`HashDomain`].

use sha2::{Digest, Sha256};

/// A content-addressed hash with algorithm identifier.
///
/// Format: `"algorithm:hex_digest"` (e.g., `"sha256:abcdef..."`)
///
/// Invariant: the inner string always contains exactly one `:` separator,
/// with non-empty substrings on both sides (enforced by [`ContentHash::parse`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash {
    /// Full string in `"algorithm:hex_digest"` format.
    full: String,
    /// Byte offset of the `:` separator (cached from parse).
    colon: usize,
}

impl ContentHash {
    /// Parse from `"algorithm:hex"` format.
    ///
    /// Returns `None` if the format is invalid (missing colon,
    /// empty algorithm, or empty digest).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let colon = s.find(':')?;
        if colon == 0 || colon == s.len() - 1 {
            return None;
        }
        Some(Self {
            full: s.to_string(),
            colon,
        })
    }

    /// The algorithm portion (e.g., "sha256").
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.full[..self.colon]
    }

    /// The hex digest portion.
    #[must_use]
    pub fn hex_digest(&self) -> &str {
        &self.full[self.colon + 1..]
    }

    /// The full string representation (`"algorithm:hex_digest"`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

/// Typed domain separator for [`canonical_hash`].
///
/// Every variant maps to a unique, null-terminated byte string used as a
/// SHA-256 prefix. Distinct domains cannot collide on identical input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashDomain {
    /// Search node state fingerprints (visited-set membership, dedup).
    SearchNode,
    /// Search graph artifact hashing.
    SearchGraph,
    /// Puzzle definition hashing (run summaries).
    PuzzleDefinition,
}

impl HashDomain {
    /// The raw domain-separator bytes (null-terminated).
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::SearchNode => b"PARLOR::SEARCH_NODE::V1\0",
            Self::SearchGraph => b"PARLOR::SEARCH_GRAPH::V1\0",
            Self::PuzzleDefinition => b"PARLOR::PUZZLE_DEFINITION::V1\0",
        }
    }

    /// All domain variants in declaration order.
    pub const ALL: &'static [HashDomain] = &[
        Self::SearchNode,
        Self::SearchGraph,
        Self::PuzzleDefinition,
    ];
}

/// Compute the canonical hash of a byte slice with domain separation.
///
/// Algorithm: SHA-256. Result format: `"sha256:<hex_digest>"`.
#[must_use]
pub fn canonical_hash(domain: HashDomain, data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update(data);
    let digest = hasher.finalize();
    let full = format!("sha256:{}", hex::encode(digest));
    // The constructed string always contains the separator.
    ContentHash {
        colon: "sha256".len(),
        full,
    }
}

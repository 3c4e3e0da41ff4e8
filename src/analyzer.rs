//! Derive the fixed set of properties of a string.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// The deterministic properties of one analyzed string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySet {
    pub length: usize,
    pub is_palindrome: bool,
    pub unique_characters: usize,
    pub word_count: usize,
    #[serde(rename = "sha256_hash")]
    pub hash: String,
    /// Keyed in code point order, not in order of first occurrence.
    #[serde(rename = "character_frequency_map")]
    pub character_frequency: BTreeMap<char, usize>,
}

/// A stored string, keyed by the SHA-256 digest of its value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedRecord {
    #[serde(rename = "id")]
    pub identifier: String,
    pub value: String,
    pub properties: PropertySet,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AnalyzedRecord {
    /// Analyze `value` and stamp the result with the current time.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let properties = analyze(&value);

        Self {
            identifier: properties.hash.clone(),
            value,
            properties,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Lowercase hex SHA-256 of the raw UTF-8 bytes.
pub fn identifier(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compute the property set of `value`.
///
/// This never fails: the empty string is a palindrome with no words and no characters.
pub fn analyze(value: &str) -> PropertySet {
    let mut character_frequency = BTreeMap::new();
    let mut length = 0;
    for c in value.chars() {
        *character_frequency.entry(c).or_insert(0) += 1;
        length += 1;
    }

    PropertySet {
        length,
        is_palindrome: is_palindrome(value),
        unique_characters: character_frequency.len(),
        word_count: value.split_whitespace().count(),
        hash: identifier(value),
        character_frequency,
    }
}

// case-insensitive, but whitespace and punctuation count
fn is_palindrome(value: &str) -> bool {
    let lower = value.to_lowercase().chars().collect::<Vec<_>>();
    lower.iter().eq(lower.iter().rev())
}

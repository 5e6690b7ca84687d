//! Compact identifiers.
//!
//! - [`ShortId`]: 8 lowercase hex characters, unique only within the
//!   [`Node`](crate::tree::Node) that holds the file.
//! - [`CapabilityKey`]: 32 lowercase hex characters (a v4 UUID in simple
//!   form), unique among live shared folders and unguessable.
//!
//! Both are random. Uniqueness is enforced by the caller, which re-rolls
//! until the candidate is not taken in its scope.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SHORT_ID_LEN: usize = 8;
pub const CAPABILITY_KEY_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("expected {expected} hex characters, got '{value}'")]
    Malformed { value: String, expected: usize },
}

fn check_hex(value: &str, expected: usize) -> Result<(), IdError> {
    if value.len() == expected && value.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(IdError::Malformed {
            value: value.to_string(),
            expected,
        })
    }
}

fn random_hex() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Per-node file identifier used for compact external reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortId(String);

impl ShortId {
    /// Draw a random id. Not checked against any scope.
    pub fn generate() -> Self {
        let mut hex = random_hex();
        hex.truncate(SHORT_ID_LEN);
        ShortId(hex)
    }

    /// Draw ids until `taken` rejects none of them.
    pub fn generate_unique(taken: impl Fn(&ShortId) -> bool) -> Self {
        loop {
            let candidate = Self::generate();
            if !taken(&candidate) {
                return candidate;
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ShortId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        check_hex(&s, SHORT_ID_LEN)?;
        Ok(ShortId(s))
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unguessable token granting a live read view of a shared subtree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityKey(String);

impl CapabilityKey {
    pub fn generate() -> Self {
        CapabilityKey(random_hex())
    }

    pub fn generate_unique(taken: impl Fn(&CapabilityKey) -> bool) -> Self {
        loop {
            let candidate = Self::generate();
            if !taken(&candidate) {
                return candidate;
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CapabilityKey {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        check_hex(&s, CAPABILITY_KEY_LEN)?;
        Ok(CapabilityKey(s))
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

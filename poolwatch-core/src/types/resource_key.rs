//! Resource key type identifying a watchable ledger account.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const MIN_KEY_LEN: usize = 32;
const MAX_KEY_LEN: usize = 44;

/// Address of a pool or a wallet-owned token account.
///
/// Equality is structural and the value is immutable once created.
///
/// # Examples
///
/// ```
/// use poolwatch_core::types::ResourceKey;
///
/// let key = ResourceKey::new("So11111111111111111111111111111111111111112").unwrap();
/// assert_eq!(key.as_str(), "So11111111111111111111111111111111111111112");
/// assert!(ResourceKey::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Creates a new `ResourceKey` from a base58 address.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyKey` if the string is empty.
    /// Returns `ValidationError::InvalidKey` if the length or alphabet is wrong.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::EmptyKey);
        }
        if !(MIN_KEY_LEN..=MAX_KEY_LEN).contains(&s.len())
            || !s.chars().all(|c| BASE58_ALPHABET.contains(c))
        {
            return Err(ValidationError::InvalidKey(s));
        }
        Ok(Self(s))
    }

    /// Creates a new `ResourceKey` without validation.
    ///
    /// Intended for trusted static data and tests.
    #[must_use]
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a shortened form for log lines (`AbCd…WxYz`).
    #[must_use]
    pub fn short(&self) -> String {
        if self.0.len() <= 8 {
            return self.0.clone();
        }
        match (self.0.get(..4), self.0.get(self.0.len() - 4..)) {
            (Some(head), Some(tail)) => format!("{head}…{tail}"),
            _ => self.0.clone(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ResourceKey> for String {
    fn from(key: ResourceKey) -> Self {
        key.0
    }
}

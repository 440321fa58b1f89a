//! Token pair types.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ResourceKey, ValidationError};

/// Unordered token pair, normalised so that `token_x < token_y`.
///
/// Pools are keyed by the normalised pair, so `(A, B)` and `(B, A)` resolve
/// to the same pools.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pair {
    token_x: ResourceKey,
    token_y: ResourceKey,
}

impl Pair {
    /// Creates a normalised pair from two token mints in any order.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::SamePair` if both tokens are equal.
    pub fn new(a: ResourceKey, b: ResourceKey) -> Result<Self, ValidationError> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Ok(Self {
                token_x: a,
                token_y: b,
            }),
            std::cmp::Ordering::Greater => Ok(Self {
                token_x: b,
                token_y: a,
            }),
            std::cmp::Ordering::Equal => Err(ValidationError::SamePair(a.to_string())),
        }
    }

    /// Returns the lower token mint.
    #[must_use]
    pub fn token_x(&self) -> &ResourceKey {
        &self.token_x
    }

    /// Returns the higher token mint.
    #[must_use]
    pub fn token_y(&self) -> &ResourceKey {
        &self.token_y
    }

    /// Returns true if `token` is one side of the pair.
    #[must_use]
    pub fn contains(&self, token: &ResourceKey) -> bool {
        &self.token_x == token || &self.token_y == token
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token_x.short(), self.token_y.short())
    }
}

/// Ordered from/to token selection on the trading page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    /// Token being sold.
    pub from: ResourceKey,
    /// Token being bought.
    pub to: ResourceKey,
}

impl TradingPair {
    /// Creates a trading pair selection.
    #[must_use]
    pub fn new(from: ResourceKey, to: ResourceKey) -> Self {
        Self { from, to }
    }

    /// Returns the normalised pair, or `None` when `from == to`.
    #[must_use]
    pub fn pair(&self) -> Option<Pair> {
        Pair::new(self.from.clone(), self.to.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> ResourceKey {
        ResourceKey::new_unchecked(s)
    }

    #[test]
    fn test_pair_normalises_order() {
        let ab = Pair::new(key("A"), key("B")).unwrap();
        let ba = Pair::new(key("B"), key("A")).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.token_x(), &key("A"));
        assert_eq!(ab.token_y(), &key("B"));
        assert!(ab.contains(&key("B")));
        assert!(!ab.contains(&key("C")));
    }

    #[test]
    fn test_pair_rejects_same_token() {
        assert!(matches!(
            Pair::new(key("A"), key("A")),
            Err(ValidationError::SamePair(_))
        ));
    }

    #[test]
    fn test_trading_pair_same_token_has_no_pair() {
        assert!(TradingPair::new(key("A"), key("A")).pair().is_none());
        assert!(TradingPair::new(key("A"), key("B")).pair().is_some());
    }
}

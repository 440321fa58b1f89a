//! Navigation route.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The route the user is currently viewing (e.g. `/exchange/SOL/USDC`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutePath(String);

impl RoutePath {
    /// Creates a route path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the route as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the route is `prefix` or nested below it.
    ///
    /// Matching is per path segment: `/exchange` contains `/exchange/SOL`
    /// but not `/exchangeable`.
    #[must_use]
    pub fn is_within(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_end_matches('/');
        match self.0.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoutePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_within_segments() {
        assert!(RoutePath::new("/exchange").is_within("/exchange"));
        assert!(RoutePath::new("/exchange/SOL/USDC").is_within("/exchange"));
        assert!(RoutePath::new("/exchange?from=SOL").is_within("/exchange/"));
        assert!(!RoutePath::new("/exchangeable").is_within("/exchange"));
        assert!(!RoutePath::new("/statistics").is_within("/exchange"));
    }
}

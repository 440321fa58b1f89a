//! Navigation/selection context.

use serde::{Deserialize, Serialize};

use super::{ResourceKey, RoutePath, TradingPair};

/// Snapshot of the navigation and selection state.
///
/// Owned and mutated by the navigation layer; the subscription subsystem
/// only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionContext {
    /// Current route.
    pub route: RoutePath,
    /// Selected trading pair on the exchange page.
    #[serde(default)]
    pub trading_pair: Option<TradingPair>,
    /// Pool selected on the new-position page.
    #[serde(default)]
    pub new_position_pool: Option<ResourceKey>,
}

impl SelectionContext {
    /// Creates a context on `route` with nothing selected.
    #[must_use]
    pub fn on_route(route: impl Into<String>) -> Self {
        Self {
            route: RoutePath::new(route),
            trading_pair: None,
            new_position_pool: None,
        }
    }

    /// Returns the context with the given trading pair selected.
    #[must_use]
    pub fn with_pair(mut self, from: ResourceKey, to: ResourceKey) -> Self {
        self.trading_pair = Some(TradingPair::new(from, to));
        self
    }

    /// Returns the context with the given new-position pool selected.
    #[must_use]
    pub fn with_position_pool(mut self, pool: ResourceKey) -> Self {
        self.new_position_pool = Some(pool);
        self
    }
}

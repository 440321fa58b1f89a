//! Static watch configuration.
//!
//! Loaded once at startup and immutable afterwards: the known fee tiers, the
//! pool directory, the two-hop whitelist and the auto-swap helper mapping.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::catalog::PoolCatalog;
use super::traits::{Configurable, EnvOverride, Validatable};
use crate::error::ConfigError;
use crate::types::{FeeTier, Pair, ResourceKey, ValidationError};

/// Route prefixes that activate watch categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Exchange (swap) page.
    #[serde(default = "default_exchange_route")]
    pub exchange: String,
    /// New-position page.
    #[serde(default = "default_new_position_route")]
    pub new_position: String,
}

fn default_exchange_route() -> String {
    "/exchange".to_string()
}

fn default_new_position_route() -> String {
    "/newPosition".to_string()
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            exchange: default_exchange_route(),
            new_position: default_new_position_route(),
        }
    }
}

/// One pool in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Pool account address.
    pub address: ResourceKey,
    /// First token mint (any order).
    pub token_x: ResourceKey,
    /// Second token mint (any order).
    pub token_y: ResourceKey,
    /// Fee tier of the pool.
    pub fee_tier: FeeTier,
}

impl PoolEntry {
    /// Returns the normalised pair of the pool.
    pub fn pair(&self) -> Result<Pair, ValidationError> {
        Pair::new(self.token_x.clone(), self.token_y.clone())
    }
}

/// Auto-swap helper pool for a token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSwapEntry {
    /// First token mint (any order).
    pub token_x: ResourceKey,
    /// Second token mint (any order).
    pub token_y: ResourceKey,
    /// Helper pool address.
    pub pool: ResourceKey,
}

impl AutoSwapEntry {
    /// Returns the normalised pair the helper serves.
    pub fn pair(&self) -> Result<Pair, ValidationError> {
        Pair::new(self.token_x.clone(), self.token_y.clone())
    }
}

/// Static configuration consumed by the desired-set computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Route prefixes.
    #[serde(default)]
    pub routes: RouteConfig,
    /// Every fee tier pools can be created with.
    pub fee_tiers: Vec<FeeTier>,
    /// Pool directory.
    #[serde(default)]
    pub pools: Vec<PoolEntry>,
    /// Pools always watched on the exchange page for multi-hop routing.
    #[serde(default)]
    pub two_hop_whitelist: Vec<ResourceKey>,
    /// Auto-swap helper pools keyed by token pair.
    #[serde(default)]
    pub auto_swap_pools: Vec<AutoSwapEntry>,
}

impl WatchConfig {
    /// Builds the immutable lookup structure used at runtime.
    #[must_use]
    pub fn catalog(&self) -> PoolCatalog {
        PoolCatalog::from_config(self)
    }
}

impl Validatable for WatchConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, route) in [
            ("routes.exchange", &self.routes.exchange),
            ("routes.new_position", &self.routes.new_position),
        ] {
            if !route.starts_with('/') {
                return Err(ConfigError::invalid_value(field, "must start with '/'"));
            }
        }
        if self.routes.exchange == self.routes.new_position {
            return Err(ConfigError::invalid_value(
                "routes",
                "exchange and new_position routes must differ",
            ));
        }

        if self.fee_tiers.is_empty() {
            return Err(ConfigError::missing_field("fee_tiers"));
        }
        let mut tiers = HashSet::new();
        for (i, tier) in self.fee_tiers.iter().enumerate() {
            tier.check()
                .map_err(|e| ConfigError::invalid_value(format!("fee_tiers[{i}]"), e.to_string()))?;
            if !tiers.insert(*tier) {
                return Err(ConfigError::invalid_value(
                    format!("fee_tiers[{i}]"),
                    format!("duplicate fee tier {tier}"),
                ));
            }
        }

        let mut addresses = HashSet::new();
        let mut slots = HashSet::new();
        for (i, pool) in self.pools.iter().enumerate() {
            let field = format!("pools[{i}]");
            let pair = pool
                .pair()
                .map_err(|e| ConfigError::invalid_value(&field, e.to_string()))?;
            if !tiers.contains(&pool.fee_tier) {
                return Err(ConfigError::invalid_value(
                    &field,
                    format!("fee tier {} is not listed in fee_tiers", pool.fee_tier),
                ));
            }
            if !addresses.insert(&pool.address) {
                return Err(ConfigError::invalid_value(
                    &field,
                    format!("duplicate pool address {}", pool.address),
                ));
            }
            if !slots.insert((pair, pool.fee_tier)) {
                return Err(ConfigError::invalid_value(
                    &field,
                    format!("another pool already serves this pair at {}", pool.fee_tier),
                ));
            }
        }

        let mut whitelist = HashSet::new();
        for (i, key) in self.two_hop_whitelist.iter().enumerate() {
            if !whitelist.insert(key) {
                return Err(ConfigError::invalid_value(
                    format!("two_hop_whitelist[{i}]"),
                    format!("duplicate entry {key}"),
                ));
            }
        }

        let mut helper_pairs = HashSet::new();
        for (i, entry) in self.auto_swap_pools.iter().enumerate() {
            let field = format!("auto_swap_pools[{i}]");
            let pair = entry
                .pair()
                .map_err(|e| ConfigError::invalid_value(&field, e.to_string()))?;
            if !helper_pairs.insert(pair) {
                return Err(ConfigError::invalid_value(
                    &field,
                    "pair already has an auto-swap pool",
                ));
            }
        }

        Ok(())
    }
}

impl Configurable for WatchConfig {
    fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_string(&format!("{prefix}_EXCHANGE_ROUTE"), &mut self.routes.exchange);
        EnvOverride::apply_string(
            &format!("{prefix}_NEW_POSITION_ROUTE"),
            &mut self.routes.new_position,
        );
    }

    fn env_var_names(prefix: &str) -> Vec<String> {
        vec![
            format!("{prefix}_EXCHANGE_ROUTE"),
            format!("{prefix}_NEW_POSITION_ROUTE"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFormat, ConfigLoader};

    const YAML: &str = r"
routes:
  exchange: /exchange
fee_tiers:
  - { fee: 0.05, tick_spacing: 10 }
  - { fee: 0.3, tick_spacing: 60 }
pools:
  - address: 9vqYJjDUFecLL2xPUC4Rc7hyCtZ6iJ4mDiVZX7aFXoAe
    token_x: So11111111111111111111111111111111111111112
    token_y: EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v
    fee_tier: { fee: 0.05, tick_spacing: 10 }
two_hop_whitelist:
  - 7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU
auto_swap_pools:
  - token_x: EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v
    token_y: So11111111111111111111111111111111111111112
    pool: HJPjoWUrhoZzkNfRpHuieeFk9WcZWjwy6PBjZ81ngndJ
";

    fn load() -> WatchConfig {
        ConfigLoader::new()
            .load_validated_str(YAML, ConfigFormat::Yaml)
            .unwrap()
    }

    #[test]
    fn test_load_yaml_with_defaults() {
        let config = load();
        assert_eq!(config.routes.exchange, "/exchange");
        assert_eq!(config.routes.new_position, "/newPosition");
        assert_eq!(config.fee_tiers.len(), 2);
        assert_eq!(config.pools.len(), 1);
        assert_eq!(config.two_hop_whitelist.len(), 1);
        assert_eq!(config.auto_swap_pools.len(), 1);
    }

    #[test]
    fn test_rejects_unknown_fee_tier() {
        let mut config = load();
        config.pools[0].fee_tier.tick_spacing = 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pools[0]"));
    }

    #[test]
    fn test_rejects_duplicate_pool_slot() {
        let mut config = load();
        let mut twin = config.pools[0].clone();
        twin.address = ResourceKey::new_unchecked("4GkRbcYg1VKsZropgai4dMf2Nj2PkXNLf43knFpavrSi");
        std::mem::swap(&mut twin.token_x, &mut twin.token_y);
        config.pools.push(twin);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pools[1]"));
    }

    #[test]
    fn test_rejects_bad_routes() {
        let mut config = load();
        config.routes.new_position = "/exchange".to_string();
        assert!(config.validate().is_err());

        config.routes.new_position = "newPosition".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_fee_tiers() {
        let mut config = load();
        config.fee_tiers.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_whitelist_entry() {
        let mut config = load();
        config
            .two_hop_whitelist
            .push(config.two_hop_whitelist[0].clone());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_var_names() {
        let names = WatchConfig::env_var_names("POOLWATCH");
        assert_eq!(
            names,
            vec!["POOLWATCH_EXCHANGE_ROUTE", "POOLWATCH_NEW_POSITION_ROUTE"]
        );
    }
}

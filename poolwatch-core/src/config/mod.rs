//! Configuration management module.
//!
//! This module provides:
//! - YAML, TOML and JSON configuration file formats
//! - Validation with descriptive error messages
//! - Environment variable overrides
//! - The static watch configuration (fee tiers, pool directory, two-hop
//!   whitelist, auto-swap helper pools) and its lookup form, [`PoolCatalog`]
//!
//! # Example
//!
//! ```rust,ignore
//! use poolwatch_core::config::{ConfigLoader, WatchConfig};
//!
//! let config: WatchConfig = ConfigLoader::new()
//!     .with_env_prefix("POOLWATCH")
//!     .load_validated_file("watch.yaml")?;
//! let catalog = config.catalog();
//! ```

mod catalog;
mod loader;
mod traits;
mod watch_config;

pub use catalog::PoolCatalog;
pub use loader::{ConfigFormat, ConfigLoader};
pub use traits::{Configurable, EnvOverride, Validatable};
pub use watch_config::{AutoSwapEntry, PoolEntry, RouteConfig, WatchConfig};

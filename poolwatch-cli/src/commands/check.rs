//! Configuration check command.

use std::collections::HashSet;

use clap::Parser;
use poolwatch_core::config::{Configurable, WatchConfig};
use tracing::{info, warn};

use super::{AppConfig, ENV_PREFIX};

/// Arguments for the check command
#[derive(Parser)]
pub struct CheckArgs {
    /// Also list every pool in the directory
    #[arg(long)]
    pub pools: bool,
}

/// Prints a summary of an already validated configuration.
pub fn run(config: &AppConfig, args: &CheckArgs) {
    let watch = &config.watch;
    info!(
        pools = watch.pools.len(),
        fee_tiers = watch.fee_tiers.len(),
        "Configuration valid"
    );

    for key in unlisted_whitelist_entries(watch) {
        warn!(key = %key, "Whitelisted pool is not in the pool directory");
    }

    println!("Configuration OK");
    println!("================");
    println!("Exchange route:      {}", watch.routes.exchange);
    println!("New-position route:  {}", watch.routes.new_position);
    let tiers: Vec<String> = watch.fee_tiers.iter().map(ToString::to_string).collect();
    println!("Fee tiers:           {}", tiers.join(", "));
    println!("Pools:               {}", watch.pools.len());
    println!("Two-hop whitelist:   {}", watch.two_hop_whitelist.len());
    println!("Auto-swap pools:     {}", watch.auto_swap_pools.len());
    println!(
        "Env overrides:       {}",
        WatchConfig::env_var_names(ENV_PREFIX).join(", ")
    );

    if args.pools {
        println!();
        for pool in &watch.pools {
            println!(
                "  {}  {}/{}  {}",
                pool.address,
                pool.token_x.short(),
                pool.token_y.short(),
                pool.fee_tier
            );
        }
    }
}

fn unlisted_whitelist_entries(watch: &WatchConfig) -> Vec<&poolwatch_core::types::ResourceKey> {
    let listed: HashSet<_> = watch.pools.iter().map(|p| &p.address).collect();
    watch
        .two_hop_whitelist
        .iter()
        .filter(|key| !listed.contains(key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_unlisted_whitelist_entries() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/watch.yaml");
        let config = AppConfig::load(&path).unwrap();
        let unlisted = unlisted_whitelist_entries(&config.watch);
        assert_eq!(unlisted.len(), 1);
        assert_eq!(
            unlisted[0].as_str(),
            "tcSSSS7XhS4D5EVB8Nf471dAb7Qg25xEgRAhHPfQX88w"
        );
    }
}

use runeforge_config::Config;
use runeforge_core::OverrideConfig;
use tracing::info;

use super::service_client;

/// Strategy for displaying configuration and service status.
///
/// Prints the service and relay settings, the current override policy,
/// and whether the build service answers `/status`.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== runeforge Configuration ===\n");

        println!("Service:");
        println!("  URL: {}", config.service.base_url);
        println!("  Timeout: {}s", config.service.timeout_secs);
        println!("  Retry Delays (ms): {:?}", config.service.retry_delays_ms);

        info!("Checking service status");
        match service_client(&config)?.status().await {
            Ok(status) if status.running => println!("  Status: Running"),
            Ok(status) => {
                println!("  Status: Not running");
                if let Some(error) = status.import_error {
                    println!("  Import Error: {error}");
                }
            }
            Err(e) => {
                println!("  Status: Unreachable");
                println!("  Error: {e:#}");
            }
        }
        println!();

        println!("Relay:");
        println!("  Enchant Debounce: {}ms", config.relay.enchant_debounce_ms);
        println!("  Enchant Limit: {}", config.relay.enchant_limit);
        println!("  Auto Impact: {}", on_off(config.relay.auto_impact));
        println!();

        print_overrides(&config.overrides);
        Ok(())
    }
}

fn print_overrides(overrides: &OverrideConfig) {
    println!("Overrides:");
    let mode = if overrides.uniform_enabled() {
        "uniform"
    } else if overrides.per_socket_enabled() {
        "per socket"
    } else {
        "off"
    };
    println!("  Rune Mode: {mode}");
    println!("  Rune Line: {}", or_unset(overrides.rune_line()));
    for (i, choice) in overrides.per_socket().iter().enumerate() {
        if !choice.trim().is_empty() {
            println!("  Socket {}: {choice}", i + 1);
        }
    }
    println!("  Pad Sockets: {}", on_off(overrides.pad_sockets()));
    println!("  Amulet Enchant: {}", on_off(overrides.enchant_enabled()));
    println!("  Enchant Text: {}", or_unset(overrides.enchant_text()));
    if !overrides.enchant_recent().is_empty() {
        println!("  Recent Enchants: {}", overrides.enchant_recent().join(" | "));
    }
    println!("  Last Buckets: {}", or_unset(overrides.last_bucket_key()));
}

const fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn or_unset(value: &str) -> &str {
    if value.trim().is_empty() {
        "(not set)"
    } else {
        value
    }
}

//! `prism status` — show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use prism_core::config::{get_config_path, load_config};
use prism_providers::ProviderRegistry;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "◆ Prism Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    println!(
        "  {:<18} {}",
        "Cache TTL:".bold(),
        format!("{}s", config.router.cache_ttl_secs).dimmed()
    );
    println!(
        "  {:<18} {}",
        "Request timeout:".bold(),
        format!("{}s", config.router.request_timeout_secs).dimmed()
    );
    println!(
        "  {:<18} {}",
        "Default provider:".bold(),
        config
            .router
            .default_provider
            .as_deref()
            .unwrap_or("(highest priority)")
    );

    println!();
    println!("  {}", "Providers:".bold());

    let registry = ProviderRegistry::from_config(&config.providers);
    let mut providers: Vec<_> = registry.all().iter().collect();
    providers.sort_by_key(|p| p.priority);

    for provider in providers {
        let status = if provider.is_available() {
            format!("{} (key set)", "✓".green())
        } else {
            let hint = prism_providers::registry::find_by_name(&provider.name)
                .map(|spec| format!("· not configured ({})", spec.env_key))
                .unwrap_or_else(|| "· not configured".to_string());
            format!("{}", hint.dimmed())
        };
        println!(
            "    {:<20} {:<4} {}",
            provider.display_name,
            provider.priority.to_string().dimmed(),
            status
        );
    }

    println!();

    Ok(())
}

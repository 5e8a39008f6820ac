use crate::config::Config;
use anyhow::Result;
use colored::*;

/// Print the effective configuration
pub async fn show_command() -> Result<()> {
    let config = Config::load()?;

    println!("Configuration:");
    println!("==============");
    println!("Base URL:         {}", config.base_url);
    println!("Session cookie:   {}", if config.session_cookie.is_some() { "set" } else { "not set" });
    println!("CSRF token:       {}", if config.csrf_token.is_some() { "set" } else { "not set" });
    println!("Timeout:          {}s (connect {}s)", config.timeout_secs, config.connect_timeout_secs);
    println!("Retry attempts:   {}", config.retry_attempts);
    println!("Formset prefix:   {}", config.formset_prefix);

    if !config.data_types.is_empty() {
        println!("\nCombined data types:");
        for (data_type, sources) in &config.data_types {
            let labelled: Vec<String> = sources
                .sources
                .iter()
                .map(|source| match sources.label(source) {
                    Some(label) => format!("{} ({})", source, label),
                    None => source.clone(),
                })
                .collect();
            println!("  {} → {}", data_type.bold(), labelled.join(", "));
        }
    }

    println!("\nConfig file: {}", Config::get_config_path()?.display());
    Ok(())
}

pub async fn set_url_command(url: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set_base_url(url)?;
    println!("{} Base URL set to {}", "✓".bright_green().bold(), config.base_url.bright_green());
    Ok(())
}

//! `dntcheck config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Set { key, value } => set_config(&key, &value),
        ConfigCommands::Path => show_path(),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Pretty => {
            let unset = || "(default)".dimmed().to_string();
            let checker = &config.checker;

            println!("{}", "Current Configuration:".bold());
            println!();
            println!(
                "  {} {}",
                "policy_path:".bold(),
                config
                    .policy_path
                    .as_ref()
                    .map_or_else(unset, |p| p.display().to_string())
            );
            println!(
                "  {} {}",
                "store_path:".bold(),
                ctx.store_path()
                    .map_or_else(|_| unset(), |p| p.display().to_string())
            );
            println!(
                "  {} {}",
                "output_format:".bold(),
                config.output_format.unwrap_or_default()
            );

            println!();
            println!("{}", "Checker:".bold());
            println!("  {} {}", "enabled:".bold(), checker.enabled);
            println!(
                "  {} {}",
                "recheck_interval_secs:".bold(),
                checker.recheck_interval_secs
            );
            println!(
                "  {} {}",
                "fetch_timeout_secs:".bold(),
                checker.fetch_timeout_secs
            );
            println!(
                "  {} {}",
                "pacing_interval_ms:".bold(),
                checker.pacing_interval_ms
            );
            println!("  {} {}", "scheme:".bold(), checker.scheme);
            println!(
                "  {} {}",
                "port:".bold(),
                checker.port.map_or_else(unset, |p| p.to_string())
            );
        }
    }

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    println!("{} {} set to {}.", "Success:".green().bold(), key, value.cyan());
    Ok(())
}

fn show_path() -> Result<()> {
    let path = Config::path()?;
    println!("{}", path.display());
    Ok(())
}

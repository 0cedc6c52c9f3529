//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Check whether domains publish the EFF Do Not Track policy
///
/// Each domain is fetched from https://<domain>/.well-known/dnt-policy.txt
/// and compared byte-for-byte with the canonical policy text. Checks are
/// rate limited per domain, so repeated runs only refetch once the recheck
/// interval has passed.
#[derive(Parser, Debug)]
#[command(name = "dntcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Recheck-time store file (or set DNTCHECK_STORE env var)
    #[arg(long, env = "DNTCHECK_STORE", global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check domains for a compliant DNT policy
    Check(CheckArgs),

    /// Show when domains were last checked
    Status(StatusArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Check command
// ============================================================================

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Domains to check (e.g., eff.org)
    #[arg(required = true)]
    pub domains: Vec<String>,

    /// Canonical policy text file (or set DNTCHECK_POLICY env var)
    #[arg(short, long, env = "DNTCHECK_POLICY")]
    pub policy: Option<PathBuf>,

    /// Ignore stored recheck times for this run
    #[arg(long)]
    pub fresh: bool,
}

// ============================================================================
// Status command
// ============================================================================

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only show these domains
    pub domains: Vec<String>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., policy_path, recheck_interval_secs)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_parses_domains_and_globals() {
        let cli = Cli::try_parse_from([
            "dntcheck", "-o", "json", "check", "eff.org", "example.com", "--fresh",
        ])
        .unwrap();

        assert_eq!(cli.output, Some(OutputFormat::Json));
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.domains, ["eff.org", "example.com"]);
                assert!(args.fresh);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_check_requires_a_domain() {
        assert!(Cli::try_parse_from(["dntcheck", "check"]).is_err());
    }
}

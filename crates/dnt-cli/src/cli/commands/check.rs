//! `dntcheck check` - Verify domains against the canonical DNT policy.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use colored::Colorize;
use dnt::{
    CheckCoordinator, CheckOutcome, HttpPolicyFetcher, MemoryRecheckStore, PolicyText,
    RecheckTimeStore, SettingsToggle,
};
use futures_util::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::CheckArgs;
use crate::output::OutputFormat;

/// Result of checking one domain, as reported to the user.
#[derive(Debug, Serialize)]
struct CheckReport {
    domain: String,
    outcome: String,
    compliant: Option<bool>,
}

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "DNT Policy")]
    result: String,
}

pub async fn execute(ctx: Context, args: CheckArgs) -> Result<()> {
    let policy_path = ctx.config.policy_path_or_default(args.policy.clone())?;
    let policy = PolicyText::from_file(&policy_path).with_context(|| {
        format!(
            "Could not load policy text from {}\n\n\
             Provide it with one of:\n  \
             1. --policy <PATH>\n  \
             2. DNTCHECK_POLICY environment variable\n  \
             3. dntcheck config set policy_path <PATH>",
            policy_path.display()
        )
    })?;

    let store = if args.fresh {
        None
    } else {
        Some(Arc::new(ctx.open_store()?))
    };
    let coordinator = match &store {
        Some(store) => build_coordinator(&ctx, policy, Arc::clone(store))?,
        None => build_coordinator(&ctx, policy, Arc::new(MemoryRecheckStore::new()))?,
    };

    let spinner = if ctx.output_format == OutputFormat::Pretty && !ctx.verbose {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
        bar.set_message(format!("Checking {} domain(s)...", args.domains.len()));
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(bar)
    } else {
        None
    };

    let tickets: Vec<_> = args
        .domains
        .iter()
        .map(|domain| (domain.clone(), coordinator.check(domain)))
        .collect();

    let reports = join_all(tickets.into_iter().map(|(domain, ticket)| async move {
        let outcome = ticket.outcome();
        CheckReport {
            domain,
            outcome: outcome.to_string(),
            compliant: ticket.result().await,
        }
    }))
    .await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    if let Some(store) = &store {
        store
            .flush()
            .with_context(|| format!("Could not save store {}", store.path().display()))?;
    }

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Pretty => print_pretty(&reports, ctx.config.checker.enabled),
    }

    Ok(())
}

fn build_coordinator<S>(ctx: &Context, policy: PolicyText, store: Arc<S>) -> Result<CheckCoordinator>
where
    S: RecheckTimeStore + 'static,
{
    let checker = &ctx.config.checker;

    let fetcher = HttpPolicyFetcher::builder()
        .timeout(checker.fetch_timeout())
        .build()?;

    let coordinator = CheckCoordinator::builder(fetcher, policy)
        .config(checker)
        .store(store)
        .gate(SettingsToggle::new(checker.enabled))
        .build()?;

    Ok(coordinator)
}

fn print_pretty(reports: &[CheckReport], enabled: bool) {
    let rows: Vec<CheckRow> = reports
        .iter()
        .map(|r| CheckRow {
            domain: r.domain.clone(),
            outcome: r.outcome.clone(),
            result: match r.compliant {
                Some(true) => "compliant".green().to_string(),
                Some(false) => "not compliant".red().to_string(),
                None => "-".dimmed().to_string(),
            },
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{}", table);

    // Tips
    if !enabled {
        println!();
        println!(
            "{}",
            "Checking is disabled. Enable it with: dntcheck config set enabled true".dimmed()
        );
    } else if reports
        .iter()
        .any(|r| r.outcome == CheckOutcome::RateLimited.as_str())
    {
        println!();
        println!(
            "{}",
            "Tip: Rate-limited domains were checked recently; use --fresh to check them now"
                .dimmed()
        );
    }
}

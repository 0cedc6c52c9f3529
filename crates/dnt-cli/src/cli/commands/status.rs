//! `dntcheck status` - Show stored recheck times.

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use dnt::{Domain, RecheckRecord};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::StatusArgs;
use crate::output::OutputFormat;

/// A stored record with its next eligible check time.
#[derive(Debug, Serialize)]
struct StatusReport {
    domain: Domain,
    last_checked_at: DateTime<Utc>,
    eligible_at: DateTime<Utc>,
    eligible: bool,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Last Checked")]
    last_checked: String,
    #[tabled(rename = "Next Check")]
    next_check: String,
}

pub async fn execute(ctx: Context, args: StatusArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let filter = args
        .domains
        .iter()
        .map(|d| Domain::parse(d))
        .collect::<Result<Vec<_>, _>>()?;

    let interval = ctx.config.checker.recheck_interval();
    let now = Utc::now();

    let reports: Vec<StatusReport> = store
        .records()
        .into_iter()
        .filter(|r| filter.is_empty() || filter.contains(&r.domain))
        .map(|r| report(r, interval, now))
        .collect();

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Pretty => {
            if reports.is_empty() {
                println!("{}", "No domains have been checked yet.".dimmed());
                println!(
                    "{}",
                    format!("Store: {}", store.path().display()).dimmed()
                );
                return Ok(());
            }

            let rows: Vec<StatusRow> = reports
                .iter()
                .map(|r| StatusRow {
                    domain: r.domain.to_string(),
                    last_checked: r.last_checked_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                    next_check: if r.eligible {
                        "now".green().to_string()
                    } else {
                        r.eligible_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
                    },
                })
                .collect();

            let table = Table::new(&rows).with(Style::rounded()).to_string();
            println!("{}", table);
            println!();
            println!(
                "{}",
                format!("{} domain(s) in {}", reports.len(), store.path().display()).dimmed()
            );
        }
    }

    Ok(())
}

fn report(record: RecheckRecord, interval: std::time::Duration, now: DateTime<Utc>) -> StatusReport {
    let eligible_at = record.eligible_at(interval);
    StatusReport {
        eligible: eligible_at <= now,
        eligible_at,
        last_checked_at: record.last_checked_at,
        domain: record.domain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_report_eligibility() {
        let checked = Utc::now();
        let record = RecheckRecord::new(Domain::parse("eff.org").unwrap(), checked);

        let fresh = report(record.clone(), Duration::from_secs(60), checked);
        assert!(!fresh.eligible);
        assert_eq!(fresh.eligible_at, checked + chrono::TimeDelta::seconds(60));

        let later = checked + chrono::TimeDelta::seconds(60);
        assert!(report(record, Duration::from_secs(60), later).eligible);
    }
}

//! dntcheck - Do Not Track policy checker
//!
//! Verifies that domains publish the canonical DNT policy at their
//! well-known location, at most once per domain per recheck interval.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dnt_cli::run().await
}

//! # dnt-cli
//!
//! Command-line front end for the DNT policy checker.
//!
//! ## Features
//!
//! - **Batch checks**: verify many domains concurrently through one coordinator
//! - **Persistent rate limiting**: recheck times survive between runs
//! - **Status view**: see when each domain becomes eligible again
//! - **Multiple output formats**: Pretty tables or JSON

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;

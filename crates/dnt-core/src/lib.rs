//! Core types and traits for Do Not Track policy checking.
//!
//! This crate provides the foundational pieces shared by the checker workspace:
//!
//! - **Types**: [`Domain`], [`RecheckRecord`], [`PolicyResponse`]
//! - **Ports**: the [`PolicyFetcher`], [`RecheckTimeStore`], [`SettingsGate`]
//!   and [`PolicyTextSource`] traits the check coordinator is built from
//! - **Errors**: [`DntError`] and the [`Result`] alias
//!
//! # Example
//!
//! ```rust
//! use dnt_core::{well_known_url, Domain};
//!
//! let domain: Domain = "WWW.EFF.org.".parse().unwrap();
//! assert_eq!(domain.as_str(), "www.eff.org");
//! assert_eq!(
//!     well_known_url("https", &domain, None),
//!     "https://www.eff.org/.well-known/dnt-policy.txt"
//! );
//! ```

#![doc(html_root_url = "https://docs.rs/dnt-core/0.3.0")]

mod error;
pub mod ports;
pub mod types;

pub use error::{DntError, Result};
pub use ports::*;
pub use types::*;

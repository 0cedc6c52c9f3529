//! Rate-limited, deduplicating DNT policy checks.
//!
//! [`CheckCoordinator`] is the engine: it decides per call whether a domain's
//! well-known DNT policy should be fetched, makes sure at most one fetch per
//! domain is outstanding and at most one starts per recheck interval, and fans
//! the single result out to every caller that asked in the meantime.
//!
//! # Example
//!
//! ```rust,ignore
//! use dnt_checker::{CheckCoordinator, PolicyText, SettingsToggle};
//! use dnt_client::HttpPolicyFetcher;
//!
//! let toggle = SettingsToggle::new(true);
//! let coordinator = CheckCoordinator::builder(
//!     HttpPolicyFetcher::new()?,
//!     PolicyText::from_file("dnt-policy.txt".as_ref())?,
//! )
//! .gate(toggle.clone())
//! .build()?;
//!
//! let ticket = coordinator.check("eff.org");
//! if let Some(compliant) = ticket.result().await {
//!     println!("eff.org compliant: {compliant}");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/dnt-checker/0.3.0")]

mod clock;
mod config;
mod coordinator;
mod gate;
mod policy;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CheckerConfig, PolicyLocator};
pub use coordinator::{Callback, CheckCoordinator, CheckCoordinatorBuilder, CheckOutcome, CheckTicket};
pub use gate::SettingsToggle;
pub use policy::PolicyText;
pub use store::{JsonFileRecheckStore, MemoryRecheckStore};

//! Rate-limited verification of well-known Do Not Track policies.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dnt::{CheckCoordinator, HttpPolicyFetcher, PolicyText};
//!
//! #[tokio::main]
//! async fn main() -> dnt::Result<()> {
//!     let coordinator = CheckCoordinator::builder(
//!         HttpPolicyFetcher::new()?,
//!         PolicyText::from_file("dnt-policy.txt".as_ref())?,
//!     )
//!     .build()?;
//!
//!     // Any number of callers may ask; one fetch per domain goes out.
//!     let ticket = coordinator.check("eff.org");
//!     println!("{}: {:?}", ticket.outcome(), ticket.result().await);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/dnt/0.3.0")]

// Re-export core types
pub use dnt_core::*;

// Re-export the fetcher
pub use dnt_client::{FetchConfig, HttpPolicyFetcher, HttpPolicyFetcherBuilder};

// Re-export the engine
pub use dnt_checker::*;

// Re-export runtime for convenience
pub use tokio;

//! HTTP fetcher for well-known DNT policy resources.
//!
//! This crate provides [`HttpPolicyFetcher`], the reqwest-backed
//! implementation of [`dnt_core::PolicyFetcher`].

#![doc(html_root_url = "https://docs.rs/dnt-client/0.3.0")]

mod config;
mod fetcher;

pub use config::*;
pub use dnt_core::{DntError, Result};
pub use fetcher::{HttpPolicyFetcher, HttpPolicyFetcherBuilder};

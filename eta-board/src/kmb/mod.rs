//! KMB open data API access.
//!
//! This module provides the transport for the route, stop and arrival
//! endpoints of `data.etabus.gov.hk`.
//!
//! Key characteristics of the API:
//! - Every response wraps its payload in `{ "data": ... }`; an absent
//!   `data` means "nothing", not an error
//! - Requests fail transiently at the edge proxy, so reads are retried a
//!   fixed number of times with a fixed pause
//! - Arrival estimates are split by service type; some upcoming arrivals
//!   only appear under a non-default one

mod client;
pub mod convert;
mod error;
pub mod mock;
mod retry;
pub mod types;

pub use client::{ApiConfig, HttpSource, JsonSource};
pub use error::FetchError;
pub use retry::{RetryPolicy, RetryingFetcher};

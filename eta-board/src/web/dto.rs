//! Response bodies for the JSON API.

use serde::Serialize;

use crate::domain::{Bound, Route, StopListing};

/// A route variant in search results.
#[derive(Debug, Serialize)]
pub struct RouteResult {
    pub route: String,
    pub bound: Bound,
    pub service_type: String,
    pub origin: String,
    pub destination: String,
}

impl From<Route> for RouteResult {
    fn from(route: Route) -> Self {
        Self {
            route: route.code.as_str().to_string(),
            bound: route.bound,
            service_type: route.service_type,
            origin: route.origin_name,
            destination: route.dest_name,
        }
    }
}

/// A stop in a route's stop list.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub seq: u32,
    pub stop_id: String,

    /// Absent when the stop has no id or its name could not be fetched.
    pub name: Option<String>,
}

impl From<StopListing> for StopResult {
    fn from(listing: StopListing) -> Self {
        Self {
            seq: listing.stop.sequence_number,
            stop_id: listing.stop.stop_id,
            name: listing.details.display_name,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

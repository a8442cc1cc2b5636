//! Stop sequence lookup for a route variant.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::domain::{Route, StopRef};
use crate::kmb::convert::{convert_route_stops, decode_data};
use crate::kmb::types::RouteStopDto;
use crate::kmb::{FetchError, JsonSource, RetryPolicy, RetryingFetcher};

/// Resolves the ordered, duplicate-free stop list of a route variant.
#[derive(Debug, Clone)]
pub struct StopSequenceResolver<S> {
    fetcher: RetryingFetcher<S>,
    policy: RetryPolicy,
}

impl<S: JsonSource> StopSequenceResolver<S> {
    pub fn new(fetcher: RetryingFetcher<S>, policy: RetryPolicy) -> Self {
        Self { fetcher, policy }
    }

    /// Endpoint path for a route variant, e.g. `/route-stop/1A/outbound/1`.
    pub fn path_for(route: &Route) -> String {
        format!(
            "/route-stop/{}/{}/{}",
            route.code,
            route.bound.path_segment(),
            route.bound.direction()
        )
    }

    /// Fetch the stop list. An absent or empty payload gives an empty list;
    /// only exhausted retries (or an undecodable body) are errors.
    pub async fn resolve(&self, route: &Route) -> Result<Vec<StopRef>, FetchError> {
        let path = Self::path_for(route);
        let value = self.fetcher.fetch(&path, self.policy).await?;
        let rows: Vec<RouteStopDto> = decode_data(value)?;

        let stops = dedup_stops(convert_route_stops(rows));
        debug!(
            route = %route.code,
            bound = %route.bound,
            stops = stops.len(),
            "resolved stop sequence"
        );

        Ok(stops)
    }
}

/// Keep the first occurrence of each `(sequence_number, stop_id)` pair,
/// preserving arrival order.
pub fn dedup_stops(stops: Vec<StopRef>) -> Vec<StopRef> {
    let mut seen = HashSet::with_capacity(stops.len());
    let mut unique = Vec::with_capacity(stops.len());

    for stop in stops {
        if seen.insert((stop.sequence_number, stop.stop_id.clone())) {
            unique.push(stop);
        } else {
            warn!(
                seq = stop.sequence_number,
                stop_id = %stop.stop_id,
                "dropping duplicate stop"
            );
        }
    }

    unique
}

//! Route catalog.
//!
//! The catalog is the full route list, fetched in one request. A route code
//! usually maps to several variants (one per bound, plus special services).

use tracing::debug;

use crate::config::Language;
use crate::domain::{Route, RouteCode};
use crate::kmb::convert::{convert_routes, decode_data};
use crate::kmb::types::RouteDto;
use crate::kmb::{FetchError, JsonSource, RetryPolicy, RetryingFetcher};

/// Path of the route list endpoint.
pub const ROUTE_LIST_PATH: &str = "/route";

/// A loaded route list.
#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    routes: Vec<Route>,
}

impl RouteCatalog {
    /// Fetch the whole catalog.
    pub async fn load<S: JsonSource>(
        fetcher: &RetryingFetcher<S>,
        policy: RetryPolicy,
        language: Language,
    ) -> Result<Self, FetchError> {
        let value = fetcher.fetch(ROUTE_LIST_PATH, policy).await?;
        let rows: Vec<RouteDto> = decode_data(value)?;
        let routes = convert_routes(rows, language);

        debug!(routes = routes.len(), "loaded route catalog");

        Ok(Self { routes })
    }

    /// Every variant whose code is exactly `code`, in catalog order.
    ///
    /// An empty result means "no such route"; it is not an error.
    pub fn find_by_code(&self, code: &RouteCode) -> Vec<Route> {
        self.routes
            .iter()
            .filter(|r| &r.code == code)
            .cloned()
            .collect()
    }
}

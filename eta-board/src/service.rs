//! Stateless facade over the KMB lookups.
//!
//! Every call goes to the API; nothing fetched is kept between calls.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::board::EtaReconciler;
use crate::catalog::RouteCatalog;
use crate::config::BoardConfig;
use crate::domain::{ReconciledBoard, Route, RouteCode, StopDetails, StopListing};
use crate::kmb::{FetchError, JsonSource, RetryingFetcher};
use crate::stops::{StopNameResolver, StopSequenceResolver};

/// A remote lookup failed after its retries ran out.
#[derive(Debug, thiserror::Error)]
#[error("{resource} unavailable: {source}")]
pub struct DataUnavailable {
    /// What was being fetched, e.g. `route catalog`.
    pub resource: String,
    #[source]
    pub source: FetchError,
}

impl DataUnavailable {
    pub fn new(resource: impl Into<String>, source: FetchError) -> Self {
        Self {
            resource: resource.into(),
            source,
        }
    }
}

/// Route search, stop listing and arrival boards.
#[derive(Debug, Clone)]
pub struct TransitBoardService<S> {
    fetcher: RetryingFetcher<S>,
    config: BoardConfig,
    stop_sequence: StopSequenceResolver<S>,
    stop_names: StopNameResolver<S>,
    reconciler: EtaReconciler<S>,
}

impl<S: JsonSource + Clone> TransitBoardService<S> {
    pub fn new(source: S, config: BoardConfig) -> Self {
        let fetcher = RetryingFetcher::new(source);

        Self {
            stop_sequence: StopSequenceResolver::new(fetcher.clone(), config.catalog_retry),
            stop_names: StopNameResolver::new(
                fetcher.clone(),
                config.realtime_retry,
                config.language,
            ),
            reconciler: EtaReconciler::new(fetcher.clone(), &config),
            fetcher,
            config,
        }
    }
}

impl<S: JsonSource> TransitBoardService<S> {
    async fn load_catalog(&self) -> Result<RouteCatalog, DataUnavailable> {
        RouteCatalog::load(
            &self.fetcher,
            self.config.catalog_retry,
            self.config.language,
        )
        .await
        .map_err(|e| DataUnavailable::new("route catalog", e))
    }

    /// Every variant of `code`. Empty when the code is unknown.
    pub async fn search_routes(&self, code: &RouteCode) -> Result<Vec<Route>, DataUnavailable> {
        let routes = self.load_catalog().await?.find_by_code(code);
        debug!(%code, variants = routes.len(), "route search");
        Ok(routes)
    }

    /// The stops of a route variant with their names, in route order.
    ///
    /// Names are looked up concurrently, once per distinct stop id. A stop
    /// whose name cannot be fetched is listed without one; a stop with a
    /// blank id is listed but never looked up.
    pub async fn list_stops(&self, route: &Route) -> Result<Vec<StopListing>, DataUnavailable> {
        let stops = self.stop_sequence.resolve(route).await.map_err(|e| {
            DataUnavailable::new(format!("stop list for {} {}", route.code, route.bound), e)
        })?;

        let mut ids: Vec<&str> = Vec::new();
        for stop in stops.iter().filter(|s| s.is_valid()) {
            if !ids.contains(&stop.stop_id.as_str()) {
                ids.push(&stop.stop_id);
            }
        }

        let mut lookups = Vec::with_capacity(ids.len());
        for id in &ids {
            lookups.push(self.stop_names.resolve(id));
        }
        let results = join_all(lookups).await;

        let names: HashMap<&str, StopDetails> = ids
            .iter()
            .copied()
            .zip(results)
            .map(|(id, result)| {
                let details = result.unwrap_or_else(|e| {
                    warn!(stop_id = id, error = %e, "stop name unavailable");
                    StopDetails::unnamed(id)
                });
                (id, details)
            })
            .collect();

        let listings = stops
            .iter()
            .map(|stop| {
                let details = names
                    .get(stop.stop_id.as_str())
                    .cloned()
                    .unwrap_or_else(|| StopDetails::unnamed(stop.stop_id.clone()));
                StopListing {
                    stop: stop.clone(),
                    details,
                }
            })
            .collect();

        Ok(listings)
    }

    /// The arrival board for `stop_id` on `route`, as of today.
    pub async fn get_board(
        &self,
        stop_id: &str,
        route: &RouteCode,
    ) -> Result<ReconciledBoard, DataUnavailable> {
        self.get_board_on(stop_id, route, self.today()).await
    }

    /// The arrival board with an explicit date for remark times.
    pub async fn get_board_on(
        &self,
        stop_id: &str,
        route: &RouteCode,
        today: NaiveDate,
    ) -> Result<ReconciledBoard, DataUnavailable> {
        self.reconciler
            .reconcile(stop_id, route, today)
            .await
            .map_err(|e| DataUnavailable::new(format!("arrivals for {route} at {stop_id}"), e))
    }

    /// Today's date in the configured offset.
    pub fn today(&self) -> NaiveDate {
        Utc::now()
            .with_timezone(&self.config.utc_offset())
            .date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bound, SlotStatus};
    use crate::kmb::RetryPolicy;
    use crate::kmb::mock::MockSource;
    use serde_json::{Value, json};
    use std::time::Duration;

    fn service(source: &MockSource) -> TransitBoardService<MockSource> {
        TransitBoardService::new(source.clone(), BoardConfig::default())
    }

    fn code(s: &str) -> RouteCode {
        RouteCode::parse(s).unwrap()
    }

    fn catalog() -> Value {
        json!({"data": [
            {"route": "1", "bound": "O", "service_type": "1",
             "orig_tc": "竹園邨", "dest_tc": "尖沙咀碼頭"},
            {"route": "1A", "bound": "O", "service_type": "1",
             "orig_tc": "中秀茂坪", "dest_tc": "尖沙咀碼頭"},
            {"route": "1A", "bound": "I", "service_type": "1",
             "orig_tc": "尖沙咀碼頭", "dest_tc": "中秀茂坪"}
        ]})
    }

    fn route_1a() -> Route {
        Route {
            code: code("1A"),
            bound: Bound::Outbound,
            service_type: "1".into(),
            origin_name: "中秀茂坪".into(),
            dest_name: "尖沙咀碼頭".into(),
        }
    }

    #[tokio::test]
    async fn search_returns_only_exact_code() {
        let source = MockSource::new();
        source.respond("/route", catalog());

        let routes = service(&source).search_routes(&code("1A")).await.unwrap();

        assert_eq!(routes.len(), 2);
        assert!(routes.iter().all(|r| r.code.as_str() == "1A"));
        assert_eq!(routes[0].bound, Bound::Outbound);
        assert_eq!(routes[1].bound, Bound::Inbound);
    }

    #[tokio::test]
    async fn unknown_code_is_empty_not_error() {
        let source = MockSource::new();
        source.respond("/route", catalog());

        let routes = service(&source).search_routes(&code("999X")).await.unwrap();
        assert!(routes.is_empty());
    }

    #[tokio::test]
    async fn each_search_fetches_again() {
        let source = MockSource::new();
        source.respond("/route", catalog());
        let service = service(&source);

        service.search_routes(&code("1")).await.unwrap();
        service.search_routes(&code("1")).await.unwrap();
        assert_eq!(source.calls("/route"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn catalog_unavailable_after_three_attempts() {
        let source = MockSource::new();
        source.respond_status("/route", 503, "");

        let start = tokio::time::Instant::now();
        let err = service(&source)
            .search_routes(&code("1A"))
            .await
            .unwrap_err();

        assert_eq!(source.calls("/route"), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(4));
        assert_eq!(err.resource, "route catalog");
        assert!(matches!(err.source, FetchError::Exhausted { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn stops_listed_in_order_with_names() {
        let source = MockSource::new();
        source.respond(
            "/route-stop/1A/outbound/1",
            json!({"data": [
                {"seq": "1", "stop": "AAA"},
                {"seq": "2", "stop": "BBB"},
                {"seq": "3", "stop": "CCC"}
            ]}),
        );
        // Slowest name first, so completion order differs from route order
        source.respond("/stop/AAA", json!({"data": {"name_tc": "甲"}}));
        source.set_latency("/stop/AAA", Duration::from_millis(30));
        source.respond("/stop/BBB", json!({"data": {"name_tc": "乙"}}));
        source.respond("/stop/CCC", json!({"data": {"name_tc": "丙"}}));

        let stops = service(&source).list_stops(&route_1a()).await.unwrap();

        let names: Vec<_> = stops
            .iter()
            .map(|s| s.details.display_name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["甲", "乙", "丙"]);
        let seqs: Vec<_> = stops.iter().map(|s| s.stop.sequence_number).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn names_resolve_concurrently() {
        let source = MockSource::new();
        source.respond(
            "/route-stop/1A/outbound/1",
            json!({"data": [
                {"seq": "1", "stop": "AAA"},
                {"seq": "2", "stop": "BBB"},
                {"seq": "3", "stop": "CCC"}
            ]}),
        );
        for id in ["AAA", "BBB", "CCC"] {
            let path = format!("/stop/{id}");
            source.respond(&path, json!({"data": {"name_tc": id}}));
            source.set_latency(&path, Duration::from_secs(1));
        }

        let start = tokio::time::Instant::now();
        service(&source).list_stops(&route_1a()).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn repeated_stop_id_fetched_once() {
        let source = MockSource::new();
        source.respond(
            "/route-stop/1A/outbound/1",
            json!({"data": [
                {"seq": "1", "stop": "LOOP"},
                {"seq": "2", "stop": "MID"},
                {"seq": "3", "stop": "LOOP"}
            ]}),
        );
        source.respond("/stop/LOOP", json!({"data": {"name_tc": "環"}}));
        source.respond("/stop/MID", json!({"data": {"name_tc": "中"}}));

        let stops = service(&source).list_stops(&route_1a()).await.unwrap();

        assert_eq!(stops.len(), 3);
        assert_eq!(stops[2].details.display_name.as_deref(), Some("環"));
        assert_eq!(source.calls("/stop/LOOP"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_name_degrades_and_blank_id_is_not_fetched() {
        let source = MockSource::new();
        source.respond(
            "/route-stop/1A/outbound/1",
            json!({"data": [
                {"seq": "1", "stop": "AAA"},
                {"seq": "2", "stop": " "},
                {"seq": "3", "stop": "BAD"}
            ]}),
        );
        source.respond("/stop/AAA", json!({"data": {"name_tc": "甲"}}));
        source.respond_status("/stop/BAD", 500, "");

        let stops = service(&source).list_stops(&route_1a()).await.unwrap();

        assert_eq!(stops.len(), 3);
        assert_eq!(stops[0].details.display_name.as_deref(), Some("甲"));
        assert!(!stops[1].stop.is_valid());
        assert_eq!(stops[1].details.display_name, None);
        assert_eq!(stops[2].details.display_name, None);
        assert_eq!(
            source.calls("/stop/BAD"),
            RetryPolicy::REALTIME.max_attempts
        );
        assert_eq!(source.calls("/stop/ "), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_list_unavailable() {
        let source = MockSource::new();
        source.respond_status("/route-stop/1A/outbound/1", 502, "");

        let err = service(&source).list_stops(&route_1a()).await.unwrap_err();
        assert_eq!(err.resource, "stop list for 1A outbound");
    }

    #[tokio::test]
    async fn board_for_stop() {
        let source = MockSource::new();
        source.respond(
            "/eta/AAA/1A/1",
            json!({"data": [
                {"eta_seq": 1, "eta": "2024-05-01T10:05:00+08:00", "rmk_tc": "", "service_type": 1}
            ]}),
        );
        for st in ["2", "3", "4"] {
            source.respond(&format!("/eta/AAA/1A/{st}"), json!({"data": []}));
        }

        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let board = service(&source)
            .get_board_on("AAA", &code("1A"), today)
            .await
            .unwrap();

        assert_eq!(board.slot(1).unwrap().status, SlotStatus::RealTime);
        assert_eq!(board.slot(2).unwrap().status, SlotStatus::NoEstimate);
        assert_eq!(board.slot(3).unwrap().status, SlotStatus::NoEstimate);
    }

    #[tokio::test(start_paused = true)]
    async fn board_unavailable_when_primary_fails() {
        let source = MockSource::new();
        source.respond_status("/eta/AAA/1A/1", 522, "");

        let err = service(&source)
            .get_board("AAA", &code("1A"))
            .await
            .unwrap_err();

        assert_eq!(source.calls("/eta/AAA/1A/1"), 5);
        assert_eq!(err.resource, "arrivals for 1A at AAA");
        let message = err.to_string();
        assert!(message.starts_with("arrivals for 1A at AAA unavailable"));
    }

    #[test]
    fn today_follows_configured_offset() {
        let source = MockSource::new();
        let service = TransitBoardService::new(source, BoardConfig::default());
        let expected = Utc::now()
            .with_timezone(&chrono::FixedOffset::east_opt(8 * 3600).unwrap())
            .date_naive();
        // Could straddle midnight; allow the following day
        let today = service.today();
        assert!(today == expected || today.pred_opt() == Some(expected));
    }
}

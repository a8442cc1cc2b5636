//! Conversion from KMB DTOs to domain types.
//!
//! Bad rows are logged and skipped rather than failing the whole response.

use chrono::DateTime;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Language;
use crate::domain::{Bound, EtaRecord, Route, RouteCode, StopDetails, StopRef};

use super::error::FetchError;
use super::types::{Envelope, EtaDto, RouteDto, RouteStopDto, StopDto};

/// Decode a `{ "data": ... }` document, treating absent `data` as `T::default()`.
pub fn decode_data<T>(value: Value) -> Result<T, FetchError>
where
    T: DeserializeOwned + Default,
{
    let envelope = Envelope::<T>::deserialize(&value).map_err(|e| FetchError::Json {
        message: e.to_string(),
        body: Some(value.to_string().chars().take(500).collect()),
    })?;
    Ok(envelope.data.unwrap_or_default())
}

/// Convert catalog rows, keeping catalog order.
pub fn convert_routes(rows: Vec<RouteDto>, language: Language) -> Vec<Route> {
    rows.into_iter()
        .filter_map(|row| match convert_route(&row, language) {
            Some(route) => Some(route),
            None => {
                warn!(route = ?row.route, bound = ?row.bound, "skipping malformed catalog row");
                None
            }
        })
        .collect()
}

fn convert_route(row: &RouteDto, language: Language) -> Option<Route> {
    let code = RouteCode::parse_normalized(row.route.as_deref()?).ok()?;
    let bound = Bound::parse(row.bound.as_deref()?).ok()?;
    let service_type = row
        .service_type
        .as_ref()
        .map(|s| s.to_text())
        .unwrap_or_else(|| "1".to_string());

    let origin_name = language
        .pick(
            row.orig_en.as_deref(),
            row.orig_tc.as_deref(),
            row.orig_sc.as_deref(),
        )
        .unwrap_or_default()
        .trim()
        .to_string();
    let dest_name = language
        .pick(
            row.dest_en.as_deref(),
            row.dest_tc.as_deref(),
            row.dest_sc.as_deref(),
        )
        .unwrap_or_default()
        .trim()
        .to_string();

    Some(Route {
        code,
        bound,
        service_type,
        origin_name,
        dest_name,
    })
}

/// Convert stop-sequence rows in arrival order. Duplicates are kept here;
/// deduplication is the resolver's job.
pub fn convert_route_stops(rows: Vec<RouteStopDto>) -> Vec<StopRef> {
    rows.into_iter()
        .filter_map(|row| {
            let Some(seq) = row.seq.as_ref().and_then(|s| s.as_positive()) else {
                warn!(seq = ?row.seq, stop = ?row.stop, "skipping stop row without a valid seq");
                return None;
            };
            let stop_id = row.stop.map(|s| s.trim().to_string()).unwrap_or_default();
            Some(StopRef::new(seq, stop_id))
        })
        .collect()
}

/// Convert a stop-details body. Unknown stops (`{}`) have no name.
pub fn convert_stop(stop_id: &str, dto: StopDto, language: Language) -> StopDetails {
    let name = language.pick(
        dto.name_en.as_deref(),
        dto.name_tc.as_deref(),
        dto.name_sc.as_deref(),
    );
    StopDetails::new(stop_id, name)
}

/// Convert arrival rows fetched under `service_type`, discarding rows whose
/// `eta_seq` is outside the board range.
pub fn convert_etas(rows: Vec<EtaDto>, service_type: &str, language: Language) -> Vec<EtaRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let seq = row.eta_seq.as_ref().and_then(|s| s.as_positive())?;

            let real_time = row
                .eta
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .and_then(|s| match DateTime::parse_from_rfc3339(s) {
                    Ok(ts) => Some(ts),
                    Err(e) => {
                        debug!(eta = s, error = %e, "unparseable real-time estimate");
                        None
                    }
                });

            let remark = language
                .pick(
                    row.rmk_en.as_deref(),
                    row.rmk_tc.as_deref(),
                    row.rmk_sc.as_deref(),
                )
                .map(|s| s.trim().to_string());

            let source_type = row
                .service_type
                .as_ref()
                .map(|s| s.to_text())
                .unwrap_or_else(|| service_type.to_string());

            EtaRecord::new(seq, real_time, remark, source_type)
        })
        .collect()
}

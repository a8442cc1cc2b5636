//! Arrival reconciliation across service types.
//!
//! Arrivals for a stop are split by service type. The primary type is
//! queried first; while the board has empty slots, alternates are queried
//! one at a time, in order, and may only fill slots that are still empty.

use chrono::{FixedOffset, NaiveDate};
use tracing::{debug, warn};

use crate::config::{BoardConfig, Language, ServiceTypes};
use crate::domain::{BOARD_SLOTS, EtaRecord, ReconciledBoard, RouteCode};
use crate::kmb::convert::{convert_etas, decode_data};
use crate::kmb::types::EtaDto;
use crate::kmb::{FetchError, JsonSource, RetryPolicy, RetryingFetcher};

use super::classify::build_board;

/// Records accepted so far, at most one per slot.
#[derive(Debug, Clone, Default)]
pub struct SlotFill {
    accepted: Vec<EtaRecord>,
    filled: [bool; BOARD_SLOTS],
}

impl SlotFill {
    /// Accept records whose slot is still empty; first record wins a slot.
    /// Returns how many were accepted.
    pub fn accept(&mut self, records: Vec<EtaRecord>) -> usize {
        let mut count = 0;
        for record in records {
            let slot = record.slot_index();
            if !self.filled[slot] {
                self.filled[slot] = true;
                self.accepted.push(record);
                count += 1;
            }
        }
        count
    }

    pub fn filled(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_full(&self) -> bool {
        self.filled() >= BOARD_SLOTS
    }

    /// Accepted records in ascending sequence order.
    pub fn into_sorted(mut self) -> Vec<EtaRecord> {
        self.accepted.sort_by_key(|r| r.sequence_number);
        self.accepted
    }
}

/// Builds the three-slot board for a stop on a route.
#[derive(Debug, Clone)]
pub struct EtaReconciler<S> {
    fetcher: RetryingFetcher<S>,
    policy: RetryPolicy,
    service_types: ServiceTypes,
    language: Language,
    offset: FixedOffset,
}

impl<S: JsonSource> EtaReconciler<S> {
    pub fn new(fetcher: RetryingFetcher<S>, config: &BoardConfig) -> Self {
        Self {
            fetcher,
            policy: config.realtime_retry,
            service_types: config.service_types.clone(),
            language: config.language,
            offset: config.utc_offset(),
        }
    }

    pub fn path_for(stop_id: &str, route: &RouteCode, service_type: &str) -> String {
        format!("/eta/{stop_id}/{route}/{service_type}")
    }

    /// Fetch and reconcile arrivals into a board.
    ///
    /// Fails only when the primary service type cannot be fetched; an
    /// alternate that fails is skipped.
    pub async fn reconcile(
        &self,
        stop_id: &str,
        route: &RouteCode,
        today: NaiveDate,
    ) -> Result<ReconciledBoard, FetchError> {
        let primary = &self.service_types.primary;

        let mut fill = SlotFill::default();
        fill.accept(self.fetch_records(stop_id, route, primary).await?);

        // Sequential: whether to query the next alternate depends on how
        // many slots the previous ones filled.
        for alternate in &self.service_types.alternates {
            if fill.is_full() {
                break;
            }
            if alternate == primary {
                continue;
            }

            match self.fetch_records(stop_id, route, alternate).await {
                Ok(records) => {
                    let added = fill.accept(records);
                    debug!(
                        stop_id,
                        %route,
                        service_type = %alternate,
                        added,
                        "filled from alternate"
                    );
                }
                Err(e) => {
                    warn!(
                        stop_id,
                        %route,
                        service_type = %alternate,
                        error = %e,
                        "alternate service type unavailable"
                    );
                }
            }
        }

        let records = fill.into_sorted();
        Ok(build_board(&records, today, self.offset))
    }

    async fn fetch_records(
        &self,
        stop_id: &str,
        route: &RouteCode,
        service_type: &str,
    ) -> Result<Vec<EtaRecord>, FetchError> {
        let path = Self::path_for(stop_id, route, service_type);
        let value = self.fetcher.fetch(&path, self.policy).await?;
        let rows: Vec<EtaDto> = decode_data(value)?;
        Ok(convert_etas(rows, service_type, self.language))
    }
}

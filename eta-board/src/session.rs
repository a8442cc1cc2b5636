//! Per-session selection state.
//!
//! A session tracks the selected route, its stops and the board for the
//! selected stop. Lookups run outside the lock, so a slow result can arrive
//! after the user has moved on; every selection is tagged with a generation
//! and a result is only applied while its tag is still current.
//!
//! [`BoardSession`] is the entry point for stateful front ends that keep one
//! session per user or connection. The bundled JSON API in [`crate::web`] is
//! stateless and calls [`TransitBoardService`] directly.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::{Bound, ReconciledBoard, Route, RouteCode, StopListing, StopRef};
use crate::kmb::JsonSource;
use crate::service::{DataUnavailable, TransitBoardService};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no route selected")]
    NoRouteSelected,

    #[error(transparent)]
    Unavailable(#[from] DataUnavailable),
}

/// Result of a selection whose lookup may have been overtaken.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<T> {
    /// The lookup finished while its selection was current and was stored.
    Applied(T),
    /// A newer selection was made while the lookup was in flight; the
    /// result was discarded.
    Stale,
}

impl<T> Selection<T> {
    pub fn is_stale(&self) -> bool {
        matches!(self, Selection::Stale)
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Selection::Applied(value) => Some(value),
            Selection::Stale => None,
        }
    }
}

/// The board for the selected stop.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StopBoard {
    pub stop: StopRef,
    pub board: ReconciledBoard,
    /// First stop of an outbound route with nothing on the board: buses
    /// start here, so the absence of estimates is expected.
    pub origin_terminus: bool,
}

impl StopBoard {
    fn new(stop: StopRef, bound: Bound, board: ReconciledBoard) -> Self {
        let origin_terminus = stop.is_first() && bound == Bound::Outbound && !board.has_estimates();
        Self {
            stop,
            board,
            origin_terminus,
        }
    }
}

/// Outcome of a search.
#[derive(Debug)]
pub struct SearchOutcome {
    /// Every variant of the searched code; empty when there is none.
    pub routes: Vec<Route>,
    /// Set when this search triggered the session's automatic selection of
    /// the first variant. A failed selection is reported here and leaves the
    /// automatic selection available to the next search.
    pub initial_selection: Option<Result<Selection<Vec<StopListing>>, SessionError>>,
}

#[derive(Debug, Default)]
struct SessionState {
    route_generation: u64,
    stop_generation: u64,
    route: Option<Route>,
    stops: Vec<StopListing>,
    board: Option<StopBoard>,
    initial_selection_made: bool,
}

/// Selection state for one user session.
#[derive(Debug)]
pub struct BoardSession<S> {
    service: Arc<TransitBoardService<S>>,
    state: RwLock<SessionState>,
}

impl<S: JsonSource> BoardSession<S> {
    pub fn new(service: Arc<TransitBoardService<S>>) -> Self {
        Self {
            service,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Search for a route code typed by the user.
    ///
    /// The input is trimmed and upper-cased. The first search of the session
    /// that finds anything also selects its first variant; the routes are
    /// returned even when that selection fails.
    pub async fn search(&self, input: &str) -> Result<SearchOutcome, SessionError> {
        if input.trim().is_empty() {
            return Err(SessionError::InvalidInput("route code is blank".to_string()));
        }
        let code = RouteCode::parse_normalized(input)
            .map_err(|e| SessionError::InvalidInput(e.to_string()))?;

        let routes = self.service.search_routes(&code).await?;

        let Some(first) = routes.first().cloned() else {
            return Ok(SearchOutcome {
                routes,
                initial_selection: None,
            });
        };

        let auto_select = {
            let mut state = self.state.write().await;
            !std::mem::replace(&mut state.initial_selection_made, true)
        };

        let initial_selection = if auto_select {
            debug!(%code, bound = %first.bound, "auto-selecting first variant");
            let selection = self.select_route(first).await;
            if let Err(e) = &selection {
                warn!(%code, error = %e, "automatic selection failed");
                self.state.write().await.initial_selection_made = false;
            }
            Some(selection)
        } else {
            None
        };

        Ok(SearchOutcome {
            routes,
            initial_selection,
        })
    }

    /// Select a route variant and load its stops.
    ///
    /// Clears the previous stops and board immediately.
    pub async fn select_route(
        &self,
        route: Route,
    ) -> Result<Selection<Vec<StopListing>>, SessionError> {
        let tag = {
            let mut state = self.state.write().await;
            state.route_generation += 1;
            state.stop_generation += 1;
            state.route = Some(route.clone());
            state.stops.clear();
            state.board = None;
            state.route_generation
        };

        let result = self.service.list_stops(&route).await;

        let mut state = self.state.write().await;
        if state.route_generation != tag {
            debug!(route = %route.code, bound = %route.bound, "discarding stale stop list");
            return Ok(Selection::Stale);
        }

        let stops = result?;
        state.stops = stops.clone();
        Ok(Selection::Applied(stops))
    }

    /// Select a stop on the current route and load its board.
    pub async fn select_stop(&self, stop: StopRef) -> Result<Selection<StopBoard>, SessionError> {
        if !stop.is_valid() {
            return Err(SessionError::InvalidInput(format!(
                "stop {} has no id",
                stop.sequence_number
            )));
        }

        let (route, route_tag, stop_tag) = {
            let mut state = self.state.write().await;
            let route = state.route.clone().ok_or(SessionError::NoRouteSelected)?;
            state.stop_generation += 1;
            state.board = None;
            (route, state.route_generation, state.stop_generation)
        };

        let result = self.service.get_board(&stop.stop_id, &route.code).await;

        let mut state = self.state.write().await;
        if state.route_generation != route_tag || state.stop_generation != stop_tag {
            debug!(stop_id = %stop.stop_id, "discarding stale board");
            return Ok(Selection::Stale);
        }

        let stop_board = StopBoard::new(stop, route.bound, result?);
        state.board = Some(stop_board.clone());
        Ok(Selection::Applied(stop_board))
    }

    pub async fn current_route(&self) -> Option<Route> {
        self.state.read().await.route.clone()
    }

    pub async fn current_stops(&self) -> Vec<StopListing> {
        self.state.read().await.stops.clone()
    }

    pub async fn current_board(&self) -> Option<StopBoard> {
        self.state.read().await.board.clone()
    }
}

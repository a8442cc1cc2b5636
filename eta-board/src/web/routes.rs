//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{error, warn};

use crate::domain::{Bound, ReconciledBoard, RouteCode};
use crate::kmb::JsonSource;
use crate::service::DataUnavailable;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<S: JsonSource + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/routes/:code", get(search_routes::<S>))
        .route(
            "/api/routes/:code/:bound/:service_type/stops",
            get(list_stops::<S>),
        )
        .route("/api/eta/:stop_id/:route", get(get_board::<S>))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn parse_code(raw: &str) -> Result<RouteCode, AppError> {
    RouteCode::parse_normalized(raw).map_err(|e| AppError::BadRequest {
        message: format!("{e}: {raw}"),
    })
}

/// Every variant of a route code.
async fn search_routes<S: JsonSource + 'static>(
    State(state): State<AppState<S>>,
    Path(code): Path<String>,
) -> Result<Json<Vec<RouteResult>>, AppError> {
    let code = parse_code(&code)?;

    let routes = state.service.search_routes(&code).await?;
    if routes.is_empty() {
        return Err(AppError::NotFound {
            message: format!("no route {code}"),
        });
    }

    Ok(Json(routes.into_iter().map(RouteResult::from).collect()))
}

/// Stops of one route variant, in route order.
async fn list_stops<S: JsonSource + 'static>(
    State(state): State<AppState<S>>,
    Path((code, bound, service_type)): Path<(String, String, String)>,
) -> Result<Json<Vec<StopResult>>, AppError> {
    let code = parse_code(&code)?;
    let bound = Bound::parse(&bound).map_err(|e| AppError::BadRequest {
        message: format!("invalid bound: {}", e.0),
    })?;

    let variants = state.service.search_routes(&code).await?;
    let Some(route) = variants
        .into_iter()
        .find(|r| r.is_variant(&code, bound, &service_type))
    else {
        return Err(AppError::NotFound {
            message: format!("no route {code} {bound} service type {service_type}"),
        });
    };

    let stops = state.service.list_stops(&route).await?;
    Ok(Json(stops.into_iter().map(StopResult::from).collect()))
}

/// The three-slot arrival board for a stop.
async fn get_board<S: JsonSource + 'static>(
    State(state): State<AppState<S>>,
    Path((stop_id, route)): Path<(String, String)>,
) -> Result<Json<ReconciledBoard>, AppError> {
    let route = parse_code(&route)?;
    if stop_id.trim().is_empty() {
        return Err(AppError::BadRequest {
            message: "stop id is blank".to_string(),
        });
    }

    let board = state.service.get_board(&stop_id, &route).await?;
    Ok(Json(board))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unavailable { message: String },
}

impl From<DataUnavailable> for AppError {
    fn from(e: DataUnavailable) -> Self {
        AppError::Unavailable {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

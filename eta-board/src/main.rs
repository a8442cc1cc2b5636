use std::net::SocketAddr;

use eta_board::config::{BoardConfig, Language};
use eta_board::kmb::{ApiConfig, HttpSource};
use eta_board::service::TransitBoardService;
use eta_board::web::{AppState, create_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eta_board=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut api_config = ApiConfig::default();
    if let Ok(base_url) = std::env::var("ETA_BOARD_BASE_URL") {
        api_config = api_config.with_base_url(base_url);
    }

    let mut board_config = BoardConfig::default();
    if let Ok(lang) = std::env::var("ETA_BOARD_LANG") {
        match Language::parse(&lang) {
            Some(language) => board_config = board_config.with_language(language),
            None => tracing::warn!(%lang, "unknown ETA_BOARD_LANG, using default"),
        }
    }

    let addr: SocketAddr = std::env::var("ETA_BOARD_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .expect("ETA_BOARD_ADDR is not a socket address");

    let source = HttpSource::new(api_config).expect("Failed to create HTTP client");
    tracing::info!(
        base_url = source.base_url(),
        language = ?board_config.language,
        "using KMB API"
    );

    let service = TransitBoardService::new(source, board_config);
    let app = create_router(AppState::new(service));

    tracing::info!("listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

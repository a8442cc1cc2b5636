//! Application state for the web layer.

use std::sync::Arc;

use crate::service::TransitBoardService;

/// Shared application state.
#[derive(Debug)]
pub struct AppState<S> {
    pub service: Arc<TransitBoardService<S>>,
}

impl<S> AppState<S> {
    pub fn new(service: TransitBoardService<S>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

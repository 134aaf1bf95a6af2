pub mod clients;
pub mod config;
pub mod notify;
pub mod rest;
pub mod review;

use std::sync::Arc;
use std::time::Instant;

use config::ReviewdConfig;
use review::EventProcessor;

/// Shared application state passed to every HTTP handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ReviewdConfig>,
    pub processor: Arc<EventProcessor>,
    pub started_at: Instant,
}

impl AppContext {
    pub fn new(config: ReviewdConfig, processor: EventProcessor) -> Self {
        Self {
            config: Arc::new(config),
            processor: Arc::new(processor),
            started_at: Instant::now(),
        }
    }
}

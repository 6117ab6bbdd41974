use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum
/// extractors. No per-request state survives the request/response cycle.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable generation backend. Production: `OpenAiClient`; tests
    /// substitute a stub so neither stage needs a live network.
    pub generator: Arc<dyn TextGenerator>,
}

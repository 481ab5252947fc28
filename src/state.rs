use crate::config::AppConfig;
use crate::error::BridgeError;
use crate::observability::DebugLog;
use crate::transport::UpstreamClient;

/// Shared state for all in-flight exchanges.
pub struct AppState {
    pub config: AppConfig,
    pub upstream: UpstreamClient,
    pub debug_log: Option<DebugLog>,
}

impl AppState {
    /// Build the shared state from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError`] when the HTTP client or the debug log cannot
    /// be created.
    pub fn new(config: AppConfig) -> Result<Self, BridgeError> {
        let upstream = UpstreamClient::new(&config.upstream, config.server.timeout)?;
        let debug_log = match config.server.debug_log.as_deref() {
            Some(path) => Some(DebugLog::create(path).map_err(|e| {
                BridgeError::Config(format!("failed to create debug log at {path}: {e}"))
            })?),
            None => None,
        };
        Ok(Self {
            config,
            upstream,
            debug_log,
        })
    }
}

//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::probes::ProbeManager;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// The probe manager is fully built before it is placed here, so handlers only
/// ever see a complete set of delays.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub probes: Arc<ProbeManager>,
}

impl AppState {
    /// Creates a new application state from the given configuration and probe manager.
    pub fn new(config: AppConfig, probes: ProbeManager) -> Self {
        Self {
            config: Arc::new(config),
            probes: Arc::new(probes),
        }
    }
}

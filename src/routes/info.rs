//! Diagnostic info endpoint.
//!
//! Reports application identity, every probe status, Kubernetes placement and
//! basic container facts in a single JSON document.

use axum::{extract::State, Json};
use chrono::SecondsFormat;
use serde::Serialize;
use tracing::instrument;

use crate::environment::{collect_env, read_namespace, ContainerInfo, KubernetesInfo};
use crate::error::AppError;
use crate::probes::ProbeStatus;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub started_at: String,
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub struct ProbesInfo {
    pub healthz: ProbeStatus,
    pub readyz: ProbeStatus,
    pub livez: ProbeStatus,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub app: AppInfo,
    pub probes: ProbesInfo,
    pub kubernetes: KubernetesInfo,
    pub container: ContainerInfo,
}

#[instrument(name = "info::info", skip(state))]
pub async fn info(State(state): State<AppState>) -> Result<Json<InfoResponse>, AppError> {
    let config = &state.config;
    let namespace = read_namespace(&config.app.namespace_path).await;
    // Interface enumeration is a blocking syscall
    let container = tokio::task::spawn_blocking(ContainerInfo::current)
        .await
        .map_err(|e| AppError::Internal(format!("container info task failed: {e}")))?;
    let env = collect_env(|key| std::env::var(key).ok());

    let [healthz, readyz, livez] = state.probes.statuses();

    Ok(Json(InfoResponse {
        app: AppInfo {
            name: config.app.name.clone(),
            version: config.app.version.clone(),
            started_at: state
                .probes
                .started_at()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            port: config.http.port,
        },
        probes: ProbesInfo {
            healthz,
            readyz,
            livez,
        },
        kubernetes: KubernetesInfo::from_sources(namespace, &env),
        container,
    }))
}

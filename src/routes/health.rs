//! Health probe endpoints for container orchestration.
//!
//! `/healthz`, `/readyz` and `/livez` each report the status of their own
//! probe. A probe that is still pending answers 503 so the orchestrator keeps
//! waiting; that is expected behavior, not a fault, and is only logged at debug.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::AppError;
use crate::probes::{Probe, ProbeStatus};
use crate::state::AppState;

/// Probe response body: a status word followed by the probe status fields.
#[derive(Debug, Serialize)]
pub struct ProbeBody {
    pub status: &'static str,
    #[serde(flatten)]
    pub probe: ProbeStatus,
}

impl IntoResponse for ProbeBody {
    fn into_response(self) -> Response {
        let code = if self.probe.ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        (code, Json(self)).into_response()
    }
}

impl From<ProbeStatus> for ProbeBody {
    fn from(probe: ProbeStatus) -> Self {
        let status = if probe.ready { "ok" } else { "unavailable" };
        Self { status, probe }
    }
}

fn respond(state: &AppState, probe: Probe) -> ProbeBody {
    let status = state.probes.status(probe);
    if !status.ready {
        tracing::debug!(
            probe = %probe,
            remaining_seconds = status.remaining_seconds,
            "Probe not ready yet"
        );
    }
    status.into()
}

pub async fn healthz(State(state): State<AppState>) -> ProbeBody {
    respond(&state, Probe::Health)
}

pub async fn readyz(State(state): State<AppState>) -> ProbeBody {
    respond(&state, Probe::Readiness)
}

pub async fn livez(State(state): State<AppState>) -> ProbeBody {
    respond(&state, Probe::Liveness)
}

/// Probe lookup by name, e.g. `/probes/readyz`. Unknown names are 404.
pub async fn by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ProbeBody, AppError> {
    let status = state.probes.status_by_name(&name)?;
    Ok(status.into())
}

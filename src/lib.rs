//! kube-probe-lab: a lab image for exercising orchestrator probe handling.
//!
//! Serves `/healthz`, `/readyz` and `/livez`, each of which turns healthy only
//! after its own randomly chosen startup delay, plus a `/info` diagnostic
//! endpoint and static files from `public/`.

pub mod config;
pub mod environment;
pub mod error;
pub mod http;
pub mod middleware;
pub mod probes;
pub mod routes;
pub mod state;

pub use error::*;
pub use probes::{Clock, ManualClock, Probe, ProbeManager, ProbeOptions, ProbeStatus, SystemClock};

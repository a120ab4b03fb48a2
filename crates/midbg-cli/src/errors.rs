//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use midbg_session::{HostError, SessionError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to start {program}: {source}")]
    Start {
        program: String,
        #[source]
        source: SessionError,
    },
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("{0}")]
    SessionFailed(SessionError),
    #[error("failed to read commands: {0}")]
    InputReader(io::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

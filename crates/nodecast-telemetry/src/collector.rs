//! Telemetry trait and error types.

use thiserror::Error;

use nodecast_core::ClusterSample;

/// Source of per-tick cluster state.
///
/// The numbers a collector returns are treated as already validated by
/// the rest of the system; only the forecast derived from them gets a
/// separate sanity check inside the decision engine.
pub trait ClusterTelemetry: Send + Sync {
    fn sample(&self) -> TelemetryResult<ClusterSample>;
}

/// Errors raised while collecting cluster telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to spawn kubectl: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("kubectl {args} exited with status {status}: {stderr}")]
    Command {
        args: String,
        status: i32,
        stderr: String,
    },
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;

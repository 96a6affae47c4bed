//! nodecast-telemetry — cluster state collection.
//!
//! Scrapes per-tick aggregates from the cluster API: summed CPU requests
//! across ready nodes (the demand signal), ready worker count, pending
//! unschedulable workloads, and worker CPU utilization. The
//! [`ClusterTelemetry`] trait is the seam the daemon consumes; the
//! shipped implementation shells out to kubectl and parses its text
//! output with pure helpers.

pub mod collector;
pub mod kubectl;

pub use collector::{ClusterTelemetry, TelemetryError, TelemetryResult};
pub use kubectl::KubectlTelemetry;

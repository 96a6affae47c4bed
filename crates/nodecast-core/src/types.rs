//! Domain types shared across the nodecast crates.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One telemetry reading of aggregate cluster state, taken per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterSample {
    /// Sum of CPU requests across ready nodes, in cores. This is the
    /// demand signal fed to the forecaster.
    pub cpu_request_cores: f64,
    /// Worker nodes currently in `Ready` state.
    pub active_workers: u32,
    /// Workloads that cannot be placed right now.
    pub pending_unschedulable: u32,
    /// Worker CPU usage as a percentage of worker capacity.
    pub cpu_utilization_percent: f64,
}

/// Immutable decision-engine configuration.
///
/// Supplied once at engine construction; there is no live reconfiguration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Nominal capacity contributed by one worker.
    pub cores_per_node: f64,
    /// Inclusive pool-size ceiling.
    pub max_workers: u32,
    /// Inclusive pool-size floor. Must be at least 1.
    pub min_workers: u32,
    /// Minimum spacing between consecutive scale-outs.
    pub cooldown_out: Duration,
    /// Minimum spacing between consecutive scale-ins. Also serves as the
    /// anti-flapping window after a scale-out.
    pub cooldown_in: Duration,
    /// Fraction of current total capacity above which the forecast
    /// triggers a scale-out.
    pub scale_out_ratio: f64,
    /// Fraction of post-shrink capacity below which the forecast
    /// triggers a scale-in.
    pub scale_in_ratio: f64,
    /// Scale-in is blocked while observed utilization exceeds this.
    pub safe_cpu_ceiling_percent: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cores_per_node: 4.0,
            max_workers: 2,
            min_workers: 1,
            cooldown_out: Duration::from_secs(300),
            cooldown_in: Duration::from_secs(300),
            scale_out_ratio: 0.80,
            scale_in_ratio: 0.95,
            safe_cpu_ceiling_percent: 80.0,
        }
    }
}

/// Which numeric forecaster the daemon runs over the demand window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastStrategy {
    /// Arithmetic mean of the window.
    MovingAverage,
    /// Least-squares line through the window, projected one step ahead.
    #[default]
    LinearTrend,
}

/// Forecasting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of demand samples the sliding window holds. Forecasting is
    /// deferred until the window has filled once.
    pub window: usize,
    pub strategy: ForecastStrategy,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window: 30,
            strategy: ForecastStrategy::default(),
        }
    }
}

/// Telemetry scraping configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Path to the kubectl binary.
    pub kubectl_path: String,
    /// Control-plane node names. Counted for aggregate CPU requests but
    /// excluded from worker counts and utilization.
    pub masters: Vec<String>,
    /// Worker node names, in power-on order.
    pub workers: Vec<String>,
}

/// Node actuation configuration. `{node}` in either template is replaced
/// with the target node id before the command runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActuatorConfig {
    pub power_on_command: String,
    pub power_off_command: String,
}

/// Daemon loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Spacing between monitoring ticks.
    pub tick_interval: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(60),
        }
    }
}

//! nodecast.toml configuration parser.
//!
//! The file model keeps every field optional; [`ConfigFile::resolve`]
//! applies defaults, parses duration strings, and validates the result
//! into the typed per-subsystem configs from [`crate::types`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::{
    ActuatorConfig, DaemonConfig, EngineConfig, ForecastConfig, ForecastStrategy, TelemetryConfig,
};

/// Raw nodecast.toml model. All fields optional; see [`Settings`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub engine: Option<EngineSection>,
    pub forecast: Option<ForecastSection>,
    pub telemetry: Option<TelemetrySection>,
    pub actuator: Option<ActuatorSection>,
    pub daemon: Option<DaemonSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSection {
    pub cores_per_node: Option<f64>,
    pub max_workers: Option<u32>,
    pub min_workers: Option<u32>,
    pub cooldown_out: Option<String>,
    pub cooldown_in: Option<String>,
    pub scale_out_ratio: Option<f64>,
    pub scale_in_ratio: Option<f64>,
    pub safe_cpu_ceiling_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastSection {
    pub window: Option<usize>,
    pub strategy: Option<ForecastStrategy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetrySection {
    pub kubectl_path: Option<String>,
    pub masters: Option<Vec<String>>,
    pub workers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActuatorSection {
    pub power_on_command: Option<String>,
    pub power_off_command: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonSection {
    pub tick_interval: Option<String>,
}

/// Fully resolved configuration for every subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub engine: EngineConfig,
    pub forecast: ForecastConfig,
    pub telemetry: TelemetryConfig,
    pub actuator: ActuatorConfig,
    pub daemon: DaemonConfig,
}

impl ConfigFile {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply defaults, parse durations, and validate.
    pub fn resolve(self) -> ConfigResult<Settings> {
        let defaults = EngineConfig::default();
        let e = self.engine.unwrap_or_default();
        let engine = EngineConfig {
            cores_per_node: e.cores_per_node.unwrap_or(defaults.cores_per_node),
            max_workers: e.max_workers.unwrap_or(defaults.max_workers),
            min_workers: e.min_workers.unwrap_or(defaults.min_workers),
            cooldown_out: resolve_duration(e.cooldown_out.as_deref(), defaults.cooldown_out)?,
            cooldown_in: resolve_duration(e.cooldown_in.as_deref(), defaults.cooldown_in)?,
            scale_out_ratio: e.scale_out_ratio.unwrap_or(defaults.scale_out_ratio),
            scale_in_ratio: e.scale_in_ratio.unwrap_or(defaults.scale_in_ratio),
            safe_cpu_ceiling_percent: e
                .safe_cpu_ceiling_percent
                .unwrap_or(defaults.safe_cpu_ceiling_percent),
        };
        validate_engine(&engine)?;

        let f = self.forecast.unwrap_or_default();
        let forecast_defaults = ForecastConfig::default();
        let forecast = ForecastConfig {
            window: f.window.unwrap_or(forecast_defaults.window),
            strategy: f.strategy.unwrap_or(forecast_defaults.strategy),
        };
        if forecast.window == 0 {
            return Err(ConfigError::Invalid(
                "forecast.window must be at least 1".to_string(),
            ));
        }

        let t = self.telemetry.unwrap_or_default();
        let telemetry = TelemetryConfig {
            kubectl_path: t.kubectl_path.unwrap_or_else(|| "kubectl".to_string()),
            masters: t.masters.unwrap_or_default(),
            workers: t.workers.unwrap_or_default(),
        };

        let a = self.actuator.unwrap_or_default();
        let actuator = ActuatorConfig {
            power_on_command: a.power_on_command.unwrap_or_default(),
            power_off_command: a.power_off_command.unwrap_or_default(),
        };

        let d = self.daemon.unwrap_or_default();
        let daemon = DaemonConfig {
            tick_interval: resolve_duration(
                d.tick_interval.as_deref(),
                DaemonConfig::default().tick_interval,
            )?,
        };

        Ok(Settings {
            engine,
            forecast,
            telemetry,
            actuator,
            daemon,
        })
    }
}

impl Settings {
    /// Load and resolve a config file in one step.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        ConfigFile::from_file(path)?.resolve()
    }
}

fn validate_engine(engine: &EngineConfig) -> ConfigResult<()> {
    if engine.min_workers < 1 {
        return Err(ConfigError::Invalid(
            "engine.min_workers must be at least 1".to_string(),
        ));
    }
    if engine.max_workers < engine.min_workers {
        return Err(ConfigError::Invalid(format!(
            "engine.max_workers ({}) must be >= engine.min_workers ({})",
            engine.max_workers, engine.min_workers
        )));
    }
    if !(engine.cores_per_node > 0.0) {
        return Err(ConfigError::Invalid(
            "engine.cores_per_node must be positive".to_string(),
        ));
    }
    Ok(())
}

fn resolve_duration(raw: Option<&str>, default: Duration) -> ConfigResult<Duration> {
    match raw {
        None => Ok(default),
        Some(s) => parse_duration(s).ok_or_else(|| ConfigError::InvalidDuration(s.to_string())),
    }
}

/// Parse a duration string like "5s", "500ms", "2m". A bare number is
/// taken as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

//! The autoscaling control loop.
//!
//! Per tick: sample the cluster, feed the demand window, forecast once
//! the window is warm, ask the engine for a decision, and drive the
//! actuator for scale-out/scale-in. Collaborator failures are logged
//! and skip the tick; they never reach the engine.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use nodecast_actuator::{CommandActuator, NodeActuator, NodeRoster};
use nodecast_core::Settings;
use nodecast_engine::{Clock, Decision, DecisionEngine, DecisionInput, ScaleAction, SystemClock};
use nodecast_forecast::{DemandWindow, Forecaster, forecaster_for};
use nodecast_telemetry::{ClusterTelemetry, KubectlTelemetry};

/// What one tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// Still filling the demand window; no decision was made.
    Warming { have: usize, need: usize },
    /// The engine produced a decision (scaling actions were actuated).
    Decided(Decision),
}

/// One assembled autoscaling pipeline.
pub struct ControlLoop<C: Clock = SystemClock> {
    engine: DecisionEngine<C>,
    window: DemandWindow,
    forecaster: Box<dyn Forecaster>,
    telemetry: Arc<dyn ClusterTelemetry>,
    actuator: Arc<dyn NodeActuator>,
    roster: NodeRoster,
    tick_interval: Duration,
}

impl ControlLoop<SystemClock> {
    /// Assemble the production loop from resolved settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            DecisionEngine::new(settings.engine.clone()),
            DemandWindow::new(settings.forecast.window),
            forecaster_for(settings.forecast.strategy),
            Arc::new(KubectlTelemetry::new(&settings.telemetry)),
            Arc::new(CommandActuator::new(&settings.actuator)),
            NodeRoster::from_telemetry_config(&settings.telemetry),
            settings.daemon.tick_interval,
        )
    }
}

impl<C: Clock> ControlLoop<C> {
    pub fn new(
        engine: DecisionEngine<C>,
        window: DemandWindow,
        forecaster: Box<dyn Forecaster>,
        telemetry: Arc<dyn ClusterTelemetry>,
        actuator: Arc<dyn NodeActuator>,
        roster: NodeRoster,
        tick_interval: Duration,
    ) -> Self {
        Self {
            engine,
            window,
            forecaster,
            telemetry,
            actuator,
            roster,
            tick_interval,
        }
    }

    /// One monitoring tick.
    pub async fn tick(&mut self) -> anyhow::Result<TickOutcome> {
        let telemetry = Arc::clone(&self.telemetry);
        let sample = tokio::task::spawn_blocking(move || telemetry.sample()).await??;

        self.window.push(sample.cpu_request_cores);
        if !self.window.is_warm() {
            debug!(
                have = self.window.len(),
                need = self.window.capacity(),
                "collecting demand history"
            );
            return Ok(TickOutcome::Warming {
                have: self.window.len(),
                need: self.window.capacity(),
            });
        }

        let history = self.window.snapshot();
        let predicted_cores = self.forecaster.predict(&history);

        let decision = self.engine.decide(&DecisionInput {
            predicted_cores,
            current_workers: sample.active_workers,
            pending_unschedulable: sample.pending_unschedulable,
            current_cpu_percent: sample.cpu_utilization_percent,
        });
        info!(
            action = %decision.action,
            reason = %decision.reason,
            predicted = predicted_cores,
            workers = sample.active_workers,
            pending = sample.pending_unschedulable,
            cpu = sample.cpu_utilization_percent,
            "tick"
        );

        match decision.action {
            ScaleAction::ScaleOut => self.power_on_next(sample.active_workers).await,
            ScaleAction::ScaleIn => self.power_off_last(sample.active_workers).await,
            ScaleAction::NoOp => {}
        }

        Ok(TickOutcome::Decided(decision))
    }

    async fn power_on_next(&self, active: u32) {
        let Some(node) = self.roster.next_to_start(active) else {
            warn!(active, "scale-out granted but every roster node is already up");
            return;
        };
        let node = node.to_string();
        let actuator = Arc::clone(&self.actuator);
        let target = node.clone();
        match tokio::task::spawn_blocking(move || actuator.scale_up(&target)).await {
            Ok(Ok(())) => info!(%node, "worker powering on"),
            Ok(Err(err)) => warn!(%node, error = %err, "power-on failed"),
            Err(err) => warn!(%node, error = %err, "power-on task failed"),
        }
    }

    async fn power_off_last(&self, active: u32) {
        let Some(node) = self.roster.next_to_stop(active) else {
            warn!(active, "scale-in granted but no roster node is up");
            return;
        };
        let node = node.to_string();
        let actuator = Arc::clone(&self.actuator);
        let target = node.clone();
        match tokio::task::spawn_blocking(move || actuator.scale_down(&target)).await {
            Ok(Ok(())) => info!(%node, "worker powering off"),
            Ok(Err(err)) => warn!(%node, error = %err, "power-off failed"),
            Err(err) => warn!(%node, error = %err, "power-off task failed"),
        }
    }

    /// Run ticks until shutdown is signaled.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.tick_interval.as_secs(),
            forecaster = self.forecaster.name(),
            "control loop started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.tick_interval) => {
                    if let Err(err) = self.tick().await {
                        warn!(error = %err, "tick failed, skipping");
                    }
                }
                _ = shutdown.changed() => {
                    info!("control loop shutting down");
                    break;
                }
            }
        }
    }
}

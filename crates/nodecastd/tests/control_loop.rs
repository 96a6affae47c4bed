//! Control-loop integration tests.
//!
//! Exercises the assembled pipeline with in-process collaborators: a
//! scripted telemetry source and a recording actuator, so no kubectl or
//! real nodes are involved.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use nodecast_actuator::{ActuatorResult, NodeActuator, NodeRoster};
use nodecast_core::{ClusterSample, EngineConfig};
use nodecast_engine::{DecisionEngine, ManualClock, ScaleAction};
use nodecast_forecast::{DemandWindow, MovingAverageForecaster};
use nodecast_telemetry::{ClusterTelemetry, TelemetryError, TelemetryResult};
use nodecastd::{ControlLoop, TickOutcome};

/// Telemetry that replays a queue of samples, then repeats the last one.
struct ScriptedTelemetry {
    queue: Mutex<VecDeque<ClusterSample>>,
    fallback: ClusterSample,
}

impl ScriptedTelemetry {
    fn new(samples: Vec<ClusterSample>) -> Self {
        let fallback = *samples.last().expect("at least one sample");
        Self {
            queue: Mutex::new(samples.into()),
            fallback,
        }
    }
}

impl ClusterTelemetry for ScriptedTelemetry {
    fn sample(&self) -> TelemetryResult<ClusterSample> {
        Ok(self
            .queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback))
    }
}

/// Telemetry that always fails, as if kubectl were unreachable.
struct BrokenTelemetry;

impl ClusterTelemetry for BrokenTelemetry {
    fn sample(&self) -> TelemetryResult<ClusterSample> {
        Err(TelemetryError::Command {
            args: "get node".to_string(),
            status: 1,
            stderr: "connection refused".to_string(),
        })
    }
}

#[derive(Default)]
struct RecordingActuator {
    powered_on: Mutex<Vec<String>>,
    powered_off: Mutex<Vec<String>>,
}

impl NodeActuator for RecordingActuator {
    fn scale_up(&self, node_id: &str) -> ActuatorResult<()> {
        self.powered_on.lock().unwrap().push(node_id.to_string());
        Ok(())
    }

    fn scale_down(&self, node_id: &str) -> ActuatorResult<()> {
        self.powered_off.lock().unwrap().push(node_id.to_string());
        Ok(())
    }
}

fn sample(cpu_req: f64, workers: u32, pending: u32, cpu: f64) -> ClusterSample {
    ClusterSample {
        cpu_request_cores: cpu_req,
        active_workers: workers,
        pending_unschedulable: pending,
        cpu_utilization_percent: cpu,
    }
}

fn test_loop(
    config: EngineConfig,
    window: usize,
    telemetry: Arc<dyn ClusterTelemetry>,
) -> (ControlLoop<ManualClock>, Arc<RecordingActuator>) {
    let actuator = Arc::new(RecordingActuator::default());
    let control = ControlLoop::new(
        DecisionEngine::with_clock(config, ManualClock::at(50_000)),
        DemandWindow::new(window),
        Box::new(MovingAverageForecaster),
        telemetry,
        actuator.clone(),
        NodeRoster::new(vec!["w-0".to_string(), "w-1".to_string()]),
        Duration::from_millis(10),
    );
    (control, actuator)
}

#[tokio::test]
async fn warming_ticks_make_no_decision() {
    let telemetry = Arc::new(ScriptedTelemetry::new(vec![sample(2.0, 1, 0, 40.0)]));
    let (mut control, actuator) = test_loop(EngineConfig::default(), 3, telemetry);

    for have in 1..=2 {
        match control.tick().await.unwrap() {
            TickOutcome::Warming { have: h, need } => {
                assert_eq!(h, have);
                assert_eq!(need, 3);
            }
            other => panic!("expected warming, got {other:?}"),
        }
    }
    assert!(actuator.powered_on.lock().unwrap().is_empty());
    assert!(actuator.powered_off.lock().unwrap().is_empty());
}

#[tokio::test]
async fn pending_workloads_power_on_the_next_node() {
    // One worker up, three unschedulable workloads: the reactive path
    // scales out and the roster picks w-1.
    let telemetry = Arc::new(ScriptedTelemetry::new(vec![sample(2.0, 1, 3, 50.0)]));
    let (mut control, actuator) = test_loop(EngineConfig::default(), 1, telemetry);

    match control.tick().await.unwrap() {
        TickOutcome::Decided(decision) => {
            assert_eq!(decision.action, ScaleAction::ScaleOut);
            assert!(decision.reason.contains("3 pending"));
        }
        other => panic!("expected a decision, got {other:?}"),
    }
    assert_eq!(*actuator.powered_on.lock().unwrap(), vec!["w-1".to_string()]);
}

#[tokio::test]
async fn low_forecast_powers_off_the_last_node() {
    // Two workers, demand averaging 1.0 cores, cool CPU: scale-in takes
    // down w-1.
    let telemetry = Arc::new(ScriptedTelemetry::new(vec![sample(1.0, 2, 0, 25.0)]));
    let (mut control, actuator) = test_loop(EngineConfig::default(), 1, telemetry);

    match control.tick().await.unwrap() {
        TickOutcome::Decided(decision) => assert_eq!(decision.action, ScaleAction::ScaleIn),
        other => panic!("expected a decision, got {other:?}"),
    }
    assert_eq!(
        *actuator.powered_off.lock().unwrap(),
        vec!["w-1".to_string()]
    );
}

#[tokio::test]
async fn exhausted_roster_skips_actuation() {
    // max_workers of 3 lets the engine grant a scale-out at 2 workers,
    // but the two-node roster has nothing left to power on.
    let config = EngineConfig {
        max_workers: 3,
        ..EngineConfig::default()
    };
    let telemetry = Arc::new(ScriptedTelemetry::new(vec![sample(7.0, 2, 4, 50.0)]));
    let (mut control, actuator) = test_loop(config, 1, telemetry);

    match control.tick().await.unwrap() {
        TickOutcome::Decided(decision) => assert_eq!(decision.action, ScaleAction::ScaleOut),
        other => panic!("expected a decision, got {other:?}"),
    }
    assert!(actuator.powered_on.lock().unwrap().is_empty());
}

#[tokio::test]
async fn cooldown_spans_ticks() {
    // Two back-to-back scale-out-worthy samples: the first commits, the
    // second is rejected by the scale-out cooldown.
    let telemetry = Arc::new(ScriptedTelemetry::new(vec![
        sample(8.0, 1, 0, 50.0),
        sample(8.0, 1, 0, 50.0),
    ]));
    let (mut control, actuator) = test_loop(EngineConfig::default(), 1, telemetry);

    match control.tick().await.unwrap() {
        TickOutcome::Decided(decision) => assert_eq!(decision.action, ScaleAction::ScaleOut),
        other => panic!("expected a decision, got {other:?}"),
    }
    match control.tick().await.unwrap() {
        TickOutcome::Decided(decision) => {
            assert_eq!(decision.action, ScaleAction::NoOp);
            assert!(decision.reason.contains("cooldown"));
        }
        other => panic!("expected a decision, got {other:?}"),
    }
    assert_eq!(actuator.powered_on.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn loop_survives_telemetry_failures_until_shutdown() {
    let (mut control, actuator) = test_loop(EngineConfig::default(), 1, Arc::new(BrokenTelemetry));

    // A failing tick surfaces the error to the loop, which logs and
    // carries on; nothing must be actuated.
    assert!(control.tick().await.is_err());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(control.run(shutdown_rx));
    tokio::time::sleep(Duration::from_millis(50)).await;

    shutdown_tx.send(true).unwrap();
    task.await.unwrap();
    assert!(actuator.powered_on.lock().unwrap().is_empty());
}

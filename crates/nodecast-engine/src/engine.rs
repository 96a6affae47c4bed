//! The decision engine: validator → classifier → gate.
//!
//! Every rejection is a normal `no-op` outcome with a reason; there is no
//! error path out of `decide` for any input combination.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use nodecast_core::EngineConfig;

use crate::clock::{Clock, SystemClock};

/// The action taken for one monitoring tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleAction {
    /// Add one worker to the pool.
    ScaleOut,
    /// Remove one worker from the pool.
    ScaleIn,
    /// Leave the pool unchanged.
    NoOp,
}

impl std::fmt::Display for ScaleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScaleAction::ScaleOut => "scale-out",
            ScaleAction::ScaleIn => "scale-in",
            ScaleAction::NoOp => "no-op",
        };
        f.write_str(s)
    }
}

/// A scaling decision plus the reason it was taken.
///
/// The reason is informational only; callers must branch on `action`,
/// never on the reason text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: ScaleAction,
    pub reason: String,
}

impl Decision {
    fn no_op(reason: String) -> Self {
        Self {
            action: ScaleAction::NoOp,
            reason,
        }
    }
}

/// Per-tick inputs to [`DecisionEngine::decide`]. Supplied fresh on every
/// call and never cached by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionInput {
    /// Forecast demand signal. May be negative or absurdly large; the
    /// engine validates it before anything else runs.
    pub predicted_cores: f64,
    /// Observed pool size.
    pub current_workers: u32,
    /// Workloads that cannot be placed right now.
    pub pending_unschedulable: u32,
    /// Observed cluster utilization, nominally 0–100.
    pub current_cpu_percent: f64,
}

/// Tentative intent produced by the classifier, before the gate runs.
enum Intent {
    ScaleOut,
    ScaleIn,
    Hold,
}

/// The stateful decision engine.
///
/// Holds exactly two timestamps across ticks: the last granted scale-out
/// and scale-in. Both start at "never". A single logical owner must drive
/// `decide`; the cooldown read-then-commit is not atomic across
/// concurrent callers.
pub struct DecisionEngine<C: Clock = SystemClock> {
    config: EngineConfig,
    clock: C,
    last_scale_out_at: Option<u64>,
    last_scale_in_at: Option<u64>,
}

impl DecisionEngine<SystemClock> {
    /// Build an engine reading the wall clock.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> DecisionEngine<C> {
    /// Build an engine with an explicit time source.
    pub fn with_clock(config: EngineConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            last_scale_out_at: None,
            last_scale_in_at: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decide what the cluster should do this tick.
    ///
    /// Rule precedence: sanity > reactive > predictive > capacity >
    /// cooldown > anti-flapping. State mutates only when a scale-out or
    /// scale-in is actually granted.
    pub fn decide(&mut self, input: &DecisionInput) -> Decision {
        // The sanity check runs before the reactive signal: a corrupted
        // forecast must never pass because an emergency was present in
        // the same tick.
        if let Some(reason) = self.forecast_out_of_range(input) {
            return Decision::no_op(reason);
        }

        let (intent, reason) = self.classify(input);
        match intent {
            Intent::ScaleOut => self.gate_scale_out(input, reason),
            Intent::ScaleIn => self.gate_scale_in(input, reason),
            Intent::Hold => Decision::no_op(reason),
        }
    }

    /// Guardrail validator: reject forecasts outside `[0, 2 × max fleet
    /// capacity]`.
    fn forecast_out_of_range(&self, input: &DecisionInput) -> Option<String> {
        let ceiling = 2.0 * self.config.max_workers as f64 * self.config.cores_per_node;
        if input.predicted_cores < 0.0 || input.predicted_cores > ceiling {
            debug!(
                predicted = input.predicted_cores,
                ceiling, "forecast rejected by sanity check"
            );
            return Some(format!(
                "sanity check failed: abnormal prediction ({:.2} cores)",
                input.predicted_cores
            ));
        }
        None
    }

    /// Intent classifier: reactive override first, then the predictive
    /// hysteresis comparison.
    fn classify(&self, input: &DecisionInput) -> (Intent, String) {
        if input.pending_unschedulable > 0 {
            return (
                Intent::ScaleOut,
                format!(
                    "emergency: {} pending unschedulable workloads",
                    input.pending_unschedulable
                ),
            );
        }

        let current_total = input.current_workers as f64 * self.config.cores_per_node;
        let out_threshold = current_total * self.config.scale_out_ratio;
        // Scale-in is judged against the capacity that would remain after
        // removing one worker, so a shrink is never granted unless the
        // smaller fleet still has headroom.
        let post_shrink = (input.current_workers as f64 - 1.0) * self.config.cores_per_node;
        let in_threshold = post_shrink * self.config.scale_in_ratio;

        if input.predicted_cores > out_threshold {
            (
                Intent::ScaleOut,
                format!(
                    "forecast {:.2} cores exceeds {:.2} core threshold at {} workers",
                    input.predicted_cores, out_threshold, input.current_workers
                ),
            )
        } else if input.predicted_cores < in_threshold {
            (
                Intent::ScaleIn,
                format!(
                    "forecast {:.2} cores fits within {:.2} core threshold at {} workers",
                    input.predicted_cores,
                    in_threshold,
                    input.current_workers.saturating_sub(1)
                ),
            )
        } else {
            // Between the thresholds sits the hysteresis band where the
            // engine deliberately does nothing.
            (Intent::Hold, "system is stable".to_string())
        }
    }

    /// Execution gate for a tentative scale-out. First failing constraint
    /// wins; state is stamped only on the grant.
    fn gate_scale_out(&mut self, input: &DecisionInput, reason: String) -> Decision {
        let now = self.clock.epoch_secs();

        if input.current_workers >= self.config.max_workers {
            return Decision::no_op(format!(
                "blocked: at capacity ceiling ({} workers)",
                self.config.max_workers
            ));
        }
        if let Some(remaining) =
            cooldown_remaining(self.last_scale_out_at, self.config.cooldown_out, now)
        {
            return Decision::no_op(format!(
                "scale-out cooldown active ({remaining}s remaining)"
            ));
        }

        self.last_scale_out_at = Some(now);
        debug!(workers = input.current_workers, %reason, "scale-out granted");
        Decision {
            action: ScaleAction::ScaleOut,
            reason,
        }
    }

    /// Execution gate for a tentative scale-in.
    fn gate_scale_in(&mut self, input: &DecisionInput, reason: String) -> Decision {
        let now = self.clock.epoch_secs();

        if input.current_workers <= self.config.min_workers {
            return Decision::no_op(format!(
                "blocked: at capacity floor ({} workers)",
                self.config.min_workers
            ));
        }
        if input.current_cpu_percent > self.config.safe_cpu_ceiling_percent {
            return Decision::no_op(format!(
                "guardrail: utilization {:.1}% above safe ceiling {:.1}%",
                input.current_cpu_percent, self.config.safe_cpu_ceiling_percent
            ));
        }
        if let Some(remaining) =
            cooldown_remaining(self.last_scale_in_at, self.config.cooldown_in, now)
        {
            return Decision::no_op(format!(
                "scale-in cooldown active ({remaining}s remaining)"
            ));
        }
        // A granted scale-out locks out scale-in for the scale-in
        // cooldown window, so a just-added worker is not immediately
        // removed again. The coupling is one-way.
        if let Some(remaining) =
            cooldown_remaining(self.last_scale_out_at, self.config.cooldown_in, now)
        {
            return Decision::no_op(format!(
                "anti-flapping: too soon after a scale-out ({remaining}s remaining)"
            ));
        }

        self.last_scale_in_at = Some(now);
        debug!(workers = input.current_workers, %reason, "scale-in granted");
        Decision {
            action: ScaleAction::ScaleIn,
            reason,
        }
    }
}

/// Seconds left in a cooldown window, or `None` once it has passed.
/// A timestamp of "never" has no window.
fn cooldown_remaining(last: Option<u64>, cooldown: Duration, now: u64) -> Option<u64> {
    let elapsed = now.saturating_sub(last?);
    let window = cooldown.as_secs();
    (elapsed < window).then(|| window - elapsed)
}

//! nodecast-engine — the scaling decision engine.
//!
//! A stateful, rule-based controller that fuses a demand forecast, a
//! reactive emergency signal (unschedulable workloads), and live
//! utilization into a single scaling decision per monitoring tick.
//!
//! # Decision flow
//!
//! ```text
//! decide(input)
//!   ├── guardrail validator — forecast sanity range, runs before everything
//!   ├── intent classifier   — reactive override, then hysteresis thresholds
//!   └── execution gate      — capacity bounds, cooldowns, anti-flapping;
//!                             the only place engine state mutates
//! ```
//!
//! The engine owns exactly two pieces of cross-tick state: the timestamps
//! of the last granted scale-out and scale-in. Time is read through the
//! [`Clock`] seam so cooldown behavior is testable without real elapsed
//! seconds.

pub mod clock;
pub mod engine;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Decision, DecisionEngine, DecisionInput, ScaleAction};

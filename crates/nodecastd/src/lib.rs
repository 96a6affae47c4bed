//! nodecastd — daemon internals.
//!
//! The binary in `main.rs` is a thin CLI over [`ControlLoop`], which
//! wires telemetry, the demand window, the forecaster, the decision
//! engine, and the node actuator into one tick loop.

pub mod control_loop;

pub use control_loop::{ControlLoop, TickOutcome};

//! nodecast-actuator — physically adding and removing workers.
//!
//! The decision engine only ever says "gain a worker" or "lose a
//! worker"; this crate turns that into action. [`NodeRoster`] picks
//! which node is next in power-on order, and a [`NodeActuator`] powers
//! it on or off. The shipped [`CommandActuator`] substitutes the node id
//! into operator-configured shell commands (wake-on-LAN, ssh poweroff,
//! a cloud CLI — whatever the fleet uses).

pub mod actuator;
pub mod roster;

pub use actuator::{ActuatorError, ActuatorResult, CommandActuator, NodeActuator};
pub use roster::NodeRoster;

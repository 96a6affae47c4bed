//! Node actuation trait and the command-driven implementation.

use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

use nodecast_core::ActuatorConfig;

/// Powers a node into or out of the pool.
///
/// Invoked by the daemon only after the engine has granted the matching
/// action; the engine itself never touches an actuator.
pub trait NodeActuator: Send + Sync {
    /// Bring the node into the pool.
    fn scale_up(&self, node_id: &str) -> ActuatorResult<()>;

    /// Take the node out of the pool.
    fn scale_down(&self, node_id: &str) -> ActuatorResult<()>;
}

/// Errors raised while actuating a node.
#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("no {action} command configured")]
    NoCommand { action: &'static str },

    #[error("failed to spawn actuation command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("actuation command {command:?} exited with status {status}: {stderr}")]
    Failed {
        command: String,
        status: i32,
        stderr: String,
    },
}

pub type ActuatorResult<T> = Result<T, ActuatorError>;

/// Runs operator-configured shell commands to power nodes on and off.
/// `{node}` in a template is replaced with the target node id.
pub struct CommandActuator {
    power_on_template: String,
    power_off_template: String,
}

impl CommandActuator {
    pub fn new(config: &ActuatorConfig) -> Self {
        Self {
            power_on_template: config.power_on_command.clone(),
            power_off_template: config.power_off_command.clone(),
        }
    }

    fn run(&self, template: &str, action: &'static str, node_id: &str) -> ActuatorResult<()> {
        if template.trim().is_empty() {
            return Err(ActuatorError::NoCommand { action });
        }
        let command = render_template(template, node_id);
        debug!(node = node_id, %command, "running actuation command");

        let output = Command::new("sh").arg("-c").arg(&command).output()?;
        if !output.status.success() {
            return Err(ActuatorError::Failed {
                command,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        info!(node = node_id, action, "node actuated");
        Ok(())
    }
}

impl NodeActuator for CommandActuator {
    fn scale_up(&self, node_id: &str) -> ActuatorResult<()> {
        self.run(&self.power_on_template, "power-on", node_id)
    }

    fn scale_down(&self, node_id: &str) -> ActuatorResult<()> {
        self.run(&self.power_off_template, "power-off", node_id)
    }
}

/// Substitute every `{node}` placeholder with the node id.
fn render_template(template: &str, node_id: &str) -> String {
    template.replace("{node}", node_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actuator(on: &str, off: &str) -> CommandActuator {
        CommandActuator::new(&ActuatorConfig {
            power_on_command: on.to_string(),
            power_off_command: off.to_string(),
        })
    }

    #[test]
    fn template_substitutes_node_id() {
        assert_eq!(
            render_template("wakeonlan {node}", "10.0.0.7"),
            "wakeonlan 10.0.0.7"
        );
        assert_eq!(
            render_template("ssh {node} poweroff # {node}", "w-1"),
            "ssh w-1 poweroff # w-1"
        );
    }

    #[test]
    fn template_without_placeholder_is_unchanged() {
        assert_eq!(render_template("virsh start worker", "w-1"), "virsh start worker");
    }

    #[test]
    fn successful_command_is_ok() {
        let actuator = actuator("true", "true");
        assert!(actuator.scale_up("w-0").is_ok());
        assert!(actuator.scale_down("w-0").is_ok());
    }

    #[test]
    fn failing_command_reports_status() {
        let actuator = actuator("false", "false");
        match actuator.scale_up("w-0") {
            Err(ActuatorError::Failed { status, .. }) => assert_eq!(status, 1),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn empty_template_is_rejected() {
        let actuator = actuator("", "  ");
        assert!(matches!(
            actuator.scale_up("w-0"),
            Err(ActuatorError::NoCommand { action: "power-on" })
        ));
        assert!(matches!(
            actuator.scale_down("w-0"),
            Err(ActuatorError::NoCommand { action: "power-off" })
        ));
    }
}

//! Ordered worker roster.

use nodecast_core::TelemetryConfig;

/// The fixed, ordered list of worker nodes the fleet can power on.
///
/// Nodes are brought up in list order and taken down in reverse: with
/// `active` workers running, the next to start is index `active` and the
/// next to stop is index `active - 1`.
#[derive(Debug, Clone)]
pub struct NodeRoster {
    workers: Vec<String>,
}

impl NodeRoster {
    pub fn new(workers: Vec<String>) -> Self {
        Self { workers }
    }

    pub fn from_telemetry_config(config: &TelemetryConfig) -> Self {
        Self::new(config.workers.clone())
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// The node to power on next, or `None` when every roster node is
    /// already up.
    pub fn next_to_start(&self, active: u32) -> Option<&str> {
        self.workers.get(active as usize).map(String::as_str)
    }

    /// The node to power off next, or `None` when nothing is up.
    pub fn next_to_stop(&self, active: u32) -> Option<&str> {
        let last = active.checked_sub(1)?;
        self.workers.get(last as usize).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> NodeRoster {
        NodeRoster::new(vec!["w-0".to_string(), "w-1".to_string()])
    }

    #[test]
    fn starts_in_list_order() {
        let roster = roster();
        assert_eq!(roster.next_to_start(0), Some("w-0"));
        assert_eq!(roster.next_to_start(1), Some("w-1"));
    }

    #[test]
    fn start_exhausted_when_all_up() {
        assert_eq!(roster().next_to_start(2), None);
    }

    #[test]
    fn stops_most_recent_first() {
        let roster = roster();
        assert_eq!(roster.next_to_stop(2), Some("w-1"));
        assert_eq!(roster.next_to_stop(1), Some("w-0"));
    }

    #[test]
    fn stop_with_nothing_running() {
        assert_eq!(roster().next_to_stop(0), None);
    }
}

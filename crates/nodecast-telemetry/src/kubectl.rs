//! kubectl-backed telemetry collection.
//!
//! One sample walks every configured node:
//! - `kubectl get node <n> --no-headers` for readiness,
//! - `kubectl describe node <n>` for allocated CPU requests (all ready
//!   nodes — this sum is the demand signal),
//! - `kubectl get node <n> -o jsonpath=...capacity.cpu` and
//!   `kubectl top node <n>` for capacity and usage (workers only —
//!   utilization percent is computed over worker capacity alone),
//! - `kubectl get pods -A --field-selector=status.phase=Pending` for the
//!   unschedulable count.

use std::process::Command;

use tracing::{debug, warn};

use nodecast_core::{ClusterSample, TelemetryConfig};

use crate::collector::{ClusterTelemetry, TelemetryError, TelemetryResult};

/// Telemetry collector shelling out to kubectl.
pub struct KubectlTelemetry {
    kubectl: String,
    masters: Vec<String>,
    workers: Vec<String>,
}

impl KubectlTelemetry {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            kubectl: config.kubectl_path.clone(),
            masters: config.masters.clone(),
            workers: config.workers.clone(),
        }
    }

    fn run(&self, args: &[&str]) -> TelemetryResult<String> {
        let output = Command::new(&self.kubectl).args(args).output()?;
        if !output.status.success() {
            return Err(TelemetryError::Command {
                args: args.join(" "),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn node_ready(&self, node: &str) -> TelemetryResult<bool> {
        match self.run(&["get", "node", node, "--no-headers"]) {
            Ok(line) => Ok(node_is_ready(&line)),
            // A powered-off node often disappears from the API entirely;
            // that is "not ready", not a failed sample.
            Err(err @ TelemetryError::Spawn(_)) => Err(err),
            Err(err) => {
                debug!(node, error = %err, "node status unavailable, treating as not ready");
                Ok(false)
            }
        }
    }

    fn allocated_request_cores(&self, node: &str) -> TelemetryResult<f64> {
        let output = self.run(&["describe", "node", node])?;
        Ok(allocated_cpu_from_describe(&output))
    }

    fn capacity_cores(&self, node: &str) -> TelemetryResult<f64> {
        let output = self.run(&[
            "get",
            "node",
            node,
            "-o",
            "jsonpath={.status.capacity.cpu}",
        ])?;
        Ok(parse_cpu_quantity(&output))
    }

    fn usage_cores(&self, node: &str) -> TelemetryResult<f64> {
        let output = self.run(&["top", "node", node, "--no-headers"])?;
        Ok(top_cpu_from_line(&output))
    }

    fn pending_workloads(&self) -> TelemetryResult<u32> {
        let output = self.run(&[
            "get",
            "pods",
            "-A",
            "--field-selector=status.phase=Pending",
            "--no-headers",
        ])?;
        Ok(count_lines(&output))
    }
}

impl ClusterTelemetry for KubectlTelemetry {
    fn sample(&self) -> TelemetryResult<ClusterSample> {
        let mut cpu_request_cores = 0.0;
        let mut worker_capacity = 0.0;
        let mut worker_usage = 0.0;
        let mut active_workers = 0u32;

        let nodes = self
            .masters
            .iter()
            .map(|n| (n, false))
            .chain(self.workers.iter().map(|n| (n, true)));

        for (node, is_worker) in nodes {
            if !self.node_ready(node)? {
                continue;
            }

            match self.allocated_request_cores(node) {
                Ok(cores) => cpu_request_cores += cores,
                Err(err) => warn!(node, error = %err, "could not read allocated CPU requests"),
            }

            if is_worker {
                active_workers += 1;
                match self.capacity_cores(node) {
                    Ok(cores) => worker_capacity += cores,
                    Err(err) => warn!(node, error = %err, "could not read node capacity"),
                }
                match self.usage_cores(node) {
                    Ok(cores) => worker_usage += cores,
                    Err(err) => warn!(node, error = %err, "could not read node usage"),
                }
            }
        }

        let cpu_utilization_percent = if worker_capacity > 0.0 {
            worker_usage / worker_capacity * 100.0
        } else {
            0.0
        };

        let pending_unschedulable = self.pending_workloads()?;

        debug!(
            cpu_request_cores,
            active_workers, pending_unschedulable, cpu_utilization_percent, "cluster sampled"
        );

        Ok(ClusterSample {
            cpu_request_cores,
            active_workers,
            pending_unschedulable,
            cpu_utilization_percent,
        })
    }
}

/// Parse a Kubernetes CPU quantity into cores: "250m" → 0.25, "4" → 4.0.
/// Unparseable input reads as zero.
pub fn parse_cpu_quantity(raw: &str) -> f64 {
    let raw = raw.trim();
    if let Some(milli) = raw.strip_suffix('m') {
        milli.parse::<f64>().map(|v| v / 1000.0).unwrap_or(0.0)
    } else {
        raw.parse::<f64>().unwrap_or(0.0)
    }
}

/// Readiness from a `kubectl get node --no-headers` line. The status
/// column can carry suffixes like "Ready,SchedulingDisabled", and
/// "NotReady" must not count as ready.
pub fn node_is_ready(line: &str) -> bool {
    match line.split_whitespace().nth(1) {
        Some(status) => status.contains("Ready") && !status.contains("NotReady"),
        None => false,
    }
}

/// CPU requests from `kubectl describe node` output: under the
/// "Allocated resources" header, the cpu row reads
/// `cpu  950m (23%)  1 (25%)` with requests in the second column.
pub fn allocated_cpu_from_describe(output: &str) -> f64 {
    let mut lines = output.lines();
    for line in lines.by_ref() {
        if line.trim_start().starts_with("Allocated resources") {
            break;
        }
    }
    for line in lines {
        let mut fields = line.split_whitespace();
        if fields.next() == Some("cpu") {
            return fields.next().map(parse_cpu_quantity).unwrap_or(0.0);
        }
    }
    0.0
}

/// Usage column of a `kubectl top node --no-headers` line:
/// `worker-1  250m  6%  1024Mi  13%`.
pub fn top_cpu_from_line(line: &str) -> f64 {
    line.split_whitespace()
        .nth(1)
        .map(parse_cpu_quantity)
        .unwrap_or(0.0)
}

/// Non-empty line count, for `--no-headers` listings.
pub fn count_lines(output: &str) -> u32 {
    output.lines().filter(|l| !l.trim().is_empty()).count() as u32
}

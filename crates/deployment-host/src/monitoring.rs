//! In-memory deployment log and metrics buffer.

use crate::types::{
    DeploymentLog, DeploymentMetrics, DeploymentResult, LogLevel, LogQuery, ResultStatus,
};
use admin_store::Environment;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Log entries kept before the oldest are dropped.
pub const MAX_LOGS: usize = 100;
/// Results kept in `recent_deployments`.
pub const MAX_RECENT: usize = 10;

#[derive(Default)]
struct MonitorState {
    logs: VecDeque<DeploymentLog>,
    metrics: DeploymentMetrics,
    recent: VecDeque<DeploymentResult>,
    timed_deployments: u64,
}

impl MonitorState {
    fn push_log(&mut self, entry: DeploymentLog) {
        self.logs.push_back(entry);
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn update_metrics(&mut self, result: &DeploymentResult) {
        let metrics = &mut self.metrics;
        metrics.total_deployments += 1;

        match result.status {
            ResultStatus::Pending => metrics.pending_deployments += 1,
            _ if result.success => metrics.successful_deployments += 1,
            _ => metrics.failed_deployments += 1,
        }

        match result.environment {
            Environment::Development => metrics.deployments_by_environment.development += 1,
            Environment::Production => metrics.deployments_by_environment.production += 1,
        }

        match result.status {
            ResultStatus::Deployed => metrics.deployments_by_status.deployed += 1,
            ResultStatus::Pending => metrics.deployments_by_status.pending += 1,
            ResultStatus::Failed => metrics.deployments_by_status.failed += 1,
        }

        if let Some(duration) = result.duration_ms {
            self.timed_deployments += 1;
            let n = self.timed_deployments as f64;
            metrics.average_deployment_time += (duration as f64 - metrics.average_deployment_time) / n;
        }

        self.recent.push_back(result.clone());
        while self.recent.len() > MAX_RECENT {
            self.recent.pop_front();
        }
    }
}

/// Bounded log and metrics aggregation for deploy results.
#[derive(Default)]
pub struct MonitoringService {
    state: Mutex<MonitorState>,
}

fn log_id() -> String {
    format!("log-{}", ulid::Ulid::new().to_string().to_lowercase())
}

impl MonitoringService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a deploy result and fold it into the metrics.
    pub fn log_deployment(&self, result: &DeploymentResult) {
        let (level, message) = if result.success {
            (LogLevel::Info, format!("Deployment successful: {}", result.url))
        } else {
            (
                LogLevel::Error,
                format!("Deployment failed: {}", result.error.as_deref().unwrap_or("unknown error")),
            )
        };
        let deployment_id = if result.deployment_id.is_empty() {
            "unknown".to_string()
        } else {
            result.deployment_id.clone()
        };

        let mut state = self.state.lock();
        state.push_log(DeploymentLog {
            id: log_id(),
            deployment_id,
            timestamp: Utc::now(),
            level,
            message,
            details: Some(result.clone()),
        });
        state.update_metrics(result);
    }

    /// Append a free-form entry for `deployment_id`.
    pub fn record(&self, deployment_id: &str, level: LogLevel, message: impl Into<String>) {
        self.state.lock().push_log(DeploymentLog {
            id: log_id(),
            deployment_id: deployment_id.to_string(),
            timestamp: Utc::now(),
            level,
            message: message.into(),
            details: None,
        });
    }

    pub fn get_logs(&self, query: &LogQuery) -> Vec<DeploymentLog> {
        let state = self.state.lock();
        let mut logs: Vec<DeploymentLog> = state
            .logs
            .iter()
            .filter(|log| {
                query
                    .deployment_id
                    .as_deref()
                    .map_or(true, |id| log.deployment_id == id)
            })
            .filter(|log| query.level.map_or(true, |level| log.level == level))
            .cloned()
            .collect();

        if let Some(limit) = query.limit.filter(|limit| *limit > 0) {
            let skip = logs.len().saturating_sub(limit);
            logs.drain(..skip);
        }
        logs
    }

    pub fn get_metrics(&self) -> DeploymentMetrics {
        let state = self.state.lock();
        let mut metrics = state.metrics.clone();
        metrics.recent_deployments = state.recent.iter().cloned().collect();
        metrics
    }

    /// Latest result for `deployment_id` among the recent deployments.
    pub fn get_deployment_status(&self, deployment_id: &str) -> Option<DeploymentResult> {
        self.state
            .lock()
            .recent
            .iter()
            .rev()
            .find(|result| result.deployment_id == deployment_id)
            .cloned()
    }

    pub fn clear_logs(&self) {
        self.state.lock().logs.clear();
    }

    pub fn reset_metrics(&self) {
        let mut state = self.state.lock();
        state.metrics = DeploymentMetrics::default();
        state.recent.clear();
        state.timed_deployments = 0;
    }
}

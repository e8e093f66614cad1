//! `/api/monitoring`

use crate::api::{ApiQuery, ApiResult};
use crate::app::AppState;
use axum::extract::State;
use axum::Json;
use deployment_host::{DeploymentLog, DeploymentMetrics, LogQuery};

pub async fn metrics(State(state): State<AppState>) -> Json<DeploymentMetrics> {
    Json(state.monitoring.get_metrics())
}

pub async fn logs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LogQuery>,
) -> ApiResult<Json<Vec<DeploymentLog>>> {
    Ok(Json(state.monitoring.get_logs(&query)))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{read_json, send, test_state};
    use axum::http::{Method, StatusCode};
    use deployment_host::LogLevel;

    #[tokio::test]
    async fn reports_metrics_and_filtered_logs() {
        let (state, _dir) = test_state().await;
        state.monitoring.record("deploy-a", LogLevel::Info, "Deployment started");
        state.monitoring.record("deploy-b", LogLevel::Error, "Disk full");
        state.monitoring.record("deploy-a", LogLevel::Info, "Deployment finished");

        let (status, body) = send(&state, Method::GET, "/api/monitoring/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
        let metrics = read_json(&body);
        assert_eq!(metrics["totalDeployments"], 0);
        assert_eq!(metrics["averageDeploymentTime"], 0.0);

        let (_, body) = send(&state, Method::GET, "/api/monitoring/logs?deploymentId=deploy-a", None).await;
        let logs = read_json(&body);
        assert_eq!(logs.as_array().unwrap().len(), 2);

        let (_, body) = send(&state, Method::GET, "/api/monitoring/logs?level=error", None).await;
        let logs = read_json(&body);
        assert_eq!(logs.as_array().unwrap().len(), 1);
        assert_eq!(logs[0]["message"], "Disk full");

        let (_, body) = send(&state, Method::GET, "/api/monitoring/logs?limit=1", None).await;
        assert_eq!(read_json(&body).as_array().unwrap().len(), 1);
    }
}

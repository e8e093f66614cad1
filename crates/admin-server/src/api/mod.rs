//! JSON admin API.
//!
//! Every error is answered as `{"error": "..."}`; unknown paths get a 404 and
//! unsupported methods on a known path get a 405.

mod deployments;
mod error;
mod generate;
mod leads;
mod llm;
mod monitoring;
mod orders;
mod templates;

pub use error::{ApiError, ApiJson, ApiQuery, ApiResult, IdPath};

use crate::app::AppState;
use axum::routing::{get, post, MethodRouter};
use axum::Router;

fn only(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(error::method_not_allowed)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/leads", only(get(leads::list).post(leads::create)))
        .route(
            "/api/leads/{id}",
            only(get(leads::get).put(leads::update).delete(leads::remove)),
        )
        .route(
            "/api/templates/website",
            only(get(templates::list_website).post(templates::create_website)),
        )
        .route(
            "/api/templates/website/{id}",
            only(
                get(templates::get_website)
                    .put(templates::update_website)
                    .delete(templates::delete_website),
            ),
        )
        .route(
            "/api/templates/email",
            only(get(templates::list_email).post(templates::create_email)),
        )
        .route(
            "/api/templates/email/{id}",
            only(
                get(templates::get_email)
                    .put(templates::update_email)
                    .delete(templates::delete_email),
            ),
        )
        .route("/api/orders", only(get(orders::list).post(orders::create)))
        .route(
            "/api/orders/{id}",
            only(get(orders::get).put(orders::update).delete(orders::remove)),
        )
        .route("/api/deployments", only(get(deployments::list)))
        .route(
            "/api/deployments/{id}",
            only(
                get(deployments::get)
                    .put(deployments::update)
                    .delete(deployments::remove),
            ),
        )
        .route("/api/deployments/{id}/publish", only(post(deployments::publish)))
        .route("/api/generate-website", only(post(generate::generate_website)))
        .route("/api/preview-website", only(post(generate::preview_website)))
        .route("/api/generate-email", only(post(generate::generate_email)))
        .route("/api/test-llm", only(post(llm::test_llm)))
        .route("/api/llm/models", only(get(llm::models)))
        .route("/api/monitoring/metrics", only(get(monitoring::metrics)))
        .route("/api/monitoring/logs", only(get(monitoring::logs)))
        .fallback(error::not_found)
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::test_support::{read_json, send, test_state};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn unknown_path_is_json_404() {
        let (state, _dir) = test_state().await;
        let (status, body) = send(&state, Method::GET, "/api/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(read_json(&body), json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (state, _dir) = test_state().await;
        let (status, body) = send(&state, Method::POST, "/api/leads", Some(json!("not an object"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(read_json(&body)["error"].is_string());
    }

    #[tokio::test]
    async fn generate_then_publish_serves_site() {
        let (state, dir) = test_state().await;

        let (_, body) = send(
            &state,
            Method::POST,
            "/api/generate-website",
            Some(json!({"templateId": 1, "leadId": 2})),
        )
        .await;
        let id = read_json(&body)["deployment"]["id"].as_i64().unwrap();

        let (status, body) = send(&state, Method::POST, &format!("/api/deployments/{id}/publish"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        let published = read_json(&body);
        assert_eq!(published["deployment"]["url"], "http://doebakery.localhost:3001");

        let hosted = published["result"]["deploymentId"].as_str().unwrap();
        let public = dir.path().join("deployments").join(hosted).join("public");
        let index = std::fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains("Fresh bread daily"));
        assert!(public.join("styles.css").exists());

        let (_, body) = send(&state, Method::GET, "/api/monitoring/metrics", None).await;
        let metrics = read_json(&body);
        assert_eq!(metrics["totalDeployments"], 1);
        assert_eq!(metrics["successfulDeployments"], 1);
    }
}

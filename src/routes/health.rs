use axum::{routing::get, Json, Router};
use crate::models::{AppState, HealthResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
}

async fn health_check() -> Json<HealthResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    Json(response)
}

#[cfg(test)]
mod tests {
    use crate::routes::create_router;
    use crate::test_support::{test_state, FakeStore};
    use axum_test::TestServer;
    use serde_json::Value;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_check() {
        let staging = tempfile::TempDir::new().unwrap();
        let store = Arc::new(FakeStore::default());
        let server = TestServer::new(create_router(test_state(store.clone(), staging.path())))
            .expect("Failed to create test server");

        let response = server.get("/health").await;
        assert_eq!(response.status_code(), 200);

        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
        assert_eq!(store.network_calls(), 0);
    }
}

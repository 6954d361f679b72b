use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use super::{AppState, handlers};

/// Full health exports run to hundreds of megabytes.
pub const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/upload", post(handlers::upload))
        .route("/summary", get(handlers::summary))
        .route("/nights", get(handlers::nights))
        .route(
            "/sleep-score",
            get(handlers::score).post(handlers::score_with_features),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{SleepSession, session::tests::ONE_NIGHT};

    const BOUNDARY: &str = "sleepwell-boundary";

    fn router(state: &AppState) -> Router {
        create_router(state.clone())
    }

    fn upload_request(field: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"export.xml\"\r\n\
             Content-Type: text/xml\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::post("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_check() {
        let state = AppState::new(SleepSession::default());
        let (status, body) = send(&state, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn reads_before_upload() {
        let state = AppState::new(SleepSession::default());

        let (status, body) = send(&state, get("/summary")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "NO_DATA_UPLOADED");

        let (status, _) = send(&state, get("/sleep-score")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_then_read() {
        let state = AppState::new(SleepSession::default());

        let (status, body) = send(&state, upload_request("file", ONE_NIGHT)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nights"], 1);
        assert_eq!(body["observations"], 5);

        let (status, body) = send(&state, get("/summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nights_tracked"], 1);
        assert_eq!(body["avg_hr"], 60.0);
        assert_eq!(body["avg_hrv"], Value::Null);

        let (_, body) = send(&state, get("/nights")).await;
        let night = &body["nights"][0];
        assert_eq!(night["date"], "2025-01-01");
        assert_eq!(night["total_sleep_hours"], 8.0);
        assert!(night.as_object().unwrap().contains_key("rem_hours"));
        assert_eq!(night["rem_hours"], Value::Null);

        let (status, body) = send(&state, get("/sleep-score")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 100);
        assert_eq!(body["component_scores"]["hrv"], Value::Null);
    }

    #[tokio::test]
    async fn upload_errors() {
        let state = AppState::new(SleepSession::default());

        let (status, body) = send(&state, upload_request("file", "not an export")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "UNRECOGNIZED_FORMAT");

        let (status, body) = send(&state, upload_request("attachment", ONE_NIGHT)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn score_with_override_features() {
        let state = AppState::new(SleepSession::default());
        let request = |features: Value| {
            Request::post("/sleep-score")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "features": features }).to_string()))
                .unwrap()
        };

        let (status, body) = send(&state, request(json!({ "avg_hr": 58.0 }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INSUFFICIENT_DATA");

        let (status, body) = send(
            &state,
            request(json!({ "avg_hr": 58.0, "resp_rate": 15.0, "avg_hrv": null })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 100);
        assert!(
            body["explanation"]
                .as_str()
                .unwrap()
                .contains("Heart rate component: 100")
        );
    }
}

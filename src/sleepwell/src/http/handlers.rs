use std::{collections::HashMap, sync::Arc};

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
};
use serde::{Deserialize, Serialize};
use sleepwell_types::{NightRecord, ScoreResult, Summary};

use super::{AppError, AppState};

pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Multipart field carrying the export.
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub nights: usize,
    pub observations: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NightsResponse {
    pub nights: Vec<NightRecord>,
}

/// Optional body of `POST /sleep-score`. Null feature values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub features: HashMap<String, Option<f64>>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> HandlerResult<UploadResponse> {
    let mut payload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        if let Some(name) = field.file_name() {
            info!("receiving export `{}`", name);
        }
        payload = Some(
            field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?,
        );
        break;
    }

    let payload = payload.ok_or_else(|| {
        AppError::BadRequest(format!("missing multipart field `{}`", UPLOAD_FIELD))
    })?;

    let session = Arc::clone(&state.session);
    let dataset = tokio::task::spawn_blocking(move || session.ingest(&payload))
        .await
        .map_err(|e| AppError::Internal(format!("ingest task failed: {}", e)))??;

    Ok(Json(UploadResponse {
        message: format!(
            "Parsed {} nights from {} observations",
            dataset.nights.len(),
            dataset.observation_count
        ),
        nights: dataset.nights.len(),
        observations: dataset.observation_count,
    }))
}

pub async fn summary(State(state): State<AppState>) -> HandlerResult<Summary> {
    Ok(Json(state.session.get_summary()?))
}

pub async fn nights(State(state): State<AppState>) -> HandlerResult<NightsResponse> {
    Ok(Json(NightsResponse {
        nights: state.session.nights()?,
    }))
}

pub async fn score(State(state): State<AppState>) -> HandlerResult<ScoreResult> {
    Ok(Json(state.session.get_score(None)?))
}

pub async fn score_with_features(
    State(state): State<AppState>,
    body: Bytes,
) -> HandlerResult<ScoreResult> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ScoreRequest::default()
    } else {
        serde_json::from_slice::<ScoreRequest>(&body)
            .map_err(|e| AppError::BadRequest(format!("invalid score request: {}", e)))?
    };

    let overrides = request
        .features
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect::<HashMap<_, _>>();

    Ok(Json(state.session.get_score(Some(&overrides))?))
}

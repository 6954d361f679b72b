use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::SleepError;

/// JSON body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Sleep(SleepError),
    BadRequest(String),
    Internal(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Sleep(SleepError::UnrecognizedFormat(_)) => {
                (StatusCode::BAD_REQUEST, "UNRECOGNIZED_FORMAT")
            }
            Self::Sleep(SleepError::NoDataUploaded) => (StatusCode::BAD_REQUEST, "NO_DATA_UPLOADED"),
            Self::Sleep(SleepError::NoSleepDataFound) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "NO_SLEEP_DATA_FOUND")
            }
            Self::Sleep(SleepError::InsufficientData { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_DATA")
            }
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let message = match self {
            Self::Sleep(error) => error.to_string(),
            Self::BadRequest(message) | Self::Internal(message) => message,
        };
        if status.is_server_error() {
            error!("{}", message);
        }

        (status, Json(ApiError::new(code, message))).into_response()
    }
}

impl From<SleepError> for AppError {
    fn from(error: SleepError) -> Self {
        Self::Sleep(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_status_codes() {
        let cases = [
            (SleepError::UnrecognizedFormat("x".into()), StatusCode::BAD_REQUEST),
            (SleepError::NoDataUploaded, StatusCode::BAD_REQUEST),
            (SleepError::NoSleepDataFound, StatusCode::UNPROCESSABLE_ENTITY),
            (
                SleepError::InsufficientData { available: 1 },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error).into_response().status(), status);
        }
    }
}

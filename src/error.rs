use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Falta la clave de API de Gemini. Configúrala antes de usar el asistente.")]
    MissingApiKey,

    #[error("La clave de API no es válida. Revisa tu clave e inténtalo de nuevo.")]
    InvalidApiKey,

    #[error("Se ha superado la cuota de la API de IA. Inténtalo más tarde.")]
    QuotaExceeded,

    #[error("AI service error: {0}")]
    AiService(String),

    #[error("Weather service error: {0}")]
    Weather(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

fn status_code_message(err: &AppError) -> (StatusCode, &'static str, String) {
    match err {
        AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        AppError::MissingApiKey => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "MISSING_API_KEY",
            err.to_string(),
        ),
        AppError::InvalidApiKey => (
            StatusCode::UNAUTHORIZED,
            "INVALID_API_KEY",
            err.to_string(),
        ),
        AppError::QuotaExceeded => (
            StatusCode::TOO_MANY_REQUESTS,
            "QUOTA_EXCEEDED",
            err.to_string(),
        ),
        AppError::Validation(msg) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_ERROR",
            msg.clone(),
        ),
        AppError::AiService(msg) => {
            tracing::error!("AI service error: {}", msg);
            (
                StatusCode::BAD_GATEWAY,
                "AI_SERVICE_ERROR",
                "Error de conexión con el asistente de IA".to_string(),
            )
        }
        AppError::Weather(msg) => {
            tracing::error!("Weather service error: {}", msg);
            (
                StatusCode::BAD_GATEWAY,
                "WEATHER_SERVICE_ERROR",
                "No se pudo obtener la previsión meteorológica".to_string(),
            )
        }
        AppError::Database(e) => {
            tracing::error!("Database error: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
            )
        }
        AppError::Request(e) => {
            tracing::error!("HTTP request error: {:?}", e);
            (
                StatusCode::BAD_GATEWAY,
                "EXTERNAL_REQUEST_FAILED",
                "Failed to communicate with external service".to_string(),
            )
        }
        AppError::Internal(e) => {
            tracing::error!("Internal error: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = status_code_message(&self);

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl AppError {
    /// Attach a structured `details` object to the error response. Used by the
    /// assistant routes to tell clients to discard a cached invalid API key.
    pub fn with_details(self, details: serde_json::Value) -> AppErrorWithDetails {
        AppErrorWithDetails {
            error: self,
            details: Some(details),
        }
    }
}

pub struct AppErrorWithDetails {
    error: AppError,
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppErrorWithDetails {
    fn into_response(self) -> Response {
        let (status, code, message) = status_code_message(&self.error);

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details: self.details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AppError> for AppErrorWithDetails {
    fn from(error: AppError) -> Self {
        AppErrorWithDetails {
            error,
            details: None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppErrorWithDetails};
use crate::routes::client_api_key;
use crate::services::gemini::SearchIntent;
use crate::AppState;

/// Router for the AI assistant endpoints. Both proxy to Gemini, so the caller
/// in `main.rs` wraps this router in the assistant rate limiter.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search-intent", post(search_intent))
        .route("/plan", post(generate_plan))
}

#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIntentResponse {
    /// None when the model reply could not be parsed; the client then falls
    /// back to plain text search.
    pub intent: Option<SearchIntent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub plan: String,
}

/// An invalid key gets a `clearStoredKey` hint so the client drops the cached
/// key and prompts for a new one instead of retrying with the bad one.
fn map_assistant_error(error: AppError) -> AppErrorWithDetails {
    match error {
        AppError::InvalidApiKey => AppError::InvalidApiKey
            .with_details(serde_json::json!({ "clearStoredKey": true })),
        other => other.into(),
    }
}

/// Classify a free-text search into a structured filter.
async fn search_intent(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<AssistantRequest>,
) -> Result<Json<SearchIntentResponse>, AppErrorWithDetails> {
    let client_key = client_api_key(&headers);

    let intent = state
        .gemini
        .analyze_search_intent(&request.query, client_key.as_deref())
        .await
        .map_err(map_assistant_error)?;

    Ok(Json(SearchIntentResponse { intent }))
}

/// Generate a markdown trip plan grounded in the catalog.
async fn generate_plan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<AssistantRequest>,
) -> Result<Json<PlanResponse>, AppErrorWithDetails> {
    if request.query.trim().is_empty() {
        return Err(AppError::BadRequest("Empty query".to_string()).into());
    }

    let client_key = client_api_key(&headers);

    // Plans are grounded only in real events; ads add nothing to the context.
    let events: Vec<_> = state
        .catalog
        .events()
        .iter()
        .filter(|e| !e.is_ad())
        .cloned()
        .collect();

    let plan = state
        .gemini
        .generate_plan(&request.query, &events, client_key.as_deref())
        .await
        .map_err(map_assistant_error)?;

    Ok(Json(PlanResponse { plan }))
}

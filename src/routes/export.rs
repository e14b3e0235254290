use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::error::AppResult;
use crate::services::export;
use crate::AppState;

/// Download the full catalog as a CSV attachment tuned for the Spanish Excel
/// locale. Ads ship too; they are rows in the source collection like any other.
pub async fn export_events(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let csv = export::events_to_csv(state.catalog.events());
    let filename = export::export_filename(chrono::Utc::now().date_naive());

    let disposition = format!("attachment; filename=\"{}\"", filename);

    let mut response = csv.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    response.headers_mut().insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    Ok(response)
}

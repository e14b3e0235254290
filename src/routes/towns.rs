use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::catalog::index::{self, TownCount};
use crate::error::AppResult;
use crate::routes::device_id;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_towns))
}

#[derive(Debug, Deserialize)]
pub struct TownsQuery {
    /// Free-text query to pre-narrow the counted events.
    pub q: Option<String>,
}

/// The full town registry ranked by how many events each currently has. Towns
/// without matches keep a zero count so the picker still renders them.
async fn list_towns(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TownsQuery>,
) -> AppResult<Json<Vec<TownCount>>> {
    let device = device_id(&headers);
    let decorated = state
        .engagement
        .decorate(state.catalog.events(), &device)
        .await;

    let needle = query
        .q
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let counted: Vec<_> = decorated
        .into_iter()
        .filter(|item| !item.event.is_ad())
        .filter(|item| match needle.as_deref() {
            Some(q) => {
                item.event.title.to_lowercase().contains(q)
                    || item.event.description.to_lowercase().contains(q)
                    || item.event.town.to_lowercase().contains(q)
            }
            None => true,
        })
        .collect();

    Ok(Json(index::ranked_towns(&counted)))
}

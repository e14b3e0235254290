use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::catalog::share::{self, FragmentUpdate};
use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    /// Raw location fragment, e.g. "#/pueblo/galaroza" or "#/evento/<id>".
    pub fragment: Option<String>,
    /// Legacy share-link params, consulted only when the fragment has no path.
    pub town: Option<String>,
    pub event: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub towns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Canonical fragment for this selection; null means "clear it".
    pub fragment: Option<String>,
}

/// Resolve a deep link into a filter seed. Unresolvable towns or unknown event
/// ids degrade to the plain listing rather than an error, so stale share links
/// keep working.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResolveQuery>,
) -> AppResult<Json<ResolveResponse>> {
    let fragment = query.fragment.unwrap_or_default();

    let seed = share::parse_share_target(
        &fragment,
        query.town.as_deref(),
        query.event.as_deref(),
        &state.catalog,
    );

    let canonical = match share::fragment_for(&seed.towns, seed.event_id.as_deref()) {
        FragmentUpdate::Set(f) => Some(f),
        FragmentUpdate::Clear | FragmentUpdate::Keep => None,
    };

    Ok(Json(ResolveResponse {
        towns: seed.towns,
        event_id: seed.event_id,
        fragment: canonical,
    }))
}

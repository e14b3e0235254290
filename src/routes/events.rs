use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::index::{self, TownCount};
use crate::catalog::model::{EventCategory, EventWithMetrics, FilterState, ListMode, SortBy};
use crate::catalog::{feed, filter};
use crate::error::{AppError, AppResult};
use crate::routes::device_id;
use crate::AppState;

/// Router for the event feed and per-event interactions.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_events))
        .route("/export", get(super::export::export_events))
        .route("/:id", get(get_event))
        .route("/:id/like", post(toggle_like))
        .route("/:id/attend", post(toggle_attend))
        .route("/:id/view", post(record_view))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Free-text search over title, description and town name.
    pub q: Option<String>,
    /// Comma-separated town ids; "all" disables town filtering.
    pub towns: Option<String>,
    /// Comma-separated category display labels.
    pub categories: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sort: Option<SortBy>,
    pub list: Option<ListMode>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub events: Vec<EventWithMetrics>,
    /// Town picker facet for the current result set, count descending.
    pub towns: Vec<TownCount>,
    /// Category options worth offering, canonical order.
    pub categories: Vec<EventCategory>,
    pub meta: ListMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    pub total: usize,
    /// Real events in the catalog, ads excluded; feeds the counter widget.
    pub catalog_total: usize,
    /// Positions after which the client may inject promo banners.
    pub banner_positions: Vec<usize>,
}

fn parse_filter(query: ListQuery) -> AppResult<FilterState> {
    let towns = query
        .towns
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let categories = query
        .categories
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(|label| label.trim())
                .filter(|label| !label.is_empty())
                .map(|label| {
                    EventCategory::from_label(label).ok_or_else(|| {
                        AppError::Validation(format!("Unknown category: {}", label))
                    })
                })
                .collect::<AppResult<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    Ok(FilterState {
        query: query.q.map(|q| q.trim().to_string()).filter(|q| !q.is_empty()),
        towns,
        categories,
        start_date: query.from,
        end_date: query.to,
        sort: query.sort.unwrap_or_default(),
        list: query.list.unwrap_or_default(),
    })
}

/// The filtered, composed event feed plus the facets derived from it.
async fn list_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ListResponse>> {
    let filter_state = parse_filter(query)?;
    let device = device_id(&headers);

    let decorated = state
        .engagement
        .decorate(state.catalog.events(), &device)
        .await;

    let filtered: Vec<EventWithMetrics> = decorated
        .into_iter()
        .filter(|item| filter::matches(item, &filter_state))
        .collect();

    let towns = index::ranked_towns(&filtered);
    let categories = index::available_categories(&filtered, &filter_state.categories);

    let events = feed::compose(filtered, filter_state.sort, state.config.feed.ad_slot_index);

    Ok(Json(ListResponse {
        meta: ListMeta {
            total: events.iter().filter(|e| !e.event.is_ad()).count(),
            catalog_total: state.catalog.content_len(),
            banner_positions: state.config.feed.banner_positions.clone(),
        },
        events,
        towns,
        categories,
    }))
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<EventWithMetrics>> {
    let event = state
        .catalog
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Event not found: {}", id)))?;

    let device = device_id(&headers);
    let item = state.engagement.metrics_for(event, &device).await;

    Ok(Json(item))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub id: String,
    pub new_state: bool,
    pub event: EventWithMetrics,
}

async fn toggle_like(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<ToggleResponse>> {
    let event = state
        .catalog
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Event not found: {}", id)))?;

    let device = device_id(&headers);
    let new_state = state.engagement.toggle_like(&device, &id).await;
    let item = state.engagement.metrics_for(event, &device).await;

    Ok(Json(ToggleResponse {
        id,
        new_state,
        event: item,
    }))
}

async fn toggle_attend(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<ToggleResponse>> {
    let event = state
        .catalog
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Event not found: {}", id)))?;

    let device = device_id(&headers);
    let new_state = state.engagement.toggle_attend(&device, &id).await;
    let item = state.engagement.metrics_for(event, &device).await;

    Ok(Json(ToggleResponse {
        id,
        new_state,
        event: item,
    }))
}

async fn record_view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<Json<ToggleResponse>> {
    let event = state
        .catalog
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Event not found: {}", id)))?;

    let device = device_id(&headers);
    let new_state = state.engagement.record_view(&device, &id).await;
    let item = state.engagement.metrics_for(event, &device).await;

    Ok(Json(ToggleResponse {
        id,
        new_state,
        event: item,
    }))
}

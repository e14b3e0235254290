use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::services::weather::DayForecast;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    /// Town id or display name, any casing.
    pub town: String,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResponse {
    /// None when the town is unknown or the API has no data for that date; the
    /// client simply hides the weather widget.
    pub forecast: Option<DayForecast>,
}

pub async fn forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> AppResult<Json<WeatherResponse>> {
    let forecast = state
        .weather
        .forecast_for_town(&query.town, query.date)
        .await?;

    Ok(Json(WeatherResponse { forecast }))
}

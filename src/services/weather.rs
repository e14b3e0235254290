use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::catalog::towns;
use crate::error::{AppError, AppResult};

/// Client for the Open-Meteo daily forecast API. Keyless, so there is no auth
/// handling here; a failed lookup surfaces as `AppError::Weather`.
#[derive(Debug, Clone)]
pub struct WeatherService {
    client: Client,
    base_url: String,
}

// ============================================================================
// Forecast Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    weathercode: Vec<i32>,
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
    #[serde(default)]
    precipitation_sum: Vec<f64>,
}

/// Daily forecast for a town, with the WMO code already translated for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayForecast {
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub precipitation_sum: f64,
    pub weather_code: i32,
    pub weather_description: String,
    pub weather_icon: String,
}

/// Spanish description and emoji icon for a WMO weather code.
pub fn describe_weather_code(code: i32) -> (&'static str, &'static str) {
    match code {
        0 => ("Cielo despejado", "☀️"),
        1 => ("Mayormente despejado", "🌤️"),
        2 => ("Parcialmente nublado", "⛅"),
        3 => ("Nublado", "☁️"),
        45 | 48 => ("Niebla", "🌫️"),
        51 | 53 | 55 => ("Llovizna", "🌦️"),
        61 => ("Lluvia ligera", "🌧️"),
        63 => ("Lluvia moderada", "🌧️"),
        65 => ("Lluvia fuerte", "🌧️"),
        71 | 73 | 75 => ("Nieve", "❄️"),
        95 => ("Tormenta", "⚡"),
        _ => ("Variable", "🌡️"),
    }
}

impl WeatherService {
    pub fn new(base_url: String) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self { client, base_url })
    }

    /// Forecast for an event day in a given town. Returns None when the town
    /// is unknown or the API has no data for that date, so callers can simply
    /// omit the weather widget.
    pub async fn forecast_for_town(
        &self,
        town_name: &str,
        date: NaiveDate,
    ) -> AppResult<Option<DayForecast>> {
        let Some(town) = towns::resolve(town_name) else {
            return Ok(None);
        };

        let day = date.format("%Y-%m-%d").to_string();
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&daily=weathercode,temperature_2m_max,temperature_2m_min,precipitation_sum&timezone=Europe%2FMadrid&start_date={}&end_date={}",
            self.base_url, town.lat, town.lon, day, day
        );

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Weather(format!(
                "Forecast request failed ({}): {}",
                status, error_text
            )));
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| AppError::Weather(format!("Failed to parse forecast response: {}", e)))?;

        let Some(daily) = body.daily else {
            return Ok(None);
        };
        if daily.time.is_empty() {
            return Ok(None);
        }

        let (code, max, min, precip) = match (
            daily.weathercode.first(),
            daily.temperature_2m_max.first(),
            daily.temperature_2m_min.first(),
            daily.precipitation_sum.first(),
        ) {
            (Some(&c), Some(&max), Some(&min), Some(&p)) => (c, max, min, p),
            _ => return Ok(None),
        };

        let (description, icon) = describe_weather_code(code);

        Ok(Some(DayForecast {
            temperature_max: max,
            temperature_min: min,
            precipitation_sum: precip,
            weather_code: code,
            weather_description: description.to_string(),
            weather_icon: icon.to_string(),
        }))
    }
}

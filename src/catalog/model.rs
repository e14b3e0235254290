use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed category enumeration. The serde names are the Spanish display labels the
/// dataset and the frontend use verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    #[serde(rename = "Pueblo Destacado")]
    PuebloDestacado,
    #[serde(rename = "Belén Viviente")]
    BelenViviente,
    #[serde(rename = "Campanilleros")]
    Campanilleros,
    #[serde(rename = "Cabalgata de Reyes")]
    Cabalgata,
    #[serde(rename = "Fiesta / Zambomba")]
    Fiesta,
    #[serde(rename = "Mercado Navideño")]
    Mercado,
    #[serde(rename = "Feria Gastronómica")]
    FeriaGastronomica,
    #[serde(rename = "Otro")]
    Otro,
}

impl EventCategory {
    pub const ALL: [EventCategory; 8] = [
        EventCategory::PuebloDestacado,
        EventCategory::BelenViviente,
        EventCategory::Campanilleros,
        EventCategory::Cabalgata,
        EventCategory::Fiesta,
        EventCategory::Mercado,
        EventCategory::FeriaGastronomica,
        EventCategory::Otro,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::PuebloDestacado => "Pueblo Destacado",
            EventCategory::BelenViviente => "Belén Viviente",
            EventCategory::Campanilleros => "Campanilleros",
            EventCategory::Cabalgata => "Cabalgata de Reyes",
            EventCategory::Fiesta => "Fiesta / Zambomba",
            EventCategory::Mercado => "Mercado Navideño",
            EventCategory::FeriaGastronomica => "Feria Gastronómica",
            EventCategory::Otro => "Otro",
        }
    }

    /// Tolerant label lookup for values coming back from the AI classifier.
    pub fn from_label(label: &str) -> Option<EventCategory> {
        let needle = label.trim();
        EventCategory::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(needle))
    }
}

/// Explicit variant tag. Advertisements were historically identified by an `ad-`
/// id prefix; the loader migrates that prefix into this tag so nothing downstream
/// inspects id strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    Event,
    Advertisement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Free-text town name, matched against the registry by display name.
    pub town: String,
    /// Start date (inclusive).
    pub date: NaiveDate,
    /// Inclusive end date for multi-day events. Must be >= `date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub category: EventCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_info: Option<String>,
    /// Pre-generated day plan, avoids an AI call per detail view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itinerary: Option<String>,
    #[serde(default)]
    pub sponsored: bool,
    /// Present on pure outbound advertisements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default)]
    pub kind: EventKind,
}

impl Event {
    pub fn is_ad(&self) -> bool {
        self.kind == EventKind::Advertisement
    }
}

/// An event with the derived engagement counters and the device's own flags
/// layered on top. This is what the API serves.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWithMetrics {
    #[serde(flatten)]
    pub event: Event,
    pub views: u32,
    pub likes: u32,
    pub attendees: u32,
    pub is_favorite: bool,
    pub is_attending: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Date,
    Popularity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMode {
    #[default]
    All,
    Favorites,
    Attending,
}

/// Session-scoped filter state. Lives on the client; arrives as query params.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub query: Option<String>,
    /// Selected town ids. The sentinel value "all" disables town filtering.
    pub towns: Vec<String>,
    pub categories: Vec<EventCategory>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort: SortBy,
    pub list: ListMode,
}

use std::env;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub catalog: CatalogConfig,
    pub feed: FeedConfig,
    pub gemini: GeminiConfig,
    pub weather: WeatherConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Path to the JSON event dataset loaded at startup.
    pub events_path: String,
    /// Optional seed pinning the sponsored shuffle, so the feed ordering
    /// survives a restart. Unset means a fresh rotation per process start.
    pub shuffle_seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Index at which the single surviving ad is spliced into the date-mode feed.
    /// Presentation tuning, not an invariant.
    pub ad_slot_index: usize,
    /// Positions after which the client may inject promo banners.
    pub banner_positions: Vec<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// Server-side API key. Clients may also send their own via `X-Api-Key`.
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Allowed requests per second (per IP) for assistant endpoints (e.g. /api/assistant/plan)
    pub assistant_per_second: u32,
    /// Burst size for assistant endpoints
    pub assistant_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
                frontend_url: env::var("FRONTEND_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://data/interactions.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
            catalog: CatalogConfig {
                events_path: env::var("EVENTS_PATH")
                    .unwrap_or_else(|_| "data/events.json".to_string()),
                shuffle_seed: env::var("FEED_SHUFFLE_SEED").ok().and_then(|s| s.parse().ok()),
            },
            feed: FeedConfig {
                ad_slot_index: env::var("FEED_AD_SLOT")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .unwrap_or(3),
                banner_positions: env::var("FEED_BANNER_POSITIONS")
                    .unwrap_or_else(|_| "5,10".to_string())
                    .split(',')
                    .filter_map(|p| p.trim().parse().ok())
                    .collect(),
            },
            gemini: GeminiConfig {
                api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
                model: env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            },
            weather: WeatherConfig {
                base_url: env::var("WEATHER_BASE_URL")
                    .unwrap_or_else(|_| "https://api.open-meteo.com/v1".to_string()),
            },
            rate_limit: RateLimitConfig {
                assistant_per_second: env::var("RATE_LIMIT_ASSISTANT_PER_SECOND")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()
                    .unwrap_or(1),
                assistant_burst: env::var("RATE_LIMIT_ASSISTANT_BURST")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                frontend_url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://data/interactions.db".to_string(),
                max_connections: 5,
            },
            catalog: CatalogConfig {
                events_path: "data/events.json".to_string(),
                shuffle_seed: None,
            },
            feed: FeedConfig {
                ad_slot_index: 3,
                banner_positions: vec![5, 10],
            },
            gemini: GeminiConfig {
                api_key: None,
                model: "gemini-2.5-flash".to_string(),
            },
            weather: WeatherConfig {
                base_url: "https://api.open-meteo.com/v1".to_string(),
            },
            rate_limit: RateLimitConfig {
                assistant_per_second: 1,
                assistant_burst: 5,
            },
        }
    }
}

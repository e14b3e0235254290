use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
mod middleware;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use axum::body::Body;
use http::{HeaderValue, StatusCode};
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::{GovernorError, GovernorLayer};

mod catalog;
mod config;
mod db;
mod error;
mod routes;
mod services;

use catalog::Catalog;
use config::Config;
use services::{
    engagement::EngagementService, gemini::GeminiService, init, weather::WeatherService,
};

pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
    pub engagement: EngagementService,
    pub gemini: GeminiService,
    pub weather: WeatherService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sierra_agenda=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Sierra Agenda Service");

    // Initialize database
    let pool = init::init_db(&config).await?;

    // Load the event dataset and build the feed snapshot
    let catalog = init::init_catalog(&config)?;

    // Initialize services
    let engagement = EngagementService::new(pool);
    let gemini = GeminiService::new(config.gemini.model.clone(), config.gemini.api_key.clone())?;
    let weather = WeatherService::new(config.weather.base_url.clone())?;

    let app_state = Arc::new(AppState {
        config: config.clone(),
        catalog,
        engagement,
        gemini,
        weather,
    });

    // Shutdown flag for the std cleanup thread
    let thread_shutdown = Arc::new(AtomicBool::new(false));

    // Build the assistant rate limiter with a custom error handler. The error
    // handler returns a proper 429 status and Retry-After header when limits
    // are exceeded, in the same `{error:{code,message}}` shape as `AppError`.
    let mut assistant_builder = GovernorConfigBuilder::default();
    assistant_builder.per_second(config.rate_limit.assistant_per_second.into());
    assistant_builder.burst_size(config.rate_limit.assistant_burst);
    assistant_builder.key_extractor(SmartIpKeyExtractor);
    assistant_builder.error_handler(|error: GovernorError| -> http::Response<Body> {
        match error {
            GovernorError::TooManyRequests { wait_time, headers } => {
                // `wait_time` is provided as seconds
                let retry_after = wait_time;

                let body = serde_json::json!({
                    "error": {
                        "code": "RATE_LIMITED",
                        "message": "Rate limit exceeded",
                        "details": { "retry_after_seconds": retry_after }
                    }
                })
                .to_string();

                let mut resp = http::Response::new(Body::from(body));
                *resp.status_mut() = StatusCode::TOO_MANY_REQUESTS;

                // Ensure clients see JSON
                resp.headers_mut().insert(
                    http::header::CONTENT_TYPE,
                    http::HeaderValue::from_static("application/json"),
                );

                // Include any headers provided by the governor (e.g., X-RateLimit-* if enabled)
                if let Some(hmap) = headers {
                    for (name, value) in hmap.iter() {
                        resp.headers_mut().append(name.clone(), value.clone());
                    }
                }

                // Retry-After (seconds)
                if let Ok(value) = http::HeaderValue::from_str(&retry_after.to_string()) {
                    resp.headers_mut().insert(http::header::RETRY_AFTER, value);
                }

                resp
            }
            GovernorError::UnableToExtractKey => {
                let body = serde_json::json!({
                    "error": {
                        "code": "INVALID_REQUEST",
                        "message": "Unable to determine client IP for rate limiting"
                    }
                })
                .to_string();

                let mut resp = http::Response::new(Body::from(body));
                *resp.status_mut() = StatusCode::BAD_REQUEST;
                resp.headers_mut().insert(
                    http::header::CONTENT_TYPE,
                    http::HeaderValue::from_static("application/json"),
                );
                resp
            }
            GovernorError::Other { code, msg, headers } => {
                let body = msg.unwrap_or_else(|| "Rate limiting error".to_string());
                let mut resp = http::Response::new(Body::from(body));
                let status = StatusCode::from_u16(code.as_u16())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                *resp.status_mut() = status;
                if let Some(hmap) = headers {
                    for (name, value) in hmap.iter() {
                        resp.headers_mut().append(name.clone(), value.clone());
                    }
                }
                resp
            }
        }
    });

    let assistant_gov_conf = Arc::new(
        assistant_builder
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Failed to build assistant governor config"))?,
    );

    // Background cleanup for the assistant limiter storage
    let assistant_cleaner = {
        let limiter = assistant_gov_conf.limiter().clone();
        let interval = Duration::from_secs(60);
        let flag = thread_shutdown.clone();
        std::thread::spawn(move || {
            // Use smaller sleep granularity to allow quick shutdown.
            let tick = Duration::from_secs(1);
            loop {
                for _ in 0..interval.as_secs() {
                    if flag.load(Ordering::SeqCst) {
                        tracing::info!("Assistant rate limiter cleanup thread exiting");
                        return;
                    }
                    std::thread::sleep(tick);
                }
                tracing::debug!("assistant rate limiter size: {}", limiter.len());
                limiter.retain_recent();
            }
        })
    };

    let assistant_rate_layer = GovernorLayer {
        config: assistant_gov_conf.clone(),
    };

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))
        // Event feed, detail and per-device interactions (includes /export)
        .nest("/api/events", routes::events::router())
        // Town registry with per-town event counts
        .nest("/api/towns", routes::towns::router())
        // Deep-link resolution for share links
        .route("/api/share/resolve", get(routes::share::resolve))
        // Weather forecast proxy
        .route("/api/weather", get(routes::weather::forecast))
        // AI assistant endpoints (rate limited; they proxy to Gemini)
        .nest(
            "/api/assistant",
            routes::assistant::router().layer(assistant_rate_layer),
        )
        // Add shared state
        .with_state(app_state.clone())
        // CSP middleware: set Content-Security-Policy headers
        .layer(axum::middleware::from_fn(middleware::csp::csp_middleware))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(
                    config
                        .server
                        .frontend_url
                        .parse::<HeaderValue>()
                        .map_err(|_| anyhow::anyhow!("Invalid FRONTEND_URL for CORS"))?,
                )
                .allow_methods([http::Method::GET, http::Method::POST, http::Method::OPTIONS])
                .allow_headers([
                    http::header::CONTENT_TYPE,
                    http::header::ACCEPT,
                    http::HeaderName::from_static("x-device-id"),
                    http::HeaderName::from_static("x-api-key"),
                ]),
        );

    // Start server
    let host = config.server.host.clone();
    let port = config.server.port;
    let addr = format!("{}:{}", host, port);

    tracing::info!("Server listening on {}", addr);

    // Start server using the axum `serve` helper, selecting between the server
    // future and a signal listener. When a shutdown signal arrives we notify
    // the cleanup thread and drop the server future (which stops accepting new
    // connections).
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let server_fut = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );

    let thread_shutdown_clone = thread_shutdown.clone();

    let signal_fut = async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut term =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("Failed to bind SIGTERM");
            tokio::select! {
                _ = ctrl_c => {},
                _ = term.recv() => {},
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.expect("Failed to bind Ctrl+C");
        }

        tracing::info!("Shutdown signal received, notifying cleanup thread");
        thread_shutdown_clone.store(true, Ordering::SeqCst);
    };

    tokio::select! {
        res = server_fut => {
            if let Err(e) = res {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = signal_fut => {
            tracing::info!("Signal handler completed; server future dropped to stop accepting new connections");
        }
    }

    // Join the std cleanup thread; it checks `thread_shutdown` and exits quickly.
    if let Err(e) = assistant_cleaner.join() {
        tracing::warn!("Assistant cleanup thread join failed: {:?}", e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

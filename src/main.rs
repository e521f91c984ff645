use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use lead_qualifier::config::Settings;
use lead_qualifier::routes::{self, AppState};
use lead_qualifier::services::{CachedDetails, GooglePlacesClient, HttpProber};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(settings: Option<&Settings>) {
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .or_else(|| settings.map(|s| s.logging.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT")
        .ok()
        .or_else(|| settings.map(|s| s.logging.format.clone()))
        .unwrap_or_else(|| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Received shutdown signal, cancelling in-flight analyses");
}

fn to_io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration before logging so it can supply the log level
    let settings = Settings::load();
    init_logging(settings.as_ref().ok());

    info!("Starting lead qualification service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        to_io_error(e)
    })?;

    info!("Configuration loaded successfully");

    if settings.google.api_key.is_empty() {
        error!("No Google Maps API key configured; set GOOGLE_MAPS_API_KEY");
    }

    let google = Arc::new(
        GooglePlacesClient::new(
            settings.google.base_url.clone(),
            settings.google.api_key.clone(),
            settings.google.timeout_secs,
            settings.google.page_token_delay(),
        )
        .map_err(to_io_error)?,
    );

    info!("Google Places client initialized ({})", settings.google.base_url);

    let details = Arc::new(CachedDetails::new(
        google.clone(),
        settings.cache.details_capacity,
        Duration::from_secs(settings.cache.details_ttl_secs),
    ));

    info!(
        "Details cache initialized ({} entries, TTL: {}s)",
        settings.cache.details_capacity, settings.cache.details_ttl_secs
    );

    let prober = Arc::new(HttpProber::new(settings.pipeline.probe_timeout()).map_err(to_io_error)?);

    info!("Grading with weights: {:?}", settings.scoring.weights);

    let shutdown = CancellationToken::new();

    // Build application state
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    let app_state = AppState {
        google,
        details,
        prober,
        settings: Arc::new(settings),
        shutdown: shutdown.clone(),
    };

    info!("Starting HTTP server on {}:{}", host, port);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .disable_signals()
    .bind((host, port))?
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.cancel();
        handle.stop(true).await;
    });

    server.await
}

use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use flightbook::config::AppConfig;
use flightbook::db;
use flightbook::handlers;
use flightbook::services::dialog::BookingDialog;
use flightbook::services::nlu::luis::LuisRecognizer;
use flightbook::services::nlu::Recognizer;
use flightbook::services::telemetry;
use flightbook::state::{AppState, TurnLocks};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => eprintln!(".env found at {}", path.display()),
        Err(_) => eprintln!(".env not found"),
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let recognizer: Option<Box<dyn Recognizer>> = if config.luis_configured() {
        tracing::info!("using LUIS recognizer (host: {})", config.luis_api_host_name);
        Some(Box::new(LuisRecognizer::new(
            config.luis_app_id.clone(),
            config.luis_api_key.clone(),
            config.luis_api_host_name.clone(),
        )))
    } else {
        tracing::warn!("LUIS is not configured, intents will not be recognized");
        None
    };

    let telemetry = telemetry::from_config(&config)?;
    let booking_dialog = BookingDialog::new(config.booking_dialog_id.clone(), telemetry);

    if config.auth_enabled() {
        tracing::info!(app_id = %config.app_id, "bearer authentication enabled");
    } else {
        tracing::warn!("MicrosoftAppPassword not set, message endpoint is unauthenticated");
    }

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        recognizer,
        booking_dialog,
        turn_locks: TurnLocks::default(),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/messages", post(handlers::messages::post_message))
        .route(
            "/api/conversations/:id",
            get(handlers::conversations::get_conversation)
                .delete(handlers::conversations::delete_conversation),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

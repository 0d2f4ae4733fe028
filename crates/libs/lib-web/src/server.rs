//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.

// region: --- Imports
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use lib_core::{config, create_pool, Config, DbPool};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::handlers;
use crate::middleware::{log_requests, require_auth, stamp_req};
use crate::presence::PresenceRegistry;
use crate::services::{
    AiChatService, AssetStore, BrevoMailer, ChatService, CloudinaryStore, GeminiClient, Mailer,
};
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub presence: Arc<PresenceRegistry>,
    pub chat: Arc<ChatService>,
    pub ai: Arc<AiChatService>,
    pub assets: Arc<dyn AssetStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl axum::extract::FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration.
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:5001")
    pub bind_address: String,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
    /// Database migrations path
    pub migrations_path: &'static str,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5001".to_string(),
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            migrations_path: "./migrations",
        }
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Initialize and start the HTTP server.
///
/// # Errors
///
/// Returns an error if configuration loading, database setup, collaborator
/// construction, or server binding fails.
pub async fn start_server(server_config: ServerConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    dotenvy::dotenv().ok();

    info!("Loading configuration...");
    config::init_config().map_err(|e| anyhow::anyhow!(e))?;
    let app_config = config::core_config().clone();

    // Ensure the data directory exists for a SQLite database file.
    if let Some(db_path) = app_config.database_url.strip_prefix("sqlite:") {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!("Created database directory: {:?}", parent);
            }
        }
    }

    info!("Connecting to database...");
    let pool = create_pool().await?;

    info!("Running database migrations from: {}", server_config.migrations_path);
    let migrator =
        sqlx::migrate::Migrator::new(std::path::Path::new(server_config.migrations_path)).await?;
    migrator.run(&pool).await?;
    info!("Migrations complete");

    info!("Connecting external collaborators...");
    let assets: Arc<dyn AssetStore> = Arc::new(CloudinaryStore::from_env()?);
    let mailer: Arc<dyn Mailer> = Arc::new(BrevoMailer::from_env()?);
    let generator = Arc::new(GeminiClient::from_env()?);

    let presence = Arc::new(PresenceRegistry::new());
    let chat = Arc::new(ChatService::new(
        pool.clone(),
        presence.clone(),
        assets.clone(),
    ));
    let ai = Arc::new(AiChatService::new(
        pool.clone(),
        presence.clone(),
        assets.clone(),
        generator,
    ));

    let state = AppState {
        db: pool,
        config: app_config,
        presence,
        chat,
        ai,
        assets,
        mailer,
    };

    let app = create_router(state, server_config.allowed_origins.clone());

    let listener = tokio::net::TcpListener::bind(&server_config.bind_address).await?;

    info!("SERVER READY: http://{}", server_config.bind_address);
    log_server_info();

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the main application router with all routes.
fn create_router(state: AppState, allowed_origins: Vec<String>) -> Router {
    use axum::http::{HeaderValue, Method};

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ]);

    // Routes that require a verified session.
    let protected = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/check", get(handlers::auth::check))
        .route("/api/auth/update-profile", put(handlers::auth::update_profile))
        .route("/api/chat/users", get(handlers::chat::get_contacts))
        .route("/api/chat/send/{id}", post(handlers::chat::send_message))
        .route("/api/chat/messages/{id}", delete(handlers::chat::delete_message))
        .route("/api/chat/{id}", get(handlers::chat::get_messages))
        .route("/api/aichat/ai", post(handlers::ai::ask_ai))
        .route("/api/aichat/history", get(handlers::ai::get_history))
        .route_layer(axum::middleware::from_fn(require_auth));

    Router::new()
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route(
            "/api/auth/verify-password",
            post(handlers::auth::verify_password_and_send_otp),
        )
        .route("/api/auth/verify-otp", post(handlers::auth::verify_otp))
        // The delivery channel authenticates itself via its token parameter.
        .route("/ws", get(handlers::ws::channel_connect))
        .route("/health", get(|| async { "OK" }))
        .merge(protected)
        .fallback(|| async { (axum::http::StatusCode::NOT_FOUND, "Route not found") })
        .with_state(state)
        // Request/response logging
        .layer(axum::middleware::from_fn(log_requests))
        // Request stamping wraps logging so the request ID is already set
        .layer(axum::middleware::from_fn(stamp_req))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
}

/// Log server information.
fn log_server_info() {
    info!("AUTH:");
    info!("   • POST /api/auth/signup");
    info!("   • POST /api/auth/verify-password");
    info!("   • POST /api/auth/verify-otp");
    info!("   • POST /api/auth/logout");
    info!("   • GET  /api/auth/check");
    info!("   • PUT  /api/auth/update-profile");
    info!("CHAT:");
    info!("   • GET    /api/chat/users");
    info!("   • GET    /api/chat/{{id}}");
    info!("   • POST   /api/chat/send/{{id}}");
    info!("   • DELETE /api/chat/messages/{{id}}");
    info!("AI CHAT:");
    info!("   • POST /api/aichat/ai");
    info!("   • GET  /api/aichat/history");
    info!("PUSH:");
    info!("   • GET  /ws?token={{session token}}");
    info!("HEALTH:");
    info!("   • GET  /health");
}
// endregion: --- Server Setup

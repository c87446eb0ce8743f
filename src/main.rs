//! Postboard Server
//!
//! A small users/posts HTTP service backed by embedded SQLite. Users are
//! created with a salted argon2 password hash and can be verified against it;
//! posts carry a free-form color label and an owning user id.

mod handlers;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use services::PasswordService;
use storage::Database;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub passwords: Arc<PasswordService>,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Postboard Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = load_config()
        .await
        .context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, db={}",
        config.bind_address, config.database_path
    );

    info!("Initializing SQLite database...");
    let db = Arc::new(
        Database::new(&config.database_path)
            .await
            .context("Failed to initialize database")?,
    );

    let state = AppState {
        db,
        passwords: Arc::new(PasswordService::new()),
    };

    let app = Router::new()
        .route("/health", get(handlers::health))
        .nest("/users", user_routes())
        .nest("/posts", post_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/post", post(handlers::users::create))
        .route("/get", get(handlers::users::list))
        .route("/get/by_id/:id", get(handlers::users::get_by_id))
        .route(
            "/get/by_username/:username",
            get(handlers::users::get_by_username),
        )
        .route("/verification", post(handlers::users::verify))
        .route(
            "/posts/by_user_id/:user_id",
            get(handlers::users::posts_by_user_id),
        )
        .route(
            "/posts/by_username/:username",
            get(handlers::users::posts_by_username),
        )
}

fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/post", post(handlers::posts::create))
        .route("/get", get(handlers::posts::list))
        .route("/get/:id", get(handlers::posts::get_by_id))
}

#[derive(Debug, Clone)]
struct Config {
    bind_address: String,
    database_path: String,
}

async fn load_config() -> Result<Config> {
    let data_dir = std::env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data"));

    if let Err(e) = tokio::fs::create_dir_all(&data_dir).await {
        return Err(anyhow::anyhow!(
            "Failed to create data directory {}: {}",
            data_dir.display(),
            e
        ));
    }

    let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
        let path = data_dir.join("postboard.db");
        path.to_string_lossy().to_string()
    });

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    Ok(Config {
        bind_address,
        database_path,
    })
}

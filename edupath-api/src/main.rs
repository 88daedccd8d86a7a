//! edupath-api - career guidance backend service
//!
//! Startup: tracing, build identification, configuration, database (plus
//! optional reference data seeding), recommendation assets, HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use edupath_common::config::{ConfigOverrides, TomlConfig};
use edupath_common::db::init::init_database;
use edupath_common::db::seed::{load_seed_file, seed_reference_data};
use edupath_api::auth::{FirebaseVerifier, SessionIssuer};
use edupath_api::gateway::{
    RecommendationGateway, ReferenceMatrix, VertexPredictionClient, WordPieceTokenizer,
};
use edupath_api::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for edupath-api
#[derive(Parser, Debug)]
#[command(name = "edupath-api")]
#[command(about = "EduPath career guidance backend")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "EDUPATH_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "EDUPATH_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "EDUPATH_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "EDUPATH_PORT")]
    port: Option<u16>,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "EDUPATH_LOG_LEVEL")]
    log_level: Option<String>,

    /// HS256 secret for session tokens
    #[arg(long, env = "EDUPATH_SESSION_SECRET", hide_env_values = true)]
    session_secret: Option<String>,

    /// Bearer token for the prediction endpoints
    #[arg(long, env = "EDUPATH_PREDICTION_TOKEN", hide_env_values = true)]
    prediction_token: Option<String>,

    /// JSON reference data to load at startup
    #[arg(long, env = "EDUPATH_SEED_FILE")]
    seed_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_path: self.database.clone(),
            host: self.host.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
            session_secret: self.session_secret.clone(),
            seed_file: self.seed_file.clone(),
            prediction_access_token: self.prediction_token.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing so the file's log level applies; loading
    // problems are reported once the subscriber is up
    let loaded = TomlConfig::load(args.config.as_deref());
    let log_level = args
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.logging.level.clone()))
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any slow startup work
    info!(
        "Starting EduPath API (edupath-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = loaded
        .context("Failed to load configuration")?
        .with_overrides(args.overrides());
    config.validate().context("Invalid configuration")?;

    info!("Database path: {}", config.database_path.display());
    let db = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    if let Some(seed_path) = &config.seed_file {
        let data = load_seed_file(seed_path).context("Failed to load seed file")?;
        seed_reference_data(&db, &data)
            .await
            .context("Failed to seed reference data")?;
    }

    let tokenizer = WordPieceTokenizer::from_file(
        &config.prediction.tokenizer_vocab,
        config.prediction.max_len,
        config.prediction.lowercase,
    )
    .context("Failed to load tokenizer")?;
    let reference = ReferenceMatrix::from_file(&config.prediction.reference_matrix)
        .context("Failed to load reference matrix")?;
    let predictor = VertexPredictionClient::new(&config.prediction, tokenizer)
        .context("Failed to create prediction client")?;
    let gateway = RecommendationGateway::new(
        Arc::new(predictor),
        reference,
        config.prediction.top_k,
        config.prediction.text_top_k,
    );

    let identity = FirebaseVerifier::new(config.identity.clone())
        .context("Failed to create identity verifier")?;
    let sessions = SessionIssuer::new(&config.session.secret, config.session.ttl_minutes)
        .context("Failed to create session issuer")?;

    let state = AppState::new(db, sessions, Arc::new(identity), gateway);
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("edupath-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

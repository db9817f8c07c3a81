use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Config file first; when it is missing or unusable, defaults plus env vars.
pub fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            warn!(error = %e, "config file not usable, falling back to environment");
            let mut cfg = AppConfig::default();
            cfg.normalize_and_validate()
                .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
            Ok(cfg)
        }
    }
}

/// Directory holding a file-backed sqlite database, if that is what `url` names.
fn sqlite_data_dir(url: &str) -> Option<String> {
    let path = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    std::path::Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .filter(|p| !p.is_empty())
}

/// Connects, migrates and wires the router.
pub async fn build_app(cfg: &AppConfig) -> Result<(Router, DatabaseConnection), StartupError> {
    if let Some(dir) = sqlite_data_dir(&cfg.database.url) {
        common::env::ensure_env(&dir).await?;
    }
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Database(format!("migrations failed: {e}")))?;
    let state = AppState::new(db.clone(), cfg.planner);
    Ok((routes::build_router(state, build_cors()), db))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> Result<(), StartupError> {
    dotenv().ok();
    common::utils::logging::init_from_env();

    let cfg = load_config()?;
    let (app, _db) = build_app(&cfg).await?;

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Any(e.into()))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Any(e.into()))?;
    info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::sqlite_data_dir;

    #[test]
    fn sqlite_dir_only_for_file_urls() {
        assert_eq!(sqlite_data_dir("sqlite://data/app.db?mode=rwc").as_deref(), Some("data"));
        assert_eq!(sqlite_data_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_data_dir("sqlite://app.db"), None);
        assert_eq!(sqlite_data_dir("postgres://localhost/db"), None);
    }
}

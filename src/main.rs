use anyhow::Context;

use crate::config::Config;
use crate::db::Database;
use crate::model::AppState;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod handlers;
pub mod model;
pub mod scan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cfg = Config::from_env();
    let db = Database::open(&cfg.db_path)
        .with_context(|| format!("failed to open database at {}", cfg.db_path))?;

    let admin_hash = auth::hash_password(&cfg.admin_password)?;
    if db.bootstrap_admin(&admin_hash)? {
        log::info!("created default admin account");
        if cfg.admin_password_is_default {
            log::warn!(
                "admin account uses the default password; set PANTRY_ADMIN_PASSWORD and rotate it"
            );
        }
    }

    let state = AppState {
        db,
        sessions: auth::Sessions::new(),
    };
    let app = handlers::router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;
    log::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

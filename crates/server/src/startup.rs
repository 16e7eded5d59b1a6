use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::AppConfig;
use service::auth::{
    otp::{gateway_from_settings, OtpConfig, OtpManager},
    repo::SeaOrmAuthRepository,
    repository::AuthRepository,
    service::{AuthConfig, AuthService},
};
use service::runtime;

use crate::errors::StartupError;
use crate::routes::{self, auth};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address: {e}")))
}

/// Public entry: load configuration, connect, migrate if asked, then serve.
pub async fn run() -> Result<(), StartupError> {
    dotenv().ok();
    let cfg = AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    runtime::ensure_env(&cfg.uploads.dir)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.auto_migrate {
        migration::Migrator::up(&db, None).await.map_err(anyhow::Error::from)?;
        info!("migrations applied");
    }

    let repo: Arc<dyn AuthRepository> = Arc::new(SeaOrmAuthRepository::new(db.clone()));
    let gateway = gateway_from_settings(&cfg.otp.sms).map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let otp = OtpManager::new(OtpConfig::from(&cfg.otp), gateway);
    let auth_svc = Arc::new(AuthService::new(repo, AuthConfig::from_app(&cfg), otp));

    let state = auth::ServerState { db, auth: auth_svc };
    let app: Router = routes::build_router(state, build_cors(), &cfg.uploads);

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting car wash api");
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    axum::serve(listener, app).await.map_err(anyhow::Error::from)?;
    Ok(())
}

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use users::{
    AppState,
    config::ServerConfig,
    create_router,
    jwt::{JwtConfig, JwtService},
    repositories::{InMemoryUserRepository, PgUserRepository, UserStore},
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting users service");

    let server_config = ServerConfig::load()?;
    let jwt_service = JwtService::new(JwtConfig::from_env()?);

    let store: Arc<dyn UserStore> = if std::env::var("DATABASE_URL").is_ok() {
        let db_config = DatabaseConfig::from_env()?;
        let pool = init_pool(&db_config).await?;

        if !health_check(&pool).await? {
            anyhow::bail!("Failed to connect to database");
        }
        run_migrations(&pool, &MIGRATOR).await?;

        Arc::new(PgUserRepository::new(pool))
    } else {
        warn!("DATABASE_URL not set, keeping users in memory");
        Arc::new(InMemoryUserRepository::new())
    };

    let app = create_router(AppState::new(store, jwt_service));

    let addr = server_config.addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Users service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;
use yatube_auth::Authenticator;
use yatube_config::AppConfig;
use yatube_database::initialize_database;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        tokio::fs::create_dir_all(&config.blog.media_root)
            .await
            .with_context(|| {
                format!("failed to create media root {}", config.blog.media_root)
            })?;

        let authenticator = Authenticator::new(db_pool.clone(), &config.auth);

        info!(
            database = %config.database.url,
            media_root = %config.blog.media_root,
            "backend services ready"
        );

        Ok(Self {
            db_pool,
            authenticator,
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

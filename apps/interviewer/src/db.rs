use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

/// Connects to PostgreSQL once at startup.
///
/// Returns `None` when no URL is configured or the connection fails; the
/// persistence gateway then stays disabled for the process lifetime.
pub async fn create_pool(database_url: Option<&str>) -> Option<PgPool> {
    let Some(database_url) = database_url else {
        warn!("DATABASE_URL not configured; interview persistence is disabled");
        return None;
    };

    info!("Connecting to PostgreSQL...");

    match PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
    {
        Ok(pool) => {
            info!("PostgreSQL connection pool established");
            Some(pool)
        }
        Err(e) => {
            warn!("PostgreSQL connection failed ({e}); interview persistence is disabled");
            None
        }
    }
}

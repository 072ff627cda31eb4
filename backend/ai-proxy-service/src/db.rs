use db_pool::{create_pool, DbConfig};
use sqlx::{Pool, Postgres};

/// The chat service owns the schema and its migrations; the proxy connects
/// to the same database with a smaller pool.
pub async fn init_pool(database_url: &str) -> Result<Pool<Postgres>, sqlx::Error> {
    let mut cfg = DbConfig::for_service("ai-proxy-service");
    if !database_url.is_empty() {
        cfg.database_url = database_url.to_string();
    }
    cfg.log_config();
    create_pool(cfg).await
}

use db_pool::{create_pool, DbConfig};
use sqlx::migrate::Migrator;
use sqlx::{Pool, Postgres};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_pool(database_url: &str) -> Result<Pool<Postgres>, sqlx::Error> {
    let mut cfg = DbConfig::for_service("chat-service");
    if !database_url.is_empty() {
        cfg.database_url = database_url.to_string();
    }
    cfg.log_config();
    create_pool(cfg).await
}

/// Run embedded migrations. Failures are fatal at startup.
pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

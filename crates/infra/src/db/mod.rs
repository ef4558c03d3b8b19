use sqlx::PgPool;

pub type Db = PgPool;

pub async fn connect(database_url: &str) -> Result<Db, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    tracing::info!("connected to Postgres");
    Ok(pool)
}

/// Apply the schema, including the partial unique index that enforces
/// booking exclusivity at commit time.
pub async fn migrate(pool: &Db) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub async fn ping(pool: &Db) -> Result<(), sqlx::Error> {
    let _: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

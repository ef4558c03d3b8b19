use async_trait::async_trait;
use uuid::Uuid;

use engine::models::Studio;
use engine::store::{StoreResult, StudioStore};

use crate::db::Db;
use crate::models::StudioRow;
use crate::repos::store_err;

const COLUMNS: &str = "id, name, address, admin_id, created_at, updated_at";

#[derive(Clone)]
pub struct StudioRepo {
    pool: Db,
}

impl StudioRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudioStore for StudioRepo {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Studio>> {
        let row = sqlx::query_as::<_, StudioRow>(&format!(
            "SELECT {COLUMNS} FROM studios WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn find_all(&self) -> StoreResult<Vec<Studio>> {
        let rows = sqlx::query_as::<_, StudioRow>(&format!(
            "SELECT {COLUMNS} FROM studios ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn exists_by_name(&self, name: &str) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM studios WHERE name = $1)")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)
    }

    async fn save(&self, studio: &Studio) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO studios (id, name, address, admin_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                address = EXCLUDED.address,
                admin_id = EXCLUDED.admin_id,
                updated_at = NOW()
            "#,
        )
        .bind(studio.id)
        .bind(&studio.name)
        .bind(&studio.address)
        .bind(studio.admin_id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM studios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}

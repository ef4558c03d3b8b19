use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use engine::models::TimeSlot;
use engine::store::{StoreResult, TimeSlotStore};

use crate::db::Db;
use crate::models::TimeSlotRow;
use crate::repos::store_err;

const COLUMNS: &str =
    "id, studio_id, date, start_time, end_time, available, trial, created_at, updated_at";

#[derive(Clone)]
pub struct TimeSlotRepo {
    pool: Db,
}

impl TimeSlotRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeSlotStore for TimeSlotRepo {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<TimeSlot>> {
        let row = sqlx::query_as::<_, TimeSlotRow>(&format!(
            "SELECT {COLUMNS} FROM time_slots WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(row.map(Into::into))
    }

    async fn exists_overlap(
        &self,
        studio_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        exclude: Option<Uuid>,
    ) -> StoreResult<bool> {
        // Half-open interval test; back-to-back slots do not collide.
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM time_slots
                WHERE studio_id = $1
                  AND date = $2
                  AND ($5::uuid IS NULL OR id <> $5)
                  AND start_time < $4
                  AND end_time > $3
            )
            "#,
        )
        .bind(studio_id)
        .bind(date)
        .bind(start)
        .bind(end)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn find_by_studio(&self, studio_id: Uuid) -> StoreResult<Vec<TimeSlot>> {
        let rows = sqlx::query_as::<_, TimeSlotRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM time_slots
            WHERE studio_id = $1
            ORDER BY date ASC, start_time ASC
            "#
        ))
        .bind(studio_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_studio_and_date(
        &self,
        studio_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<TimeSlot>> {
        let rows = sqlx::query_as::<_, TimeSlotRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM time_slots
            WHERE studio_id = $1 AND date = $2
            ORDER BY start_time ASC
            "#
        ))
        .bind(studio_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_studio_and_date_range(
        &self,
        studio_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        available: Option<bool>,
    ) -> StoreResult<Vec<TimeSlot>> {
        let rows = sqlx::query_as::<_, TimeSlotRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM time_slots
            WHERE studio_id = $1
              AND date BETWEEN $2 AND $3
              AND ($4::boolean IS NULL OR available = $4)
            ORDER BY date ASC, start_time ASC
            "#
        ))
        .bind(studio_id)
        .bind(start)
        .bind(end)
        .bind(available)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn save(&self, slot: &TimeSlot) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO time_slots (id, studio_id, date, start_time, end_time, available, trial)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                date = EXCLUDED.date,
                start_time = EXCLUDED.start_time,
                end_time = EXCLUDED.end_time,
                available = EXCLUDED.available,
                trial = EXCLUDED.trial,
                updated_at = NOW()
            "#,
        )
        .bind(slot.id)
        .bind(slot.studio_id)
        .bind(slot.date)
        .bind(slot.start_time)
        .bind(slot.end_time)
        .bind(slot.available)
        .bind(slot.trial)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM time_slots WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}

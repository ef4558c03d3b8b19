use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use engine::models::{Booking, BookingStatus, TimeSlot};
use engine::store::{BookingStore, StoreResult};

use crate::db::Db;
use crate::models::BookingRow;
use crate::repos::{corrupt_row, store_err};

const COLUMNS: &str = "id, user_id, time_slot_id, status, created_at, updated_at";

#[derive(Clone)]
pub struct BookingRepo {
    pool: Db,
}

impl BookingRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

fn into_bookings(rows: Vec<BookingRow>) -> StoreResult<Vec<Booking>> {
    rows.into_iter()
        .map(|r| Booking::try_from(r).map_err(corrupt_row))
        .collect()
}

#[async_trait]
impl BookingStore for BookingRepo {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.map(|r| Booking::try_from(r).map_err(corrupt_row))
            .transpose()
    }

    async fn find_all(&self) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {COLUMNS} FROM bookings ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        into_bookings(rows)
    }

    async fn find_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM bookings
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        into_bookings(rows)
    }

    async fn find_by_date_and_status_not(
        &self,
        date: NaiveDate,
        status: BookingStatus,
    ) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT b.id, b.user_id, b.time_slot_id, b.status, b.created_at, b.updated_at
            FROM bookings b
            JOIN time_slots t ON t.id = b.time_slot_id
            WHERE t.date = $1 AND b.status <> $2
            "#,
        )
        .bind(date)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        into_bookings(rows)
    }

    async fn find_by_date_and_status(
        &self,
        date: NaiveDate,
        status: BookingStatus,
    ) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT b.id, b.user_id, b.time_slot_id, b.status, b.created_at, b.updated_at
            FROM bookings b
            JOIN time_slots t ON t.id = b.time_slot_id
            WHERE t.date = $1 AND b.status = $2
            "#,
        )
        .bind(date)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        into_bookings(rows)
    }

    async fn exists_by_slot_and_status_not(
        &self,
        time_slot_id: Uuid,
        status: BookingStatus,
        exclude_booking: Option<Uuid>,
    ) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE time_slot_id = $1
                  AND status <> $2
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(time_slot_id)
        .bind(status.as_str())
        .bind(exclude_booking)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn exists_trial_booking_after(
        &self,
        user_id: Uuid,
        cutoff: NaiveDate,
    ) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings b
                JOIN time_slots t ON t.id = b.time_slot_id
                WHERE b.user_id = $1 AND t.trial AND t.date > $2
            )
            "#,
        )
        .bind(user_id)
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn exists_by_user_and_status_not(
        &self,
        user_id: Uuid,
        status: BookingStatus,
    ) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE user_id = $1 AND status <> $2)",
        )
        .bind(user_id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)
    }

    /// One transaction for the booking and every slot it touched. The
    /// partial unique index `one_active_booking_per_slot` is the
    /// authoritative exclusivity check: the loser of a create race hits a
    /// unique violation here and gets `StoreError::Conflict`.
    async fn commit(&self, booking: &Booking, slots: &[TimeSlot]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, time_slot_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                time_slot_id = EXCLUDED.time_slot_id,
                status = EXCLUDED.status,
                updated_at = NOW()
            "#,
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.time_slot_id)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        for slot in slots {
            sqlx::query(
                r#"
                UPDATE time_slots
                SET available = $2, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(slot.id)
            .bind(slot.available)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        }

        tx.commit().await.map_err(store_err)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}

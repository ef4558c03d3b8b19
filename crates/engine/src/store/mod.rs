//! Durable-store contracts consumed by the engine.
//!
//! Implementations decide how the data is kept; the engine only requires
//! that [`BookingStore::commit`] is a single atomic unit of work which
//! enforces "at most one non-cancelled booking per slot" at commit time.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, Studio, TimeSlot, User};

pub mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A commit-time uniqueness guarantee was violated, e.g. two concurrent
    /// bookings raced for the same slot.
    #[error("store conflict")]
    Conflict,

    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TimeSlotStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<TimeSlot>>;

    /// Does any slot in the studio on this date intersect [start, end)?
    /// `exclude` skips one slot id when re-validating an update.
    async fn exists_overlap(
        &self,
        studio_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        exclude: Option<Uuid>,
    ) -> StoreResult<bool>;

    async fn find_by_studio(&self, studio_id: Uuid) -> StoreResult<Vec<TimeSlot>>;

    async fn find_by_studio_and_date(
        &self,
        studio_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<TimeSlot>>;

    /// Slots in the inclusive date range, optionally filtered on the
    /// availability flag.
    async fn find_by_studio_and_date_range(
        &self,
        studio_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        available: Option<bool>,
    ) -> StoreResult<Vec<TimeSlot>>;

    async fn save(&self, slot: &TimeSlot) -> StoreResult<()>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Booking>>;

    async fn find_all(&self) -> StoreResult<Vec<Booking>>;

    async fn find_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Booking>>;

    /// Bookings whose slot falls on `date` with a status other than `status`.
    async fn find_by_date_and_status_not(
        &self,
        date: NaiveDate,
        status: BookingStatus,
    ) -> StoreResult<Vec<Booking>>;

    /// Bookings whose slot falls on `date` in exactly `status`. The engine
    /// itself never calls this; host-side reminder jobs do.
    async fn find_by_date_and_status(
        &self,
        date: NaiveDate,
        status: BookingStatus,
    ) -> StoreResult<Vec<Booking>>;

    /// Is the slot referenced by a booking whose status is not `status`?
    /// `exclude_booking` skips one booking id when re-validating an update.
    async fn exists_by_slot_and_status_not(
        &self,
        time_slot_id: Uuid,
        status: BookingStatus,
        exclude_booking: Option<Uuid>,
    ) -> StoreResult<bool>;

    /// Does the user hold a booking, in any status, for a trial slot dated
    /// strictly after `cutoff`?
    async fn exists_trial_booking_after(
        &self,
        user_id: Uuid,
        cutoff: NaiveDate,
    ) -> StoreResult<bool>;

    async fn exists_by_user_and_status_not(
        &self,
        user_id: Uuid,
        status: BookingStatus,
    ) -> StoreResult<bool>;

    /// Atomic unit of work: persist the booking together with every slot it
    /// touched. Must fail with [`StoreError::Conflict`] when writing an
    /// active booking would leave its slot with more than one non-cancelled
    /// booking; on any failure nothing may be written.
    async fn commit(&self, booking: &Booking, slots: &[TimeSlot]) -> StoreResult<()>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait StudioStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Studio>>;

    async fn find_all(&self) -> StoreResult<Vec<Studio>>;

    async fn exists_by_name(&self, name: &str) -> StoreResult<bool>;

    async fn save(&self, studio: &Studio) -> StoreResult<()>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn save(&self, user: &User) -> StoreResult<()>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

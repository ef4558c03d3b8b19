//! In-memory store, used by the engine's own tests and suitable for
//! embedding. One mutex guards all four aggregates, so `commit` is a real
//! unit of work: the exclusivity check re-runs under the lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::conflict::overlaps;
use crate::models::{Booking, BookingStatus, Studio, TimeSlot, User};
use crate::store::{
    BookingStore, StoreError, StoreResult, StudioStore, TimeSlotStore, UserStore,
};

#[derive(Debug, Default)]
struct Inner {
    studios: HashMap<Uuid, Studio>,
    slots: HashMap<Uuid, TimeSlot>,
    bookings: HashMap<Uuid, Booking>,
    users: HashMap<Uuid, User>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    fn slot_date(&self, booking: &Booking) -> Option<NaiveDate> {
        self.slots.get(&booking.time_slot_id).map(|s| s.date)
    }

    fn has_other_active(&self, time_slot_id: Uuid, exclude_booking: Option<Uuid>) -> bool {
        self.bookings.values().any(|b| {
            b.time_slot_id == time_slot_id
                && b.is_active()
                && Some(b.id) != exclude_booking
        })
    }
}

#[async_trait]
impl TimeSlotStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<TimeSlot>> {
        Ok(self.lock().slots.get(&id).cloned())
    }

    async fn exists_overlap(
        &self,
        studio_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        exclude: Option<Uuid>,
    ) -> StoreResult<bool> {
        Ok(self.lock().slots.values().any(|s| {
            s.studio_id == studio_id
                && s.date == date
                && Some(s.id) != exclude
                && overlaps(start, end, s.start_time, s.end_time)
        }))
    }

    async fn find_by_studio(&self, studio_id: Uuid) -> StoreResult<Vec<TimeSlot>> {
        let mut slots: Vec<TimeSlot> = self
            .lock()
            .slots
            .values()
            .filter(|s| s.studio_id == studio_id)
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.date, s.start_time));
        Ok(slots)
    }

    async fn find_by_studio_and_date(
        &self,
        studio_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<TimeSlot>> {
        let mut slots: Vec<TimeSlot> = self
            .lock()
            .slots
            .values()
            .filter(|s| s.studio_id == studio_id && s.date == date)
            .cloned()
            .collect();
        slots.sort_by_key(|s| s.start_time);
        Ok(slots)
    }

    async fn find_by_studio_and_date_range(
        &self,
        studio_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        available: Option<bool>,
    ) -> StoreResult<Vec<TimeSlot>> {
        let mut slots: Vec<TimeSlot> = self
            .lock()
            .slots
            .values()
            .filter(|s| {
                s.studio_id == studio_id
                    && s.date >= start
                    && s.date <= end
                    && available.map_or(true, |a| s.available == a)
            })
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.date, s.start_time));
        Ok(slots)
    }

    async fn save(&self, slot: &TimeSlot) -> StoreResult<()> {
        self.lock().slots.insert(slot.id, slot.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.lock().slots.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        Ok(self.lock().bookings.get(&id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self.lock().bookings.values().cloned().collect();
        bookings.sort_by_key(|b| b.created_at);
        Ok(bookings)
    }

    async fn find_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .lock()
            .bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.created_at);
        Ok(bookings)
    }

    async fn find_by_date_and_status_not(
        &self,
        date: NaiveDate,
        status: BookingStatus,
    ) -> StoreResult<Vec<Booking>> {
        let inner = self.lock();
        Ok(inner
            .bookings
            .values()
            .filter(|b| b.status != status && inner.slot_date(b) == Some(date))
            .cloned()
            .collect())
    }

    async fn find_by_date_and_status(
        &self,
        date: NaiveDate,
        status: BookingStatus,
    ) -> StoreResult<Vec<Booking>> {
        let inner = self.lock();
        Ok(inner
            .bookings
            .values()
            .filter(|b| b.status == status && inner.slot_date(b) == Some(date))
            .cloned()
            .collect())
    }

    async fn exists_by_slot_and_status_not(
        &self,
        time_slot_id: Uuid,
        status: BookingStatus,
        exclude_booking: Option<Uuid>,
    ) -> StoreResult<bool> {
        Ok(self.lock().bookings.values().any(|b| {
            b.time_slot_id == time_slot_id
                && b.status != status
                && Some(b.id) != exclude_booking
        }))
    }

    async fn exists_trial_booking_after(
        &self,
        user_id: Uuid,
        cutoff: NaiveDate,
    ) -> StoreResult<bool> {
        let inner = self.lock();
        Ok(inner.bookings.values().any(|b| {
            b.user_id == user_id
                && inner
                    .slots
                    .get(&b.time_slot_id)
                    .is_some_and(|s| s.trial && s.date > cutoff)
        }))
    }

    async fn exists_by_user_and_status_not(
        &self,
        user_id: Uuid,
        status: BookingStatus,
    ) -> StoreResult<bool> {
        Ok(self
            .lock()
            .bookings
            .values()
            .any(|b| b.user_id == user_id && b.status != status))
    }

    async fn commit(&self, booking: &Booking, slots: &[TimeSlot]) -> StoreResult<()> {
        let mut inner = self.lock();
        // The authoritative exclusivity check: both racing creators reach
        // this point, only the first one through the lock wins.
        if booking.is_active() && inner.has_other_active(booking.time_slot_id, Some(booking.id)) {
            return Err(StoreError::Conflict);
        }
        inner.bookings.insert(booking.id, booking.clone());
        for slot in slots {
            inner.slots.insert(slot.id, slot.clone());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.lock().bookings.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl StudioStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Studio>> {
        Ok(self.lock().studios.get(&id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Studio>> {
        let mut studios: Vec<Studio> = self.lock().studios.values().cloned().collect();
        studios.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(studios)
    }

    async fn exists_by_name(&self, name: &str) -> StoreResult<bool> {
        Ok(self.lock().studios.values().any(|s| s.name == name))
    }

    async fn save(&self, studio: &Studio) -> StoreResult<()> {
        self.lock().studios.insert(studio.id, studio.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.lock().studios.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn save(&self, user: &User) -> StoreResult<()> {
        self.lock().users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.lock().users.remove(&id);
        Ok(())
    }
}

//! Administrative slot management: creation, rescheduling, deletion, and
//! the studio-facing slot listings.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::conflict::{validate_time_range, ConflictChecker};
use crate::error::{Error, Result};
use crate::models::{BookingStatus, TimeSlot};
use crate::store::{BookingStore, StudioStore, TimeSlotStore};

#[derive(Debug, Clone)]
pub struct CreateTimeSlot {
    pub studio_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone)]
pub struct UpdateTimeSlot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Clone)]
pub struct TimeSlotService {
    slots: Arc<dyn TimeSlotStore>,
    studios: Arc<dyn StudioStore>,
    bookings: Arc<dyn BookingStore>,
    checker: ConflictChecker,
}

impl TimeSlotService {
    pub fn new(
        slots: Arc<dyn TimeSlotStore>,
        studios: Arc<dyn StudioStore>,
        bookings: Arc<dyn BookingStore>,
        checker: ConflictChecker,
    ) -> Self {
        Self {
            slots,
            studios,
            bookings,
            checker,
        }
    }

    /// New slots come up available; whether they are trial slots follows
    /// from their duration, never from the caller.
    pub async fn create_slot(&self, req: CreateTimeSlot) -> Result<TimeSlot> {
        validate_time_range(req.start_time, req.end_time)?;
        self.checker
            .ensure_no_studio_overlap(req.studio_id, req.date, req.start_time, req.end_time, None)
            .await?;
        self.studios
            .find_by_id(req.studio_id)
            .await?
            .ok_or(Error::StudioNotFound)?;

        let slot = TimeSlot {
            id: Uuid::new_v4(),
            studio_id: req.studio_id,
            date: req.date,
            start_time: req.start_time,
            end_time: req.end_time,
            available: true,
            trial: self.is_trial(req.start_time, req.end_time),
        };
        self.slots.save(&slot).await?;
        Ok(slot)
    }

    /// Reschedule a slot. Overlap is re-validated against the rest of the
    /// studio (excluding the slot itself); the trial flag is recomputed;
    /// availability is left to the booking lifecycle.
    pub async fn update_slot(&self, id: Uuid, req: UpdateTimeSlot) -> Result<TimeSlot> {
        validate_time_range(req.start_time, req.end_time)?;
        let mut slot = self
            .slots
            .find_by_id(id)
            .await?
            .ok_or(Error::SlotNotFound)?;
        self.checker
            .ensure_no_studio_overlap(
                slot.studio_id,
                req.date,
                req.start_time,
                req.end_time,
                Some(id),
            )
            .await?;

        slot.date = req.date;
        slot.start_time = req.start_time;
        slot.end_time = req.end_time;
        slot.trial = self.is_trial(req.start_time, req.end_time);
        self.slots.save(&slot).await?;
        Ok(slot)
    }

    /// Deletion is rejected while any non-cancelled booking references the
    /// slot; cancel the booking first.
    pub async fn delete_slot(&self, id: Uuid) -> Result<()> {
        self.slots
            .find_by_id(id)
            .await?
            .ok_or(Error::SlotNotFound)?;
        if self
            .bookings
            .exists_by_slot_and_status_not(id, BookingStatus::Cancelled, None)
            .await?
        {
            return Err(Error::SlotHasActiveBooking);
        }
        self.slots.delete(id).await?;
        Ok(())
    }

    pub async fn get_slot(&self, id: Uuid) -> Result<TimeSlot> {
        self.slots
            .find_by_id(id)
            .await?
            .ok_or(Error::SlotNotFound)
    }

    pub async fn slots_by_studio(&self, studio_id: Uuid) -> Result<Vec<TimeSlot>> {
        Ok(self.slots.find_by_studio(studio_id).await?)
    }

    pub async fn slots_by_studio_and_range(
        &self,
        studio_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeSlot>> {
        Ok(self
            .slots
            .find_by_studio_and_date_range(studio_id, start, end, None)
            .await?)
    }

    /// Available slots a client could actually take: the availability flag
    /// is necessary but not sufficient, since a commitment at another studio
    /// can still block the trainer through the travel buffer.
    pub async fn available_slots(
        &self,
        studio_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeSlot>> {
        let candidates = self
            .slots
            .find_by_studio_and_date_range(studio_id, start, end, Some(true))
            .await?;

        let mut open = Vec::new();
        for candidate in candidates {
            match self
                .checker
                .check_trainer_availability(&candidate, None)
                .await
            {
                Ok(()) => open.push(candidate),
                Err(Error::TrainerNotAvailable) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(open)
    }

    fn is_trial(&self, start: NaiveTime, end: NaiveTime) -> bool {
        (end - start).num_minutes() == self.checker.policy().trial_slot_minutes
    }
}

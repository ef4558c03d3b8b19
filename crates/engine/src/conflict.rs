//! Conflict detection: time-range validation, intra-studio slot overlap and
//! the cross-studio trainer buffer, plus trial-session eligibility.

use std::sync::Arc;

use chrono::{Days, NaiveDate, NaiveTime, Timelike};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{BookingStatus, TimeSlot};
use crate::policy::BookingPolicy;
use crate::store::{BookingStore, TimeSlotStore};

/// Rejects empty and reversed ranges; slots live within one calendar day.
pub fn validate_time_range(start: NaiveTime, end: NaiveTime) -> Result<()> {
    if end <= start {
        return Err(Error::InvalidTimeRange);
    }
    Ok(())
}

/// Half-open interval test: back-to-back slots do not overlap, in either
/// direction.
pub(crate) fn overlaps(s1: NaiveTime, e1: NaiveTime, s2: NaiveTime, e2: NaiveTime) -> bool {
    s1 < e2 && e1 > s2
}

fn minute_of_day(t: NaiveTime) -> i64 {
    i64::from(t.num_seconds_from_midnight()) / 60
}

/// Overlap with `buffer_minutes` of slack on both sides of the existing
/// interval. Computed on minutes-since-midnight so a buffer reaching past
/// midnight widens the interval instead of wrapping around.
fn buffered_overlaps(
    s1: NaiveTime,
    e1: NaiveTime,
    s2: NaiveTime,
    e2: NaiveTime,
    buffer_minutes: i64,
) -> bool {
    minute_of_day(s1) < minute_of_day(e2) + buffer_minutes
        && minute_of_day(e1) > minute_of_day(s2) - buffer_minutes
}

/// Detects booking conflicts for the single shared trainer resource.
///
/// Within one studio consecutive slots are fine (changeover is presumed
/// instant); moving between studios costs the policy buffer, hence the two
/// branches in [`check_trainer_availability`](Self::check_trainer_availability).
#[derive(Clone)]
pub struct ConflictChecker {
    slots: Arc<dyn TimeSlotStore>,
    bookings: Arc<dyn BookingStore>,
    policy: BookingPolicy,
}

impl ConflictChecker {
    pub fn new(
        slots: Arc<dyn TimeSlotStore>,
        bookings: Arc<dyn BookingStore>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            slots,
            bookings,
            policy,
        }
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    /// Fail with [`Error::SlotOverlap`] when another slot in the studio on
    /// the same date intersects the candidate interval.
    pub async fn ensure_no_studio_overlap(
        &self,
        studio_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        exclude_slot: Option<Uuid>,
    ) -> Result<()> {
        if self
            .slots
            .exists_overlap(studio_id, date, start, end, exclude_slot)
            .await?
        {
            return Err(Error::SlotOverlap);
        }
        Ok(())
    }

    /// Scan every active booking on the candidate's date. Same studio:
    /// plain overlap. Different studio: buffered overlap, modelling travel
    /// time. `ignore_booking` skips the booking being re-validated.
    pub async fn check_trainer_availability(
        &self,
        candidate: &TimeSlot,
        ignore_booking: Option<Uuid>,
    ) -> Result<()> {
        let same_day = self
            .bookings
            .find_by_date_and_status_not(candidate.date, BookingStatus::Cancelled)
            .await?;

        for booking in same_day {
            if ignore_booking == Some(booking.id) {
                continue;
            }
            let Some(other) = self.slots.find_by_id(booking.time_slot_id).await? else {
                continue;
            };

            let conflict = if other.studio_id == candidate.studio_id {
                overlaps(
                    candidate.start_time,
                    candidate.end_time,
                    other.start_time,
                    other.end_time,
                )
            } else {
                buffered_overlaps(
                    candidate.start_time,
                    candidate.end_time,
                    other.start_time,
                    other.end_time,
                    self.policy.inter_studio_buffer_minutes,
                )
            };
            if conflict {
                return Err(Error::TrainerNotAvailable);
            }
        }
        Ok(())
    }

    /// For trial candidates only: one trial booking per client per rolling
    /// window, anchored to the candidate slot's date and counted regardless
    /// of the earlier booking's status.
    pub async fn check_trial_eligibility(
        &self,
        user_id: Uuid,
        candidate: &TimeSlot,
    ) -> Result<()> {
        if !candidate.trial {
            return Ok(());
        }
        let cutoff = candidate
            .date
            .checked_sub_days(Days::new(self.policy.trial_window_days))
            .unwrap_or(NaiveDate::MIN);
        if self
            .bookings
            .exists_trial_booking_after(user_id, cutoff)
            .await?
        {
            return Err(Error::TrialSessionLimitExceeded);
        }
        Ok(())
    }
}

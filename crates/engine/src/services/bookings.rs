//! Booking lifecycle: creation, cancellation, status/slot reassignment, and
//! the client-facing booking views. Keeps `TimeSlot.available` in lockstep
//! with the set of active bookings.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::conflict::ConflictChecker;
use crate::error::{Error, Result};
use crate::models::{Booking, BookingStatus, TimeSlot};
use crate::notify::Notifier;
use crate::pagination::LimitOffset;
use crate::scope::Viewer;
use crate::store::{BookingStore, StoreError, TimeSlotStore, UserStore};

/// Optional intersection filters for [`BookingService::search_bookings`].
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub user_id: Option<Uuid>,
    pub studio_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
    /// Inclusive slot-date range bounds.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingStore>,
    slots: Arc<dyn TimeSlotStore>,
    users: Arc<dyn UserStore>,
    checker: ConflictChecker,
    notifier: Arc<dyn Notifier>,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        slots: Arc<dyn TimeSlotStore>,
        users: Arc<dyn UserStore>,
        checker: ConflictChecker,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            bookings,
            slots,
            users,
            checker,
            notifier,
        }
    }

    /// Book a slot for a client. The new booking starts `Pending` and takes
    /// the slot out of availability in the same commit.
    pub async fn create_booking(&self, user_id: Uuid, time_slot_id: Uuid) -> Result<Booking> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(Error::UserNotFound)?;
        let mut slot = self
            .slots
            .find_by_id(time_slot_id)
            .await?
            .ok_or(Error::SlotNotFound)?;

        if self
            .bookings
            .exists_by_slot_and_status_not(slot.id, BookingStatus::Cancelled, None)
            .await?
        {
            return Err(Error::SlotNotAvailable);
        }
        self.checker.check_trial_eligibility(user.id, &slot).await?;
        self.checker.check_trainer_availability(&slot, None).await?;

        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: user.id,
            time_slot_id: slot.id,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };
        slot.available = false;
        self.commit(&booking, std::slice::from_ref(&slot)).await?;

        if let Err(err) = self.notifier.booking_created(&user, &booking).await {
            tracing::warn!(%err, booking_id = %booking.id, "booking-created notification failed");
        }
        Ok(booking)
    }

    /// Cancel a booking and free its slot. Cancelling an already-cancelled
    /// booking is a no-op that still succeeds.
    pub async fn cancel_booking(&self, booking_id: Uuid) -> Result<Booking> {
        let mut booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(Error::BookingNotFound)?;
        if booking.status == BookingStatus::Cancelled {
            return Ok(booking);
        }

        let mut slot = self
            .slots
            .find_by_id(booking.time_slot_id)
            .await?
            .ok_or(Error::SlotNotFound)?;

        booking.status = BookingStatus::Cancelled;
        // Exclusivity guarantees this booking was the only active holder.
        slot.available = true;
        self.commit(&booking, std::slice::from_ref(&slot)).await?;

        self.notify_status(&booking, BookingStatus::Cancelled).await;
        Ok(booking)
    }

    /// Reassign a booking's slot and/or apply a status transition. Either
    /// everything is persisted in one commit or nothing is.
    pub async fn update_booking(
        &self,
        booking_id: Uuid,
        new_time_slot_id: Option<Uuid>,
        new_status: Option<BookingStatus>,
    ) -> Result<Booking> {
        let mut booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(Error::BookingNotFound)?;
        let old_status = booking.status;
        let resulting = new_status.unwrap_or(old_status);
        ensure_transition(old_status, resulting)?;

        let mut target = self
            .slots
            .find_by_id(booking.time_slot_id)
            .await?
            .ok_or(Error::SlotNotFound)?;
        let mut touched: Vec<TimeSlot> = Vec::new();

        let slot_changed = new_time_slot_id.is_some_and(|id| id != booking.time_slot_id);
        if slot_changed {
            let new_id = new_time_slot_id.unwrap_or(booking.time_slot_id);
            let new_slot = self
                .slots
                .find_by_id(new_id)
                .await?
                .ok_or(Error::SlotNotFound)?;

            // Free the old slot unless some other active booking still
            // holds it (possible when moving a cancelled booking).
            let mut old_slot = target;
            old_slot.available = !self
                .bookings
                .exists_by_slot_and_status_not(
                    old_slot.id,
                    BookingStatus::Cancelled,
                    Some(booking.id),
                )
                .await?;
            touched.push(old_slot);

            booking.time_slot_id = new_slot.id;
            target = new_slot;
        }

        // A fresh occupancy (reactivation or reassignment while active) is
        // re-validated as if it were a new booking.
        if resulting != BookingStatus::Cancelled
            && (slot_changed || old_status == BookingStatus::Cancelled)
        {
            if self
                .bookings
                .exists_by_slot_and_status_not(target.id, BookingStatus::Cancelled, Some(booking.id))
                .await?
            {
                return Err(Error::SlotNotAvailable);
            }
            self.checker
                .check_trainer_availability(&target, Some(booking.id))
                .await?;
        }

        booking.status = resulting;
        target.available = if resulting == BookingStatus::Cancelled {
            !self
                .bookings
                .exists_by_slot_and_status_not(target.id, BookingStatus::Cancelled, Some(booking.id))
                .await?
        } else {
            false
        };
        touched.push(target);

        self.commit(&booking, &touched).await?;

        if resulting != old_status {
            self.notify_status(&booking, resulting).await;
        }
        Ok(booking)
    }

    pub async fn get_booking(&self, booking_id: Uuid, viewer: &Viewer) -> Result<Booking> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(Error::BookingNotFound)?;
        let slot = self
            .slots
            .find_by_id(booking.time_slot_id)
            .await?
            .ok_or(Error::SlotNotFound)?;
        if !viewer.can_view(&booking, &slot) {
            return Err(Error::AccessDenied);
        }
        Ok(booking)
    }

    /// Scan all bookings, intersect every non-null filter, then apply the
    /// viewer's visibility on top.
    pub async fn search_bookings(
        &self,
        filter: &BookingFilter,
        viewer: &Viewer,
        page: Option<LimitOffset>,
    ) -> Result<Vec<Booking>> {
        let page = page.unwrap_or_default().clamped();
        let mut out = Vec::new();
        for booking in self.bookings.find_all().await? {
            let Some(slot) = self.slots.find_by_id(booking.time_slot_id).await? else {
                continue;
            };
            if !viewer.can_view(&booking, &slot) {
                continue;
            }
            if filter.user_id.is_some_and(|id| booking.user_id != id) {
                continue;
            }
            if filter.studio_id.is_some_and(|id| slot.studio_id != id) {
                continue;
            }
            if filter.status.is_some_and(|s| booking.status != s) {
                continue;
            }
            if filter.from.is_some_and(|from| slot.date < from) {
                continue;
            }
            if filter.to.is_some_and(|to| slot.date > to) {
                continue;
            }
            out.push(booking);
        }
        Ok(out
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    /// Pending/confirmed bookings with a slot date on or after `today`,
    /// scoped to the viewer.
    pub async fn my_upcoming(&self, viewer: &Viewer, today: NaiveDate) -> Result<Vec<Booking>> {
        let mut out = Vec::new();
        for booking in self.bookings.find_all().await? {
            if !booking.is_active() {
                continue;
            }
            let Some(slot) = self.slots.find_by_id(booking.time_slot_id).await? else {
                continue;
            };
            if slot.date < today || !viewer.can_view(&booking, &slot) {
                continue;
            }
            out.push(booking);
        }
        Ok(out)
    }

    /// Every booking the user ever made, any status, any date.
    pub async fn my_history(&self, user_id: Uuid) -> Result<Vec<Booking>> {
        Ok(self.bookings.find_by_user(user_id).await?)
    }

    /// The atomic unit of work; a commit-time exclusivity violation is the
    /// lost half of a create race and surfaces as `SlotNotAvailable`.
    async fn commit(&self, booking: &Booking, slots: &[TimeSlot]) -> Result<()> {
        match self.bookings.commit(booking, slots).await {
            Ok(()) => Ok(()),
            Err(StoreError::Conflict) => Err(Error::SlotNotAvailable),
            Err(err) => Err(err.into()),
        }
    }

    async fn notify_status(&self, booking: &Booking, status: BookingStatus) {
        let user = match self.users.find_by_id(booking.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(%err, booking_id = %booking.id, "could not load user for notification");
                return;
            }
        };
        let sent = match status {
            BookingStatus::Confirmed => self.notifier.booking_confirmed(&user, booking).await,
            BookingStatus::Cancelled => self.notifier.booking_cancelled(&user, booking).await,
            BookingStatus::Pending => return,
        };
        if let Err(err) = sent {
            tracing::warn!(%err, booking_id = %booking.id, "booking notification failed");
        }
    }
}

/// `Pending -> {Confirmed, Cancelled}`, `Confirmed -> Cancelled`,
/// `Cancelled -> {Pending, Confirmed}`; staying put is a no-op.
fn ensure_transition(from: BookingStatus, to: BookingStatus) -> Result<()> {
    use BookingStatus::{Confirmed, Pending};
    if from == Confirmed && to == Pending {
        return Err(Error::InvalidStatusTransition { from, to });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_cannot_go_back_to_pending() {
        assert!(matches!(
            ensure_transition(BookingStatus::Confirmed, BookingStatus::Pending),
            Err(Error::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn all_defined_transitions_pass() {
        use BookingStatus::{Cancelled, Confirmed, Pending};
        for (from, to) in [
            (Pending, Confirmed),
            (Pending, Cancelled),
            (Confirmed, Cancelled),
            (Cancelled, Pending),
            (Cancelled, Confirmed),
            (Pending, Pending),
            (Confirmed, Confirmed),
            (Cancelled, Cancelled),
        ] {
            assert!(ensure_transition(from, to).is_ok(), "{from} -> {to}");
        }
    }
}

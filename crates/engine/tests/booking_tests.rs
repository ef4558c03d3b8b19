mod common;

use common::*;
use engine::store::TimeSlotStore;
use engine::{BookingStatus, Error, Role, TimeSlot};
use uuid::Uuid;

#[tokio::test]
async fn create_booking_occupies_the_slot() {
    let app = setup();
    let user = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;
    let slot = create_test_slot(&app, &studio, "2025-07-01", "09:00", "10:00").await;

    let booking = app.bookings.create_booking(user.id, slot.id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.time_slot_id, slot.id);

    let slot = app.slots.get_slot(slot.id).await.unwrap();
    assert!(!slot.available);
}

#[tokio::test]
async fn create_booking_unknown_slot_and_user() {
    let app = setup();
    let user = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;
    let slot = create_test_slot(&app, &studio, "2025-07-01", "09:00", "10:00").await;

    let missing_slot = app.bookings.create_booking(user.id, Uuid::new_v4()).await;
    assert!(matches!(missing_slot, Err(Error::SlotNotFound)));

    let missing_user = app.bookings.create_booking(Uuid::new_v4(), slot.id).await;
    assert!(matches!(missing_user, Err(Error::UserNotFound)));
}

#[tokio::test]
async fn slot_is_exclusive_until_cancelled() {
    let app = setup();
    let alice = create_test_user(&app, Role::User).await;
    let bob = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;
    let slot = create_test_slot(&app, &studio, "2025-07-01", "09:00", "10:00").await;

    let first = app.bookings.create_booking(alice.id, slot.id).await.unwrap();

    let second = app.bookings.create_booking(bob.id, slot.id).await;
    assert!(matches!(second, Err(Error::SlotNotAvailable)));

    let cancelled = app.bookings.cancel_booking(first.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert!(app.slots.get_slot(slot.id).await.unwrap().available);

    // the slot is free again, so the second client gets it now
    let rebooked = app.bookings.create_booking(bob.id, slot.id).await.unwrap();
    assert_eq!(rebooked.status, BookingStatus::Pending);
    assert!(!app.slots.get_slot(slot.id).await.unwrap().available);
}

#[tokio::test]
async fn cancelling_twice_is_idempotent() {
    let app = setup();
    let user = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;
    let slot = create_test_slot(&app, &studio, "2025-07-01", "09:00", "10:00").await;
    let booking = app.bookings.create_booking(user.id, slot.id).await.unwrap();

    let once = app.bookings.cancel_booking(booking.id).await.unwrap();
    let twice = app.bookings.cancel_booking(booking.id).await.unwrap();
    assert_eq!(once.status, BookingStatus::Cancelled);
    assert_eq!(twice.status, BookingStatus::Cancelled);

    let missing = app.bookings.cancel_booking(Uuid::new_v4()).await;
    assert!(matches!(missing, Err(Error::BookingNotFound)));
}

#[tokio::test]
async fn back_to_back_slots_in_one_studio_are_bookable() {
    let app = setup();
    let alice = create_test_user(&app, Role::User).await;
    let bob = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;
    let morning = create_test_slot(&app, &studio, "2025-07-01", "09:00", "10:00").await;
    let next = create_test_slot(&app, &studio, "2025-07-01", "10:00", "11:00").await;

    app.bookings.create_booking(alice.id, morning.id).await.unwrap();
    // changeover within one studio is instant; no buffer applies
    app.bookings.create_booking(bob.id, next.id).await.unwrap();
}

#[tokio::test]
async fn overlapping_commitment_in_same_studio_blocks_the_trainer() {
    let app = setup();
    let alice = create_test_user(&app, Role::User).await;
    let bob = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;
    let slot = create_test_slot(&app, &studio, "2025-07-01", "09:00", "10:00").await;
    app.bookings.create_booking(alice.id, slot.id).await.unwrap();

    // Slot creation forbids overlap, so forge an overlapping slot directly
    // in the store to exercise the trainer check on its own.
    let forged = TimeSlot {
        id: Uuid::new_v4(),
        studio_id: studio.id,
        date: date("2025-07-01"),
        start_time: time("09:30"),
        end_time: time("10:30"),
        available: true,
        trial: false,
    };
    TimeSlotStore::save(&app.store, &forged).await.unwrap();

    let conflicted = app.bookings.create_booking(bob.id, forged.id).await;
    assert!(matches!(conflicted, Err(Error::TrainerNotAvailable)));
}

#[tokio::test]
async fn cross_studio_bookings_respect_the_travel_buffer() {
    let app = setup();
    let alice = create_test_user(&app, Role::User).await;
    let bob = create_test_user(&app, Role::User).await;
    let studio_a = create_test_studio(&app, "Studio A").await;
    let studio_b = create_test_studio(&app, "Studio B").await;
    let studio_c = create_test_studio(&app, "Studio C").await;

    let in_a = create_test_slot(&app, &studio_a, "2025-07-01", "10:00", "11:00").await;
    let too_close = create_test_slot(&app, &studio_b, "2025-07-01", "11:30", "12:30").await;
    let far_enough = create_test_slot(&app, &studio_c, "2025-07-01", "12:00", "13:00").await;

    app.bookings.create_booking(alice.id, in_a.id).await.unwrap();

    // 30 minute gap < 1 hour travel buffer
    let blocked = app.bookings.create_booking(bob.id, too_close.id).await;
    assert!(matches!(blocked, Err(Error::TrainerNotAvailable)));

    // gap of exactly one hour is allowed
    app.bookings.create_booking(bob.id, far_enough.id).await.unwrap();
}

#[tokio::test]
async fn one_trial_booking_per_rolling_year() {
    let app = setup();
    let user = create_test_user(&app, Role::User).await;
    let other = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;

    // 30-minute slots are trial slots under the default policy
    let first = create_test_slot(&app, &studio, "2024-06-01", "09:00", "09:30").await;
    assert!(first.trial);
    app.bookings.create_booking(user.id, first.id).await.unwrap();

    let within_window = create_test_slot(&app, &studio, "2025-05-31", "09:00", "09:30").await;
    let blocked = app.bookings.create_booking(user.id, within_window.id).await;
    assert!(matches!(blocked, Err(Error::TrialSessionLimitExceeded)));

    // a year later the client is eligible again
    let past_window = create_test_slot(&app, &studio, "2025-06-02", "09:00", "09:30").await;
    app.bookings.create_booking(user.id, past_window.id).await.unwrap();

    // the limit is per client, not global
    app.bookings.create_booking(other.id, within_window.id).await.unwrap();
}

#[tokio::test]
async fn trial_limit_counts_cancelled_bookings_too() {
    let app = setup();
    let user = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;

    let first = create_test_slot(&app, &studio, "2025-03-01", "09:00", "09:30").await;
    let booking = app.bookings.create_booking(user.id, first.id).await.unwrap();
    app.bookings.cancel_booking(booking.id).await.unwrap();

    let second = create_test_slot(&app, &studio, "2025-04-01", "09:00", "09:30").await;
    let blocked = app.bookings.create_booking(user.id, second.id).await;
    assert!(matches!(blocked, Err(Error::TrialSessionLimitExceeded)));
}

#[tokio::test]
async fn update_moves_booking_to_a_free_slot() {
    let app = setup();
    let user = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;
    let old = create_test_slot(&app, &studio, "2025-07-01", "09:00", "10:00").await;
    let new = create_test_slot(&app, &studio, "2025-07-02", "09:00", "10:00").await;
    let booking = app.bookings.create_booking(user.id, old.id).await.unwrap();

    let updated = app
        .bookings
        .update_booking(booking.id, Some(new.id), None)
        .await
        .unwrap();
    assert_eq!(updated.time_slot_id, new.id);
    assert!(app.slots.get_slot(old.id).await.unwrap().available);
    assert!(!app.slots.get_slot(new.id).await.unwrap().available);
}

#[tokio::test]
async fn failed_reassignment_leaves_everything_untouched() {
    let app = setup();
    let alice = create_test_user(&app, Role::User).await;
    let bob = create_test_user(&app, Role::User).await;
    let studio_a = create_test_studio(&app, "Studio A").await;
    let studio_b = create_test_studio(&app, "Studio B").await;

    let in_a = create_test_slot(&app, &studio_a, "2025-07-01", "10:00", "11:00").await;
    let in_b = create_test_slot(&app, &studio_b, "2025-07-01", "14:00", "15:00").await;
    // inside the buffer window of alice's commitment in studio A
    let buffered = create_test_slot(&app, &studio_b, "2025-07-01", "11:30", "12:30").await;

    app.bookings.create_booking(alice.id, in_a.id).await.unwrap();
    let bobs = app.bookings.create_booking(bob.id, in_b.id).await.unwrap();

    let failed = app
        .bookings
        .update_booking(bobs.id, Some(buffered.id), None)
        .await;
    assert!(matches!(failed, Err(Error::TrainerNotAvailable)));

    // no partial mutation: the booking still sits on its original slot
    let unchanged = app.bookings.my_history(bob.id).await.unwrap();
    assert_eq!(unchanged[0].time_slot_id, in_b.id);
    assert!(!app.slots.get_slot(in_b.id).await.unwrap().available);
    assert!(app.slots.get_slot(buffered.id).await.unwrap().available);
}

#[tokio::test]
async fn status_transitions_follow_the_state_machine() {
    let app = setup();
    let user = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;
    let slot = create_test_slot(&app, &studio, "2025-07-01", "09:00", "10:00").await;
    let booking = app.bookings.create_booking(user.id, slot.id).await.unwrap();

    let confirmed = app
        .bookings
        .update_booking(booking.id, None, Some(BookingStatus::Confirmed))
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let back_to_pending = app
        .bookings
        .update_booking(booking.id, None, Some(BookingStatus::Pending))
        .await;
    assert!(matches!(
        back_to_pending,
        Err(Error::InvalidStatusTransition { .. })
    ));
}

#[tokio::test]
async fn cancelling_via_update_frees_the_slot() {
    let app = setup();
    let user = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;
    let slot = create_test_slot(&app, &studio, "2025-07-01", "09:00", "10:00").await;
    let booking = app.bookings.create_booking(user.id, slot.id).await.unwrap();

    app.bookings
        .update_booking(booking.id, None, Some(BookingStatus::Cancelled))
        .await
        .unwrap();
    assert!(app.slots.get_slot(slot.id).await.unwrap().available);
}

#[tokio::test]
async fn reactivating_a_cancelled_booking_reoccupies_the_slot() {
    let app = setup();
    let user = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;
    let slot = create_test_slot(&app, &studio, "2025-07-01", "09:00", "10:00").await;
    let booking = app.bookings.create_booking(user.id, slot.id).await.unwrap();
    app.bookings.cancel_booking(booking.id).await.unwrap();

    let reactivated = app
        .bookings
        .update_booking(booking.id, None, Some(BookingStatus::Confirmed))
        .await
        .unwrap();
    assert_eq!(reactivated.status, BookingStatus::Confirmed);
    assert!(!app.slots.get_slot(slot.id).await.unwrap().available);
}

#[tokio::test]
async fn reactivation_is_validated_as_a_fresh_occupancy() {
    let app = setup();
    let alice = create_test_user(&app, Role::User).await;
    let bob = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;
    let slot = create_test_slot(&app, &studio, "2025-07-01", "09:00", "10:00").await;

    let alices = app.bookings.create_booking(alice.id, slot.id).await.unwrap();
    app.bookings.cancel_booking(alices.id).await.unwrap();
    app.bookings.create_booking(bob.id, slot.id).await.unwrap();

    // bob took the slot in the meantime; alice cannot come back onto it
    let blocked = app
        .bookings
        .update_booking(alices.id, None, Some(BookingStatus::Pending))
        .await;
    assert!(matches!(blocked, Err(Error::SlotNotAvailable)));
}

#[tokio::test]
async fn concurrent_creates_admit_exactly_one_booking() {
    let app = setup();
    let alice = create_test_user(&app, Role::User).await;
    let bob = create_test_user(&app, Role::User).await;
    let studio = create_test_studio(&app, "Studio 1").await;
    let slot = create_test_slot(&app, &studio, "2025-07-01", "09:00", "10:00").await;

    let (a, b) = tokio::join!(
        app.bookings.create_booking(alice.id, slot.id),
        app.bookings.create_booking(bob.id, slot.id),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one of the racing creates may win");
    for lost in [a, b].into_iter().filter(Result::is_err) {
        assert!(matches!(lost, Err(Error::SlotNotAvailable)));
    }
    assert!(!app.slots.get_slot(slot.id).await.unwrap().available);
}

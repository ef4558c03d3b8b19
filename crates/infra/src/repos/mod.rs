use engine::store::StoreError;

pub mod bookings;
pub mod studios;
pub mod time_slots;
pub mod users;

pub use bookings::BookingRepo;
pub use studios::StudioRepo;
pub use time_slots::TimeSlotRepo;
pub use users::UserRepo;

/// A unique-constraint hit is the lost half of a commit-time race; anything
/// else is a backend failure.
pub(crate) fn store_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict;
        }
    }
    StoreError::Backend(err.to_string())
}

pub(crate) fn corrupt_row(err: String) -> StoreError {
    StoreError::Backend(err)
}

use thiserror::Error;

use crate::models::BookingStatus;
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

/// Validation and conflict failures surfaced to the caller.
///
/// All variants are recoverable; `code()` gives the stable machine-readable
/// identifier the boundary layer translates into a transport response.
#[derive(Debug, Error)]
pub enum Error {
    #[error("end time must be after start time")]
    InvalidTimeRange,

    #[error("time slot overlaps an existing slot in the same studio")]
    SlotOverlap,

    #[error("time slot not found")]
    SlotNotFound,

    #[error("booking not found")]
    BookingNotFound,

    #[error("studio not found")]
    StudioNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("a studio with this name already exists")]
    StudioAlreadyExists,

    #[error("time slot is not available")]
    SlotNotAvailable,

    #[error("trainer is not available for this time slot")]
    TrainerNotAvailable,

    #[error("trial session limit exceeded")]
    TrialSessionLimitExceeded,

    #[error("booking status may not change from {from} to {to}")]
    InvalidStatusTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("time slot still has an active booking")]
    SlotHasActiveBooking,

    #[error("user still has active bookings")]
    UserHasActiveBookings,

    #[error("access denied")]
    AccessDenied,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTimeRange => "INVALID_TIME_RANGE",
            Self::SlotOverlap => "SLOT_OVERLAP",
            Self::SlotNotFound => "SLOT_NOT_FOUND",
            Self::BookingNotFound => "BOOKING_NOT_FOUND",
            Self::StudioNotFound => "STUDIO_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::StudioAlreadyExists => "STUDIO_ALREADY_EXISTS",
            Self::SlotNotAvailable => "SLOT_NOT_AVAILABLE",
            Self::TrainerNotAvailable => "TRAINER_NOT_AVAILABLE",
            Self::TrialSessionLimitExceeded => "TRIAL_SESSION_LIMIT_EXCEEDED",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::SlotHasActiveBooking => "SLOT_HAS_ACTIVE_BOOKING",
            Self::UserHasActiveBookings => "USER_HAS_ACTIVE_BOOKINGS",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

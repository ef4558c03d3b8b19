//! Slot/booking engine for multi-studio training sessions: overlap and
//! trainer-buffer conflict detection, trial eligibility, and the booking
//! lifecycle that keeps slot availability consistent with active bookings.
//!
//! The engine is a library; HTTP, authentication and delivery of
//! notifications belong to the host. Identity enters as a [`Viewer`]
//! capability, persistence through the [`store`] traits.

pub mod conflict;
pub mod error;
pub mod models;
pub mod notify;
pub mod pagination;
pub mod policy;
pub mod scope;
pub mod services;
pub mod store;

pub use conflict::ConflictChecker;
pub use error::{Error, Result};
pub use models::{Booking, BookingStatus, Role, Studio, TimeSlot, User};
pub use notify::{LogNotifier, Notifier};
pub use pagination::LimitOffset;
pub use policy::BookingPolicy;
pub use scope::Viewer;
pub use services::{
    BookingFilter, BookingService, CreateTimeSlot, CreateUser, StudioService, TimeSlotService,
    UpdateTimeSlot, UpsertStudio, UserService,
};

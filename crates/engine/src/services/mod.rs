pub mod bookings;
pub mod studios;
pub mod time_slots;
pub mod users;

pub use bookings::{BookingFilter, BookingService};
pub use studios::{StudioService, UpsertStudio};
pub use time_slots::{CreateTimeSlot, TimeSlotService, UpdateTimeSlot};
pub use users::{CreateUser, UserService};

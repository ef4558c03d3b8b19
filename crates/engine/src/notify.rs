//! Notification seam. Delivery (email, push) lives outside the engine;
//! the lifecycle manager calls these best-effort and only logs failures.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Booking, User};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_created(&self, user: &User, booking: &Booking) -> Result<(), NotifyError>;

    async fn booking_confirmed(&self, user: &User, booking: &Booking) -> Result<(), NotifyError>;

    async fn booking_cancelled(&self, user: &User, booking: &Booking) -> Result<(), NotifyError>;
}

/// Default collaborator: writes the event to the log and succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_created(&self, user: &User, booking: &Booking) -> Result<(), NotifyError> {
        tracing::info!(user = %user.email, booking_id = %booking.id, "booking created");
        Ok(())
    }

    async fn booking_confirmed(&self, user: &User, booking: &Booking) -> Result<(), NotifyError> {
        tracing::info!(user = %user.email, booking_id = %booking.id, "booking confirmed");
        Ok(())
    }

    async fn booking_cancelled(&self, user: &User, booking: &Booking) -> Result<(), NotifyError> {
        tracing::info!(user = %user.email, booking_id = %booking.id, "booking cancelled");
        Ok(())
    }
}

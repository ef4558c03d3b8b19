use uuid::Uuid;

use crate::models::{Booking, Role, TimeSlot, User};

/// Visibility capability supplied by the caller's identity layer.
///
/// The engine never resolves roles itself; the host authenticates the
/// request and passes the resulting capability into every scoped query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    /// Sees everything.
    Admin,
    /// Sees everything.
    Dev,
    /// Studio owner: sees bookings whose slot belongs to the owned studio.
    Owner { studio_id: Uuid },
    /// Regular client: sees only their own bookings.
    Client { user_id: Uuid },
}

impl Viewer {
    /// Derive the capability from an authenticated user. A USER_PRO without
    /// an owned studio degrades to a plain client view.
    pub fn for_user(user: &User, owned_studio: Option<Uuid>) -> Self {
        match user.role {
            Role::Admin => Self::Admin,
            Role::Dev => Self::Dev,
            Role::UserPro => match owned_studio {
                Some(studio_id) => Self::Owner { studio_id },
                None => Self::Client { user_id: user.id },
            },
            Role::User => Self::Client { user_id: user.id },
        }
    }

    pub fn can_view(&self, booking: &Booking, slot: &TimeSlot) -> bool {
        match self {
            Self::Admin | Self::Dev => true,
            Self::Owner { studio_id } => slot.studio_id == *studio_id,
            Self::Client { user_id } => booking.user_id == *user_id,
        }
    }
}

//! Minimal user administration the engine still owns: account removal is
//! blocked while the user holds active bookings.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{BookingStatus, Role, User};
use crate::store::{BookingStore, UserStore};

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub role: Role,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    bookings: Arc<dyn BookingStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, bookings: Arc<dyn BookingStore>) -> Self {
        Self { users, bookings }
    }

    pub async fn create_user(&self, req: CreateUser) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            role: req.role,
        };
        self.users.save(&user).await?;
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        self.users.find_by_id(id).await?.ok_or(Error::UserNotFound)
    }

    /// Cancel (or let expire) every booking first; deletion refuses to
    /// orphan an occupied slot.
    pub async fn delete_user(&self, id: Uuid) -> Result<()> {
        self.users.find_by_id(id).await?.ok_or(Error::UserNotFound)?;
        if self
            .bookings
            .exists_by_user_and_status_not(id, BookingStatus::Cancelled)
            .await?
        {
            return Err(Error::UserHasActiveBookings);
        }
        self.users.delete(id).await?;
        Ok(())
    }
}

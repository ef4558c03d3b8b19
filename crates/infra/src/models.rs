use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use engine::models::{Booking, Studio, TimeSlot, User};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StudioRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StudioRow> for Studio {
    fn from(row: StudioRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            admin_id: row.admin_id,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TimeSlotRow {
    pub id: Uuid,
    pub studio_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub available: bool,
    pub trial: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TimeSlotRow> for TimeSlot {
    fn from(row: TimeSlotRow) -> Self {
        Self {
            id: row.id,
            studio_id: row.studio_id,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            available: row.available,
            trial: row.trial,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub time_slot_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = String;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            time_slot_id: row.time_slot_id,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role.parse()?,
        })
    }
}

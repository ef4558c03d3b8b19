//! Studio administration and the per-studio analytics views.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::Studio;
use crate::store::{BookingStore, StudioStore, TimeSlotStore, UserStore};

#[derive(Debug, Clone)]
pub struct UpsertStudio {
    pub name: String,
    pub address: String,
}

#[derive(Clone)]
pub struct StudioService {
    studios: Arc<dyn StudioStore>,
    bookings: Arc<dyn BookingStore>,
    slots: Arc<dyn TimeSlotStore>,
    users: Arc<dyn UserStore>,
}

impl StudioService {
    pub fn new(
        studios: Arc<dyn StudioStore>,
        bookings: Arc<dyn BookingStore>,
        slots: Arc<dyn TimeSlotStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            studios,
            bookings,
            slots,
            users,
        }
    }

    pub async fn create_studio(&self, req: UpsertStudio) -> Result<Studio> {
        if self.studios.exists_by_name(&req.name).await? {
            return Err(Error::StudioAlreadyExists);
        }
        let studio = Studio {
            id: Uuid::new_v4(),
            name: req.name,
            address: req.address,
            admin_id: None,
        };
        self.studios.save(&studio).await?;
        Ok(studio)
    }

    pub async fn update_studio(&self, id: Uuid, req: UpsertStudio) -> Result<Studio> {
        let mut studio = self
            .studios
            .find_by_id(id)
            .await?
            .ok_or(Error::StudioNotFound)?;
        if studio.name != req.name && self.studios.exists_by_name(&req.name).await? {
            return Err(Error::StudioAlreadyExists);
        }
        studio.name = req.name;
        studio.address = req.address;
        self.studios.save(&studio).await?;
        Ok(studio)
    }

    pub async fn get_studio(&self, id: Uuid) -> Result<Studio> {
        self.studios
            .find_by_id(id)
            .await?
            .ok_or(Error::StudioNotFound)
    }

    pub async fn list_studios(&self) -> Result<Vec<Studio>> {
        Ok(self.studios.find_all().await?)
    }

    pub async fn delete_studio(&self, id: Uuid) -> Result<()> {
        self.studios
            .find_by_id(id)
            .await?
            .ok_or(Error::StudioNotFound)?;
        self.studios.delete(id).await?;
        Ok(())
    }

    /// Bind the owning USER_PRO account to the studio.
    pub async fn assign_admin(&self, studio_id: Uuid, user_id: Uuid) -> Result<Studio> {
        let mut studio = self
            .studios
            .find_by_id(studio_id)
            .await?
            .ok_or(Error::StudioNotFound)?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(Error::UserNotFound)?;
        studio.admin_id = Some(user_id);
        self.studios.save(&studio).await?;
        Ok(studio)
    }

    /// Active bookings per date over the inclusive range. Dates without any
    /// booking are absent from the map, not zero-filled.
    pub async fn occupancy(
        &self,
        studio_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, u32>> {
        let mut per_date = BTreeMap::new();
        for booking in self.bookings.find_all().await? {
            if !booking.is_active() {
                continue;
            }
            let Some(slot) = self.slots.find_by_id(booking.time_slot_id).await? else {
                continue;
            };
            if slot.studio_id == studio_id && slot.date >= start && slot.date <= end {
                *per_date.entry(slot.date).or_insert(0) += 1;
            }
        }
        Ok(per_date)
    }

    /// Distinct clients who booked in the studio during the range, counting
    /// bookings of any status.
    pub async fn unique_clients(
        &self,
        studio_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64> {
        let mut clients = HashSet::new();
        for booking in self.bookings.find_all().await? {
            let Some(slot) = self.slots.find_by_id(booking.time_slot_id).await? else {
                continue;
            };
            if slot.studio_id == studio_id && slot.date >= start && slot.date <= end {
                clients.insert(booking.user_id);
            }
        }
        Ok(clients.len() as u64)
    }
}

//! Postgres implementations of the engine's store traits.

pub mod db;
pub mod models;
pub mod repos;

pub use db::Db;
pub use repos::{BookingRepo, StudioRepo, TimeSlotRepo, UserRepo};

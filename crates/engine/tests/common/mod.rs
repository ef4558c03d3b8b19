#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use engine::store::{BookingStore, MemoryStore, StudioStore, TimeSlotStore, UserStore};
use engine::{
    BookingPolicy, BookingService, ConflictChecker, CreateTimeSlot, CreateUser, LogNotifier, Role,
    Studio, StudioService, TimeSlot, TimeSlotService, UpsertStudio, User, UserService,
};

pub struct TestApp {
    /// Raw store handle, for fixtures the services would refuse to create.
    pub store: MemoryStore,
    pub bookings: BookingService,
    pub slots: TimeSlotService,
    pub studios: StudioService,
    pub users: UserService,
}

pub fn setup() -> TestApp {
    setup_with_policy(BookingPolicy::default())
}

pub fn setup_with_policy(policy: BookingPolicy) -> TestApp {
    let store = MemoryStore::new();
    let slot_store: Arc<dyn TimeSlotStore> = Arc::new(store.clone());
    let booking_store: Arc<dyn BookingStore> = Arc::new(store.clone());
    let studio_store: Arc<dyn StudioStore> = Arc::new(store.clone());
    let user_store: Arc<dyn UserStore> = Arc::new(store.clone());

    let checker = ConflictChecker::new(slot_store.clone(), booking_store.clone(), policy);

    TestApp {
        store,
        bookings: BookingService::new(
            booking_store.clone(),
            slot_store.clone(),
            user_store.clone(),
            checker.clone(),
            Arc::new(LogNotifier),
        ),
        slots: TimeSlotService::new(
            slot_store.clone(),
            studio_store.clone(),
            booking_store.clone(),
            checker,
        ),
        studios: StudioService::new(studio_store, booking_store.clone(), slot_store, user_store.clone()),
        users: UserService::new(user_store, booking_store),
    }
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("test date")
}

pub fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").expect("test time")
}

pub async fn create_test_user(app: &TestApp, role: Role) -> User {
    app.users
        .create_user(CreateUser {
            email: format!("{}@example.com", Uuid::new_v4()),
            first_name: "Test".into(),
            last_name: Some("User".into()),
            role,
        })
        .await
        .expect("create test user")
}

pub async fn create_test_studio(app: &TestApp, name: &str) -> Studio {
    app.studios
        .create_studio(UpsertStudio {
            name: name.into(),
            address: "1 Main St".into(),
        })
        .await
        .expect("create test studio")
}

pub async fn create_test_slot(
    app: &TestApp,
    studio: &Studio,
    day: &str,
    start: &str,
    end: &str,
) -> TimeSlot {
    app.slots
        .create_slot(CreateTimeSlot {
            studio_id: studio.id,
            date: date(day),
            start_time: time(start),
            end_time: time(end),
        })
        .await
        .expect("create test slot")
}

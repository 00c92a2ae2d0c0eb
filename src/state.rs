use std::sync::Arc;

use crate::{
    config::Config,
    db::{BookingStore, DbPool, SlotStore, UserStore},
    services::{AuthService, BookingService, Pricing},
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: DbPool,
    pub auth: Arc<AuthService>,
    pub users: UserStore,
    pub slots: SlotStore,
    pub bookings: BookingStore,
    pub booking_service: BookingService,
}

impl AppState {
    pub fn new(config: Config, pool: DbPool) -> Self {
        let auth = Arc::new(AuthService::new(
            &config.session_secret,
            config.session_ttl_hours,
        ));
        let users = UserStore::new(pool.clone());
        let slots = SlotStore::new(pool.clone());
        let bookings = BookingStore::new(pool.clone());
        let booking_service = BookingService::new(
            slots.clone(),
            bookings.clone(),
            Pricing::new(config.rate_per_hour),
        );

        Self {
            config: Arc::new(config),
            pool,
            auth,
            users,
            slots,
            bookings,
            booking_service,
        }
    }
}

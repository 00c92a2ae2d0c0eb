pub mod auth_service;
pub mod booking_service;

pub use auth_service::AuthService;
pub use booking_service::{BookingError, BookingService, Pricing};

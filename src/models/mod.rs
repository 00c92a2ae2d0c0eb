pub mod booking;
pub mod flash;
pub mod slot;
pub mod user;

pub use booking::{Booking, BookingDetails, BookingStatus, BookingWindow, WindowError};
pub use flash::{Flash, FlashKind};
pub use slot::Slot;
pub use user::{NewUser, Role, User};

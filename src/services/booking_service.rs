use crate::{
    db::{BookingStore, SlotStore, booking_store::NewBooking},
    error::{AppError, Result},
    models::{Booking, BookingStatus, BookingWindow, Slot, User, WindowError, booking},
};

const SECONDS_PER_HOUR: i64 = 3600;

/// Hourly pricing, billed per started hour with a one hour minimum
#[derive(Debug, Clone, Copy)]
pub struct Pricing {
    pub rate_per_hour: i64,
}

impl Pricing {
    pub fn new(rate_per_hour: i64) -> Self {
        Self { rate_per_hour }
    }

    pub fn billable_hours(window: &BookingWindow) -> i64 {
        let seconds = window.duration_seconds();
        ((seconds + SECONDS_PER_HOUR - 1) / SECONDS_PER_HOUR).max(1)
    }

    pub fn amount_for(&self, window: &BookingWindow) -> i64 {
        self.rate_per_hour * Self::billable_hours(window)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid date/time: {0}")]
    InvalidWindow(#[from] WindowError),
    #[error("Provide start and end time via search.")]
    MissingWindow,
    #[error("Slot not available.")]
    SlotUnavailable,
    #[error("Sorry, this slot was just booked.")]
    Conflict,
    #[error("Booking not found.")]
    NotFound,
    #[error("Only active bookings can be cancelled.")]
    NotCancellable,
    #[error(transparent)]
    Storage(#[from] AppError),
}

pub type BookingResult<T> = std::result::Result<T, BookingError>;

/// Search, booking and cancellation on top of the slot registry and ledger
#[derive(Clone)]
pub struct BookingService {
    slots: SlotStore,
    bookings: BookingStore,
    pricing: Pricing,
}

impl BookingService {
    pub fn new(slots: SlotStore, bookings: BookingStore, pricing: Pricing) -> Self {
        Self {
            slots,
            bookings,
            pricing,
        }
    }

    /// Build a window from optional query values. `Ok(None)` means the
    /// form has not been submitted yet.
    pub fn window_from_query(
        start: Option<&str>,
        end: Option<&str>,
    ) -> BookingResult<Option<BookingWindow>> {
        let start = start.map(str::trim).filter(|value| !value.is_empty());
        let end = end.map(str::trim).filter(|value| !value.is_empty());

        match (start, end) {
            (Some(start), Some(end)) => Ok(Some(BookingWindow::parse(start, end)?)),
            _ => Ok(None),
        }
    }

    /// Active slots that are free for the whole window
    pub async fn search(&self, window: &BookingWindow) -> Result<Vec<Slot>> {
        self.slots.available_slots(window).await
    }

    /// Book `slot_id` for `user` over `window`
    pub async fn book(
        &self,
        user: &User,
        slot_id: i64,
        window: &BookingWindow,
    ) -> BookingResult<(Booking, Slot)> {
        let window = &BookingWindow::new(window.start, window.end)?;

        let slot = self
            .slots
            .get_slot(slot_id)
            .await?
            .filter(|slot| slot.is_active)
            .ok_or(BookingError::SlotUnavailable)?;

        let new_booking = NewBooking {
            user_id: user.id,
            slot_id,
            window: *window,
            amount: self.pricing.amount_for(window),
            created_at: booking::now(),
        };

        match self.bookings.create_booking(&new_booking).await? {
            Some(created) => {
                tracing::info!(
                    "User {} booked slot {} from {} to {} for {}",
                    user.id,
                    slot.slot_number,
                    window.start,
                    window.end,
                    created.amount
                );
                Ok((created, slot))
            }
            None => {
                // The slot may have been deactivated after the first lookup
                let still_active = self
                    .slots
                    .get_slot(slot_id)
                    .await?
                    .is_some_and(|slot| slot.is_active);

                if still_active {
                    tracing::info!("Booking conflict on slot {} for user {}", slot_id, user.id);
                    Err(BookingError::Conflict)
                } else {
                    Err(BookingError::SlotUnavailable)
                }
            }
        }
    }

    /// Cancel one of `user`'s own `booked` bookings
    pub async fn cancel(&self, user: &User, booking_id: i64) -> BookingResult<Booking> {
        let booking = self
            .bookings
            .get_booking_for_user(booking_id, user.id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if booking.status != BookingStatus::Booked {
            return Err(BookingError::NotCancellable);
        }

        if !self.bookings.cancel_booking(booking_id, user.id).await? {
            return Err(BookingError::NotCancellable);
        }

        tracing::info!("User {} cancelled booking {}", user.id, booking_id);
        Ok(Booking {
            status: BookingStatus::Cancelled,
            ..booking
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: &str, end: &str) -> BookingWindow {
        BookingWindow::parse(start, end).unwrap()
    }

    #[test]
    fn one_hour_and_one_minute_bills_two_hours() {
        let pricing = Pricing::new(20);
        let w = window("2025-03-01T10:00", "2025-03-01T11:01");
        assert_eq!(Pricing::billable_hours(&w), 2);
        assert_eq!(pricing.amount_for(&w), 40);
    }

    #[test]
    fn exactly_sixty_minutes_bills_one_hour() {
        let pricing = Pricing::new(20);
        let w = window("2025-03-01T10:00:00", "2025-03-01T11:00:00");
        assert_eq!(Pricing::billable_hours(&w), 1);
        assert_eq!(pricing.amount_for(&w), 20);
    }

    #[test]
    fn short_stays_bill_the_minimum_hour() {
        let w = window("2025-03-01T10:00:00", "2025-03-01T10:00:01");
        assert_eq!(Pricing::billable_hours(&w), 1);
    }

    #[test]
    fn missing_query_values_mean_no_search_yet() {
        assert!(matches!(
            BookingService::window_from_query(None, Some("2025-03-01T10:00")),
            Ok(None)
        ));
        assert!(matches!(
            BookingService::window_from_query(Some(""), Some("")),
            Ok(None)
        ));
    }

    #[test]
    fn inverted_query_window_is_invalid() {
        let err = BookingService::window_from_query(
            Some("2025-03-01T12:00"),
            Some("2025-03-01T10:00"),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid date/time: End time must be after start time"
        );
    }
}

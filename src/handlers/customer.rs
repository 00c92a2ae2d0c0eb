use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::{
    error::Result,
    handlers::session::{CustomerUser, IncomingFlash, Page, flash_redirect},
    models::{BookingWindow, Flash, FlashKind},
    services::{BookingError, BookingService, booking_service::BookingResult},
    state::AppState,
    views::{self, Chrome},
};

/// `start`/`end` query values as submitted by the search form
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl WindowQuery {
    fn window(&self) -> BookingResult<Option<BookingWindow>> {
        BookingService::window_from_query(self.start.as_deref(), self.end.as_deref())
    }
}

fn flash_kind(err: &BookingError) -> FlashKind {
    match err {
        BookingError::MissingWindow | BookingError::Conflict | BookingError::NotCancellable => {
            FlashKind::Warning
        }
        _ => FlashKind::Danger,
    }
}

/// Search form and the slots free for the submitted window
pub async fn search(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
    flash: IncomingFlash,
    Query(query): Query<WindowQuery>,
) -> Result<Page> {
    let start = query.start.as_deref().unwrap_or_default();
    let end = query.end.as_deref().unwrap_or_default();

    let (window, slots, error) = match query.window() {
        Ok(Some(window)) => {
            let slots = state.booking_service.search(&window).await?;
            (Some(window), slots, None)
        }
        Ok(None) => (None, Vec::new(), None),
        Err(BookingError::Storage(err)) => return Err(err),
        Err(err) => (None, Vec::new(), Some(Flash::new(flash_kind(&err), err.to_string()))),
    };

    let chrome = Chrome {
        user: Some(&user),
        flash: error.as_ref().or(flash.message.as_ref()),
    };
    let results = window.as_ref().map(|window| (window, slots.as_slice()));
    let html = views::customer_search(&chrome, start, end, results);
    if error.is_some() {
        Ok(Page::deferring(html, &flash))
    } else {
        Ok(Page::new(html, &flash))
    }
}

/// Book a slot for the window carried in the query string
pub async fn book(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
    Path(slot_id): Path<i64>,
    Query(query): Query<WindowQuery>,
) -> Result<Response> {
    let window = match query.window() {
        Ok(Some(window)) => window,
        Ok(None) => {
            let err = BookingError::MissingWindow;
            return Ok(flash_redirect(&state, flash_kind(&err), err.to_string(), "/customer/search"));
        }
        Err(BookingError::Storage(err)) => return Err(err),
        Err(err) => {
            return Ok(flash_redirect(&state, flash_kind(&err), err.to_string(), "/customer/search"));
        }
    };

    match state.booking_service.book(&user, slot_id, &window).await {
        Ok((booking, slot)) => Ok(flash_redirect(
            &state,
            FlashKind::Success,
            format!(
                "Booked Slot {} for {}{}.",
                slot.slot_number, state.config.currency, booking.amount
            ),
            "/customer/bookings",
        )),
        Err(BookingError::Storage(err)) => Err(err),
        Err(err) => {
            let back_to_search = format!("/customer/search?{}", window.query_string());
            Ok(flash_redirect(&state, flash_kind(&err), err.to_string(), &back_to_search))
        }
    }
}

/// The customer's own bookings, newest first
pub async fn bookings(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
    flash: IncomingFlash,
) -> Result<Page> {
    let bookings = state.bookings.get_bookings_for_user(user.id).await?;

    let chrome = Chrome {
        user: Some(&user),
        flash: flash.message.as_ref(),
    };
    Ok(Page::new(
        views::customer_bookings(&chrome, &bookings, &state.config.currency),
        &flash,
    ))
}

/// Cancel one of the customer's own active bookings
pub async fn cancel(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
    Path(booking_id): Path<i64>,
) -> Result<Response> {
    match state.booking_service.cancel(&user, booking_id).await {
        Ok(_) => Ok(flash_redirect(
            &state,
            FlashKind::Info,
            "Booking cancelled.",
            "/customer/bookings",
        )),
        Err(BookingError::Storage(err)) => Err(err),
        Err(err) => Ok(flash_redirect(
            &state,
            flash_kind(&err),
            err.to_string(),
            "/customer/bookings",
        )),
    }
}

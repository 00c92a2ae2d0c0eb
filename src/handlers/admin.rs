use axum::{
    extract::{Form, Path, State},
    response::Response,
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    handlers::session::{AdminUser, IncomingFlash, Page, flash_redirect},
    models::FlashKind,
    state::AppState,
    views::{self, AdminStats, Chrome},
};

pub const MAX_SLOTS: i64 = 10_000;

/// Slot reset form
#[derive(Debug, Deserialize)]
pub struct SetSlotsRequest {
    #[serde(default)]
    pub count: String,
}

/// Parse the requested slot count, accepting `1..=MAX_SLOTS`
pub fn parse_slot_count(raw: &str) -> Option<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|count| (1..=MAX_SLOTS).contains(count))
}

pub async fn dashboard(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    flash: IncomingFlash,
) -> Result<Page> {
    let stats = AdminStats {
        total_slots: state.slots.count_slots().await?,
        active_slots: state.slots.count_active_slots().await?,
        users: state.users.count_users().await?,
        total_bookings: state.bookings.count_bookings().await?,
    };

    let chrome = Chrome {
        user: Some(&admin),
        flash: flash.message.as_ref(),
    };
    Ok(Page::new(views::admin_dashboard(&chrome, &stats), &flash))
}

pub async fn slots(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    flash: IncomingFlash,
) -> Result<Page> {
    let slots = state.slots.get_all_slots().await?;

    let chrome = Chrome {
        user: Some(&admin),
        flash: flash.message.as_ref(),
    };
    Ok(Page::new(views::admin_slots(&chrome, &slots), &flash))
}

pub async fn toggle_slot(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(slot_id): Path<i64>,
) -> Result<Response> {
    match state.slots.toggle_slot(slot_id).await {
        Ok(slot) => {
            tracing::info!(
                "Admin {} set slot {} to {}",
                admin.id,
                slot.slot_number,
                slot.status_label()
            );
            Ok(flash_redirect(
                &state,
                FlashKind::Info,
                format!("Slot {} set to {}.", slot.slot_number, slot.status_label()),
                "/admin/slots",
            ))
        }
        Err(AppError::NotFound(_)) => Ok(flash_redirect(
            &state,
            FlashKind::Danger,
            "Slot not found.",
            "/admin/slots",
        )),
        Err(err) => Err(err),
    }
}

pub async fn bookings(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    flash: IncomingFlash,
) -> Result<Page> {
    let bookings = state.bookings.get_all_bookings().await?;

    let chrome = Chrome {
        user: Some(&admin),
        flash: flash.message.as_ref(),
    };
    Ok(Page::new(
        views::admin_bookings(&chrome, &bookings, &state.config.currency),
        &flash,
    ))
}

/// Replace every slot with `count` fresh active slots
pub async fn set_slots(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(request): Form<SetSlotsRequest>,
) -> Result<Response> {
    let Some(count) = parse_slot_count(&request.count) else {
        return Ok(flash_redirect(
            &state,
            FlashKind::Danger,
            format!("Invalid count: Count must be between 1 and {MAX_SLOTS}"),
            "/admin",
        ));
    };

    state.slots.reset_slots(count).await?;
    tracing::warn!("Admin {} recreated {} slots", admin.id, count);

    Ok(flash_redirect(
        &state,
        FlashKind::Success,
        format!("Recreated {count} slots."),
        "/admin/slots",
    ))
}

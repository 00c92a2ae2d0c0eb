use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::{
    error::Result,
    handlers::session::{IncomingFlash, MaybeUser, Page},
    models::booking,
    state::AppState,
    views::{self, Chrome, HomeStats},
};

/// Landing page with slot and booking counts
pub async fn index(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    flash: IncomingFlash,
) -> Result<Page> {
    let stats = HomeStats {
        active_slots: state.slots.count_active_slots().await?,
        total_bookings: state.bookings.count_bookings().await?,
        upcoming: state.bookings.count_upcoming(booking::now()).await?,
    };

    let chrome = Chrome {
        user: user.as_ref(),
        flash: flash.message.as_ref(),
    };
    Ok(Page::new(views::home(&chrome, &stats), &flash))
}

/// Liveness probe, including a round trip to the database
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "database": "ok",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        ),
        Err(err) => {
            tracing::error!("Health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "database": "unreachable",
                    "version": env!("CARGO_PKG_VERSION"),
                })),
            )
        }
    }
}

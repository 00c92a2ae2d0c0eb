use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod customer;
pub mod home;
pub mod session;

/// All routes of the portal
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(home::index))
        .route("/health", get(home::health))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout));

    let customer = Router::new()
        .route("/customer/search", get(customer::search))
        .route("/customer/book/{slot_id}", get(customer::book))
        .route("/customer/bookings", get(customer::bookings))
        .route("/customer/cancel/{booking_id}", get(customer::cancel));

    let admin = Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/slots", get(admin::slots))
        .route("/admin/slots/toggle/{slot_id}", get(admin::toggle_slot))
        .route("/admin/bookings", get(admin::bookings))
        .route("/admin/set-slots", post(admin::set_slots));

    Router::new()
        .merge(public)
        .merge(customer)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! Server-rendered HTML pages.
//!
//! Every value coming from the database or the request goes through
//! [`escape`] before it is interpolated.

use std::fmt::Write;

use axum::http::StatusCode;

use crate::models::{
    BookingDetails, BookingStatus, BookingWindow, Flash, Slot, User, booking::input_value,
};

pub const APP_TITLE: &str = "Online Parking System";

/// Parts of the layout shared by every page
pub struct Chrome<'a> {
    pub user: Option<&'a User>,
    pub flash: Option<&'a Flash>,
}

pub struct HomeStats {
    pub active_slots: i64,
    pub total_bookings: i64,
    pub upcoming: i64,
}

pub struct AdminStats {
    pub total_slots: i64,
    pub active_slots: i64,
    pub users: i64,
    pub total_bookings: i64,
}

pub enum AuthForm {
    Register,
    Login,
}

pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(chrome: &Chrome, heading: &str, content: &str) -> String {
    let nav = match chrome.user {
        Some(user) if user.is_admin() => format!(
            r#"<a class="nav-link" href="/admin">Dashboard</a>
<a class="nav-link" href="/admin/slots">Slots</a>
<a class="nav-link" href="/admin/bookings">Bookings</a>
<span class="navbar-text mx-2">{}</span>
<a class="nav-link" href="/logout">Logout</a>"#,
            escape(&user.name)
        ),
        Some(user) => format!(
            r#"<a class="nav-link" href="/customer/search">Find a slot</a>
<a class="nav-link" href="/customer/bookings">My bookings</a>
<span class="navbar-text mx-2">{}</span>
<a class="nav-link" href="/logout">Logout</a>"#,
            escape(&user.name)
        ),
        None => r#"<a class="nav-link" href="/login">Login</a>
<a class="nav-link" href="/register">Register</a>"#
            .to_string(),
    };

    let flash = chrome
        .flash
        .map(|flash| {
            format!(
                r#"<div class="alert alert-{}" role="alert">{}</div>"#,
                flash.kind.as_str(),
                escape(&flash.message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{heading} · {APP_TITLE}</title>
<link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet">
<style>body {{ padding-top: 4.5rem; }} .brand {{ font-weight: 700; }} .card {{ border-radius: 1rem; }}</style>
</head>
<body>
<nav class="navbar navbar-expand navbar-dark bg-dark fixed-top">
<div class="container">
<a class="navbar-brand brand" href="/">{APP_TITLE}</a>
<div class="navbar-nav ms-auto">
{nav}
</div>
</div>
</nav>
<main class="container">
{flash}
<h1 class="h3 mb-4">{heading}</h1>
{content}
</main>
</body>
</html>
"#,
        heading = escape(heading),
    )
}

fn stat_card(label: &str, value: i64) -> String {
    format!(
        r#"<div class="col"><div class="card p-3"><div class="text-muted">{label}</div><div class="fs-3">{value}</div></div></div>"#
    )
}

pub fn home(chrome: &Chrome, stats: &HomeStats) -> String {
    let call_to_action = match chrome.user {
        None => r#"<a class="btn btn-primary" href="/login">Log in</a> <a class="btn btn-outline-primary" href="/register">Create account</a>"#,
        Some(user) if user.is_admin() => r#"<a class="btn btn-primary" href="/admin">Open admin dashboard</a>"#,
        Some(_) => r#"<a class="btn btn-primary" href="/customer/search">Find a parking slot</a>"#,
    };

    let content = format!(
        r#"<div class="row g-3 mb-4">{}{}{}</div>
<p>{call_to_action}</p>"#,
        stat_card("Active slots", stats.active_slots),
        stat_card("Total bookings", stats.total_bookings),
        stat_card("Upcoming bookings", stats.upcoming),
    );

    layout(chrome, "Welcome", &content)
}

pub fn auth_form(chrome: &Chrome, form: AuthForm) -> String {
    let (heading, action, cta, name_field, footer) = match form {
        AuthForm::Register => (
            "Create Account",
            "/register",
            "Sign up",
            r#"<div class="mb-3"><label class="form-label">Name</label><input name="name" class="form-control" required></div>"#,
            r#"Already registered? <a href="/login">Log in</a>"#,
        ),
        AuthForm::Login => (
            "Log in",
            "/login",
            "Log in",
            "",
            r#"New here? <a href="/register">Create an account</a>"#,
        ),
    };

    let content = format!(
        r#"<div class="card p-4" style="max-width: 28rem">
<form method="post" action="{action}">
{name_field}
<div class="mb-3"><label class="form-label">Email</label><input type="email" name="email" class="form-control" required></div>
<div class="mb-3"><label class="form-label">Password</label><input type="password" name="password" class="form-control" required></div>
<button class="btn btn-primary" type="submit">{cta}</button>
</form>
<p class="mt-3 mb-0">{footer}</p>
</div>"#
    );

    layout(chrome, heading, &content)
}

/// Search form plus, once a window was submitted, the free slots
pub fn customer_search(
    chrome: &Chrome,
    start: &str,
    end: &str,
    results: Option<(&BookingWindow, &[Slot])>,
) -> String {
    let mut content = format!(
        r#"<form class="row g-3 mb-4" method="get" action="/customer/search">
<div class="col-md-4"><label class="form-label">Start</label><input class="form-control" type="datetime-local" name="start" value="{}" required></div>
<div class="col-md-4"><label class="form-label">End</label><input class="form-control" type="datetime-local" name="end" value="{}" required></div>
<div class="col-md-4 align-self-end"><button class="btn btn-primary" type="submit">Search</button></div>
</form>"#,
        escape(start),
        escape(end)
    );

    if let Some((window, slots)) = results {
        if slots.is_empty() {
            content.push_str(r#"<p class="text-muted">No slots are free for this window.</p>"#);
        } else {
            content.push_str(r#"<table class="table"><thead><tr><th>Slot</th><th>Status</th><th></th></tr></thead><tbody>"#);
            let query = window.query_string();
            for slot in slots {
                let _ = write!(
                    content,
                    r#"<tr><td>Slot {}</td><td>{}</td><td><a class="btn btn-sm btn-success" href="/customer/book/{}?{}">Book</a></td></tr>"#,
                    slot.slot_number,
                    slot.status_label(),
                    slot.id,
                    escape(&query)
                );
            }
            content.push_str("</tbody></table>");
        }
    }

    layout(chrome, "Find a parking slot", &content)
}

fn status_badge(status: BookingStatus) -> String {
    let color = match status {
        BookingStatus::Booked => "primary",
        BookingStatus::Cancelled => "secondary",
        BookingStatus::Completed => "success",
    };
    format!(r#"<span class="badge bg-{color}">{}</span>"#, status.as_str())
}

fn format_timestamp(booking_time: &chrono::NaiveDateTime) -> String {
    escape(&input_value(booking_time).replace('T', " "))
}

pub fn customer_bookings(chrome: &Chrome, bookings: &[BookingDetails], currency: &str) -> String {
    if bookings.is_empty() {
        let content = r#"<p class="text-muted">You have no bookings yet. <a href="/customer/search">Find a slot</a>.</p>"#;
        return layout(chrome, "My bookings", content);
    }

    let mut content = String::from(
        r#"<table class="table"><thead><tr><th>#</th><th>Slot</th><th>Start</th><th>End</th><th>Amount</th><th>Status</th><th></th></tr></thead><tbody>"#,
    );
    for details in bookings {
        let booking = &details.booking;
        let action = if booking.status == BookingStatus::Booked {
            format!(
                r#"<a class="btn btn-sm btn-outline-danger" href="/customer/cancel/{}">Cancel</a>"#,
                booking.id
            )
        } else {
            String::new()
        };
        let _ = write!(
            content,
            "<tr><td>{}</td><td>Slot {}</td><td>{}</td><td>{}</td><td>{}{}</td><td>{}</td><td>{}</td></tr>",
            booking.id,
            details.slot_number,
            format_timestamp(&booking.start_time),
            format_timestamp(&booking.end_time),
            escape(currency),
            booking.amount,
            status_badge(booking.status),
            action
        );
    }
    content.push_str("</tbody></table>");

    layout(chrome, "My bookings", &content)
}

pub fn admin_dashboard(chrome: &Chrome, stats: &AdminStats) -> String {
    let default_count = if stats.total_slots > 0 { stats.total_slots } else { 20 };
    let content = format!(
        r#"<div class="row g-3 mb-4">{}{}{}{}</div>
<div class="card p-4">
<h2 class="h5">Reset slots</h2>
<p class="text-muted">Deletes every slot, together with its bookings, and recreates slots numbered from 1.</p>
<form method="post" action="/admin/set-slots" class="row g-3">
<div class="col-md-4"><input class="form-control" type="number" name="count" min="1" max="10000" value="{default_count}" required></div>
<div class="col-md-4"><button class="btn btn-danger" type="submit">Recreate slots</button></div>
</form>
</div>"#,
        stat_card("Total slots", stats.total_slots),
        stat_card("Active slots", stats.active_slots),
        stat_card("Users", stats.users),
        stat_card("Total bookings", stats.total_bookings),
    );

    layout(chrome, "Admin dashboard", &content)
}

pub fn admin_slots(chrome: &Chrome, slots: &[Slot]) -> String {
    let mut content = String::from(
        r#"<table class="table"><thead><tr><th>Slot</th><th>Status</th><th></th></tr></thead><tbody>"#,
    );
    for slot in slots {
        let (badge, action) = if slot.is_active {
            ("success", "Deactivate")
        } else {
            ("secondary", "Activate")
        };
        let _ = write!(
            content,
            r#"<tr><td>Slot {}</td><td><span class="badge bg-{badge}">{}</span></td><td><a class="btn btn-sm btn-outline-primary" href="/admin/slots/toggle/{}">{action}</a></td></tr>"#,
            slot.slot_number,
            slot.status_label(),
            slot.id
        );
    }
    content.push_str("</tbody></table>");

    layout(chrome, "Slots", &content)
}

pub fn admin_bookings(chrome: &Chrome, bookings: &[BookingDetails], currency: &str) -> String {
    let mut content = String::from(
        r#"<table class="table"><thead><tr><th>#</th><th>User</th><th>Email</th><th>Slot</th><th>Start</th><th>End</th><th>Amount</th><th>Status</th><th>Created</th></tr></thead><tbody>"#,
    );
    for details in bookings {
        let booking = &details.booking;
        let _ = write!(
            content,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>Slot {}</td><td>{}</td><td>{}</td><td>{}{}</td><td>{}</td><td>{}</td></tr>",
            booking.id,
            escape(details.user_name.as_deref().unwrap_or("")),
            escape(details.user_email.as_deref().unwrap_or("")),
            details.slot_number,
            format_timestamp(&booking.start_time),
            format_timestamp(&booking.end_time),
            escape(currency),
            booking.amount,
            status_badge(booking.status),
            format_timestamp(&booking.created_at)
        );
    }
    content.push_str("</tbody></table>");

    layout(chrome, "All bookings", &content)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let chrome = Chrome {
        user: None,
        flash: None,
    };
    let content = format!(
        r#"<p>{}</p><p><a href="/">Back to the home page</a></p>"#,
        escape(message)
    );
    layout(&chrome, status.canonical_reason().unwrap_or("Error"), &content)
}

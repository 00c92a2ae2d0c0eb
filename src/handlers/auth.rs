use axum::{
    extract::{Form, State},
    response::Response,
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    handlers::session::{
        IncomingFlash, MaybeUser, Page, flash_redirect, login_redirect, logout_redirect,
    },
    models::{Flash, FlashKind, NewUser, Role, user::normalize_email},
    services::auth_service::{hash_password, verify_password},
    state::AppState,
    views::{self, AuthForm, Chrome},
};

/// Registration form
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn register_form(MaybeUser(user): MaybeUser, flash: IncomingFlash) -> Page {
    let chrome = Chrome {
        user: user.as_ref(),
        flash: flash.message.as_ref(),
    };
    Page::new(views::auth_form(&chrome, AuthForm::Register), &flash)
}

/// Create a customer account
pub async fn register(
    State(state): State<AppState>,
    Form(request): Form<RegisterRequest>,
) -> Result<Response> {
    let name = request.name.trim().to_string();
    let email = normalize_email(&request.email);

    if name.is_empty() || email.is_empty() || request.password.is_empty() {
        return Ok(flash_redirect(
            &state,
            FlashKind::Danger,
            "All fields are required.",
            "/register",
        ));
    }

    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let created = state
        .users
        .create_user(NewUser {
            name,
            email: email.clone(),
            password_hash,
            role: Role::Customer,
        })
        .await;

    match created {
        Ok(user) => {
            tracing::info!("Registered user {} ({})", user.id, user.email);
            Ok(flash_redirect(
                &state,
                FlashKind::Success,
                "Registered! Please log in.",
                "/login",
            ))
        }
        Err(AppError::EmailTaken) => {
            tracing::info!("Registration rejected, email {} already exists", email);
            Ok(flash_redirect(
                &state,
                FlashKind::Danger,
                "Email already exists.",
                "/register",
            ))
        }
        Err(err) => Err(err),
    }
}

pub async fn login_form(MaybeUser(user): MaybeUser, flash: IncomingFlash) -> Page {
    let chrome = Chrome {
        user: user.as_ref(),
        flash: flash.message.as_ref(),
    };
    Page::new(views::auth_form(&chrome, AuthForm::Login), &flash)
}

/// Verify credentials and start a session
pub async fn login(
    State(state): State<AppState>,
    Form(request): Form<LoginRequest>,
) -> Result<Response> {
    let email = normalize_email(&request.email);

    if let Some(user) = state.users.get_user_by_email(&email).await? {
        let password = request.password;
        let password_hash = user.password_hash.clone();
        let verified =
            tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;

        if verified {
            let token = state.auth.issue_session(&user)?;
            tracing::info!("User {} logged in", user.id);
            return Ok(login_redirect(
                &state,
                &token,
                Flash::new(FlashKind::Success, "Welcome back!"),
                "/",
            ));
        }
    }

    tracing::warn!("Failed login attempt for {}", email);
    Ok(flash_redirect(
        &state,
        FlashKind::Danger,
        "Invalid credentials.",
        "/login",
    ))
}

pub async fn logout(State(state): State<AppState>) -> Response {
    logout_redirect(&state, Flash::new(FlashKind::Info, "Logged out."), "/")
}

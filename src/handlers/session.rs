//! Cookie-backed identity and flash messages.
//!
//! Handlers never look up the logged-in user themselves: they ask for one of
//! the extractors below and receive the identity as a value.

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, LOCATION, SET_COOKIE},
        request::Parts,
        StatusCode,
    },
    response::{Html, IntoResponse, Response},
};

use crate::{
    error::AppError,
    models::{Flash, FlashKind, User},
    state::AppState,
};

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

/// Value of the cookie `name`, looking through every `Cookie` header
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}")
}

pub fn expired_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn flash_cookie(state: &AppState, flash: &Flash) -> Option<String> {
    match state.auth.encode_flash(flash) {
        Ok(token) => Some(format!("{FLASH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")),
        Err(err) => {
            tracing::error!("Failed to sign flash message: {}", err);
            None
        }
    }
}

/// `303 See Other` to `location`, setting the given cookies
pub fn redirect_with_cookies(location: &str, cookies: Vec<String>) -> Response {
    let mut response = StatusCode::SEE_OTHER.into_response();
    let headers = response.headers_mut();

    match HeaderValue::from_str(location) {
        Ok(value) => {
            headers.insert(LOCATION, value);
        }
        Err(_) => {
            headers.insert(LOCATION, HeaderValue::from_static("/"));
        }
    }

    for cookie in cookies {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.append(SET_COOKIE, value);
        }
    }

    response
}

/// Redirect to `location` with a message for the next rendered page
pub fn flash_redirect(
    state: &AppState,
    kind: FlashKind,
    message: impl Into<String>,
    location: &str,
) -> Response {
    let flash = Flash::new(kind, message);
    redirect_with_cookies(location, flash_cookie(state, &flash).into_iter().collect())
}

/// Redirect that logs the user in and greets them
pub fn login_redirect(state: &AppState, session_token: &str, flash: Flash, location: &str) -> Response {
    let mut cookies = vec![session_cookie(
        session_token,
        state.auth.session_ttl_seconds(),
    )];
    cookies.extend(flash_cookie(state, &flash));
    redirect_with_cookies(location, cookies)
}

/// Redirect that drops the session cookie
pub fn logout_redirect(state: &AppState, flash: Flash, location: &str) -> Response {
    let mut cookies = vec![expired_cookie(SESSION_COOKIE)];
    cookies.extend(flash_cookie(state, &flash));
    redirect_with_cookies(location, cookies)
}

/// The logged-in user, if any
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(user_id) = cookie_value(&parts.headers, SESSION_COOKIE)
            .and_then(|token| state.auth.read_session(token))
        else {
            return Ok(MaybeUser(None));
        };

        // A valid token for a user that no longer exists reads as logged out
        Ok(MaybeUser(state.users.get_user_by_id(user_id).await?))
    }
}

/// Any logged-in user
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await {
            Ok(MaybeUser(Some(user))) => Ok(CurrentUser(user)),
            Ok(MaybeUser(None)) => Err(flash_redirect(
                state,
                FlashKind::Warning,
                "Please log in first.",
                "/login",
            )),
            Err(err) => Err(err.into_response()),
        }
    }
}

/// A logged-in non-admin user
pub struct CustomerUser(pub User);

impl FromRequestParts<AppState> for CustomerUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.is_admin() {
            return Err(flash_redirect(
                state,
                FlashKind::Warning,
                "Admins cannot book. Use a customer account.",
                "/",
            ));
        }
        Ok(CustomerUser(user))
    }
}

/// A logged-in admin
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await {
            Ok(MaybeUser(Some(user))) if user.is_admin() => Ok(AdminUser(user)),
            Ok(_) => Err(flash_redirect(
                state,
                FlashKind::Danger,
                "Admin access required.",
                "/",
            )),
            Err(err) => Err(err.into_response()),
        }
    }
}

/// Flash message left by the previous response
pub struct IncomingFlash {
    pub message: Option<Flash>,
    // A `flash` cookie arrived, even one that no longer verifies
    cookie_present: bool,
}

impl FromRequestParts<AppState> for IncomingFlash {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let cookie = cookie_value(&parts.headers, FLASH_COOKIE);
        Ok(IncomingFlash {
            message: cookie.and_then(|token| state.auth.decode_flash(token)),
            cookie_present: cookie.is_some(),
        })
    }
}

/// A rendered HTML page. Expires the flash cookie once its message was shown.
pub struct Page {
    html: String,
    clear_flash: bool,
}

impl Page {
    /// Page that displays the incoming flash message
    pub fn new(html: String, incoming: &IncomingFlash) -> Self {
        Self {
            html,
            clear_flash: incoming.cookie_present,
        }
    }

    /// Page that shows a message of its own. A readable incoming flash is
    /// left for the next page; an unreadable one is still cleared.
    pub fn deferring(html: String, incoming: &IncomingFlash) -> Self {
        Self {
            html,
            clear_flash: incoming.cookie_present && incoming.message.is_none(),
        }
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        let mut response = Html(self.html).into_response();
        if self.clear_flash {
            if let Ok(value) = HeaderValue::from_str(&expired_cookie(FLASH_COOKIE)) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; session=abc.def"));
        headers.append(COOKIE, HeaderValue::from_static("flash=xyz"));

        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("abc.def"));
        assert_eq!(cookie_value(&headers, FLASH_COOKIE), Some("xyz"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_reads_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session="));
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), None);
    }

    #[test]
    fn redirect_sets_location_and_every_cookie() {
        let response = redirect_with_cookies("/login", vec!["a=1".into(), "b=2".into()]);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/login");
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);
    }
}

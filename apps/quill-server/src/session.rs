//! Session and flash cookies.

use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite, time::Duration};

use crate::config::SessionConfig;

/// Cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "quill_session";

/// Cookie carrying one notice across a redirect.
pub const FLASH_COOKIE: &str = "quill_flash";

/// One-shot notices shown after a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    PostDeleted,
    PostPublished,
    LoggedOut,
}

impl Notice {
    pub fn key(self) -> &'static str {
        match self {
            Notice::PostDeleted => "post-deleted",
            Notice::PostPublished => "post-published",
            Notice::LoggedOut => "logged-out",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "post-deleted" => Some(Notice::PostDeleted),
            "post-published" => Some(Notice::PostPublished),
            "logged-out" => Some(Notice::LoggedOut),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Notice::PostDeleted => "Post deleted.",
            Notice::PostPublished => "Post published.",
            Notice::LoggedOut => "You have been signed out.",
        }
    }
}

pub fn session_cookie(token: String, max_age_seconds: i64, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

pub fn flash_cookie(notice: Notice) -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE, notice.key())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(5))
        .finish()
}

/// A cookie that makes the browser drop `name`.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// Pending notice, if the flash cookie holds a known key.
pub fn pending_notice(req: &HttpRequest) -> Option<Notice> {
    req.cookie(FLASH_COOKIE)
        .and_then(|c| Notice::from_key(c.value()))
}

/// Session token from the cookie, falling back to a Bearer header.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

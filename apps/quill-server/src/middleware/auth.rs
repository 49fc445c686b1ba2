//! Authentication extractors.

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::StatusCode, web};
use std::future::{Ready, ready};

use quill_core::ports::{AuthError, TokenClaims};

use crate::session::{self, Notice};
use crate::state::AppState;

/// Path of the login page unauthenticated visitors are sent to.
pub const LOGIN_PATH: &str = "/accounts/login";

/// Authenticated user identity extractor.
///
/// Use this in handlers to require a signed-in user:
/// ```ignore
/// async fn drafts(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.email)
/// }
/// ```
/// Anonymous requests are redirected to the login page with `?next=` set to
/// the page they asked for.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub email: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
        }
    }
}

impl Identity {
    fn resolve(req: &HttpRequest) -> Result<Self, AuthError> {
        let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
            tracing::error!("AppState not found in app data");
            AuthError::InvalidToken("Server configuration error".to_string())
        })?;

        let token = session::session_token(req).ok_or(AuthError::MissingAuth)?;
        state.tokens.validate_token(&token).map(Identity::from)
    }
}

/// Authentication failure, answered with a redirect to the login page.
#[derive(Debug)]
pub struct AuthenticationError {
    pub reason: AuthError,
    /// Page to return to after signing in.
    pub next: String,
}

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

/// Login URL that returns to `next` afterwards.
pub fn login_url(next: &str) -> String {
    let encoded: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("{LOGIN_PATH}?{encoded}")
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        tracing::debug!(reason = %self.reason, next = %self.next, "Redirecting to login");

        let mut response = HttpResponse::SeeOther();
        response.insert_header(("Location", login_url(&self.next)));

        // A stale or forged token should not keep bouncing the user around.
        if !matches!(self.reason, AuthError::MissingAuth) {
            response.cookie(session::removal_cookie(session::SESSION_COOKIE));
        }

        response.finish()
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::resolve(req).map_err(|reason| {
            let next = match req.uri().path_and_query() {
                Some(pq) => pq.as_str().to_string(),
                None => req.path().to_string(),
            };
            AuthenticationError { reason, next }
        }))
    }
}

/// Page chrome: who is signed in and which notice is pending.
///
/// Never fails; public pages use it to render the navigation.
#[derive(Debug, Clone, Default)]
pub struct Chrome {
    pub user_email: Option<String>,
    pub notice: Option<Notice>,
}

impl Chrome {
    pub fn for_request(req: &HttpRequest) -> Self {
        Chrome {
            user_email: Identity::resolve(req).ok().map(|identity| identity.email),
            notice: session::pending_notice(req),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_email.is_some()
    }

    pub fn notice_message(&self) -> Option<&'static str> {
        self.notice.map(Notice::message)
    }
}

impl FromRequest for Chrome {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Chrome::for_request(req)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_encodes_next() {
        assert_eq!(
            login_url("/post/new?x=1&y=2"),
            "/accounts/login?next=%2Fpost%2Fnew%3Fx%3D1%26y%3D2"
        );
    }
}

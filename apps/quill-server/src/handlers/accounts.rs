//! Sign in, registration and sign out.

use actix_web::{HttpResponse, http::StatusCode, web};

use quill_core::domain::User;
use quill_core::error::RepoError;
use quill_shared::dto::{LoginForm, NextQuery, RegisterForm};

use crate::middleware::auth::Chrome;
use crate::middleware::error::{AppError, AppResult};
use crate::session::{self, Notice, SESSION_COOKIE};
use crate::state::AppState;
use crate::views::{self, LoginTemplate, RegisterTemplate, paths};

const PASSWORD_MIN_CHARS: usize = 8;
const BAD_CREDENTIALS: &str = "Please enter a correct email and password.";
const EMAIL_TAKEN: &str = "An account with this email already exists.";

/// 303 to `location` carrying a fresh session cookie for `user`.
fn signed_in_redirect(state: &AppState, user: &User, location: &str) -> AppResult<HttpResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.email)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .cookie(session::session_cookie(
            token,
            state.tokens.expiration_seconds(),
            &state.session,
        ))
        .finish())
}

/// GET /accounts/login
pub async fn login_form(chrome: Chrome, query: web::Query<NextQuery>) -> AppResult<HttpResponse> {
    let next = query.local_target().unwrap_or(paths::POST_LIST);
    if chrome.is_signed_in() {
        return Ok(views::redirect(next));
    }

    views::render(
        StatusCode::OK,
        &chrome,
        LoginTemplate {
            chrome: chrome.clone(),
            email: String::new(),
            next: next.to_string(),
            error: None,
        },
    )
}

/// POST /accounts/login
pub async fn login(
    state: web::Data<AppState>,
    chrome: Chrome,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let next = form.local_target().unwrap_or(paths::POST_LIST);

    let user = state.users.find_by_email(&form.email).await?;
    let verified = match &user {
        Some(user) => state
            .passwords
            .verify(&form.password, &user.password_hash)
            .map_err(|e| AppError::Internal(e.to_string()))?,
        None => false,
    };

    match user.filter(|_| verified) {
        Some(user) => {
            tracing::info!(user_id = %user.id, "User signed in");
            signed_in_redirect(&state, &user, next)
        }
        None => {
            tracing::info!("Sign in rejected");
            views::render(
                StatusCode::UNAUTHORIZED,
                &chrome,
                LoginTemplate {
                    chrome: chrome.clone(),
                    email: form.email.clone(),
                    next: next.to_string(),
                    error: Some(BAD_CREDENTIALS),
                },
            )
        }
    }
}

/// GET /accounts/register
pub async fn register_form(chrome: Chrome) -> AppResult<HttpResponse> {
    views::render(
        StatusCode::OK,
        &chrome,
        RegisterTemplate {
            chrome: chrome.clone(),
            email: String::new(),
            errors: Vec::new(),
        },
    )
}

/// POST /accounts/register
pub async fn register(
    state: web::Data<AppState>,
    chrome: Chrome,
    form: web::Form<RegisterForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let email = form.email.trim();

    let mut errors = Vec::new();
    if !email.contains('@') {
        errors.push("Enter a valid email address.".to_string());
    }
    if form.password.chars().count() < PASSWORD_MIN_CHARS {
        errors.push(format!(
            "Password must be at least {PASSWORD_MIN_CHARS} characters."
        ));
    }
    if errors.is_empty() && state.users.find_by_email(email).await?.is_some() {
        errors.push(EMAIL_TAKEN.to_string());
    }

    if errors.is_empty() {
        let password_hash = state
            .passwords
            .hash(&form.password)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        match state.users.save(User::new(email, password_hash)).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "User registered");
                return signed_in_redirect(&state, &user, paths::POST_LIST);
            }
            // Lost a race with a concurrent registration.
            Err(RepoError::Constraint(_)) => errors.push(EMAIL_TAKEN.to_string()),
            Err(e) => return Err(e.into()),
        }
    }

    views::render(
        StatusCode::UNPROCESSABLE_ENTITY,
        &chrome,
        RegisterTemplate {
            chrome: chrome.clone(),
            email: email.to_string(),
            errors,
        },
    )
}

/// POST /accounts/logout
pub async fn logout() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", paths::POST_LIST))
        .cookie(session::removal_cookie(SESSION_COOKIE))
        .cookie(session::flash_cookie(Notice::LoggedOut))
        .finish()
}

//! Error handling - every failure ends as a rendered page.

use actix_web::dev::ServiceResponse;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use quill_core::error::{DomainError, RepoError};

use crate::middleware::auth::Chrome;
use crate::views::{self, NotFoundTemplate, ServerErrorTemplate};

/// Application-level error type that converts to HTML error pages.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let chrome = Chrome::default();
        match self {
            AppError::NotFound(detail) => {
                tracing::debug!("Not found: {}", detail);
                views::render_fallback(self.status_code(), NotFoundTemplate { chrome })
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                views::render_fallback(self.status_code(), ServerErrorTemplate { chrome })
            }
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Duplicate(msg) => AppError::Internal(format!("unexpected duplicate: {msg}")),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Internal(format!("constraint violation: {msg}")),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Re-render any 404 with the requester's navigation.
///
/// `ResponseError` has no access to the request, so the page it renders
/// always looks signed out.
pub fn render_not_found<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    // A pending notice stays pending for the next real page.
    let chrome = Chrome {
        notice: None,
        ..Chrome::for_request(res.request())
    };
    let page = views::render_fallback(StatusCode::NOT_FOUND, NotFoundTemplate { chrome });

    let (req, _) = res.into_parts();
    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, page).map_into_right_body(),
    ))
}

//! HTTP handlers and route configuration.

mod accounts;
mod health;
mod posts;

use actix_web::{HttpResponse, web};

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
    )
    .route("/health", web::get().to(health::health_check))
    // Public reading
    .route("/", web::get().to(posts::post_list))
    .service(
        web::resource("/post/new")
            .route(web::get().to(posts::new_post_form))
            .route(web::post().to(posts::create_post)),
    )
    .route("/post/{id}", web::get().to(posts::post_detail))
    // Authoring
    .service(
        web::resource("/post/{id}/edit")
            .route(web::get().to(posts::edit_post_form))
            .route(web::post().to(posts::update_post)),
    )
    .service(
        web::resource("/post/{id}/publish")
            .route(web::post().to(posts::publish_post))
            .default_service(web::to(HttpResponse::MethodNotAllowed)),
    )
    .service(
        web::resource("/post/{id}/delete")
            .route(web::post().to(posts::delete_post))
            .default_service(web::to(HttpResponse::MethodNotAllowed)),
    )
    .route("/drafts/", web::get().to(posts::draft_list))
    .route("/drafts/{id}", web::get().to(posts::draft_detail))
    // Accounts
    .service(
        web::scope("/accounts")
            .service(
                web::resource("/login")
                    .route(web::get().to(accounts::login_form))
                    .route(web::post().to(accounts::login)),
            )
            .service(
                web::resource("/register")
                    .route(web::get().to(accounts::register_form))
                    .route(web::post().to(accounts::register)),
            )
            .service(
                web::resource("/logout")
                    .route(web::post().to(accounts::logout))
                    .default_service(web::to(HttpResponse::MethodNotAllowed)),
            ),
    );
}

/// Fallback for unmatched routes.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("No route matches".to_string()))
}

//! Server-rendered pages.

use actix_web::{HttpResponse, http::StatusCode, http::header::ContentType};
use askama::Template;
use chrono::{DateTime, Utc};

use quill_core::domain::{FieldErrors, Post};

use crate::middleware::auth::Chrome;
use crate::middleware::error::{AppError, AppResult};
use crate::session::{self, FLASH_COOKIE, Notice};

/// Where each post page lives.
pub mod paths {
    use uuid::Uuid;

    pub const POST_LIST: &str = "/";
    pub const DRAFT_LIST: &str = "/drafts/";
    pub const NEW_POST: &str = "/post/new";

    pub fn post_detail(id: Uuid) -> String {
        format!("/post/{id}")
    }

    pub fn draft_detail(id: Uuid) -> String {
        format!("/drafts/{id}")
    }

    pub fn edit(id: Uuid) -> String {
        format!("/post/{id}/edit")
    }

    pub fn publish(id: Uuid) -> String {
        format!("/post/{id}/publish")
    }

    pub fn delete(id: Uuid) -> String {
        format!("/post/{id}/delete")
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y %H:%M UTC").to_string()
}

/// One entry of a post or draft list.
pub struct PostCard {
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub date: String,
}

const EXCERPT_CHARS: usize = 200;

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        let href = if post.is_published() {
            paths::post_detail(post.id)
        } else {
            paths::draft_detail(post.id)
        };

        let mut excerpt: String = post.content.chars().take(EXCERPT_CHARS).collect();
        if post.content.chars().count() > EXCERPT_CHARS {
            excerpt.push('…');
        }

        Self {
            href,
            title: post.title.clone(),
            excerpt,
            date: format_time(post.published_at.unwrap_or(post.created_at)),
        }
    }
}

/// A post laid out for its detail page.
pub struct PostView {
    pub title: String,
    pub paragraphs: Vec<String>,
    pub published: Option<String>,
    pub created: String,
    pub edit_href: String,
    pub publish_href: String,
    pub delete_href: String,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            paragraphs: post
                .content
                .split("\n\n")
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            published: post.published_at.map(format_time),
            created: format_time(post.created_at),
            edit_href: paths::edit(post.id),
            publish_href: paths::publish(post.id),
            delete_href: paths::delete(post.id),
        }
    }
}

#[derive(Template)]
#[template(path = "post_list.html")]
pub struct PostListTemplate {
    pub chrome: Chrome,
    pub heading: &'static str,
    pub empty_message: &'static str,
    pub posts: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate {
    pub chrome: Chrome,
    pub post: PostView,
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub chrome: Chrome,
    pub heading: &'static str,
    pub action: String,
    pub title: String,
    pub content: String,
    pub title_errors: Vec<String>,
    pub content_errors: Vec<String>,
}

impl PostFormTemplate {
    pub fn new(chrome: Chrome, heading: &'static str, action: String) -> Self {
        Self {
            chrome,
            heading,
            action,
            title: String::new(),
            content: String::new(),
            title_errors: Vec::new(),
            content_errors: Vec::new(),
        }
    }

    pub fn with_values(mut self, title: &str, content: &str) -> Self {
        self.title = title.to_string();
        self.content = content.to_string();
        self
    }

    pub fn with_errors(mut self, errors: &FieldErrors) -> Self {
        self.title_errors = errors.get("title").to_vec();
        self.content_errors = errors.get("content").to_vec();
        self
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub chrome: Chrome,
    pub email: String,
    pub next: String,
    pub error: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub chrome: Chrome,
    pub email: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub chrome: Chrome,
}

#[derive(Template)]
#[template(path = "server_error.html")]
pub struct ServerErrorTemplate {
    pub chrome: Chrome,
}

/// Render a page, consuming any pending flash notice.
pub fn render<T: Template>(status: StatusCode, chrome: &Chrome, template: T) -> AppResult<HttpResponse> {
    let body = template
        .render()
        .map_err(|e| AppError::Internal(format!("template rendering failed: {e}")))?;

    let mut response = HttpResponse::build(status);
    response.content_type(ContentType::html());
    if chrome.notice.is_some() {
        response.cookie(session::removal_cookie(FLASH_COOKIE));
    }

    Ok(response.body(body))
}

/// Render a page whose failure can only be reported as plain text.
pub fn render_fallback<T: Template>(status: StatusCode, template: T) -> HttpResponse {
    match template.render() {
        Ok(body) => HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, "Error page rendering failed");
            HttpResponse::build(status)
                .content_type(ContentType::plaintext())
                .body(status.canonical_reason().unwrap_or("Error"))
        }
    }
}

/// 303 to `location`, the answer to every successful form post.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

/// 303 to `location` that shows `notice` on the next page.
pub fn redirect_with_notice(location: &str, notice: Notice) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .cookie(session::flash_cookie(notice))
        .finish()
}

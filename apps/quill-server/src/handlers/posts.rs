//! Post reading and authoring handlers.

use actix_web::{HttpResponse, http::StatusCode, web};
use uuid::Uuid;

use quill_core::domain::{FieldErrors, Post, PostInput, PostStatus};
use quill_core::error::DomainError;
use quill_shared::dto::PostForm;

use crate::middleware::auth::{Chrome, Identity};
use crate::middleware::error::AppResult;
use crate::session::Notice;
use crate::state::AppState;
use crate::views::{
    self, PostCard, PostDetailTemplate, PostFormTemplate, PostListTemplate, PostView, paths,
};

fn post_list_page(
    chrome: &Chrome,
    heading: &'static str,
    empty_message: &'static str,
    posts: &[Post],
) -> AppResult<HttpResponse> {
    views::render(
        StatusCode::OK,
        chrome,
        PostListTemplate {
            chrome: chrome.clone(),
            heading,
            empty_message,
            posts: posts.iter().map(PostCard::from).collect(),
        },
    )
}

fn post_detail_page(chrome: &Chrome, post: &Post) -> AppResult<HttpResponse> {
    views::render(
        StatusCode::OK,
        chrome,
        PostDetailTemplate {
            chrome: chrome.clone(),
            post: PostView::from(post),
        },
    )
}

/// Re-render the editor with the submitted values and their errors.
fn invalid_form(
    chrome: &Chrome,
    heading: &'static str,
    action: String,
    form: &PostForm,
    errors: &FieldErrors,
) -> AppResult<HttpResponse> {
    views::render(
        StatusCode::UNPROCESSABLE_ENTITY,
        chrome,
        PostFormTemplate::new(chrome.clone(), heading, action)
            .with_values(&form.title, &form.content)
            .with_errors(errors),
    )
}

/// Where a post lives, depending on which side of the split it is on.
fn detail_location(post: &Post) -> String {
    if post.is_published() {
        paths::post_detail(post.id)
    } else {
        paths::draft_detail(post.id)
    }
}

/// GET /
pub async fn post_list(state: web::Data<AppState>, chrome: Chrome) -> AppResult<HttpResponse> {
    let posts = state.posts.list(PostStatus::Published).await?;
    post_list_page(&chrome, "Posts", "No posts have been published yet.", &posts)
}

/// GET /post/{id}
pub async fn post_detail(
    state: web::Data<AppState>,
    chrome: Chrome,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .posts
        .get(id, PostStatus::Published)
        .await
        .map_err(|e| DomainError::from_repo("Post", id, e))?;

    post_detail_page(&chrome, &post)
}

/// GET /drafts/
pub async fn draft_list(
    state: web::Data<AppState>,
    _identity: Identity,
    chrome: Chrome,
) -> AppResult<HttpResponse> {
    let drafts = state.posts.list(PostStatus::Draft).await?;
    post_list_page(&chrome, "Drafts", "There are no drafts.", &drafts)
}

/// GET /drafts/{id}
pub async fn draft_detail(
    state: web::Data<AppState>,
    _identity: Identity,
    chrome: Chrome,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .posts
        .get(id, PostStatus::Draft)
        .await
        .map_err(|e| DomainError::from_repo("Post", id, e))?;

    post_detail_page(&chrome, &post)
}

/// GET /post/new
pub async fn new_post_form(_identity: Identity, chrome: Chrome) -> AppResult<HttpResponse> {
    views::render(
        StatusCode::OK,
        &chrome,
        PostFormTemplate::new(chrome.clone(), "New post", paths::NEW_POST.to_string()),
    )
}

/// POST /post/new
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    chrome: Chrome,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let input = match PostInput::parse(&form.title, &form.content) {
        Ok(input) => input,
        Err(errors) => {
            return invalid_form(&chrome, "New post", paths::NEW_POST.to_string(), &form, &errors);
        }
    };

    let post = state.posts.create(identity.user_id, input).await?;
    tracing::info!(post_id = %post.id, author_id = %identity.user_id, "Draft created");

    Ok(views::redirect(&paths::draft_detail(post.id)))
}

/// GET /post/{id}/edit
pub async fn edit_post_form(
    state: web::Data<AppState>,
    _identity: Identity,
    chrome: Chrome,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .posts
        .find(id)
        .await
        .map_err(|e| DomainError::from_repo("Post", id, e))?;

    views::render(
        StatusCode::OK,
        &chrome,
        PostFormTemplate::new(chrome.clone(), "Edit post", paths::edit(id))
            .with_values(&post.title, &post.content),
    )
}

/// POST /post/{id}/edit
pub async fn update_post(
    state: web::Data<AppState>,
    _identity: Identity,
    chrome: Chrome,
    path: web::Path<Uuid>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let form = form.into_inner();

    let input = match PostInput::parse(&form.title, &form.content) {
        Ok(input) => input,
        Err(errors) => {
            // A missing post is a 404 even when the submission is also invalid.
            state
                .posts
                .find(id)
                .await
                .map_err(|e| DomainError::from_repo("Post", id, e))?;
            return invalid_form(&chrome, "Edit post", paths::edit(id), &form, &errors);
        }
    };

    let post = state
        .posts
        .update(id, input)
        .await
        .map_err(|e| DomainError::from_repo("Post", id, e))?;
    tracing::info!(post_id = %id, "Post updated");

    Ok(views::redirect(&detail_location(&post)))
}

/// POST /post/{id}/publish
pub async fn publish_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state
        .posts
        .publish(id)
        .await
        .map_err(|e| DomainError::from_repo("Post", id, e))?;
    tracing::info!(post_id = %id, user_id = %identity.user_id, "Post published");

    Ok(views::redirect_with_notice(paths::POST_LIST, Notice::PostPublished))
}

/// POST /post/{id}/delete
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.posts.delete(id).await?;
    tracing::info!(post_id = %id, user_id = %identity.user_id, "Post deleted");

    Ok(views::redirect_with_notice(paths::POST_LIST, Notice::PostDeleted))
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::http::header;
    use actix_web::test;

    use quill_core::error::RepoError;
    use quill_infra::JwtConfig;

    use super::*;
    use crate::config::SessionConfig;
    use crate::session::{FLASH_COOKIE, SESSION_COOKIE};

    fn state() -> AppState {
        AppState::in_memory(JwtConfig::default(), SessionConfig::default())
    }

    fn session(state: &AppState, user_id: Uuid) -> Cookie<'static> {
        let token = state
            .tokens
            .generate_token(user_id, "writer@example.com")
            .unwrap();
        Cookie::new(SESSION_COOKIE, token)
    }

    async fn draft(state: &AppState, title: &str) -> Post {
        let input = PostInput::parse(title, "Body").unwrap();
        state.posts.create(Uuid::new_v4(), input).await.unwrap()
    }

    async fn published(state: &AppState, title: &str) -> Post {
        let post = draft(state, title).await;
        state.posts.publish(post.id).await.unwrap()
    }

    fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> &str {
        resp.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[actix_web::test]
    async fn test_public_list_shows_only_published_posts() {
        let state = state();
        published(&state, "Out in the open").await;
        draft(&state, "Still cooking").await;
        let app = test::init_service(crate::build_app(state)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Out in the open"));
        assert!(!body.contains("Still cooking"));
    }

    #[actix_web::test]
    async fn test_draft_list_shows_only_drafts() {
        let state = state();
        published(&state, "Out in the open").await;
        draft(&state, "Still cooking").await;
        let cookie = session(&state, Uuid::new_v4());
        let app = test::init_service(crate::build_app(state)).await;

        let req = test::TestRequest::get()
            .uri("/drafts/")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Still cooking"));
        assert!(!body.contains("Out in the open"));
    }

    #[actix_web::test]
    async fn test_published_detail_hides_drafts() {
        let state = state();
        let post = published(&state, "Visible").await;
        let hidden = draft(&state, "Hidden").await;
        let app = test::init_service(crate::build_app(state)).await;

        let req = test::TestRequest::get()
            .uri(&paths::post_detail(post.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&paths::post_detail(hidden.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_draft_detail_hides_published_posts() {
        let state = state();
        let post = published(&state, "Visible").await;
        let cookie = session(&state, Uuid::new_v4());
        let app = test::init_service(crate::build_app(state)).await;

        let req = test::TestRequest::get()
            .uri(&paths::draft_detail(post.id))
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_malformed_id_is_not_found() {
        let app = test::init_service(crate::build_app(state())).await;

        let req = test::TestRequest::get().uri("/post/not-a-uuid").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_not_found_page_keeps_navigation() {
        let state = state();
        let cookie = session(&state, Uuid::new_v4());
        let app = test::init_service(crate::build_app(state)).await;

        for uri in [paths::post_detail(Uuid::new_v4()), "/no/such/page".to_string()] {
            let req = test::TestRequest::get()
                .uri(&uri)
                .cookie(cookie.clone())
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {uri}");

            let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
            assert!(body.contains("writer@example.com"), "GET {uri}");
            assert!(!body.contains(">Sign in</a>"), "GET {uri}");
        }
    }

    #[actix_web::test]
    async fn test_create_redirects_to_new_draft() {
        let state = state();
        let author = Uuid::new_v4();
        let cookie = session(&state, author);
        let app = test::init_service(crate::build_app(state.clone())).await;

        let req = test::TestRequest::post()
            .uri(paths::NEW_POST)
            .cookie(cookie)
            .set_form([("title", "Hello"), ("content", "World")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        let drafts = state.posts.list(PostStatus::Draft).await.unwrap();
        assert_eq!(drafts.len(), 1);
        let post = &drafts[0];
        assert_eq!(post.title, "Hello");
        assert_eq!(post.content, "World");
        assert_eq!(post.author_id, author);
        assert!(post.published_at.is_none());
        assert_eq!(location(&resp), paths::draft_detail(post.id));
    }

    #[actix_web::test]
    async fn test_invalid_submission_rerenders_form() {
        let state = state();
        let cookie = session(&state, Uuid::new_v4());
        let app = test::init_service(crate::build_app(state.clone())).await;

        let req = test::TestRequest::post()
            .uri(paths::NEW_POST)
            .cookie(cookie)
            .set_form([("title", "   "), ("content", "Kept body")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("This field is required."));
        assert!(body.contains("Kept body"));
        assert!(state.posts.list(PostStatus::Draft).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_edit_form_prefills_post() {
        let state = state();
        let post = published(&state, "Prefilled title").await;
        let cookie = session(&state, Uuid::new_v4());
        let app = test::init_service(crate::build_app(state)).await;

        let req = test::TestRequest::get()
            .uri(&paths::edit(post.id))
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Prefilled title"));
    }

    #[actix_web::test]
    async fn test_editing_published_post_keeps_publication() {
        let state = state();
        let post = published(&state, "Before").await;
        let cookie = session(&state, Uuid::new_v4());
        let app = test::init_service(crate::build_app(state.clone())).await;

        let req = test::TestRequest::post()
            .uri(&paths::edit(post.id))
            .cookie(cookie)
            .set_form([("title", "After"), ("content", "New body")])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), paths::post_detail(post.id));

        let stored = state.posts.find(post.id).await.unwrap();
        assert_eq!(stored.title, "After");
        assert_eq!(stored.published_at, post.published_at);
    }

    #[actix_web::test]
    async fn test_editing_draft_redirects_to_draft_detail() {
        let state = state();
        let post = draft(&state, "Before").await;
        let cookie = session(&state, Uuid::new_v4());
        let app = test::init_service(crate::build_app(state)).await;

        let req = test::TestRequest::post()
            .uri(&paths::edit(post.id))
            .cookie(cookie)
            .set_form([("title", "After"), ("content", "New body")])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), paths::draft_detail(post.id));
    }

    #[actix_web::test]
    async fn test_editing_missing_post_is_not_found() {
        let state = state();
        let cookie = session(&state, Uuid::new_v4());
        let app = test::init_service(crate::build_app(state)).await;

        let req = test::TestRequest::post()
            .uri(&paths::edit(Uuid::new_v4()))
            .cookie(cookie)
            .set_form([("title", ""), ("content", "")])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_publish_is_one_way() {
        let state = state();
        let post = draft(&state, "Draft").await;
        let cookie = session(&state, Uuid::new_v4());
        let app = test::init_service(crate::build_app(state.clone())).await;

        let req = test::TestRequest::post()
            .uri(&paths::publish(post.id))
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), paths::POST_LIST);
        assert!(state.posts.get(post.id, PostStatus::Published).await.is_ok());

        let req = test::TestRequest::post()
            .uri(&paths::publish(post.id))
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_publish_and_delete_reject_get() {
        let state = state();
        let post = draft(&state, "Draft").await;
        let cookie = session(&state, Uuid::new_v4());
        let app = test::init_service(crate::build_app(state.clone())).await;

        for uri in [paths::publish(post.id), paths::delete(post.id)] {
            let req = test::TestRequest::get()
                .uri(&uri)
                .cookie(cookie.clone())
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "GET {uri}");
        }

        let untouched = state.posts.find(post.id).await.unwrap();
        assert!(untouched.published_at.is_none());
    }

    #[actix_web::test]
    async fn test_delete_removes_post_and_sets_notice() {
        let state = state();
        let post = published(&state, "Doomed").await;
        let cookie = session(&state, Uuid::new_v4());
        let app = test::init_service(crate::build_app(state.clone())).await;

        let req = test::TestRequest::post()
            .uri(&paths::delete(post.id))
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), paths::POST_LIST);
        let flash = resp
            .response()
            .cookies()
            .find(|c| c.name() == FLASH_COOKIE)
            .map(|c| c.value().to_string());
        assert_eq!(flash.as_deref(), Some(Notice::PostDeleted.key()));

        for status in [PostStatus::Published, PostStatus::Draft] {
            assert!(matches!(
                state.posts.get(post.id, status).await,
                Err(RepoError::NotFound)
            ));
        }

        // Repeating the delete is harmless.
        let req = test::TestRequest::post()
            .uri(&paths::delete(post.id))
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    #[actix_web::test]
    async fn test_notice_is_shown_once_and_cleared() {
        let app = test::init_service(crate::build_app(state())).await;

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(FLASH_COOKIE, Notice::PostDeleted.key()))
            .to_request();
        let resp = test::call_service(&app, req).await;

        let cleared = resp
            .response()
            .cookies()
            .any(|c| c.name() == FLASH_COOKIE && c.value().is_empty());
        assert!(cleared);

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Post deleted."));
    }

    #[actix_web::test]
    async fn test_authoring_requires_login() {
        let state = state();
        let post = draft(&state, "Draft").await;
        let app = test::init_service(crate::build_app(state.clone())).await;

        let gets = [
            paths::DRAFT_LIST.to_string(),
            paths::draft_detail(post.id),
            paths::NEW_POST.to_string(),
            paths::edit(post.id),
        ];
        for uri in gets {
            let req = test::TestRequest::get().uri(&uri).to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::SEE_OTHER, "GET {uri}");
            assert!(location(&resp).starts_with("/accounts/login?next="), "GET {uri}");
        }

        let posts = [
            paths::NEW_POST.to_string(),
            paths::edit(post.id),
            paths::publish(post.id),
            paths::delete(post.id),
        ];
        for uri in posts {
            let req = test::TestRequest::post()
                .uri(&uri)
                .set_form([("title", "Sneaky"), ("content", "Edit")])
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::SEE_OTHER, "POST {uri}");
            assert!(location(&resp).starts_with("/accounts/login"), "POST {uri}");
        }

        let untouched = state.posts.find(post.id).await.unwrap();
        assert_eq!(untouched.title, "Draft");
        assert!(untouched.published_at.is_none());
    }

    #[actix_web::test]
    async fn test_forged_session_is_cleared() {
        let app = test::init_service(crate::build_app(state())).await;

        let req = test::TestRequest::get()
            .uri(paths::DRAFT_LIST)
            .cookie(Cookie::new(SESSION_COOKIE, "not-a-jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let cleared = resp
            .response()
            .cookies()
            .any(|c| c.name() == SESSION_COOKIE && c.value().is_empty());
        assert!(cleared);
    }
}

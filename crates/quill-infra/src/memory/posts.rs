use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Post, PostInput, PostStatus};
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

/// Post store backed by a `HashMap` behind an async `RwLock`.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self, status: PostStatus) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;

        let mut matching: Vec<Post> = posts
            .values()
            .filter(|p| status.matches(p.published_at))
            .cloned()
            .collect();
        matching.sort_by_key(|p| Reverse((p.published_at, p.created_at)));

        Ok(matching)
    }

    async fn get(&self, id: Uuid, status: PostStatus) -> Result<Post, RepoError> {
        let posts = self.posts.read().await;

        posts
            .get(&id)
            .filter(|p| status.matches(p.published_at))
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn find(&self, id: Uuid) -> Result<Post, RepoError> {
        let posts = self.posts.read().await;
        posts.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn create(&self, author_id: Uuid, input: PostInput) -> Result<Post, RepoError> {
        let post = Post::new(author_id, input);

        let mut posts = self.posts.write().await;
        posts.insert(post.id, post.clone());

        Ok(post)
    }

    async fn update(&self, id: Uuid, input: PostInput) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(&id).ok_or(RepoError::NotFound)?;

        post.title = input.title;
        post.content = input.content;
        post.updated_at = Utc::now();

        Ok(post.clone())
    }

    async fn publish(&self, id: Uuid) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(&id)
            .filter(|p| !p.is_published())
            .ok_or(RepoError::NotFound)?;

        let now = Utc::now();
        post.published_at = Some(now);
        post.updated_at = now;

        Ok(post.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.posts.write().await;
        posts.remove(&id);
        Ok(())
    }
}

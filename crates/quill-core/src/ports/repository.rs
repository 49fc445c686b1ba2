use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostInput, PostStatus, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post store.
///
/// Every method is a single atomic store call. Lookups restricted to a
/// [`PostStatus`] treat a post on the other side of the split as absent.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Posts of one status, newest `published_at` first, then newest `created_at`.
    async fn list(&self, status: PostStatus) -> Result<Vec<Post>, RepoError>;

    /// A post with this id and status.
    async fn get(&self, id: Uuid, status: PostStatus) -> Result<Post, RepoError>;

    /// A post with this id, whatever its status.
    async fn find(&self, id: Uuid) -> Result<Post, RepoError>;

    /// Store a new draft.
    async fn create(&self, author_id: Uuid, input: PostInput) -> Result<Post, RepoError>;

    /// Replace title and content. Author and `published_at` are left alone.
    async fn update(&self, id: Uuid, input: PostInput) -> Result<Post, RepoError>;

    /// Stamp a draft with the current time.
    ///
    /// Fails with [`RepoError::NotFound`] if the post is absent or already published.
    async fn publish(&self, id: Uuid) -> Result<Post, RepoError>;

    /// Remove a post in either state. Removing an absent post succeeds.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Select,
    Set, UpdateMany,
};
use uuid::Uuid;

use quill_core::domain::{Post, PostInput, PostStatus, User};
use quill_core::error::RepoError;
use quill_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = match email.split_once('@') {
            Some((local, domain)) => match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
                _ => format!("***@{domain}"),
            },
            None => "***".to_string(),
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

/// Restrict a post query to one side of the published/draft split.
fn with_status(query: Select<PostEntity>, status: PostStatus) -> Select<PostEntity> {
    match status {
        PostStatus::Published => query.filter(post::Column::PublishedAt.is_not_null()),
        PostStatus::Draft => query.filter(post::Column::PublishedAt.is_null()),
    }
}

/// Posts of one status, newest publication first, then newest creation.
pub(crate) fn list_query(status: PostStatus) -> Select<PostEntity> {
    with_status(PostEntity::find(), status)
        .order_by_desc(post::Column::PublishedAt)
        .order_by_desc(post::Column::CreatedAt)
}

/// A post with this id, restricted to one status.
pub(crate) fn get_query(id: Uuid, status: PostStatus) -> Select<PostEntity> {
    with_status(PostEntity::find_by_id(id), status)
}

/// Stamp `id` with `now`, matching no row once the post is published.
pub(crate) fn publish_query(id: Uuid, now: DateTimeWithTimeZone) -> UpdateMany<PostEntity> {
    PostEntity::update_many()
        .col_expr(post::Column::PublishedAt, Expr::value(now))
        .col_expr(post::Column::UpdatedAt, Expr::value(now))
        .filter(post::Column::Id.eq(id))
        .filter(post::Column::PublishedAt.is_null())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, status: PostStatus) -> Result<Vec<Post>, RepoError> {
        let result = list_query(status)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid, status: PostStatus) -> Result<Post, RepoError> {
        get_query(id, status)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?
            .map(Into::into)
            .ok_or(RepoError::NotFound)
    }

    async fn find(&self, id: Uuid) -> Result<Post, RepoError> {
        PostEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?
            .map(Into::into)
            .ok_or(RepoError::NotFound)
    }

    async fn create(&self, author_id: Uuid, input: PostInput) -> Result<Post, RepoError> {
        let active: post::ActiveModel = Post::new(author_id, input).into();
        let model = active.insert(self.db.as_ref()).await.map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, id: Uuid, input: PostInput) -> Result<Post, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut active = model.into_active_model();
        active.title = Set(input.title);
        active.content = Set(input.content);
        active.updated_at = Set(Utc::now().into());

        let model = active.update(self.db.as_ref()).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn publish(&self, id: Uuid) -> Result<Post, RepoError> {
        let result = publish_query(id, Utc::now().into())
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        self.find(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        PostEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PostInput;

/// Post entity - a blog post that is either a draft or published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// `None` while the post is a draft. Never cleared once set.
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new draft authored by `author_id`.
    pub fn new(author_id: Uuid, input: PostInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: input.title,
            content: input.content,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    pub fn status(&self) -> PostStatus {
        if self.is_published() {
            PostStatus::Published
        } else {
            PostStatus::Draft
        }
    }
}

/// Which side of the published/draft split a lookup is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostStatus {
    Published,
    Draft,
}

impl PostStatus {
    /// Whether a post with the given `published_at` belongs to this status.
    pub fn matches(self, published_at: Option<DateTime<Utc>>) -> bool {
        match self {
            PostStatus::Published => published_at.is_some(),
            PostStatus::Draft => published_at.is_none(),
        }
    }
}

//! Domain entities - the core business objects.

mod input;
mod post;
mod user;

pub use input::{FieldErrors, PostInput, TITLE_MAX_CHARS};
pub use post::{Post, PostStatus};
pub use user::User;

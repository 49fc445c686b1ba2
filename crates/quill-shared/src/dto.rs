//! Data Transfer Objects - urlencoded form bodies and query strings.
//!
//! Every field defaults to empty so a missing input surfaces as a
//! validation message on the re-rendered form, not as a 400.

use serde::{Deserialize, Serialize};

/// Title and content submitted from the post editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
}

/// Credentials submitted from the login page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Where to go after signing in.
    pub next: Option<String>,
}

/// Request to register a new user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
}

/// `?next=` carried by the login redirect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl NextQuery {
    /// The redirect target if it stays on this site.
    pub fn local_target(&self) -> Option<&str> {
        local_path(self.next.as_deref())
    }
}

impl LoginForm {
    /// The redirect target if it stays on this site.
    pub fn local_target(&self) -> Option<&str> {
        local_path(self.next.as_deref())
    }
}

/// Accept only absolute paths on this host; `//evil.example` is protocol-relative.
fn local_path(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.starts_with("/\\"))
}

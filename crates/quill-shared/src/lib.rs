//! # Quill Shared
//!
//! Form payloads exchanged between the browser and the server.

pub mod dto;

pub use dto::{LoginForm, NextQuery, PostForm, RegisterForm};

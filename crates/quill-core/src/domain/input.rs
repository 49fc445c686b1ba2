//! Validated post input.

use std::collections::BTreeMap;

/// Longest title accepted, in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// Title and content that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    pub title: String,
    pub content: String,
}

impl PostInput {
    /// Validate raw form values.
    ///
    /// Both fields are trimmed and must be non-empty. Every failing field is
    /// reported, not just the first one.
    pub fn parse(title: &str, content: &str) -> Result<Self, FieldErrors> {
        let title = title.trim();
        let content = content.trim();
        let mut errors = FieldErrors::default();

        if title.is_empty() {
            errors.add("title", "This field is required.");
        } else if title.chars().count() > TITLE_MAX_CHARS {
            errors.add(
                "title",
                format!("Ensure this value has at most {TITLE_MAX_CHARS} characters."),
            );
        }
        if content.is_empty() {
            errors.add("content", "This field is required.");
        }

        if errors.is_empty() {
            Ok(Self {
                title: title.to_string(),
                content: content.to_string(),
            })
        } else {
            Err(errors)
        }
    }
}

/// Validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    /// Messages for one field; empty when the field is valid.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

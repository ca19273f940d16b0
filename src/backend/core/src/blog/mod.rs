//! Blog domain types and mutation rules.

pub mod slug;

pub use slug::slugify;

use uuid::Uuid;

use crate::error::{QuillError, Result};

/// Minimum title length, inclusive.
pub const TITLE_MIN_LEN: usize = 5;
/// Maximum title length, inclusive.
pub const TITLE_MAX_LEN: usize = 100;
/// Minimum content length, inclusive.
pub const CONTENT_MIN_LEN: usize = 50;

/// A validated create-post request.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub author: Uuid,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
}

impl NewPost {
    /// Validate raw create-post input and derive the slug.
    pub fn validate(
        title: &str,
        content: &str,
        author: Uuid,
        cover_image: Option<String>,
        tags: Option<Vec<String>>,
    ) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(QuillError::validation("Title is required"));
        }
        // Length limits count characters, not bytes.
        let title_len = title.chars().count();
        if title_len < TITLE_MIN_LEN {
            return Err(QuillError::validation(
                "Title must be at least 5 characters long",
            ));
        }
        if title_len > TITLE_MAX_LEN {
            return Err(QuillError::validation("Title cannot exceed 100 characters"));
        }
        if content.is_empty() {
            return Err(QuillError::validation("Content cannot be empty"));
        }
        if content.chars().count() < CONTENT_MIN_LEN {
            return Err(QuillError::validation(
                "Content must be at least 50 characters long",
            ));
        }

        let slug = slugify(title);
        if slug.is_empty() {
            return Err(QuillError::validation(
                "Title must contain letters or numbers",
            ));
        }

        let tags = tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Self {
            title: title.to_string(),
            slug,
            content: content.to_string(),
            author,
            cover_image,
            tags,
        })
    }
}

/// Validate a comment message. Comments are appended unconditionally once
/// non-empty; there is no duplicate prevention and no length cap.
pub fn validate_comment(message: &str) -> Result<&str> {
    if message.trim().is_empty() {
        return Err(QuillError::validation("Comment cannot be empty"));
    }
    Ok(message)
}

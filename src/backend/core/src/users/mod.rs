//! User domain types and validation.

use serde::{Deserialize, Serialize};

use crate::error::{QuillError, Result};

/// Non-negative deltas applied to a user's counters.
///
/// The engagement orchestrator is the sole writer of these three fields;
/// the database applies them as a single atomic update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
    pub xp: u32,
    pub total_posts: u32,
    pub total_comments: u32,
}

impl CounterDelta {
    pub fn xp(amount: u32) -> Self {
        Self {
            xp: amount,
            ..Self::default()
        }
    }

    pub fn with_post(mut self) -> Self {
        self.total_posts += 1;
        self
    }

    pub fn with_comment(mut self) -> Self {
        self.total_comments += 1;
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Social profile links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

/// A validated registration request.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub is_oauth_user: bool,
    pub first_name: String,
    pub last_name: String,
}

impl NewUser {
    /// Validate raw registration input.
    ///
    /// Password is required unless the account comes from an OAuth provider.
    pub fn validate(
        username: &str,
        email: &str,
        password: Option<&str>,
        is_oauth_user: bool,
        first_name: &str,
        last_name: &str,
    ) -> Result<Self> {
        let username = username.trim();
        if username.len() < 3 || username.len() > 20 {
            return Err(QuillError::validation(
                "Username must be between 3 and 20 characters",
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(QuillError::validation(
                "Username can only contain letters, numbers, and underscores",
            ));
        }

        let email = email.trim().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(QuillError::validation("Enter a valid email address"));
        }

        let password = match (password, is_oauth_user) {
            (_, true) => None,
            (Some(p), false) if p.len() >= 8 => Some(p.to_string()),
            (Some(_), false) => {
                return Err(QuillError::validation(
                    "Password must be at least 8 characters long",
                ))
            }
            (None, false) => {
                return Err(QuillError::validation(
                    "Password is required for non-OAuth accounts",
                ))
            }
        };

        let first_name = validate_name(first_name, "First name")?;
        let last_name = validate_name(last_name, "Last name")?;

        Ok(Self {
            username: username.to_string(),
            email,
            password,
            is_oauth_user,
            first_name,
            last_name,
        })
    }
}

fn validate_name(name: &str, field: &str) -> Result<String> {
    let name = name.trim();
    // Length limits count characters, not bytes.
    let len = name.chars().count();
    if len < 2 || len > 30 {
        return Err(QuillError::validation(format!(
            "{} must be between 2 and 30 characters",
            field
        )));
    }
    if !name.chars().all(|c| c.is_alphabetic()) {
        return Err(QuillError::validation(format!(
            "{} can only contain alphabets",
            field
        )));
    }
    Ok(name.to_string())
}

/// Structural email check: one `@`, non-empty local part, dotted domain.
fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let Some(domain) = parts.next() else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Optional profile fields completed after registration.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub social_links: Option<SocialLinks>,
}

impl ProfileUpdate {
    pub fn validate(
        bio: Option<String>,
        website: Option<String>,
        social_links: Option<SocialLinks>,
    ) -> Result<Self> {
        if let Some(ref bio) = bio {
            if bio.chars().count() > 250 {
                return Err(QuillError::validation("Bio cannot exceed 250 characters"));
            }
        }
        if let Some(ref website) = website {
            if !website.is_empty() && !is_plausible_url(website) {
                return Err(QuillError::validation("Invalid website URL"));
            }
        }
        if let Some(ref links) = social_links {
            for url in [&links.twitter, &links.linkedin, &links.github]
                .into_iter()
                .flatten()
            {
                if !is_plausible_url(url) {
                    return Err(QuillError::validation("Invalid social link URL"));
                }
            }
        }
        Ok(Self {
            bio,
            website,
            social_links,
        })
    }
}

fn is_plausible_url(url: &str) -> bool {
    (url.starts_with("http://") || url.starts_with("https://")) && url.len() > 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn valid() -> Result<NewUser> {
        NewUser::validate(
            "quill_writer",
            "writer@example.com",
            Some("hunter2hunter2"),
            false,
            "Ada",
            "Lovelace",
        )
    }

    #[test]
    fn accepts_valid_registration() {
        let user = valid().unwrap();
        assert_eq!(user.username, "quill_writer");
        assert_eq!(user.email, "writer@example.com");
        assert!(user.password.is_some());
    }

    #[test]
    fn rejects_short_username() {
        let err = NewUser::validate("ab", "a@b.co", Some("password1"), false, "Ada", "Lovelace")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[test]
    fn rejects_username_with_symbols() {
        assert!(
            NewUser::validate("bad name!", "a@b.co", Some("password1"), false, "Ada", "Lovelace")
                .is_err()
        );
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["not-an-email", "a@", "@b.co", "a@nodot", "a b@c.co"] {
            assert!(
                NewUser::validate("writer", email, Some("password1"), false, "Ada", "Lovelace")
                    .is_err(),
                "{} should be rejected",
                email
            );
        }
    }

    #[test]
    fn lowercases_email() {
        let user = NewUser::validate(
            "writer",
            "Writer@Example.COM",
            Some("password1"),
            false,
            "Ada",
            "Lovelace",
        )
        .unwrap();
        assert_eq!(user.email, "writer@example.com");
    }

    #[test]
    fn oauth_accounts_skip_password() {
        let user =
            NewUser::validate("writer", "a@b.co", None, true, "Ada", "Lovelace").unwrap();
        assert!(user.is_oauth_user);
        assert!(user.password.is_none());
    }

    #[test]
    fn password_required_without_oauth() {
        assert!(NewUser::validate("writer", "a@b.co", None, false, "Ada", "Lovelace").is_err());
        assert!(
            NewUser::validate("writer", "a@b.co", Some("short"), false, "Ada", "Lovelace")
                .is_err()
        );
    }

    #[test]
    fn rejects_numeric_names() {
        assert!(
            NewUser::validate("writer", "a@b.co", Some("password1"), false, "Ada1", "Lovelace")
                .is_err()
        );
    }

    #[test]
    fn profile_update_limits_bio() {
        let long_bio = "x".repeat(251);
        assert!(ProfileUpdate::validate(Some(long_bio), None, None).is_err());
        assert!(ProfileUpdate::validate(Some("short bio".into()), None, None).is_ok());
    }

    #[test]
    fn profile_update_checks_urls() {
        assert!(ProfileUpdate::validate(None, Some("ftp://x".into()), None).is_err());
        assert!(ProfileUpdate::validate(None, Some("https://example.com".into()), None).is_ok());
        assert!(ProfileUpdate::validate(None, Some(String::new()), None).is_ok());
    }

    #[test]
    fn counter_delta_builders() {
        let delta = CounterDelta::xp(20).with_post();
        assert_eq!(delta.xp, 20);
        assert_eq!(delta.total_posts, 1);
        assert_eq!(delta.total_comments, 0);
        assert!(!delta.is_empty());
        assert!(CounterDelta::default().is_empty());
    }
}

//! Gamification XP subsystem.
//!
//! The policy table is static configuration: a closed set of recognized
//! actions, each mapped to a fixed positive point value. Nothing here is
//! mutated at runtime.

pub mod ledger;

pub use ledger::{LedgerEntry, LedgerWriter};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognized XP-earning actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum XpAction {
    NewPost,
    Commented,
    CommentReceived,
    Reviewed,
    LikeReceived,
    BlogShared,
    DailyLogin,
    ChallengeCompleted,
}

impl XpAction {
    /// All recognized actions.
    pub const ALL: [XpAction; 8] = [
        XpAction::NewPost,
        XpAction::Commented,
        XpAction::CommentReceived,
        XpAction::Reviewed,
        XpAction::LikeReceived,
        XpAction::BlogShared,
        XpAction::DailyLogin,
        XpAction::ChallengeCompleted,
    ];

    /// Point value for this action.
    pub const fn points(&self) -> u32 {
        match self {
            XpAction::NewPost => 20,
            XpAction::Commented => 2,
            XpAction::CommentReceived => 5,
            XpAction::Reviewed => 10,
            XpAction::LikeReceived => 2,
            XpAction::BlogShared => 10,
            XpAction::DailyLogin => 5,
            XpAction::ChallengeCompleted => 50,
        }
    }

    /// Canonical name as stored in the ledger.
    pub const fn as_str(&self) -> &'static str {
        match self {
            XpAction::NewPost => "New Blog Post",
            XpAction::Commented => "Commented",
            XpAction::CommentReceived => "Comment Received",
            XpAction::Reviewed => "Reviewed",
            XpAction::LikeReceived => "Like Received",
            XpAction::BlogShared => "Blog Shared",
            XpAction::DailyLogin => "Daily Login",
            XpAction::ChallengeCompleted => "Challenge Completed",
        }
    }

    /// Parse a ledger action name. Returns `None` for unrecognized names.
    pub fn parse(name: &str) -> Option<XpAction> {
        Self::ALL.iter().copied().find(|a| a.as_str() == name)
    }
}

impl fmt::Display for XpAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point value for a named action, `0` if the name is not recognized.
pub fn points_for(action: &str) -> u32 {
    XpAction::parse(action).map(|a| a.points()).unwrap_or(0)
}

/// A grant is valid iff the action is recognized and the amount is positive.
pub fn is_valid_grant(action: &str, amount: u32) -> bool {
    XpAction::parse(action).is_some() && amount > 0
}

//! XP ledger writer.
//!
//! Ledger entries are the audit trail for XP grants: written once, never
//! mutated or deleted. A user's `xp` counter should equal the sum of their
//! ledger entries; that reconciliation is an external auditing concern, not
//! enforced here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::EngagementStore;
use crate::error::{QuillError, Result};
use crate::xp::{is_valid_grant, XpAction};

/// An immutable XP grant record.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: XpAction,
    pub xp_gained: u32,
    pub date_earned: DateTime<Utc>,
}

/// Appends immutable XP grant records.
#[derive(Clone)]
pub struct LedgerWriter {
    store: Arc<dyn EngagementStore>,
}

impl LedgerWriter {
    pub fn new(store: Arc<dyn EngagementStore>) -> Self {
        Self { store }
    }

    /// Record an XP grant for a user.
    ///
    /// Fails with `InvalidGrant` if the policy table rejects the action and
    /// amount pair; nothing is written on failure.
    pub async fn record(
        &self,
        user_id: Uuid,
        action: XpAction,
        amount: u32,
    ) -> Result<LedgerEntry> {
        if !is_valid_grant(action.as_str(), amount) {
            return Err(QuillError::invalid_grant(action, amount));
        }

        let row = self.store.insert_xp_entry(user_id, action, amount).await?;

        Ok(LedgerEntry {
            id: row.id,
            user_id: row.user_id,
            action,
            xp_gained: row.xp_gained as u32,
            date_earned: row.date_earned,
        })
    }
}

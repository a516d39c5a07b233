//! Warning model.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A single warning, stored append-only in the `warnings` collection.
///
/// The count for a (user, chat) pair drives escalation; /clearwarns and
/// an auto-ban delete all rows for that pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub user_id: u64,
    pub chat_id: i64,
    pub reason: String,

    /// Admin who issued the warning (the bot's own id for policy warns)
    pub admin_id: u64,

    /// Unix timestamp
    pub timestamp: i64,
}

impl Warning {
    pub fn new(user_id: u64, chat_id: i64, reason: impl Into<String>, admin_id: u64) -> Self {
        Self {
            id: None,
            user_id,
            chat_id,
            reason: reason.into(),
            admin_id,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

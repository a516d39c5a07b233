//! Warning repository.
//!
//! Warnings are append-only and never cached: escalation compares a
//! fresh count against the group's limit, so stale reads are not
//! acceptable here.

use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::doc;
use tracing::debug;

use crate::database::Database;
use crate::database::models::Warning;
use crate::error::Result;

pub struct WarningRepo {
    collection: Collection<Warning>,
}

/// Per-chat warning statistics for /stats.
#[derive(Debug, Clone, Copy)]
pub struct ChatWarnStats {
    pub total: u64,
    pub warned_users: u64,
}

impl WarningRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("warnings"),
        }
    }

    /// Append a warning and return the new total for the (user, chat) pair.
    pub async fn add(
        &self,
        user_id: u64,
        chat_id: i64,
        reason: &str,
        admin_id: u64,
    ) -> Result<u64> {
        let warning = Warning::new(user_id, chat_id, reason, admin_id);
        self.collection.insert_one(&warning).await?;

        let count = self.count(user_id, chat_id).await?;
        debug!(
            "Warning {} recorded for user {} in chat {}",
            count, user_id, chat_id
        );

        Ok(count)
    }

    /// Count warnings for a (user, chat) pair.
    pub async fn count(&self, user_id: u64, chat_id: i64) -> Result<u64> {
        let filter = doc! { "user_id": user_id as i64, "chat_id": chat_id };
        Ok(self.collection.count_documents(filter).await?)
    }

    /// List warnings for a (user, chat) pair, most recent first.
    pub async fn list(&self, user_id: u64, chat_id: i64) -> Result<Vec<Warning>> {
        let filter = doc! { "user_id": user_id as i64, "chat_id": chat_id };
        Ok(self
            .collection
            .find(filter)
            .sort(doc! { "timestamp": -1, "_id": -1 })
            .await?
            .try_collect()
            .await?)
    }

    /// Delete all warnings for a (user, chat) pair.
    ///
    /// Used by /clearwarns and after an auto-ban (a ban resets history).
    pub async fn clear(&self, user_id: u64, chat_id: i64) -> Result<u64> {
        let filter = doc! { "user_id": user_id as i64, "chat_id": chat_id };
        let result = self.collection.delete_many(filter).await?;
        debug!(
            "Cleared {} warnings for user {} in chat {}",
            result.deleted_count, user_id, chat_id
        );
        Ok(result.deleted_count)
    }

    /// Warning totals for a chat.
    pub async fn chat_stats(&self, chat_id: i64) -> Result<ChatWarnStats> {
        let filter = doc! { "chat_id": chat_id };
        let total = self.collection.count_documents(filter.clone()).await?;
        let warned_users = self
            .collection
            .distinct("user_id", filter)
            .await?
            .len() as u64;

        Ok(ChatWarnStats {
            total,
            warned_users,
        })
    }
}

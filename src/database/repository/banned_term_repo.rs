//! Banned term repository.
//!
//! The per-chat term list is cached whole since the content policy scans
//! it on every message.

use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::doc;
use tracing::{debug, info};

use crate::cache::{CacheConfig, TypedCache};
use crate::database::Database;
use crate::database::models::{BannedTerm, TermAction};
use crate::error::Result;

pub struct BannedTermRepo {
    collection: Collection<BannedTerm>,
    cache: TypedCache<i64, Vec<BannedTerm>>,
}

impl BannedTermRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("banned_terms"),
            cache: TypedCache::new("banned_terms", CacheConfig::message_context()),
        }
    }

    /// Preload all term lists into the cache at startup.
    pub async fn warm_cache(&self) -> Result<()> {
        let mut cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "created_at": 1, "_id": 1 })
            .await?;

        let mut by_chat: std::collections::HashMap<i64, Vec<BannedTerm>> =
            std::collections::HashMap::new();
        let mut count = 0usize;

        while let Some(term) = cursor.try_next().await? {
            by_chat.entry(term.chat_id).or_default().push(term);
            count += 1;
        }

        for (chat_id, terms) in by_chat {
            self.cache.insert(chat_id, terms);
        }

        info!("Loaded {} banned terms", count);
        Ok(())
    }

    /// List a chat's banned terms in insertion order.
    ///
    /// Insertion order matters: the content policy applies the first
    /// matching term, not the most severe one.
    pub async fn list(&self, chat_id: i64) -> Result<Vec<BannedTerm>> {
        if let Some(terms) = self.cache.get(&chat_id) {
            return Ok(terms);
        }

        let terms: Vec<BannedTerm> = self
            .collection
            .find(doc! { "chat_id": chat_id })
            .sort(doc! { "created_at": 1, "_id": 1 })
            .await?
            .try_collect()
            .await?;

        self.cache.insert(chat_id, terms.clone());
        Ok(terms)
    }

    /// Add a term. Returns the stored record.
    pub async fn add(
        &self,
        chat_id: i64,
        term: &str,
        action: TermAction,
        created_by: u64,
    ) -> Result<BannedTerm> {
        let record = BannedTerm::new(chat_id, term, action, created_by);
        self.collection.insert_one(&record).await?;

        // Durable write confirmed; refresh the cached list.
        self.cache.invalidate(&chat_id);
        debug!("Added banned term '{}' for chat {}", record.term, chat_id);

        Ok(record)
    }

    /// Remove a term by its text. Returns how many records were deleted.
    pub async fn remove(&self, chat_id: i64, term: &str) -> Result<u64> {
        let term = term.to_lowercase();
        let result = self
            .collection
            .delete_many(doc! { "chat_id": chat_id, "term": term.as_str() })
            .await?;

        self.cache.invalidate(&chat_id);
        debug!(
            "Removed banned term '{}' for chat {} ({} records)",
            term, chat_id, result.deleted_count
        );

        Ok(result.deleted_count)
    }
}

//! Group configuration repository.

use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::doc;
use tracing::{debug, info};

use crate::cache::{CacheConfig, TypedCache};
use crate::database::Database;
use crate::database::models::GroupConfig;
use crate::error::Result;

/// Repository for per-group settings.
///
/// The cache holds the full config per chat; the hot path (every
/// message) reads it to check antispam/captcha flags.
pub struct GroupConfigRepo {
    collection: Collection<GroupConfig>,
    cache: TypedCache<i64, GroupConfig>,
}

impl GroupConfigRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("group_settings"),
            cache: TypedCache::new("group_configs", CacheConfig::message_context()),
        }
    }

    /// Preload every stored config into the cache at startup.
    pub async fn warm_cache(&self) -> Result<()> {
        let mut cursor = self.collection.find(doc! {}).await?;
        let mut count = 0usize;

        while let Some(config) = cursor.try_next().await? {
            self.cache.insert(config.chat_id, config);
            count += 1;
        }

        info!("Loaded {} group configs", count);
        Ok(())
    }

    /// Get the stored config for a chat, if any.
    pub async fn get(&self, chat_id: i64) -> Result<Option<GroupConfig>> {
        if let Some(config) = self.cache.get(&chat_id) {
            return Ok(Some(config));
        }

        let result = self.collection.find_one(doc! { "chat_id": chat_id }).await?;

        if let Some(c) = &result {
            self.cache.insert(chat_id, c.clone());
        }

        Ok(result)
    }

    /// Get the config for a chat, falling back to all-defaults.
    ///
    /// Does not persist the defaults; a config document is only created
    /// on the first admin write.
    pub async fn get_or_default(&self, chat_id: i64) -> Result<GroupConfig> {
        Ok(self
            .get(chat_id)
            .await?
            .unwrap_or_else(|| GroupConfig::new(chat_id)))
    }

    /// Persist a config (upsert), then update the cache.
    pub async fn save(&self, config: &GroupConfig) -> Result<()> {
        let filter = doc! { "chat_id": config.chat_id };
        let options = mongodb::options::ReplaceOptions::builder()
            .upsert(true)
            .build();

        self.collection
            .replace_one(filter, config)
            .with_options(options)
            .await?;

        self.cache.insert(config.chat_id, config.clone());
        debug!("Saved GroupConfig for chat {}", config.chat_id);

        Ok(())
    }
}

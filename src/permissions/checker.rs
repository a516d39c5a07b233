//! Permission checker with caching.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMember, ChatMemberKind, UserId};
use tracing::debug;

use crate::cache::{CacheConfig, TypedCache};

/// Cached admin information.
#[derive(Clone, Debug)]
struct AdminInfo {
    can_delete_messages: bool,
    can_restrict_members: bool,
}

impl AdminInfo {
    fn from_chat_member(member: &ChatMember) -> Option<Self> {
        match &member.kind {
            ChatMemberKind::Owner(_) => Some(Self {
                can_delete_messages: true,
                can_restrict_members: true,
            }),
            ChatMemberKind::Administrator(admin) => Some(Self {
                can_delete_messages: admin.can_delete_messages,
                can_restrict_members: admin.can_restrict_members,
            }),
            _ => None,
        }
    }

    fn bot_owner() -> Self {
        Self {
            can_delete_messages: true,
            can_restrict_members: true,
        }
    }
}

type AdminCacheKey = (i64, u64); // (chat_id, user_id)

/// Permission checker with a short-lived admin cache.
///
/// Bot owners (OWNER_IDS) bypass all permission checks in every chat.
#[derive(Clone)]
pub struct Permissions {
    bot: Bot,
    cache: TypedCache<AdminCacheKey, Option<AdminInfo>>,
    owner_ids: Vec<u64>,
}

impl Permissions {
    pub fn with_owners(bot: Bot, owner_ids: Vec<u64>) -> Self {
        let cache = TypedCache::new(
            "admin_permissions",
            CacheConfig::with_capacity(10_000).ttl(Duration::from_secs(300)),
        );

        Self {
            bot,
            cache,
            owner_ids,
        }
    }

    /// Check if a user is a bot owner.
    #[inline]
    pub fn is_bot_owner(&self, user_id: UserId) -> bool {
        self.owner_ids.contains(&user_id.0)
    }

    async fn get_admin_info(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> anyhow::Result<Option<AdminInfo>> {
        if self.is_bot_owner(user_id) {
            return Ok(Some(AdminInfo::bot_owner()));
        }

        let cache_key = (chat_id.0, user_id.0);

        if let Some(cached) = self.cache.get(&cache_key) {
            debug!("Admin cache hit for user {} in chat {}", user_id, chat_id);
            return Ok(cached);
        }

        let member = self.bot.get_chat_member(chat_id, user_id).await?;
        let result = AdminInfo::from_chat_member(&member);

        // Cache the result (including None for non-admins)
        self.cache.insert(cache_key, result.clone());

        Ok(result)
    }

    /// Check if a user is an admin (including the chat owner).
    pub async fn is_admin(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<bool> {
        Ok(self.get_admin_info(chat_id, user_id).await?.is_some())
    }

    /// Check if a user can restrict members (warn, ban, mute, kick).
    pub async fn can_restrict_members(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> anyhow::Result<bool> {
        Ok(self
            .get_admin_info(chat_id, user_id)
            .await?
            .map(|a| a.can_restrict_members)
            .unwrap_or(false))
    }

    /// Check if a user can delete messages. Also consulted for the bot
    /// itself before it removes flood or banned-term messages.
    pub async fn can_delete_messages(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> anyhow::Result<bool> {
        Ok(self
            .get_admin_info(chat_id, user_id)
            .await?
            .map(|a| a.can_delete_messages)
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_owner_has_every_right() {
        let info = AdminInfo::bot_owner();
        assert!(info.can_delete_messages);
        assert!(info.can_restrict_members);
    }

    #[test]
    fn test_owner_list_membership() {
        let bot = Bot::new("123:abc");
        let permissions = Permissions::with_owners(bot, vec![7]);

        assert!(permissions.is_bot_owner(UserId(7)));
        assert!(!permissions.is_bot_owner(UserId(8)));
    }
}

//! Per-group configuration model.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::common::{InlineButton, WelcomeMedia};

/// Per-group settings, stored in the `group_settings` collection.
///
/// Exactly one document per chat id; an absent document means
/// all-defaults. Created lazily on the first admin customization and
/// persisted synchronously after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Telegram chat ID (indexed)
    pub chat_id: i64,

    /// Whether welcome messages are enabled
    #[serde(default = "default_true")]
    pub welcome_enabled: bool,

    /// Welcome template with {name}/{username}/{group}/{mention}/{id}
    /// placeholders. `None` falls back to the built-in greeting.
    #[serde(default)]
    pub welcome_template: Option<String>,

    /// Media attached to the welcome message
    #[serde(default)]
    pub welcome_media: Option<WelcomeMedia>,

    /// Inline button rows for the welcome message
    #[serde(default)]
    pub welcome_buttons: Vec<Vec<InlineButton>>,

    /// Group rules shown by /rules
    #[serde(default)]
    pub rules_text: Option<String>,

    /// Warnings before an automatic ban
    #[serde(default = "default_max_warnings")]
    pub max_warnings: u32,

    /// Advisory security level (not enforced yet)
    #[serde(default = "default_security_level")]
    pub security_level: u32,

    /// Message-rate spam detection
    #[serde(default = "default_true")]
    pub antispam_enabled: bool,

    /// Arithmetic CAPTCHA on join
    #[serde(default)]
    pub captcha_enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_max_warnings() -> u32 {
    3
}

fn default_security_level() -> u32 {
    1
}

impl GroupConfig {
    /// All-defaults config for a chat.
    pub fn new(chat_id: i64) -> Self {
        Self {
            id: None,
            chat_id,
            welcome_enabled: true,
            welcome_template: None,
            welcome_media: None,
            welcome_buttons: Vec::new(),
            rules_text: None,
            max_warnings: default_max_warnings(),
            security_level: default_security_level(),
            antispam_enabled: true,
            captcha_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::MediaKind;

    #[test]
    fn test_defaults() {
        let config = GroupConfig::new(-100);
        assert!(config.welcome_enabled);
        assert!(config.antispam_enabled);
        assert!(!config.captcha_enabled);
        assert_eq!(config.max_warnings, 3);
        assert_eq!(config.security_level, 1);
        assert!(config.welcome_template.is_none());
        assert!(config.welcome_buttons.is_empty());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        // A minimal stored document must deserialize with defaults applied.
        let doc = mongodb::bson::doc! { "chat_id": -100i64 };
        let config: GroupConfig = mongodb::bson::from_document(doc).unwrap();
        assert!(config.welcome_enabled);
        assert_eq!(config.max_warnings, 3);
        assert!(!config.captcha_enabled);
    }

    #[test]
    fn test_bson_round_trip_preserves_customization() {
        let mut config = GroupConfig::new(-100);
        config.welcome_template = Some("hi {name}".to_string());
        config.welcome_media = Some(WelcomeMedia {
            kind: MediaKind::Photo,
            file_id: "AgACAgQAAx".to_string(),
        });
        config.welcome_buttons = vec![vec![InlineButton::new("Rules", "https://example.com")]];
        config.rules_text = Some("Be nice.".to_string());
        config.max_warnings = 5;
        config.antispam_enabled = false;
        config.captcha_enabled = true;

        let doc = mongodb::bson::to_document(&config).unwrap();
        let back: GroupConfig = mongodb::bson::from_document(doc).unwrap();

        assert_eq!(back.chat_id, -100);
        assert_eq!(back.welcome_template.as_deref(), Some("hi {name}"));
        assert_eq!(back.welcome_media, config.welcome_media);
        assert_eq!(back.welcome_buttons, config.welcome_buttons);
        assert_eq!(back.rules_text.as_deref(), Some("Be nice."));
        assert_eq!(back.max_warnings, 5);
        assert!(!back.antispam_enabled);
        assert!(back.captcha_enabled);
    }

    #[test]
    fn test_cache_round_trip() {
        use crate::cache::{CacheConfig, TypedCache};

        let cache: TypedCache<i64, GroupConfig> =
            TypedCache::new("test_configs", CacheConfig::default());

        let mut config = GroupConfig::new(-100);
        config.rules_text = Some("Be nice.".to_string());
        cache.insert(config.chat_id, config.clone());

        let cached = cache.get(&config.chat_id).expect("config must be cached");
        assert_eq!(cached.chat_id, -100);
        assert_eq!(cached.rules_text.as_deref(), Some("Be nice."));

        cache.invalidate(&config.chat_id);
        assert!(cache.get(&config.chat_id).is_none());
    }
}

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
}

#[derive(Debug, Deserialize)]
pub struct NewsConfig {
    #[serde(default)]
    pub provider: crate::news::Provider,
    #[serde(default = "default_news_api_key")]
    pub api_key: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_topics")]
    pub topics: Vec<TopicSpec>,
}

/// One batch topic: `query` maps to the provider's keyword parameter,
/// `params` are passed through opaquely and win over the generated ones.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicSpec {
    pub name: String,
    pub query: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: crate::llm::Provider,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DiscordConfig {
    #[serde(default = "default_discord_token")]
    pub token: String,
    /// Destination channel for batch digests. Interactive commands reply
    /// into whichever channel they arrived from.
    #[serde(default = "default_discord_channel_id")]
    pub channel_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default = "default_sender")]
    pub sender: String,
    #[serde(default = "default_sender_password")]
    pub password: String,
    #[serde(default = "default_recipient")]
    pub recipient: String,
    #[serde(default = "default_subject")]
    pub subject: String,
}

/// Which output channels the batch pipeline produces.
#[derive(Debug, Deserialize)]
pub struct ChannelsConfig {
    #[serde(default = "default_true")]
    pub chat: bool,
    #[serde(default = "default_true")]
    pub email: bool,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            chat: true,
            email: true,
        }
    }
}

// Defaults
fn default_news_api_key() -> String {
    std::env::var("NEWS_API_KEY").unwrap_or_default()
}
fn default_language() -> String {
    "en".into()
}
fn default_country() -> String {
    "us".into()
}
fn default_limit() -> u32 {
    10
}
fn default_sort() -> String {
    "published_desc".into()
}
fn default_topics() -> Vec<TopicSpec> {
    vec![
        TopicSpec {
            name: "Technology News".into(),
            query: "technology".into(),
            params: BTreeMap::new(),
        },
        TopicSpec {
            name: "AI News".into(),
            query: "artificial intelligence".into(),
            params: BTreeMap::new(),
        },
        TopicSpec {
            name: "Python News".into(),
            query: "Python".into(),
            params: BTreeMap::new(),
        },
    ]
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_discord_token() -> String {
    std::env::var("DISCORD_TOKEN").unwrap_or_default()
}
fn default_discord_channel_id() -> u64 {
    std::env::var("DISCORD_CHANNEL_ID")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}
fn default_smtp_port() -> u16 {
    465
}
fn default_sender() -> String {
    std::env::var("SENDER_EMAIL").unwrap_or_default()
}
fn default_sender_password() -> String {
    std::env::var("SENDER_PASSWORD").unwrap_or_default()
}
fn default_recipient() -> String {
    std::env::var("RECIPIENT_EMAIL").unwrap_or_default()
}
fn default_subject() -> String {
    "Your Daily Tech Briefing".into()
}
fn default_true() -> bool {
    true
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            provider: crate::news::Provider::default(),
            api_key: default_news_api_key(),
            language: default_language(),
            country: default_country(),
            limit: default_limit(),
            sort: default_sort(),
            topics: default_topics(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: crate::llm::Provider::default(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_key_env: None,
            base_url: None,
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: default_discord_token(),
            channel_id: default_discord_channel_id(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            sender: default_sender(),
            password: default_sender_password(),
            recipient: default_recipient(),
            subject: default_subject(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            news: NewsConfig::default(),
            llm: LlmConfig::default(),
            discord: DiscordConfig::default(),
            email: EmailConfig::default(),
            channels: ChannelsConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config {}: {e}", path.display())))?;
        toml::from_str(&content).map_err(|e| Error::config(format!("Failed to parse config: {e}")))
    }

    /// Config file is optional: secrets come from the environment, everything
    /// else has defaults. A present-but-broken file is still a hard error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Fail fast on missing secrets. `require_chat` / `require_email` reflect
    /// which delivery channels the selected mode will touch.
    pub fn validate(&self, require_chat: bool, require_email: bool) -> Result<()> {
        if self.news.api_key.is_empty() {
            return Err(Error::config(
                "NEWS_API_KEY not set. Export it or set news.api_key in config.toml",
            ));
        }
        let llm_key_env = self
            .llm
            .api_key_env
            .clone()
            .unwrap_or_else(|| self.llm.provider.default_api_key_env().into());
        if std::env::var(&llm_key_env).unwrap_or_default().is_empty() {
            return Err(Error::config(format!(
                "{llm_key_env} not set. Export it to authenticate the LLM provider",
            )));
        }
        if require_chat {
            if self.discord.token.is_empty() {
                return Err(Error::config(
                    "DISCORD_TOKEN not set. Export it or set discord.token in config.toml",
                ));
            }
            if self.discord.channel_id == 0 {
                return Err(Error::config(
                    "DISCORD_CHANNEL_ID not set or not a numeric channel id",
                ));
            }
        }
        if require_email {
            if self.email.sender.is_empty() {
                return Err(Error::config(
                    "SENDER_EMAIL not set. Export it or set email.sender in config.toml",
                ));
            }
            if self.email.password.is_empty() {
                return Err(Error::config(
                    "SENDER_PASSWORD not set. Export it or set email.password in config.toml",
                ));
            }
            if self.email.recipient.is_empty() {
                return Err(Error::config(
                    "RECIPIENT_EMAIL not set. Export it or set email.recipient in config.toml",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let toml = r#"
[news]
provider = "mediastack"
api_key = "mk_test"
language = "en"
limit = 5
sort = "published_desc"

[[news.topics]]
name = "Technology News"
query = "technology"
[news.topics.params]
categories = "technology"

[[news.topics]]
name = "AI News"
query = "AI,artificial intelligence"

[llm]
provider = "gemini"
model = "gemini-2.5-flash"
max_tokens = 2048

[discord]
token = "bot_test"
channel_id = 123456789

[email]
smtp_host = "smtp.gmail.com"
smtp_port = 465
sender = "sender@example.com"
password = "app-password"
recipient = "reader@example.com"
subject = "Morning Briefing"

[channels]
chat = true
email = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.news.api_key, "mk_test");
        assert_eq!(config.news.limit, 5);
        assert_eq!(config.news.topics.len(), 2);
        assert_eq!(
            config.news.topics[0].params.get("categories").map(String::as_str),
            Some("technology")
        );
        assert!(config.news.topics[1].params.is_empty());
        assert_eq!(config.discord.channel_id, 123456789);
        assert_eq!(config.email.smtp_port, 465);
        assert!(config.channels.chat);
        assert!(!config.channels.email);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let toml = r#"
[news]
api_key = "mk_test"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.news.language, "en");
        assert_eq!(config.news.limit, 10);
        assert_eq!(config.news.topics.len(), 3);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.email.smtp_host, "smtp.gmail.com");
        assert_eq!(config.email.smtp_port, 465);
        assert!(config.channels.chat);
        assert!(config.channels.email);
    }

    #[test]
    fn validate_rejects_missing_news_key() {
        let mut config = Config::default();
        config.news.api_key = String::new();
        let err = config.validate(false, false).unwrap_err();
        assert!(err.to_string().contains("NEWS_API_KEY"));
    }

    #[test]
    fn validate_rejects_missing_chat_settings() {
        let mut config = Config::default();
        config.news.api_key = "k".into();
        config.llm.api_key_env = Some("PATH".into()); // always present
        config.discord.token = String::new();
        let err = config.validate(true, false).unwrap_err();
        assert!(err.to_string().contains("DISCORD_TOKEN"));

        config.discord.token = "t".into();
        config.discord.channel_id = 0;
        let err = config.validate(true, false).unwrap_err();
        assert!(err.to_string().contains("DISCORD_CHANNEL_ID"));
    }

    #[test]
    fn validate_rejects_missing_email_settings() {
        let mut config = Config::default();
        config.news.api_key = "k".into();
        config.llm.api_key_env = Some("PATH".into());
        config.email.sender = String::new();
        config.email.password = "p".into();
        config.email.recipient = "r@example.com".into();
        let err = config.validate(false, true).unwrap_err();
        assert!(err.to_string().contains("SENDER_EMAIL"));
    }

    #[test]
    fn validate_skips_disabled_channels() {
        let mut config = Config::default();
        config.news.api_key = "k".into();
        config.llm.api_key_env = Some("PATH".into());
        config.discord.token = String::new();
        config.email.sender = String::new();
        assert!(config.validate(false, false).is_ok());
    }
}

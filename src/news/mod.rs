pub mod gnews;
pub mod mediastack;
pub mod newsapi;

use crate::config::{NewsConfig, TopicSpec};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// News provider, determines endpoint, parameter names and the key the
/// article list lives under in the response.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    GNews,
    Mediastack,
    NewsApi,
}

impl Provider {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::GNews => gnews::ENDPOINT,
            Self::Mediastack => mediastack::ENDPOINT,
            Self::NewsApi => newsapi::ENDPOINT,
        }
    }

    /// Query parameter carrying the API key.
    pub fn key_param(&self) -> &'static str {
        match self {
            Self::GNews => gnews::KEY_PARAM,
            Self::Mediastack => mediastack::KEY_PARAM,
            Self::NewsApi => newsapi::KEY_PARAM,
        }
    }

    /// Query parameter carrying the topic keyword(s).
    pub fn topic_param(&self) -> &'static str {
        match self {
            Self::GNews => gnews::TOPIC_PARAM,
            Self::Mediastack => mediastack::TOPIC_PARAM,
            Self::NewsApi => newsapi::TOPIC_PARAM,
        }
    }

    /// Response key the article array lives under.
    pub fn list_key(&self) -> &'static str {
        match self {
            Self::GNews => gnews::LIST_KEY,
            Self::Mediastack => mediastack::LIST_KEY,
            Self::NewsApi => newsapi::LIST_KEY,
        }
    }

    pub fn base_params(&self, config: &NewsConfig) -> BTreeMap<String, String> {
        match self {
            Self::GNews => gnews::base_params(config),
            Self::Mediastack => mediastack::base_params(config),
            Self::NewsApi => newsapi::base_params(config),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GNews => write!(f, "gnews"),
            Self::Mediastack => write!(f, "mediastack"),
            Self::NewsApi => write!(f, "newsapi"),
        }
    }
}

/// One article as returned by the provider, taken verbatim. Missing or null
/// fields fall back to placeholders; nothing else is normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(default = "default_title", deserialize_with = "null_title")]
    pub title: String,
    #[serde(default, deserialize_with = "null_string")]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_title() -> String {
    "No Title".into()
}

fn null_title<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_else(default_title))
}

fn null_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

pub struct NewsClient {
    http: HttpClient,
    provider: Provider,
    api_key: String,
    base_params: BTreeMap<String, String>,
}

impl NewsClient {
    pub fn new(config: &NewsConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new("daybrief/0.1.0")?,
            provider: config.provider,
            api_key: config.api_key.clone(),
            base_params: config.provider.base_params(config),
        })
    }

    /// Parameters for an ad-hoc topic (interactive commands).
    pub fn topic_params(&self, topic: &str) -> BTreeMap<String, String> {
        let mut params = self.base_params.clone();
        params.insert(self.provider.topic_param().into(), topic.into());
        params
    }

    /// Parameters for a configured batch topic. The topic's opaque `params`
    /// win over the generated ones.
    pub fn section_params(&self, spec: &TopicSpec) -> BTreeMap<String, String> {
        let mut params = self.topic_params(&spec.query);
        for (k, v) in &spec.params {
            params.insert(k.clone(), v.clone());
        }
        params
    }

    /// One GET against the provider endpoint. An absent or null article list
    /// means "no news today" and comes back as an empty vec; a malformed
    /// response or transport failure is an error for the caller to handle.
    pub async fn fetch(&self, params: &BTreeMap<String, String>) -> Result<Vec<Article>> {
        let url = self.build_url(params);
        let value: serde_json::Value = self.http.get_json(&url).await?;

        let articles: Vec<Article> = match value.get(self.provider.list_key()) {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(list) => serde_json::from_value(list.clone()).map_err(|e| {
                Error::parse(format!(
                    "decode '{}' from {}: {e}",
                    self.provider.list_key(),
                    self.provider
                ))
            })?,
        };

        info!(provider = %self.provider, count = articles.len(), "fetched articles");
        Ok(articles)
    }

    fn build_url(&self, params: &BTreeMap<String, String>) -> String {
        let mut pairs: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect();
        pairs.push(format!(
            "{}={}",
            self.provider.key_param(),
            urlencoding::encode(&self.api_key)
        ));
        format!("{}?{}", self.provider.endpoint(), pairs.join("&"))
    }
}

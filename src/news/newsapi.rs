//! NewsAPI everything endpoint (newsapi.org/v2).

use crate::config::NewsConfig;
use std::collections::BTreeMap;

pub const ENDPOINT: &str = "https://newsapi.org/v2/everything";
pub const KEY_PARAM: &str = "apiKey";
pub const TOPIC_PARAM: &str = "q";
pub const LIST_KEY: &str = "articles";

pub fn base_params(config: &NewsConfig) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("language".into(), config.language.clone()),
        ("pageSize".into(), config.limit.to_string()),
    ])
}

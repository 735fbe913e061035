//! GNews search API (gnews.io/api/v4).

use crate::config::NewsConfig;
use std::collections::BTreeMap;

pub const ENDPOINT: &str = "https://gnews.io/api/v4/search";
pub const KEY_PARAM: &str = "apikey";
pub const TOPIC_PARAM: &str = "q";
pub const LIST_KEY: &str = "articles";

pub fn base_params(config: &NewsConfig) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("lang".into(), config.language.clone()),
        ("country".into(), config.country.clone()),
        ("max".into(), config.limit.to_string()),
    ])
}

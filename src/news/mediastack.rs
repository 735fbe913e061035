//! mediastack live news API (api.mediastack.com/v1). The free tier is
//! plain HTTP; the article list comes back under `data`.

use crate::config::NewsConfig;
use std::collections::BTreeMap;

pub const ENDPOINT: &str = "http://api.mediastack.com/v1/news";
pub const KEY_PARAM: &str = "access_key";
pub const TOPIC_PARAM: &str = "keywords";
pub const LIST_KEY: &str = "data";

pub fn base_params(config: &NewsConfig) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("languages".into(), config.language.clone()),
        ("limit".into(), config.limit.to_string()),
        ("sort".into(), config.sort.clone()),
    ])
}

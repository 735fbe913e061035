pub mod config;
pub mod deliver;
pub mod digest;
pub mod error;
pub mod http;
pub mod interactive;
pub mod llm;
pub mod news;
pub mod pipeline;

use error::Result;

/// CLI override for LLM provider/model.
pub struct LlmOverride {
    pub provider: llm::Provider,
    pub model: String,
}

/// Build an LlmClient from config + optional CLI override.
pub fn build_llm_client(
    llm_config: &config::LlmConfig,
    llm_override: Option<&LlmOverride>,
) -> Result<llm::LlmClient> {
    let provider = llm_override
        .map(|o| o.provider.clone())
        .unwrap_or_else(|| llm_config.provider.clone());
    let model = llm_override
        .map(|o| o.model.clone())
        .unwrap_or_else(|| llm_config.model.clone());
    llm::LlmClient::from_config(
        provider,
        model,
        llm_config.max_tokens,
        llm_config.api_key_env.clone(),
        llm_config.base_url.clone(),
    )
}

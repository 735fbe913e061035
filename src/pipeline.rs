// Batch orchestration: fetch -> format -> generate -> deliver, once.

use crate::config::Config;
use crate::deliver::{Channel, DigestSink};
use crate::deliver::discord::ChatDelivery;
use crate::deliver::email::EmailDelivery;
use crate::digest::{self, TopicSection};
use crate::error::{Error, Result};
use crate::llm::TextGenerator;
use crate::news::NewsClient;
use crate::{LlmOverride, build_llm_client};
use std::path::Path;
use tracing::{error, info};

/// Run the briefing once for the configured topics, then return. Fetch or
/// decode failures propagate; an entirely empty fetch is "no news today"
/// and a normal termination.
pub async fn run_batch(
    config_path: &Path,
    llm_override: Option<&LlmOverride>,
) -> anyhow::Result<()> {
    let config = Config::load_or_default(config_path)?;
    config.validate(config.channels.chat, config.channels.email)?;

    let news = NewsClient::new(&config.news)?;
    let llm = build_llm_client(&config.llm, llm_override)?;

    let mut sinks: Vec<Box<dyn DigestSink>> = Vec::new();
    if config.channels.chat {
        sinks.push(Box::new(ChatDelivery::new(
            config.discord.token.clone(),
            config.discord.channel_id,
        )));
    }
    if config.channels.email {
        sinks.push(Box::new(EmailDelivery::new(&config.email)?));
    }
    if sinks.is_empty() {
        anyhow::bail!("no output channels enabled; enable channels.chat or channels.email");
    }

    info!("Phase 1: Fetching headlines...");
    let mut sections = Vec::with_capacity(config.news.topics.len());
    for spec in &config.news.topics {
        let articles = news.fetch(&news.section_params(spec)).await?;
        if articles.is_empty() {
            info!(topic = %spec.name, "no articles for topic");
        }
        sections.push(TopicSection {
            name: spec.name.clone(),
            articles,
        });
    }

    info!("Phase 2: Generating and delivering digests...");
    publish_sections(&sections, &llm, &sinks).await?;
    Ok(())
}

/// Generate and deliver one digest per sink. Channels are independent: every
/// sink gets its own generate+deliver attempt and its own error log, and the
/// call fails afterwards if any of them failed.
pub async fn publish_sections(
    sections: &[TopicSection],
    generator: &dyn TextGenerator,
    sinks: &[Box<dyn DigestSink>],
) -> Result<()> {
    if sections.iter().all(|s| s.articles.is_empty()) {
        info!("no news today, skipping generation and delivery");
        return Ok(());
    }

    let mut failed = Vec::new();
    for sink in sinks {
        let channel = sink.channel();
        let prompt = match channel {
            Channel::Chat => digest::chat_prompt(sections),
            Channel::Email => digest::email_prompt(sections),
        };
        let outcome = async {
            let text = generator.generate(&prompt).await?;
            sink.deliver(&text).await
        }
        .await;
        match outcome {
            Ok(()) => info!(%channel, "digest delivered"),
            Err(e) => {
                error!(%channel, error = %e, "channel delivery failed");
                failed.push(channel);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(Error::delivery(format!(
            "{} of {} channels failed: {}",
            failed.len(),
            sinks.len(),
            failed
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

// Resident command bot: one gateway shard, one spawned task per command.

use crate::config::Config;
use crate::deliver::discord::send_long;
use crate::deliver::email::EmailDelivery;
use crate::digest;
use crate::error::Result;
use crate::llm::{LlmClient, TextGenerator};
use crate::news::NewsClient;
use crate::{LlmOverride, build_llm_client};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use twilight_gateway::{Event, EventTypeFlags, Intents, Shard, ShardId, StreamExt as _};
use twilight_model::channel::Message;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

const DEFAULT_TOPIC: &str = "technology";

/// Immutable context shared by command handlers. Handlers never write to it,
/// so overlapping commands need no synchronization.
struct BotContext {
    http: Arc<twilight_http::Client>,
    news: NewsClient,
    llm: LlmClient,
    email: EmailDelivery,
}

/// Connect a gateway shard and dispatch chat commands until the connection
/// ends. Command failures are reported into the originating channel; the
/// process stays resident.
pub async fn run_listener(
    config_path: &Path,
    llm_override: Option<&LlmOverride>,
) -> anyhow::Result<()> {
    let config = Config::load_or_default(config_path)?;
    // interactive commands can touch both channels
    config.validate(true, true)?;

    let ctx = Arc::new(BotContext {
        http: Arc::new(twilight_http::Client::new(config.discord.token.clone())),
        news: NewsClient::new(&config.news)?,
        llm: build_llm_client(&config.llm, llm_override)?,
        email: EmailDelivery::new(&config.email)?,
    });

    let intents = Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT;
    let mut shard = Shard::new(ShardId::ONE, config.discord.token.clone(), intents);
    info!("gateway shard created, connecting");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => event,
            Err(source) => {
                warn!(?source, "error receiving gateway event");
                continue;
            }
        };

        match event {
            Event::Ready(ready) => {
                info!(user = %ready.user.name, "logged in, listening for commands");
            }
            Event::MessageCreate(message) => {
                if message.author.bot {
                    continue;
                }
                let ctx = Arc::clone(&ctx);
                let message = (*message).0;
                tokio::spawn(async move {
                    dispatch(ctx, message).await;
                });
            }
            _ => {}
        }
    }

    Ok(())
}

async fn dispatch(ctx: Arc<BotContext>, message: Message) {
    let content = message.content.trim();
    let channel_id = message.channel_id;

    if content.starts_with("!ping") {
        if let Err(e) = send_long(&ctx.http, channel_id, "Pong!").await {
            error!(error = %e, "failed to answer ping");
        }
        return;
    }

    if let Some(rest) = content.strip_prefix("!emailnews") {
        let topic = parse_topic(rest);
        if let Err(e) = email_command(&ctx, channel_id, &topic).await {
            error!(error = %e, topic = %topic, "emailnews command failed");
            report_failure(
                &ctx,
                channel_id,
                &format!("Sorry, I couldn't send the email. Error: {e}"),
            )
            .await;
        }
        return;
    }

    if let Some(rest) = content.strip_prefix("!news") {
        let topic = parse_topic(rest);
        if let Err(e) = news_command(&ctx, channel_id, &topic).await {
            error!(error = %e, topic = %topic, "news command failed");
            report_failure(
                &ctx,
                channel_id,
                &format!("Sorry, an error occurred. Error: {e}"),
            )
            .await;
        }
    }
}

fn parse_topic(rest: &str) -> String {
    let topic = rest.trim();
    if topic.is_empty() {
        DEFAULT_TOPIC.into()
    } else {
        topic.to_string()
    }
}

async fn report_failure(ctx: &BotContext, channel_id: Id<ChannelMarker>, text: &str) {
    if let Err(e) = send_long(&ctx.http, channel_id, text).await {
        error!(error = %e, "failed to report error into channel");
    }
}

async fn news_command(ctx: &BotContext, channel_id: Id<ChannelMarker>, topic: &str) -> Result<()> {
    send_long(
        &ctx.http,
        channel_id,
        &format!("Gathering today's top headlines about '{topic}'..."),
    )
    .await?;

    let articles = ctx.news.fetch(&ctx.news.topic_params(topic)).await?;
    if articles.is_empty() {
        send_long(
            &ctx.http,
            channel_id,
            &format!("Sorry, I couldn't find any news about '{topic}' right now."),
        )
        .await?;
        return Ok(());
    }

    let text = ctx
        .llm
        .generate(&digest::chat_topic_prompt(topic, &articles))
        .await?;
    send_long(&ctx.http, channel_id, &text).await
}

async fn email_command(ctx: &BotContext, channel_id: Id<ChannelMarker>, topic: &str) -> Result<()> {
    send_long(
        &ctx.http,
        channel_id,
        &format!("Preparing an HTML report about '{topic}' and emailing it..."),
    )
    .await?;

    let articles = ctx.news.fetch(&ctx.news.topic_params(topic)).await?;
    if articles.is_empty() {
        send_long(
            &ctx.http,
            channel_id,
            &format!("Sorry, I couldn't find any news about '{topic}' to email."),
        )
        .await?;
        return Ok(());
    }

    let html = ctx
        .llm
        .generate(&digest::email_topic_prompt(topic, &articles))
        .await?;
    ctx.email
        .send_html(&format!("Today's Top Headlines: {topic}"), &html)
        .await?;
    send_long(
        &ctx.http,
        channel_id,
        &format!("Success! Sent the report to {}.", ctx.email.recipient()),
    )
    .await
}

use crate::deliver::{Channel, DigestSink};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use twilight_http::Client as HttpClient;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

/// Discord's per-message content limit, in characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// Split into consecutive segments of at most `limit` characters, preserving
/// order and every character. All segments except possibly the last are
/// exactly `limit` characters long.
pub fn split_message(text: &str, limit: usize) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(limit)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(cut);
        segments.push(head);
        rest = tail;
    }
    segments
}

/// Send a digest of any length to a channel, chunked to the message limit.
pub async fn send_long(
    http: &HttpClient,
    channel_id: Id<ChannelMarker>,
    text: &str,
) -> Result<()> {
    for segment in split_message(text, MESSAGE_LIMIT) {
        http.create_message(channel_id)
            .content(segment)
            .await
            .map_err(|e| Error::api("discord", e.to_string()))?;
    }
    Ok(())
}

pub struct ChatDelivery {
    http: Arc<HttpClient>,
    channel_id: u64,
}

impl ChatDelivery {
    pub fn new(token: String, channel_id: u64) -> Self {
        Self {
            http: Arc::new(HttpClient::new(token)),
            channel_id,
        }
    }

    /// Confirm the configured channel exists and the bot can reach it.
    /// An unresolvable channel aborts delivery rather than silently no-oping.
    pub async fn resolve_channel(&self) -> Result<Id<ChannelMarker>> {
        let id = Id::new_checked(self.channel_id)
            .ok_or_else(|| Error::config("discord channel id must be non-zero"))?;
        self.http
            .channel(id)
            .await
            .map_err(|e| {
                Error::api(
                    "discord",
                    format!("channel {} not found or inaccessible: {e}", self.channel_id),
                )
            })?
            .model()
            .await
            .map_err(|e| Error::parse(format!("decode channel: {e}")))?;
        Ok(id)
    }
}

#[async_trait]
impl DigestSink for ChatDelivery {
    fn channel(&self) -> Channel {
        Channel::Chat
    }

    async fn deliver(&self, digest: &str) -> Result<()> {
        let id = self.resolve_channel().await?;
        send_long(&self.http, id, digest).await?;
        info!(channel_id = self.channel_id, "digest posted to Discord");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_segment() {
        assert_eq!(split_message("hello", MESSAGE_LIMIT), vec!["hello"]);
    }

    #[test]
    fn empty_text_sends_nothing() {
        assert!(split_message("", MESSAGE_LIMIT).is_empty());
    }

    #[test]
    fn segments_reassemble_exactly() {
        let text: String = "abcdefghij".repeat(451); // 4510 chars
        let segments = split_message(&text, MESSAGE_LIMIT);
        assert_eq!(segments.len(), text.chars().count().div_ceil(MESSAGE_LIMIT));
        assert_eq!(segments.concat(), text);
    }

    #[test]
    fn all_but_the_last_segment_are_full_length() {
        let text = "x".repeat(5000);
        let segments = split_message(&text, MESSAGE_LIMIT);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].chars().count(), MESSAGE_LIMIT);
        assert_eq!(segments[1].chars().count(), MESSAGE_LIMIT);
        assert_eq!(segments[2].chars().count(), 1000);
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_segment() {
        let text = "y".repeat(MESSAGE_LIMIT * 2);
        let segments = split_message(&text, MESSAGE_LIMIT);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.chars().count() == MESSAGE_LIMIT));
    }

    #[test]
    fn splits_on_character_boundaries_not_bytes() {
        // 3 chars each taking 3 bytes in UTF-8
        let text = "日本語".repeat(1000); // 3000 chars, 9000 bytes
        let segments = split_message(&text, MESSAGE_LIMIT);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].chars().count(), MESSAGE_LIMIT);
        assert_eq!(segments[1].chars().count(), 1000);
        assert_eq!(segments.concat(), text);
    }
}

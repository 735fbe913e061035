pub mod discord;
pub mod email;

use crate::error::Result;
use async_trait::async_trait;

/// Output channels the pipeline can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Chat,
    Email,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::Email => write!(f, "email"),
        }
    }
}

/// A destination a finished digest can be handed to. Implementations own
/// their transport; the pipeline only knows the channel kind.
#[async_trait]
pub trait DigestSink: Send + Sync {
    fn channel(&self) -> Channel;
    async fn deliver(&self, digest: &str) -> Result<()>;
}

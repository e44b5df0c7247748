pub mod throttle;

pub use self::throttle::Throttle;

use crate::message::{ChatId, Message, MessageId, UserId};
use anyhow::{Context, Result};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Chat operations the moderator needs from the transport.
///
/// Errors are returned as-is; retrying is up to the implementation.
#[async_trait::async_trait]
pub trait ChatActions: Send + Sync {
    async fn administrators(&self, chat: ChatId) -> Result<Vec<UserId>>;

    /// Deleting a message that is already gone must succeed.
    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<()>;

    async fn send_reply(&self, chat: ChatId, reply_to: MessageId, text: &str) -> Result<()>;
}

/// Terminal state of one message's trip through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NoAction,
    Deleted,
    Warned,
    Throttled,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::NoAction => "no action",
            Action::Deleted => "deleted",
            Action::Warned => "warned",
            Action::Throttled => "warning throttled",
        })
    }
}

/// Deletes scam messages where the bot is an administrator and posts a
/// throttled warning everywhere else.
pub struct EnforcementDecider {
    actions: Arc<dyn ChatActions>,
    bot_id: UserId,
    warning: String,
    throttle: Arc<Throttle>,
}

impl EnforcementDecider {
    pub fn new(
        actions: Arc<dyn ChatActions>,
        bot_id: UserId,
        warning: impl Into<String>,
        throttle: Arc<Throttle>,
    ) -> Self {
        Self {
            actions,
            bot_id,
            warning: warning.into(),
            throttle,
        }
    }

    pub fn throttle(&self) -> &Arc<Throttle> {
        &self.throttle
    }

    /// Acts on a message already judged SCAM.
    pub async fn enforce(&self, message: &Message) -> Result<Action> {
        let chat = message.chat_id;
        let admins = self
            .actions
            .administrators(chat)
            .await
            .with_context(|| format!("Failed to fetch administrators of chat {}", chat))?;

        if admins.contains(&self.bot_id) {
            info!("Admin mode: deleting message {} in chat {}", message.id, chat);
            self.actions
                .delete_message(chat, message.id)
                .await
                .with_context(|| format!("Failed to delete message {} in chat {}", message.id, chat))?;
            return Ok(Action::Deleted);
        }

        // The slot is claimed before sending: a failed send still uses up
        // the window.
        if !self.throttle.try_acquire(chat) {
            let wait = self.throttle.remaining(chat).unwrap_or_default();
            info!(
                "Canary mode: throttled a warning in chat {} ({}s of cooldown left)",
                chat,
                wait.as_secs()
            );
            return Ok(Action::Throttled);
        }

        info!("Canary mode: issuing a warning in chat {}", chat);
        self.actions
            .send_reply(chat, message.id, &self.warning)
            .await
            .with_context(|| format!("Failed to send warning to chat {}", chat))?;
        Ok(Action::Warned)
    }
}

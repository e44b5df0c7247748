#![allow(dead_code)]

use anyhow::{anyhow, Result};
use scam_nope::enforcement::ChatActions;
use scam_nope::message::{AnnotatedText, ChatId, Message, MessageId, Span, SpanKind, Update, UserId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const BOT_ID: UserId = UserId(4242);

// --- Mocks ---

#[derive(Default)]
pub struct MockActions {
    pub admins: Vec<UserId>,
    pub fail_admin_lookup: bool,
    pub fail_send: bool,
    /// Delay inside send_reply to widen race windows.
    pub send_delay: Option<Duration>,
    pub admin_lookups: AtomicUsize,
    pub deletes: Mutex<Vec<(ChatId, MessageId)>>,
    pub replies: Mutex<Vec<(ChatId, MessageId, String)>>,
}

impl MockActions {
    pub fn as_admin() -> Self {
        Self {
            admins: vec![UserId(1), BOT_ID],
            ..Self::default()
        }
    }

    pub fn as_member() -> Self {
        Self {
            admins: vec![UserId(1)],
            ..Self::default()
        }
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.lock().unwrap().len()
    }

    pub fn reply_count(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    pub fn lookup_count(&self) -> usize {
        self.admin_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ChatActions for MockActions {
    async fn administrators(&self, _chat: ChatId) -> Result<Vec<UserId>> {
        self.admin_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_admin_lookup {
            return Err(anyhow!("Bad Gateway"));
        }
        Ok(self.admins.clone())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<()> {
        self.deletes.lock().unwrap().push((chat, message));
        Ok(())
    }

    async fn send_reply(&self, chat: ChatId, reply_to: MessageId, text: &str) -> Result<()> {
        if let Some(delay) = self.send_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_send {
            return Err(anyhow!("Too Many Requests"));
        }
        self.replies
            .lock()
            .unwrap()
            .push((chat, reply_to, text.to_string()));
        Ok(())
    }
}

// --- Message builders ---

/// A message in `chat` whose text is `parts` joined by spaces, with every
/// part starting with `@` tagged as a mention and the rest as urls.
pub fn message_with(chat: i64, id: i32, parts: &[&str]) -> Message {
    let text = parts.join(" ");
    let mut spans = Vec::new();
    let mut offset = 0;
    for part in parts {
        let len = part.encode_utf16().count();
        let kind = if part.starts_with('@') {
            SpanKind::Mention
        } else {
            SpanKind::Url
        };
        spans.push(Span::new(kind, offset, len));
        offset += len + 1;
    }
    Message::new(ChatId(chat), MessageId(id))
        .with_sender(UserId(777))
        .with_body(AnnotatedText::new(text, spans))
}

pub fn scam_message(chat: i64, id: i32) -> Message {
    message_with(chat, id, &["https://evil.example/claim-prize"])
}

pub fn update(message: Message) -> Update {
    Update::new_message(message)
}

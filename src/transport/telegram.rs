use crate::config::Config;
use crate::enforcement::ChatActions;
use crate::handler::Moderator;
use crate::message::{AnnotatedText, ChatId, Message, MessageId, Span, SpanKind, Update, UserId};
use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{MessageEntity, MessageEntityKind, ReplyParameters, Update as TgUpdate};
use teloxide::update_listeners::webhooks;
use teloxide::{ApiError, RequestError};
use tracing::{debug, error, info};

/// [`ChatActions`] backed by the Bot API.
pub struct TelegramActions {
    bot: Bot,
}

impl TelegramActions {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait::async_trait]
impl ChatActions for TelegramActions {
    async fn administrators(&self, chat: ChatId) -> Result<Vec<UserId>> {
        let admins = self
            .bot
            .get_chat_administrators(teloxide::types::ChatId(chat.0))
            .await?;
        Ok(admins.into_iter().map(|m| UserId(m.user.id.0)).collect())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<()> {
        let res = self
            .bot
            .delete_message(
                teloxide::types::ChatId(chat.0),
                teloxide::types::MessageId(message.0),
            )
            .await;
        match res {
            Ok(_) => Ok(()),
            Err(RequestError::Api(ApiError::MessageToDeleteNotFound)) => {
                debug!("Message {} in chat {} was already deleted", message, chat);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn send_reply(&self, chat: ChatId, reply_to: MessageId, text: &str) -> Result<()> {
        self.bot
            .send_message(teloxide::types::ChatId(chat.0), text)
            .reply_parameters(ReplyParameters::new(teloxide::types::MessageId(reply_to.0)))
            .await?;
        Ok(())
    }
}

fn span_from(entity: &MessageEntity) -> Option<Span> {
    let kind = match &entity.kind {
        MessageEntityKind::Url => SpanKind::Url,
        MessageEntityKind::Mention => SpanKind::Mention,
        MessageEntityKind::TextLink { url } => SpanKind::TextLink {
            url: url.to_string(),
        },
        _ => return None,
    };
    Some(Span::new(kind, entity.offset, entity.length))
}

fn annotate(text: Option<&str>, entities: Option<&[MessageEntity]>) -> Option<AnnotatedText> {
    let text = text?;
    let spans = entities
        .unwrap_or_default()
        .iter()
        .filter_map(span_from)
        .collect();
    Some(AnnotatedText::new(text, spans))
}

impl From<&teloxide::types::Message> for Message {
    fn from(msg: &teloxide::types::Message) -> Self {
        Message {
            id: MessageId(msg.id.0),
            chat_id: ChatId(msg.chat.id.0),
            sender: msg.from.as_ref().map(|u| UserId(u.id.0)),
            body: annotate(msg.text(), msg.entities()),
            caption: annotate(msg.caption(), msg.caption_entities()),
        }
    }
}

async fn moderate(moderator: &Moderator, update: Update) {
    if let Err(e) = moderator.handle(&update).await {
        error!("Failed to moderate message: {:#}", e);
    }
}

async fn on_message(
    msg: teloxide::types::Message,
    moderator: Arc<Moderator>,
) -> ResponseResult<()> {
    moderate(&moderator, Update::new_message(Message::from(&msg))).await;
    Ok(())
}

async fn on_edited_message(
    msg: teloxide::types::Message,
    moderator: Arc<Moderator>,
) -> ResponseResult<()> {
    moderate(&moderator, Update::edited(Message::from(&msg))).await;
    Ok(())
}

/// Serves updates until Ctrl-C, by long polling or webhook per config.
pub async fn run(config: &Config, bot: Bot, moderator: Arc<Moderator>) -> Result<()> {
    let handler = dptree::entry()
        .branch(TgUpdate::filter_message().endpoint(on_message))
        .branch(TgUpdate::filter_edited_message().endpoint(on_edited_message));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![moderator])
        .default_handler(|_| async {})
        .enable_ctrlc_handler()
        .build();

    match &config.webhook {
        None => {
            info!("Starting in polling mode");
            dispatcher.dispatch().await;
        }
        Some(webhook) => {
            let url = webhook.url()?;
            let addr = webhook.listen_addr()?;
            info!("Starting webhook at {}; backend at {}", url, addr);
            let listener = webhooks::axum(bot, webhooks::Options::new(addr, url))
                .await
                .context("Failed to set up webhook")?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
    }

    Ok(())
}

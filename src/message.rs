//! Transport-neutral view of an incoming chat message.
//!
//! The moderation engine only needs a handful of fields, so the transport
//! adapter copies them into these types instead of leaking its own model
//! into the core.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    /// Bare URL typed into the text.
    Url,
    /// Text with a hidden target URL.
    TextLink { url: String },
    /// `@handle`
    Mention,
}

/// Annotated range of a text. Offsets are UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub offset: usize,
    pub length: usize,
}

impl Span {
    pub fn new(kind: SpanKind, offset: usize, length: usize) -> Self {
        Self {
            kind,
            offset,
            length,
        }
    }

    /// Resolves the span against the text it annotates.
    ///
    /// Returns `None` when the range falls outside of `text` or cuts a
    /// surrogate pair in half.
    pub fn resolve(&self, text: &str) -> Option<String> {
        let end = self.offset.checked_add(self.length)?;
        let units: Vec<u16> = text.encode_utf16().collect();
        let segment = units.get(self.offset..end)?;
        String::from_utf16(segment).ok()
    }
}

/// A text body together with its spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedText {
    pub text: String,
    pub spans: Vec<Span>,
}

impl AnnotatedText {
    pub fn new(text: impl Into<String>, spans: Vec<Span>) -> Self {
        Self {
            text: text.into(),
            spans,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender: Option<UserId>,
    pub body: Option<AnnotatedText>,
    pub caption: Option<AnnotatedText>,
}

impl Message {
    pub fn new(chat_id: ChatId, id: MessageId) -> Self {
        Self {
            id,
            chat_id,
            sender: None,
            body: None,
            caption: None,
        }
    }

    pub fn with_sender(mut self, sender: UserId) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_body(mut self, body: AnnotatedText) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_caption(mut self, caption: AnnotatedText) -> Self {
        self.caption = Some(caption);
        self
    }

    /// Body and caption, whichever are present.
    pub fn texts(&self) -> impl Iterator<Item = &AnnotatedText> {
        self.body.iter().chain(self.caption.iter())
    }
}

/// One delivery from the transport: either a new message or an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Update {
    pub message: Option<Message>,
    pub edited_message: Option<Message>,
}

impl Update {
    pub fn new_message(message: Message) -> Self {
        Self {
            message: Some(message),
            edited_message: None,
        }
    }

    pub fn edited(message: Message) -> Self {
        Self {
            message: None,
            edited_message: Some(message),
        }
    }

    /// The message the pipeline works on: the original if present,
    /// otherwise the edit.
    pub fn effective_message(&self) -> Option<&Message> {
        self.message.as_ref().or(self.edited_message.as_ref())
    }
}

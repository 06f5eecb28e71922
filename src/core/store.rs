//! # Message Store
//!
//! Append-only transcript of sent messages. Insertion order is display order.
//!
//! `ChatMessage` values can only be created by [`MessageStore::append`], and
//! the store exposes no way to mutate or remove them afterwards.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::composer::PendingSend;
use super::image::Image;

/// Who a message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "you",
            Sender::Bot => "bot",
        }
    }
}

/// Message body. Exactly one shape is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    Images(Vec<Image>),
    TextWithImages { text: String, images: Vec<Image> },
}

/// Content that would violate the store's invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("message has no text and no images")]
    Empty,
    #[error("text message is blank")]
    BlankText,
    #[error("image message has no images")]
    NoImages,
}

impl MessageContent {
    /// Pick the content shape for a composer snapshot.
    ///
    /// Blank text next to images yields `Images`; text is otherwise kept verbatim.
    pub fn from_pending(pending: PendingSend) -> Result<Self, StoreError> {
        let PendingSend { text, images } = pending;
        let has_text = !text.trim().is_empty();
        match (has_text, images.is_empty()) {
            (false, true) => Err(StoreError::Empty),
            (true, true) => Ok(MessageContent::Text(text)),
            (false, false) => Ok(MessageContent::Images(images)),
            (true, false) => Ok(MessageContent::TextWithImages { text, images }),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) | MessageContent::TextWithImages { text, .. } => Some(text),
            MessageContent::Images(_) => None,
        }
    }

    pub fn images(&self) -> &[Image] {
        match self {
            MessageContent::Text(_) => &[],
            MessageContent::Images(images) | MessageContent::TextWithImages { images, .. } => {
                images
            }
        }
    }

    /// The image shown when a row has room for a single preview.
    pub fn preview_image(&self) -> Option<&Image> {
        self.images().first()
    }

    fn validate(&self) -> Result<(), StoreError> {
        match self {
            MessageContent::Text(text) if text.trim().is_empty() => Err(StoreError::BlankText),
            MessageContent::Images(images) | MessageContent::TextWithImages { images, .. }
                if images.is_empty() =>
            {
                Err(StoreError::NoImages)
            }
            _ => Ok(()),
        }
    }
}

/// An immutable transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    id: Uuid,
    sender: Sender,
    content: MessageContent,
    timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<ChatMessage>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `content`, stamp it, and add it to the end of the log.
    ///
    /// Timestamps never go backwards, even if the wall clock does.
    pub fn append(
        &mut self,
        sender: Sender,
        content: MessageContent,
    ) -> Result<&ChatMessage, StoreError> {
        content.validate()?;

        let now = Utc::now();
        let timestamp = match self.messages.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };

        self.messages.push(ChatMessage {
            id: Uuid::new_v4(),
            sender,
            content,
            timestamp,
        });
        Ok(&self.messages[self.messages.len() - 1])
    }

    pub fn count(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&ChatMessage> {
        self.messages.get(index)
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }
}

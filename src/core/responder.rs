//! # Bot Responder
//!
//! Local stand-in for the bot side of the conversation. A responder looks at
//! a freshly appended user message and may produce a text reply, which the
//! TUI delivers after a short delay as a `Sender::Bot` message.
//!
//! Nothing here touches the network.

use super::store::{ChatMessage, MessageContent, Sender};

pub trait Responder: Send + Sync {
    /// Returns the name of the responder.
    fn name(&self) -> &str;

    /// Produce a reply to `message`, or `None` to stay silent.
    fn reply(&self, message: &ChatMessage) -> Option<String>;
}

/// Acknowledges every user message by echoing what it received.
pub struct EchoResponder;

impl Responder for EchoResponder {
    fn name(&self) -> &str {
        "echo"
    }

    fn reply(&self, message: &ChatMessage) -> Option<String> {
        if message.sender() != Sender::User {
            return None;
        }
        let reply = match message.content() {
            MessageContent::Text(text) => format!("You said: {}", text.trim()),
            MessageContent::Images(images) => format!("Got {}.", count_images(images.len())),
            MessageContent::TextWithImages { text, images } => format!(
                "You said: {} (with {})",
                text.trim(),
                count_images(images.len())
            ),
        };
        Some(reply)
    }
}

fn count_images(n: usize) -> String {
    if n == 1 {
        "1 image".to_string()
    } else {
        format!("{n} images")
    }
}

//! # Actions
//!
//! Everything that can happen in Parley becomes an `Action`.
//! User presses Enter on a draft? That's `Action::Send(pending)`.
//! A picker session finishes? That's `Action::AttachmentsPicked(outcome)`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing what the adapter must do
//! next. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  State' + Effect
//! ```

use log::{debug, info, warn};

use crate::attachment::PickerOutcome;
use crate::core::composer::PendingSend;
use crate::core::image::Image;
use crate::core::state::App;
use crate::core::store::{MessageContent, Sender};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// User asked to attach images (Ctrl+O).
    OpenPicker,
    /// A picker session finished.
    AttachmentsPicked(PickerOutcome),
    /// The composer produced a snapshot to record.
    Send(PendingSend),
    /// Background responder finished a reply.
    BotReply(String),
    Quit,
}

/// Follow-up work for the adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    /// Show the attachment source menu.
    ShowPicker,
    /// Hand the picked images to the composer.
    Attach(Vec<Image>),
    /// The message is in the store; reset the composer and, if present,
    /// schedule the bot reply.
    Sent { reply: Option<String> },
    /// The store refused the content; leave the composer untouched.
    Rejected,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::OpenPicker => {
            if app.picker_active {
                debug!("Picker already open, ignoring request");
                return Effect::None;
            }
            app.picker_active = true;
            app.status_message = String::from("Choose an attachment source");
            info!("Picker session started (limit {})", app.selection_limit);
            Effect::ShowPicker
        }
        Action::AttachmentsPicked(outcome) => {
            app.picker_active = false;
            match outcome {
                PickerOutcome::Selected(images) => {
                    info!("Picker session selected {} image(s)", images.len());
                    app.status_message = match images.len() {
                        1 => String::from("Attached 1 image"),
                        n => format!("Attached {} images", n),
                    };
                    Effect::Attach(images)
                }
                PickerOutcome::Cancelled => {
                    info!("Picker session cancelled");
                    app.status_message = String::from("No images attached");
                    Effect::None
                }
            }
        }
        Action::Send(pending) => {
            let content = match MessageContent::from_pending(pending) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Refusing to send: {}", e);
                    app.status_message = String::from("Nothing to send");
                    return Effect::Rejected;
                }
            };
            match app.store.append(Sender::User, content) {
                Ok(message) => {
                    info!(
                        "Sent message {} ({} image(s))",
                        message.id(),
                        message.content().images().len()
                    );
                    let reply = app.responder.as_ref().and_then(|r| r.reply(message));
                    app.status_message = String::from("Sent");
                    Effect::Sent { reply }
                }
                Err(e) => {
                    warn!("Store rejected message: {}", e);
                    app.status_message = format!("Not sent: {}", e);
                    Effect::Rejected
                }
            }
        }
        Action::BotReply(text) => {
            if let Err(e) = app.store.append(Sender::Bot, MessageContent::Text(text)) {
                warn!("Dropping bot reply: {}", e);
            }
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::responder::EchoResponder;
    use crate::test_support::{solid_image, test_app};

    fn pending(text: &str, images: Vec<Image>) -> PendingSend {
        PendingSend {
            text: text.to_string(),
            images,
        }
    }

    #[test]
    fn test_quit() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }

    #[test]
    fn test_open_picker_once_per_session() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::OpenPicker), Effect::ShowPicker);
        assert!(app.picker_active);
        assert_eq!(update(&mut app, Action::OpenPicker), Effect::None);

        update(&mut app, Action::AttachmentsPicked(PickerOutcome::Cancelled));
        assert!(!app.picker_active);
        assert_eq!(update(&mut app, Action::OpenPicker), Effect::ShowPicker);
    }

    #[test]
    fn test_selected_images_are_attached() {
        let mut app = test_app();
        update(&mut app, Action::OpenPicker);
        let imgs = vec![solid_image(1, 1), solid_image(2, 2)];
        let effect = update(
            &mut app,
            Action::AttachmentsPicked(PickerOutcome::Selected(imgs.clone())),
        );
        assert_eq!(effect, Effect::Attach(imgs));
        assert_eq!(app.status_message, "Attached 2 images");
    }

    #[test]
    fn test_cancelled_picker_is_noop() {
        let mut app = test_app();
        update(&mut app, Action::OpenPicker);
        let effect = update(&mut app, Action::AttachmentsPicked(PickerOutcome::Cancelled));
        assert_eq!(effect, Effect::None);
        assert_eq!(app.status_message, "No images attached");
    }

    #[test]
    fn test_send_text_appends_user_message() {
        let mut app = test_app();
        let effect = update(&mut app, Action::Send(pending("Hello", vec![])));
        assert_eq!(effect, Effect::Sent { reply: None });
        assert_eq!(app.store.count(), 1);
        let msg = app.store.at(0).unwrap();
        assert_eq!(msg.sender(), Sender::User);
        assert_eq!(msg.content(), &MessageContent::Text("Hello".into()));
    }

    #[test]
    fn test_send_images_only() {
        let mut app = test_app();
        let imgs = vec![solid_image(1, 1), solid_image(2, 2)];
        update(&mut app, Action::Send(pending("", imgs.clone())));
        let content = app.store.at(0).unwrap().content();
        assert_eq!(content, &MessageContent::Images(imgs.clone()));
        assert_eq!(content.preview_image(), Some(&imgs[0]));
    }

    #[test]
    fn test_send_empty_is_rejected() {
        let mut app = test_app();
        let effect = update(&mut app, Action::Send(pending("  ", vec![])));
        assert_eq!(effect, Effect::Rejected);
        assert!(app.store.is_empty());
    }

    #[test]
    fn test_send_with_responder_returns_reply() {
        let mut app = App::new(10, Some(Box::new(EchoResponder)));
        let effect = update(&mut app, Action::Send(pending("ping", vec![])));
        assert_eq!(
            effect,
            Effect::Sent {
                reply: Some("You said: ping".into())
            }
        );
    }

    #[test]
    fn test_bot_reply_appends_bot_message() {
        let mut app = test_app();
        update(&mut app, Action::BotReply("hi".into()));
        assert_eq!(app.store.last().unwrap().sender(), Sender::Bot);

        // Blank replies are dropped
        update(&mut app, Action::BotReply("   ".into()));
        assert_eq!(app.store.count(), 1);
    }
}

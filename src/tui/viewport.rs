//! # Viewport Signal
//!
//! Terminal size and composer height, published on a `tokio::sync::watch`
//! channel. The event loop owns the sender; the message list owns the
//! receiver and re-pins to the bottom whenever the value changes, the way a
//! chat view scrolls to the latest message when the keyboard appears.

use log::debug;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
    /// Rows currently taken by the composer.
    pub composer_height: u16,
}

impl Viewport {
    /// Rows left for the message list under a one-row title bar.
    pub fn list_height(&self) -> u16 {
        self.height
            .saturating_sub(1)
            .saturating_sub(self.composer_height)
    }
}

pub struct ViewportSignal {
    tx: watch::Sender<Viewport>,
}

impl ViewportSignal {
    pub fn new(initial: Viewport) -> (Self, watch::Receiver<Viewport>) {
        let (tx, rx) = watch::channel(initial);
        (Self { tx }, rx)
    }

    pub fn current(&self) -> Viewport {
        *self.tx.borrow()
    }

    /// Another receiver for a component that needs the stream.
    pub fn subscribe(&self) -> watch::Receiver<Viewport> {
        self.tx.subscribe()
    }

    pub fn resized(&self, width: u16, height: u16) -> bool {
        self.publish(|v| {
            v.width = width;
            v.height = height;
        })
    }

    pub fn composer_resized(&self, composer_height: u16) -> bool {
        self.publish(|v| v.composer_height = composer_height)
    }

    /// Apply `change`; receivers are only notified if the value differs.
    fn publish(&self, change: impl FnOnce(&mut Viewport)) -> bool {
        self.tx.send_if_modified(|current| {
            let before = *current;
            change(current);
            if *current == before {
                return false;
            }
            debug!("Viewport {:?} -> {:?}", before, current);
            true
        })
    }
}

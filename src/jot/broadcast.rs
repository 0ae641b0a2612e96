//! Change notifications for open editors.
//!
//! The store calls [`Broadcaster::broadcast`] after every successful write.
//! It is fire-and-forget: no return value, no delivery guarantee. A web
//! front end plugs its WebSocket fan-out in here; [`Hub`] is the in-process
//! version, handing each subscriber an `mpsc` receiver.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, name: &str, content: &str);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBroadcaster;

impl Broadcaster for NoopBroadcaster {
    fn broadcast(&self, _name: &str, _content: &str) {}
}

/// Message delivered to subscribers. Serializes as
/// `{"type":"update","content":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NoteUpdate {
    Update { content: String },
}

impl NoteUpdate {
    pub fn content(&self) -> &str {
        match self {
            NoteUpdate::Update { content } => content,
        }
    }
}

/// Fan-out of note updates to per-note subscribers.
#[derive(Debug, Default)]
pub struct Hub {
    subscribers: Mutex<HashMap<String, Vec<Sender<NoteUpdate>>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber for `name`. Dropping the receiver unsubscribes
    /// on the next broadcast to that note.
    pub fn subscribe(&self, name: &str) -> Receiver<NoteUpdate> {
        let (tx, rx) = mpsc::channel();
        self.lock().entry(name.to_string()).or_default().push(tx);
        rx
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        self.lock().get(name).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Sender<NoteUpdate>>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Broadcaster for Hub {
    fn broadcast(&self, name: &str, content: &str) {
        let mut subscribers = self.lock();
        let Some(senders) = subscribers.get_mut(name) else {
            return;
        };

        let update = NoteUpdate::Update {
            content: content.to_string(),
        };
        senders.retain(|tx| tx.send(update.clone()).is_ok());
        if senders.is_empty() {
            subscribers.remove(name);
        }
    }
}

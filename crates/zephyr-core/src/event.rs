//! Event system for editor notifications.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! Rust's ownership model makes traditional observer patterns tricky.
//! We use `tokio::sync::broadcast` for a safe, async-friendly event bus.
//!
//! Key differences from OOP observers:
//! - No object references to manage
//! - Events are values, not callbacks
//! - Subscribers receive copies (Clone)

use crate::document::DocumentId;
use crate::streamer::LineEnding;
use std::path::PathBuf;
use tokio::sync::broadcast;

/// Events that can occur in the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    // Document events
    /// A document was opened or created
    DocumentOpened(DocumentId),
    /// A document was closed
    DocumentClosed(DocumentId),
    /// A document was written to the given path
    DocumentSaved(DocumentId, PathBuf),
    /// A document's content changed
    DocumentChanged(DocumentId),
    /// A document became the active one
    DocumentFocused(DocumentId),

    /// Selection or caret changed
    SelectionChanged(DocumentId),

    // Search events
    /// A find request matched nothing
    NoMatches { pattern: String },
    /// A find request wrapped around the end (or start) of the document
    SearchWrapped(DocumentId),

    // Editor events
    /// The terminator used for writing changed
    LineEndingChanged(LineEnding),
    /// Configuration changed
    ConfigChanged,
    /// Editor is quitting
    Quit,
}

/// Event bus for broadcasting editor events.
///
/// Lagged receivers don't block senders; they skip ahead and are told how
/// many events they missed.
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        // Capacity of 256 events in the buffer
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // No receivers is not an error
        let _ = self.sender.send(event);
    }

    /// Subscribes to events.
    ///
    /// Returns a receiver that will get all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Helper for processing events asynchronously.
///
/// ## Example
///
/// ```ignore
/// let mut handler = EventHandler::new(editor.subscribe());
///
/// tokio::spawn(async move {
///     while let Some(event) = handler.next().await {
///         if let EditorEvent::NoMatches { pattern } = event {
///             println!("Nothing found for {pattern}");
///         }
///     }
/// });
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<EditorEvent>,
}

impl EventHandler {
    /// Creates a new event handler.
    pub fn new(receiver: broadcast::Receiver<EditorEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next event if one is already queued.
    pub fn try_next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(EditorEvent::ConfigChanged);

        let event = rx.recv().await.unwrap();
        assert_eq!(event, EditorEvent::ConfigChanged);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(EditorEvent::NoMatches {
            pattern: "x".to_string(),
        });

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_handler_ends_when_bus_dropped() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());

        bus.emit(EditorEvent::Quit);
        drop(bus);

        assert_eq!(handler.next().await, Some(EditorEvent::Quit));
        assert_eq!(handler.next().await, None);
    }

    #[test]
    fn test_handler_skips_lagged_events() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());

        for _ in 0..300 {
            bus.emit(EditorEvent::ConfigChanged);
        }
        bus.emit(EditorEvent::Quit);

        let mut received = Vec::new();
        while let Some(event) = handler.try_next() {
            received.push(event);
        }
        assert_eq!(received.len(), 256);
        assert_eq!(received.last(), Some(&EditorEvent::Quit));
    }
}

//! Transport-Abstraktion zwischen Session und Relay
//!
//! Ein Transport liefert eine lazy, reihenfolgetreue Folge von
//! [`TransportEvent`]s und nimmt serialisierte Envelopes als Text-Frames an.

pub mod memory;
pub mod websocket;

use async_trait::async_trait;

use crate::error::TransportError;

pub use memory::{MemoryPeer, MemoryTransport};
pub use websocket::WebSocketTransport;

/// Ereignis vom Transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Rohes Envelope vom Relay
    Message(Vec<u8>),
    /// Verbindung regulaer beendet (Grund)
    Closed(String),
    /// Verbindung durch Fehler beendet
    Error(String),
}

impl TransportEvent {
    /// Beendet dieses Ereignis die Verbindung?
    pub fn ist_terminal(&self) -> bool {
        !matches!(self, TransportEvent::Message(_))
    }
}

/// Bidirektionale Verbindung zum Relay
///
/// `next_event` muss cancel-safe sein, da die Session es in `tokio::select!`
/// verwendet.
#[async_trait]
pub trait Transport: Send {
    /// Baut die Verbindung auf
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Sendet ein serialisiertes Envelope
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Wartet auf das naechste Ereignis
    async fn next_event(&mut self) -> TransportEvent;

    /// Schliesst die Verbindung (idempotent)
    async fn close(&mut self) -> Result<(), TransportError>;
}

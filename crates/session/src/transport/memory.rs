//! In-Process-Transport fuer Tests und Loopback-Relays
//!
//! `MemoryTransport::paar()` liefert den Client-Teil und den Relay-Teil
//! ([`MemoryPeer`]). Was die Session sendet, kommt beim Peer an; was der
//! Peer zustellt, liefert `next_event`.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Transport, TransportEvent};
use crate::error::TransportError;

/// Client-Seite einer In-Process-Verbindung
pub struct MemoryTransport {
    ausgehend: Option<mpsc::UnboundedSender<String>>,
    eingehend: mpsc::UnboundedReceiver<TransportEvent>,
    verbunden: bool,
}

/// Relay-Seite einer In-Process-Verbindung
pub struct MemoryPeer {
    an_client: mpsc::UnboundedSender<TransportEvent>,
    vom_client: mpsc::UnboundedReceiver<String>,
}

impl MemoryTransport {
    pub fn paar() -> (MemoryTransport, MemoryPeer) {
        let (client_tx, peer_rx) = mpsc::unbounded_channel();
        let (peer_tx, client_rx) = mpsc::unbounded_channel();

        let transport = MemoryTransport {
            ausgehend: Some(client_tx),
            eingehend: client_rx,
            verbunden: false,
        };
        let peer = MemoryPeer {
            an_client: peer_tx,
            vom_client: peer_rx,
        };
        (transport, peer)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.ausgehend.is_none() {
            return Err(TransportError::Verbindung(
                "Verbindung wurde bereits geschlossen".to_string(),
            ));
        }
        self.verbunden = true;
        Ok(())
    }

    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        if !self.verbunden {
            return Err(TransportError::NichtVerbunden);
        }
        let tx = self.ausgehend.as_ref().ok_or(TransportError::NichtVerbunden)?;
        tx.send(text)
            .map_err(|_| TransportError::Senden("Gegenstelle nicht mehr erreichbar".to_string()))
    }

    async fn next_event(&mut self) -> TransportEvent {
        match self.eingehend.recv().await {
            Some(event) => event,
            None => TransportEvent::Closed("Gegenstelle beendet".to_string()),
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        // Sender droppen: der Peer sieht das Ende seines Empfangskanals
        self.ausgehend = None;
        self.verbunden = false;
        Ok(())
    }
}

impl MemoryPeer {
    /// Stellt dem Client ein rohes Envelope zu
    pub fn zustellen(&self, raw: impl Into<Vec<u8>>) -> bool {
        self.an_client.send(TransportEvent::Message(raw.into())).is_ok()
    }

    /// Beendet die Verbindung aus Sicht des Relays
    pub fn schliessen(&self, grund: impl Into<String>) -> bool {
        self.an_client.send(TransportEvent::Closed(grund.into())).is_ok()
    }

    /// Meldet einen Transportfehler an den Client
    pub fn fehler_melden(&self, grund: impl Into<String>) -> bool {
        self.an_client.send(TransportEvent::Error(grund.into())).is_ok()
    }

    /// Naechster Frame vom Client; `None` wenn der Client geschlossen hat
    pub async fn empfangen(&mut self) -> Option<String> {
        self.vom_client.recv().await
    }

    pub fn try_empfangen(&mut self) -> Option<String> {
        self.vom_client.try_recv().ok()
    }

    /// Zerlegt den Peer in Sende- und Empfangsteil
    pub fn aufteilen(
        self,
    ) -> (
        mpsc::UnboundedSender<TransportEvent>,
        mpsc::UnboundedReceiver<String>,
    ) {
        (self.an_client, self.vom_client)
    }
}

//! relaychat-session – Client-Kern des Ende-zu-Ende verschluesselten Gruppenchats
//!
//! Dieses Crate implementiert:
//! - Session: Verbindungsaufbau, Ankuendigung, Fan-out beim Senden, Empfangs-Dispatch
//! - Roster: bekannte Teilnehmer mit `NotFound` statt Panik
//! - Transport-Trait + WebSocket- und In-Memory-Implementierung
//! - Presentation-Trait + ChannelPresentation (lazy Notification-Folge)
//!
//! # Beispiel
//!
//! ```no_run
//! use relaychat_crypto::X25519Provider;
//! use relaychat_session::{ChannelPresentation, Session, WebSocketTransport};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (presentation, mut notifications) = ChannelPresentation::neu();
//!     let transport = WebSocketTransport::neu("ws://127.0.0.1:3000/ws");
//!     let session = Session::neu("alice", X25519Provider::default(), transport, presentation)
//!         .unwrap();
//!
//!     let (eingabe, rx) = tokio::sync::mpsc::channel(16);
//!     tokio::spawn(session.run(rx));
//!     eingabe.send("hallo".to_string()).await.unwrap();
//!
//!     while let Some(n) = notifications.next().await {
//!         println!("{:?}", n);
//!     }
//! }
//! ```

pub mod error;
pub mod notification;
pub mod presentation;
pub mod roster;
pub mod session;
pub mod state;
pub mod transport;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use error::{RosterError, SessionError, SessionResult, TransportError};
pub use notification::{Anomaly, Notification, ServerMessage};
pub use presentation::{ChannelPresentation, NotificationStream, Presentation};
pub use roster::{Participant, Roster};
pub use session::Session;
pub use state::SessionState;
pub use transport::{MemoryPeer, MemoryTransport, Transport, TransportEvent, WebSocketTransport};

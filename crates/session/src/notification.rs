//! Domain-Benachrichtigungen fuer die Presentation
//!
//! Die Session baut kein Markup; sie liefert strukturierte Daten.
//! `Display` liefert den Text, den eine einfache Oberflaeche anzeigen kann.

use std::fmt;

use relaychat_core::ParticipantId;

use crate::state::SessionState;

/// Auffaelligkeiten bei eingehenden Nachrichten (verworfen, Session laeuft weiter)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// `relay_message` von einer ID, die nicht im Roster steht
    UnknownSender { sender: ParticipantId },
    /// Payload liess sich nicht mit dem eigenen Schluessel oeffnen
    Undecryptable { sender: ParticipantId, name: String },
}

/// Systemmeldungen im Chat-Verlauf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    UserJoined { name: String },
    UserLeft { name: String },
    Anomaly(Anomaly),
    ConnectionClosed { reason: String },
}

/// Ein Ereignis fuer die Oberflaeche, in Erzeugungsreihenfolge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    UserMessage { name: String, text: String },
    Server(ServerMessage),
    State(SessionState),
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::UnknownSender { sender } => {
                write!(f, "Nachricht von unbekanntem Absender {} verworfen.", sender)
            }
            Anomaly::Undecryptable { name, .. } => {
                write!(f, "Nachricht von {} konnte nicht entschluesselt werden.", name)
            }
        }
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::UserJoined { name } => write!(f, "{} ist dem Chat beigetreten.", name),
            ServerMessage::UserLeft { name } => write!(f, "{} hat den Chat verlassen.", name),
            ServerMessage::Anomaly(anomaly) => anomaly.fmt(f),
            ServerMessage::ConnectionClosed { reason } => {
                write!(f, "Verbindung geschlossen: {}", reason)
            }
        }
    }
}

//! Envelope-Definitionen
//!
//! ## Nachrichtentypen
//! | kind            | Felder                        | Richtung                     |
//! |-----------------|-------------------------------|------------------------------|
//! | `first`         | `public_key`, `name`          | Client -> Relay, einmalig     |
//! | `new_user`      | `user: {id, name, public_key}`| Relay -> Client (Broadcast)   |
//! | `relay_message` | `sender`, `payload`           | Relay -> Client               |
//! | `send_message`  | `recipient`, `payload`        | Client -> Relay, je Empfaenger|
//! | `user_left`     | `user_id`                     | Relay -> Client (Broadcast)   |
//!
//! Das Diskriminanten-Feld heisst `kind` (internally tagged enum).

use relaychat_core::{Ciphertext, ParticipantId, PublicKey};
use serde::{Deserialize, Serialize};

/// Oeffentliche Identitaet eines Teilnehmers wie vom Relay gemeldet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireUser {
    pub id: ParticipantId,
    pub name: String,
    pub public_key: PublicKey,
}

/// Alle Nachrichten zwischen Client und Relay (typsicher via Tagged Enum)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Envelope {
    /// Ankuendigung nach dem Verbindungsaufbau
    First { public_key: PublicKey, name: String },
    /// Ein neuer Teilnehmer ist beigetreten
    NewUser { user: WireUser },
    /// Vom Relay weitergeleitete Nachricht eines anderen Teilnehmers
    RelayMessage {
        sender: ParticipantId,
        payload: Ciphertext,
    },
    /// Ausgehende Nachricht fuer genau einen Empfaenger
    SendMessage {
        recipient: ParticipantId,
        payload: Ciphertext,
    },
    /// Ein Teilnehmer hat den Chat verlassen
    UserLeft { user_id: ParticipantId },
}

/// Diskriminante ohne Nutzdaten (fuer Logs und Fehlermeldungen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    First,
    NewUser,
    RelayMessage,
    SendMessage,
    UserLeft,
}

impl EnvelopeKind {
    pub const ALLE: [EnvelopeKind; 5] = [
        EnvelopeKind::First,
        EnvelopeKind::NewUser,
        EnvelopeKind::RelayMessage,
        EnvelopeKind::SendMessage,
        EnvelopeKind::UserLeft,
    ];

    /// Name wie er im `kind`-Feld auf dem Draht steht
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeKind::First => "first",
            EnvelopeKind::NewUser => "new_user",
            EnvelopeKind::RelayMessage => "relay_message",
            EnvelopeKind::SendMessage => "send_message",
            EnvelopeKind::UserLeft => "user_left",
        }
    }

    /// Sucht die Diskriminante zu einem Draht-Namen
    pub fn from_wire(kind: &str) -> Option<Self> {
        Self::ALLE.into_iter().find(|k| k.as_str() == kind)
    }
}

impl std::fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Envelope {
    /// Erstellt die Ankuendigung (`first`)
    pub fn first(name: impl Into<String>, public_key: PublicKey) -> Self {
        Self::First {
            public_key,
            name: name.into(),
        }
    }

    /// Erstellt eine ausgehende Nachricht fuer einen Empfaenger
    pub fn send_message(recipient: ParticipantId, payload: Ciphertext) -> Self {
        Self::SendMessage { recipient, payload }
    }

    pub fn kind(&self) -> EnvelopeKind {
        match self {
            Envelope::First { .. } => EnvelopeKind::First,
            Envelope::NewUser { .. } => EnvelopeKind::NewUser,
            Envelope::RelayMessage { .. } => EnvelopeKind::RelayMessage,
            Envelope::SendMessage { .. } => EnvelopeKind::SendMessage,
            Envelope::UserLeft { .. } => EnvelopeKind::UserLeft,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

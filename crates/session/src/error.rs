//! Fehlertypen fuer Roster, Transport und Session

use relaychat_core::ParticipantId;
use relaychat_crypto::CryptoError;
use relaychat_protocol::ParseError;
use thiserror::Error;

use crate::state::SessionState;

/// Fehler bei Roster-Operationen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// Unbekannte Teilnehmer-ID
    #[error("Teilnehmer nicht gefunden: {0}")]
    NotFound(ParticipantId),

    /// Die lokale Identitaet ist nie Mitglied des eigenen Rosters
    #[error("Eigene Identitaet kann nicht in das Roster aufgenommen werden")]
    SelfReference,
}

/// Fehler der Transport-Schicht
#[derive(Debug, Error)]
pub enum TransportError {
    /// Verbindungsaufbau fehlgeschlagen
    #[error("Verbindungsaufbau fehlgeschlagen: {0}")]
    Verbindung(String),

    /// Frame konnte nicht gesendet werden
    #[error("Senden fehlgeschlagen: {0}")]
    Senden(String),

    /// Operation ohne offene Verbindung
    #[error("Transport nicht verbunden")]
    NichtVerbunden,
}

/// Fehlertyp fuer die Session
#[derive(Debug, Error)]
pub enum SessionError {
    /// Senden ausserhalb des Zustands `Announced`
    #[error("Nicht verbunden (Zustand: {0})")]
    NotConnected(SessionState),

    /// `connect` auf einer bereits gestarteten Session
    #[error("Session bereits gestartet (Zustand: {0})")]
    BereitsGestartet(SessionState),

    #[error("Kryptografie-Fehler: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Transport-Fehler: {0}")]
    Transport(#[from] TransportError),

    #[error("Ungueltiges Envelope: {0}")]
    Parse(#[from] ParseError),

    #[error("Roster-Fehler: {0}")]
    Roster(#[from] RosterError),

    #[error("Serialisierungsfehler: {0}")]
    Serialisierung(#[from] serde_json::Error),
}

/// Result-Alias fuer Session-Operationen
pub type SessionResult<T> = Result<T, SessionError>;

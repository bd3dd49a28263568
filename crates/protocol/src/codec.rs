//! JSON-Codec fuer Envelopes
//!
//! `parse` prueft zuerst die Groesse, dann ob ein JSON-Objekt mit
//! bekanntem `kind` vorliegt, und erst danach die Felder der Variante.
//! Ein Fehler in irgendeiner Stufe liefert einen `ParseError`, nie ein
//! halb befuelltes Envelope.
//!
//! Rundlauf-Gesetz: `parse(serialize(e)) == e` fuer jedes gueltige `e`.

use serde_json::Value;
use thiserror::Error;

use crate::envelope::{Envelope, EnvelopeKind};

/// Standard-maximale Envelope-Groesse (1 MB)
pub const DEFAULT_MAX_ENVELOPE_SIZE: usize = 1024 * 1024;

/// Fehler beim Dekodieren eines eingehenden Envelopes
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Envelope zu gross: {groesse} Bytes (Maximum: {maximum} Bytes)")]
    ZuGross { groesse: usize, maximum: usize },

    #[error("Ungueltiges JSON: {0}")]
    UngueltigesJson(#[source] serde_json::Error),

    #[error("Envelope ist kein JSON-Objekt")]
    KeinObjekt,

    #[error("Feld 'kind' fehlt oder ist kein String")]
    KindFehlt,

    #[error("Unbekannter Envelope-Typ: {0}")]
    UnbekannterKind(String),

    #[error("Ungueltige Felder fuer '{kind}': {source}")]
    UngueltigeFelder {
        kind: EnvelopeKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Codec mit konfigurierbarer Maximalgroesse
#[derive(Debug, Clone)]
pub struct Codec {
    max_envelope_size: usize,
}

impl Codec {
    /// Erstellt einen Codec mit Standard-Limits
    pub fn new() -> Self {
        Self {
            max_envelope_size: DEFAULT_MAX_ENVELOPE_SIZE,
        }
    }

    /// Erstellt einen Codec mit benutzerdefinierter Maximalgroesse
    pub fn with_max_size(max_envelope_size: usize) -> Self {
        Self { max_envelope_size }
    }

    pub fn max_envelope_size(&self) -> usize {
        self.max_envelope_size
    }

    /// Dekodiert und validiert ein Envelope aus rohen Bytes
    pub fn parse(&self, raw: &[u8]) -> Result<Envelope, ParseError> {
        if raw.len() > self.max_envelope_size {
            return Err(ParseError::ZuGross {
                groesse: raw.len(),
                maximum: self.max_envelope_size,
            });
        }

        let value: Value = serde_json::from_slice(raw).map_err(ParseError::UngueltigesJson)?;
        let object = value.as_object().ok_or(ParseError::KeinObjekt)?;

        let kind = match object.get("kind") {
            Some(Value::String(name)) => EnvelopeKind::from_wire(name)
                .ok_or_else(|| ParseError::UnbekannterKind(name.clone()))?,
            _ => return Err(ParseError::KindFehlt),
        };

        serde_json::from_value(value).map_err(|source| ParseError::UngueltigeFelder { kind, source })
    }

    /// Serialisiert ein Envelope als JSON-Text
    pub fn serialize(&self, envelope: &Envelope) -> serde_json::Result<String> {
        serde_json::to_string(envelope)
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

/// Dekodiert ein Envelope mit Standard-Limits
pub fn parse(raw: &[u8]) -> Result<Envelope, ParseError> {
    Codec::new().parse(raw)
}

/// Serialisiert ein Envelope als JSON-Text
pub fn serialize(envelope: &Envelope) -> serde_json::Result<String> {
    Codec::new().serialize(envelope)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

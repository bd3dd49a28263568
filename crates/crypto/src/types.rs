//! Gemeinsame Typen fuer das Kryptografie-Subsystem

use relaychat_core::PublicKey;
use serde::{Deserialize, Serialize};

/// Ein asymmetrisches Schluessel-Paar (oeffentlich + privat)
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// Oeffentlicher Schluessel (32 Bytes fuer X25519), darf uebertragen werden
    pub public_key: PublicKey,
    /// Privater Schluessel, verlaesst den Prozess nie
    pub private_key: SecretBytes,
}

/// Sicherer Schluessel-Container (wird beim Drop genullt)
#[derive(Clone)]
pub struct SecretBytes(Vec<u8>);

impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes([REDACTED] {} bytes)", self.0.len())
    }
}

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// AEAD-Algorithmus fuer die Versiegelung
///
/// Die Suite steht als erstes Byte im Ciphertext, damit der Empfaenger
/// unabhaengig von seiner eigenen Konfiguration entschluesseln kann.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CipherSuite {
    #[default]
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    #[serde(rename = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

impl CipherSuite {
    /// Kennung im Ciphertext-Header
    pub fn id(&self) -> u8 {
        match self {
            CipherSuite::Aes256Gcm => 1,
            CipherSuite::ChaCha20Poly1305 => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(CipherSuite::Aes256Gcm),
            2 => Some(CipherSuite::ChaCha20Poly1305),
            _ => None,
        }
    }
}

//! relaychat-core – Gemeinsame Typen
//!
//! Dieses Crate stellt die Bausteine bereit, die Protokoll, Krypto und
//! Session gemeinsam nutzen: Teilnehmer-IDs sowie oeffentliche Schluessel
//! und Ciphertexte als opake Byte-Container.

pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use types::{Ciphertext, ParticipantId, PublicKey};

//! # relaychat-crypto
//!
//! Ende-zu-Ende Verschluesselung fuer relaychat (Client <-> Client).
//! Das Relay sieht nur Ciphertexte, die jeweils fuer genau einen
//! Empfaenger versiegelt wurden (Fan-out, kein Gruppen-Schluessel).
//!
//! ## Module
//! - `provider` - `CryptoProvider`-Trait (Schluessel-Paar, encrypt, decrypt)
//! - `ecies` - Standard-Provider: X25519 + HKDF-SHA256 + AEAD
//! - `identity` - Lokale Identitaet (Name + Schluessel-Paar)
//! - `types` - Gemeinsame Typen (KeyPair, SecretBytes, CipherSuite)
//! - `error` - Fehlertypen

pub mod ecies;
pub mod error;
pub mod identity;
pub mod provider;
pub mod types;

// Bequeme Re-Exports
pub use ecies::{hkdf_derive, X25519Provider};
pub use error::{CryptoError, CryptoResult};
pub use identity::Identity;
pub use provider::CryptoProvider;
pub use types::{CipherSuite, KeyPair, SecretBytes};

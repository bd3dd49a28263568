//! Vertrag zwischen Session und Krypto-Backend
//!
//! Die Session kennt nur diesen Trait. Jede gesendete Nachricht fuehrt pro
//! Empfaenger eine eigene asymmetrische Operation aus; ein Provider darf
//! keine Session-Schluessel zwischen Aufrufen cachen.

use relaychat_core::{Ciphertext, PublicKey};

use crate::error::CryptoResult;
use crate::types::{KeyPair, SecretBytes};

/// Asymmetrische Primitive fuer die Fan-out-Verschluesselung
pub trait CryptoProvider: Send + Sync {
    /// Erzeugt ein Schluessel-Paar (einmal pro Prozess)
    fn generate_keypair(&self) -> CryptoResult<KeyPair>;

    /// Versiegelt `plaintext` fuer genau einen Empfaenger
    ///
    /// Darf randomisiert sein; zwei Aufrufe mit gleichen Argumenten
    /// liefern in der Regel verschiedene Ciphertexte.
    fn encrypt(&self, plaintext: &[u8], recipient_public_key: &PublicKey)
        -> CryptoResult<Ciphertext>;

    /// Oeffnet einen Ciphertext mit dem eigenen privaten Schluessel
    ///
    /// Schlaegt fehl, wenn der Ciphertext nicht fuer dieses Paar erzeugt wurde.
    fn decrypt(&self, ciphertext: &Ciphertext, own_private_key: &SecretBytes)
        -> CryptoResult<Vec<u8>>;
}

//! Lokale Identitaet des laufenden Clients
//!
//! Genau eine pro Prozess, beim Start erzeugt und nie persistiert.
//! Nur der oeffentliche Schluessel verlaesst den Client (im `first`-Envelope).

use relaychat_core::PublicKey;

use crate::error::CryptoResult;
use crate::provider::CryptoProvider;
use crate::types::{KeyPair, SecretBytes};

/// Anzeigename plus Schluessel-Paar
pub struct Identity {
    name: String,
    keypair: KeyPair,
}

impl Identity {
    /// Erzeugt eine frische Identitaet ueber den Provider
    pub fn generate<C>(name: impl Into<String>, provider: &C) -> CryptoResult<Self>
    where
        C: CryptoProvider + ?Sized,
    {
        let keypair = provider.generate_keypair()?;
        Ok(Self {
            name: name.into(),
            keypair,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.keypair.public_key
    }

    pub fn private_key(&self) -> &SecretBytes {
        &self.keypair.private_key
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("name", &self.name)
            .field("public_key", &self.keypair.public_key.fingerprint())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Versiegelung pro Empfaenger (ECIES-aehnlich)
//!
//! Pro `encrypt`-Aufruf:
//! 1. Ephemeres X25519-Schluessel-Paar generieren
//! 2. DH mit dem Empfaenger-Public-Key
//! 3. HKDF-SHA256 -> 32-Byte AEAD-Schluessel
//! 4. AES-256-GCM oder ChaCha20-Poly1305 mit zufaelliger Nonce
//!
//! ## Format
//! ```text
//! [suite(1)] [ephemeral_public(32)] [nonce(12)] [ciphertext + auth_tag(16)]
//! ```
//!
//! Suite-Byte und ephemerer Public Key gehen als AAD in den AEAD ein.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce as AesNonce,
};
use chacha20poly1305::{ChaCha20Poly1305, Nonce as ChaChaNonce};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use relaychat_core::{Ciphertext, PublicKey};
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey, StaticSecret};

use crate::error::{CryptoError, CryptoResult};
use crate::provider::CryptoProvider;
use crate::types::{CipherSuite, KeyPair, SecretBytes};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + KEY_LEN + NONCE_LEN;

/// HKDF-Info fuer die Versiegelung
const SEAL_INFO: &[u8] = b"relaychat-seal-v1";

/// Standard-Provider: X25519 + HKDF-SHA256 + AEAD
#[derive(Debug, Clone, Copy, Default)]
pub struct X25519Provider {
    suite: CipherSuite,
}

impl X25519Provider {
    /// Erstellt einen Provider, der mit `suite` versiegelt
    pub fn new(suite: CipherSuite) -> Self {
        Self { suite }
    }

    pub fn suite(&self) -> CipherSuite {
        self.suite
    }
}

impl CryptoProvider for X25519Provider {
    fn generate_keypair(&self) -> CryptoResult<KeyPair> {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);

        Ok(KeyPair {
            public_key: PublicKey::new(public.as_bytes().to_vec()),
            private_key: SecretBytes::new(secret.to_bytes().to_vec()),
        })
    }

    fn encrypt(
        &self,
        plaintext: &[u8],
        recipient_public_key: &PublicKey,
    ) -> CryptoResult<Ciphertext> {
        let recipient_bytes = key_array(recipient_public_key.as_bytes())?;

        // Ephemeres Schluessel-Paar
        let ephemeral_secret = EphemeralSecret::random_from_rng(OsRng);
        let ephemeral_public = X25519PublicKey::from(&ephemeral_secret);

        // DH-Austausch
        let dh_output = ephemeral_secret.diffie_hellman(&X25519PublicKey::from(recipient_bytes));
        if !dh_output.was_contributory() {
            return Err(CryptoError::KeyExchange(
                "Empfaenger-Schluessel liefert kein gemeinsames Geheimnis".to_string(),
            ));
        }

        let sealing_key = hkdf_derive(dh_output.as_bytes(), &recipient_bytes, SEAL_INFO, KEY_LEN)?;

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let mut out = Vec::with_capacity(HEADER_LEN + plaintext.len() + TAG_LEN);
        out.push(self.suite.id());
        out.extend_from_slice(ephemeral_public.as_bytes());

        let sealed = seal(self.suite, &sealing_key, &nonce, plaintext, &out)?;

        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);

        tracing::trace!(
            suite = ?self.suite,
            empfaenger = %recipient_public_key.fingerprint(),
            groesse = out.len(),
            "Nachricht versiegelt"
        );
        Ok(Ciphertext::new(out))
    }

    fn decrypt(
        &self,
        ciphertext: &Ciphertext,
        own_private_key: &SecretBytes,
    ) -> CryptoResult<Vec<u8>> {
        let bytes = ciphertext.as_bytes();
        if bytes.len() < HEADER_LEN + TAG_LEN {
            return Err(CryptoError::UngueltigeDaten(format!(
                "Ciphertext zu kurz: {} Bytes (Minimum: {})",
                bytes.len(),
                HEADER_LEN + TAG_LEN
            )));
        }

        // Dispatch ueber das Suite-Byte, nicht ueber die eigene Konfiguration
        let suite = CipherSuite::from_id(bytes[0]).ok_or(CryptoError::UnbekannteSuite(bytes[0]))?;
        let ephemeral_bytes = key_array(&bytes[1..1 + KEY_LEN])?;
        let aad = &bytes[..1 + KEY_LEN];
        let nonce = &bytes[1 + KEY_LEN..HEADER_LEN];
        let sealed = &bytes[HEADER_LEN..];

        // DH mit dem eigenen privaten Schluessel
        let private_key = StaticSecret::from(key_array(own_private_key.as_bytes())?);
        let own_public = X25519PublicKey::from(&private_key);
        let dh_output = private_key.diffie_hellman(&X25519PublicKey::from(ephemeral_bytes));

        let sealing_key =
            hkdf_derive(dh_output.as_bytes(), own_public.as_bytes(), SEAL_INFO, KEY_LEN)?;

        open(suite, &sealing_key, nonce, sealed, aad)
    }
}

/// HKDF-basierte Key Derivation (allgemein verwendbar)
pub fn hkdf_derive(ikm: &[u8], salt: &[u8], info: &[u8], len: usize) -> CryptoResult<Vec<u8>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = vec![0u8; len];
    hk.expand(info, &mut okm)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(okm)
}

fn key_array(bytes: &[u8]) -> CryptoResult<[u8; KEY_LEN]> {
    bytes
        .try_into()
        .map_err(|_| CryptoError::UngueltigeSchluesselLaenge {
            erwartet: KEY_LEN,
            erhalten: bytes.len(),
        })
}

fn seal(
    suite: CipherSuite,
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
    aad: &[u8],
) -> CryptoResult<Vec<u8>> {
    let payload = Payload { msg: plaintext, aad };
    let result = match suite {
        CipherSuite::Aes256Gcm => Aes256Gcm::new_from_slice(key)
            .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?
            .encrypt(AesNonce::from_slice(nonce), payload),
        CipherSuite::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key)
            .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?
            .encrypt(ChaChaNonce::from_slice(nonce), payload),
    };
    result.map_err(|e| CryptoError::Verschluesselung(e.to_string()))
}

fn open(
    suite: CipherSuite,
    key: &[u8],
    nonce: &[u8],
    sealed: &[u8],
    aad: &[u8],
) -> CryptoResult<Vec<u8>> {
    let payload = Payload { msg: sealed, aad };
    let result = match suite {
        CipherSuite::Aes256Gcm => Aes256Gcm::new_from_slice(key)
            .map_err(|e| CryptoError::Entschluesselung(e.to_string()))?
            .decrypt(AesNonce::from_slice(nonce), payload),
        CipherSuite::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key)
            .map_err(|e| CryptoError::Entschluesselung(e.to_string()))?
            .decrypt(ChaChaNonce::from_slice(nonce), payload),
    };
    result.map_err(|e| CryptoError::Entschluesselung(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

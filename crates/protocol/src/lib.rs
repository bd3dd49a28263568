//! relaychat-protocol – Wire-Schema fuer den Relay-Chat
//!
//! Dieses Crate definiert den Umschlag (`Envelope`), der zwischen Client
//! und Relay ausgetauscht wird, sowie den JSON-Codec dafuer. Klartext
//! taucht in keinem Envelope auf: Nachrichten-Payloads sind immer
//! pro Empfaenger verschluesselte Ciphertexte.

pub mod codec;
pub mod envelope;

pub use codec::{parse, serialize, Codec, ParseError, DEFAULT_MAX_ENVELOPE_SIZE};
pub use envelope::{Envelope, EnvelopeKind, WireUser};

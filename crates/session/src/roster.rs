//! Roster – bekannte Teilnehmer (id -> Name, Public Key)
//!
//! Haelt nie einen fremden privaten Schluessel. Die lokale Identitaet ist
//! nie Mitglied: ein Eintrag mit dem eigenen Public Key wird abgelehnt,
//! auch wenn das Relay die eigene Anmeldung zurueckspiegelt.

use std::collections::BTreeMap;

use relaychat_core::{ParticipantId, PublicKey};
use relaychat_protocol::WireUser;

use crate::error::RosterError;

/// Ein entfernter Chat-Teilnehmer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub public_key: PublicKey,
}

impl From<WireUser> for Participant {
    fn from(user: WireUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            public_key: user.public_key,
        }
    }
}

/// Menge der aktuell bekannten Teilnehmer, sortiert nach ID
#[derive(Debug, Clone)]
pub struct Roster {
    eigener_schluessel: PublicKey,
    teilnehmer: BTreeMap<ParticipantId, Participant>,
}

impl Roster {
    /// Erstellt ein leeres Roster fuer die Identitaet mit `eigener_schluessel`
    pub fn neu(eigener_schluessel: PublicKey) -> Self {
        Self {
            eigener_schluessel,
            teilnehmer: BTreeMap::new(),
        }
    }

    /// Fuegt einen Teilnehmer ein oder ersetzt ihn (Upsert)
    ///
    /// Gibt den ersetzten Eintrag zurueck, falls die ID schon bekannt war.
    pub fn add(&mut self, participant: Participant) -> Result<Option<Participant>, RosterError> {
        if participant.public_key == self.eigener_schluessel {
            return Err(RosterError::SelfReference);
        }
        Ok(self.teilnehmer.insert(participant.id.clone(), participant))
    }

    pub fn remove(&mut self, id: &ParticipantId) -> Result<Participant, RosterError> {
        self.teilnehmer
            .remove(id)
            .ok_or_else(|| RosterError::NotFound(id.clone()))
    }

    pub fn get(&self, id: &ParticipantId) -> Result<&Participant, RosterError> {
        self.teilnehmer
            .get(id)
            .ok_or_else(|| RosterError::NotFound(id.clone()))
    }

    /// Alle Teilnehmer in deterministischer Reihenfolge (nach ID)
    pub fn list(&self) -> impl Iterator<Item = &Participant> {
        self.teilnehmer.values()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.teilnehmer.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.teilnehmer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teilnehmer.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Session – Verbindung, Identitaet und Roster eines Chat-Clients
//!
//! Eine Session besitzt exklusiv Transport, Identitaet und Roster. Sie
//! verarbeitet Ereignisse einzeln und vollstaendig nacheinander:
//! - lokale Eingabe -> Fan-out (ein `send_message` je Roster-Eintrag)
//! - Transport-Ereignis -> Roster-Aenderung und/oder Presentation-Aufruf
//!
//! Fehler einzelner Envelopes beenden die Session nie. Nur Schliessen oder
//! Fehler des Transports fuehren nach `Closed`.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use relaychat_core::{Ciphertext, ParticipantId};
use relaychat_crypto::{CryptoError, CryptoProvider, Identity};
use relaychat_protocol::{Codec, Envelope, WireUser};

use crate::error::{RosterError, SessionError, SessionResult};
use crate::notification::{Anomaly, ServerMessage};
use crate::presentation::Presentation;
use crate::roster::{Participant, Roster};
use crate::state::SessionState;
use crate::transport::{Transport, TransportEvent};

/// Client-Session gegen ein Relay
pub struct Session<T, C, P> {
    identity: Identity,
    crypto: C,
    transport: T,
    presentation: P,
    roster: Roster,
    codec: Codec,
    state: SessionState,
}

impl<T, C, P> Session<T, C, P>
where
    T: Transport,
    C: CryptoProvider,
    P: Presentation,
{
    /// Erstellt eine Session mit frisch erzeugter Identitaet
    pub fn neu(name: impl Into<String>, crypto: C, transport: T, presentation: P) -> SessionResult<Self> {
        let identity = Identity::generate(name, &crypto)?;
        Ok(Self::mit_identitaet(identity, crypto, transport, presentation))
    }

    /// Erstellt eine Session fuer eine vorhandene Identitaet
    pub fn mit_identitaet(identity: Identity, crypto: C, transport: T, presentation: P) -> Self {
        let roster = Roster::neu(identity.public_key().clone());
        Self {
            identity,
            crypto,
            transport,
            presentation,
            roster,
            codec: Codec::new(),
            state: SessionState::Disconnected,
        }
    }

    /// Ersetzt den Codec (z.B. fuer eine andere Maximalgroesse)
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    // -----------------------------------------------------------------------
    // Verbindungsaufbau
    // -----------------------------------------------------------------------

    /// Verbindet den Transport und kuendigt die eigene Identitaet an
    ///
    /// Schlaegt der Aufbau fehl, geht die Session direkt nach `Closed`.
    pub async fn connect(&mut self) -> SessionResult<()> {
        if self.state != SessionState::Disconnected {
            return Err(SessionError::BereitsGestartet(self.state));
        }
        self.zustand_setzen(SessionState::Connecting);

        if let Err(e) = self.ankuendigen().await {
            self.beenden(e.to_string());
            return Err(e);
        }

        self.zustand_setzen(SessionState::Announced);
        info!(
            name = %self.identity.name(),
            schluessel = %self.identity.public_key().fingerprint(),
            "Beim Relay angekuendigt"
        );
        self.presentation.render_server_message(&ServerMessage::UserJoined {
            name: self.identity.name().to_string(),
        });
        Ok(())
    }

    /// Transport oeffnen und `first` senden
    async fn ankuendigen(&mut self) -> SessionResult<()> {
        self.transport.connect().await?;
        let first = Envelope::first(self.identity.name(), self.identity.public_key().clone());
        let frame = self.codec.serialize(&first)?;
        self.transport.send(frame).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Senden
    // -----------------------------------------------------------------------

    /// Verschluesselt `text` einzeln fuer jeden Roster-Eintrag und sendet
    ///
    /// Alle Ciphertexte entstehen vor dem ersten Frame; ein Krypto-Fehler
    /// sendet also nichts. Liefert die Anzahl gesendeter Envelopes.
    pub async fn send(&mut self, text: &str) -> SessionResult<usize> {
        if self.state != SessionState::Announced {
            return Err(SessionError::NotConnected(self.state));
        }

        let mut frames = Vec::with_capacity(self.roster.len());
        for participant in self.roster.list() {
            let payload = self.crypto.encrypt(text.as_bytes(), &participant.public_key)?;
            let envelope = Envelope::send_message(participant.id.clone(), payload);
            frames.push(self.codec.serialize(&envelope)?);
        }

        let anzahl = frames.len();
        for frame in frames {
            if let Err(e) = self.transport.send(frame).await {
                self.beenden(e.to_string());
                return Err(e.into());
            }
        }

        debug!(empfaenger = anzahl, "Nachricht verteilt");
        self.presentation
            .render_user_message(self.identity.name(), text);
        Ok(anzahl)
    }

    // -----------------------------------------------------------------------
    // Empfangen
    // -----------------------------------------------------------------------

    /// Verarbeitet ein Transport-Ereignis vollstaendig
    pub async fn handle_event(&mut self, event: TransportEvent) {
        if self.state.ist_geschlossen() {
            debug!(?event, "Ereignis nach Closed ignoriert");
            return;
        }

        match event {
            TransportEvent::Message(raw) => {
                if let Err(e) = self.receive(&raw) {
                    warn!(fehler = %e, "Envelope verworfen");
                }
            }
            TransportEvent::Closed(grund) => self.beenden(grund),
            TransportEvent::Error(grund) => self.beenden(format!("Transportfehler: {}", grund)),
        }
    }

    /// Dekodiert und verarbeitet ein rohes Envelope
    ///
    /// Der Fehler beschreibt, warum das Envelope verworfen wurde; die
    /// Session bleibt in jedem Fall benutzbar.
    pub fn receive(&mut self, raw: &[u8]) -> SessionResult<()> {
        let envelope = self.codec.parse(raw)?;
        let kind = envelope.kind();

        match envelope {
            Envelope::NewUser { user } => self.teilnehmer_beigetreten(user),
            Envelope::RelayMessage { sender, payload } => self.nachricht_empfangen(sender, payload),
            Envelope::UserLeft { user_id } => {
                self.teilnehmer_verlassen(user_id);
                Ok(())
            }
            Envelope::First { .. } | Envelope::SendMessage { .. } => {
                debug!(%kind, "Client-Envelope vom Relay ignoriert");
                Ok(())
            }
        }
    }

    fn teilnehmer_beigetreten(&mut self, user: WireUser) -> SessionResult<()> {
        let participant = Participant::from(user);
        let id = participant.id.clone();
        let name = participant.name.clone();

        match self.roster.add(participant) {
            Ok(vorher) => {
                info!(%id, %name, ersetzt = vorher.is_some(), "Teilnehmer beigetreten");
                self.presentation
                    .render_server_message(&ServerMessage::UserJoined { name });
                Ok(())
            }
            Err(RosterError::SelfReference) => {
                debug!(%id, "Eigene Anmeldung vom Relay zurueckgespiegelt");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn nachricht_empfangen(&mut self, sender: ParticipantId, payload: Ciphertext) -> SessionResult<()> {
        let name = match self.roster.get(&sender) {
            Ok(participant) => participant.name.clone(),
            Err(e) => {
                self.presentation
                    .render_server_message(&ServerMessage::Anomaly(Anomaly::UnknownSender {
                        sender,
                    }));
                return Err(e.into());
            }
        };

        let klartext = self
            .crypto
            .decrypt(&payload, self.identity.private_key())
            .and_then(|bytes| {
                String::from_utf8(bytes)
                    .map_err(|e| CryptoError::UngueltigeDaten(format!("Kein UTF-8: {}", e)))
            });

        match klartext {
            Ok(text) => {
                self.presentation.render_user_message(&name, &text);
                Ok(())
            }
            Err(e) => {
                self.presentation
                    .render_server_message(&ServerMessage::Anomaly(Anomaly::Undecryptable {
                        sender,
                        name,
                    }));
                Err(e.into())
            }
        }
    }

    fn teilnehmer_verlassen(&mut self, user_id: ParticipantId) {
        match self.roster.remove(&user_id) {
            Ok(participant) => {
                info!(id = %participant.id, name = %participant.name, "Teilnehmer verlassen");
                self.presentation.render_server_message(&ServerMessage::UserLeft {
                    name: participant.name,
                });
            }
            Err(e) => debug!(fehler = %e, "user_left fuer unbekannte ID ignoriert"),
        }
    }

    // -----------------------------------------------------------------------
    // Beenden
    // -----------------------------------------------------------------------

    /// Schliesst die Verbindung auf Wunsch des lokalen Benutzers
    pub async fn close(&mut self) {
        if self.state.ist_geschlossen() {
            return;
        }
        if let Err(e) = self.transport.close().await {
            debug!(fehler = %e, "Transport liess sich nicht sauber schliessen");
        }
        self.beenden("Vom Benutzer beendet".to_string());
    }

    /// Treibt die Session bis `Closed`
    ///
    /// Verbindet zuerst, falls noch nicht geschehen. Jede Zeile aus `eingabe`
    /// wird gesendet; endet die Eingabe, wird die Session geschlossen.
    /// Danach wird die Session gedroppt, womit auch die Presentation endet.
    pub async fn run(mut self, mut eingabe: mpsc::Receiver<String>) {
        if self.state == SessionState::Disconnected {
            if let Err(e) = self.connect().await {
                warn!(fehler = %e, "Verbindung zum Relay fehlgeschlagen");
                return;
            }
        }

        while !self.state.ist_geschlossen() {
            tokio::select! {
                event = self.transport.next_event() => self.handle_event(event).await,
                zeile = eingabe.recv() => match zeile {
                    Some(text) => {
                        if let Err(e) = self.send(&text).await {
                            warn!(fehler = %e, "Senden fehlgeschlagen");
                        }
                    }
                    None => self.close().await,
                },
            }
        }

        info!("Session beendet");
    }

    fn zustand_setzen(&mut self, ziel: SessionState) {
        if !self.state.kann_wechseln_zu(ziel) {
            warn!(von = %self.state, nach = %ziel, "Ungueltiger Zustandswechsel ignoriert");
            return;
        }
        debug!(von = %self.state, nach = %ziel, "Zustandswechsel");
        self.state = ziel;
        self.presentation.render_state(ziel);
    }

    /// Terminaler Uebergang nach `Closed` mit Hinweis an die Presentation
    fn beenden(&mut self, grund: String) {
        if self.state.ist_geschlossen() {
            return;
        }
        info!(%grund, "Verbindung geschlossen");
        self.presentation
            .render_server_message(&ServerMessage::ConnectionClosed { reason: grund });
        self.zustand_setzen(SessionState::Closed);
    }
}

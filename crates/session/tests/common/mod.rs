//! Loopback-Relay fuer Integrationstests
//!
//! Verhaelt sich wie ein einfaches Broadcast-Relay:
//! - `first` -> ID vergeben, bestehende Teilnehmer an den Neuen melden,
//!   `new_user` an alle (inklusive Absender)
//! - `send_message` -> `relay_message` an genau den Empfaenger
//! - Verbindungsende -> `user_left` an alle verbleibenden

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use relaychat_core::ParticipantId;
use relaychat_crypto::X25519Provider;
use relaychat_protocol::{parse, serialize, Envelope, WireUser};
use relaychat_session::{
    ChannelPresentation, MemoryPeer, MemoryTransport, Notification, NotificationStream, Session,
    TransportEvent,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const WARTEZEIT: Duration = Duration::from_secs(5);

enum RelayEreignis {
    Frame(usize, String),
    Getrennt(usize),
}

struct RelayClient {
    an_client: mpsc::UnboundedSender<TransportEvent>,
    user: Option<WireUser>,
}

/// Handle auf ein laufendes Loopback-Relay
pub struct LoopbackRelay {
    neue_peers: mpsc::UnboundedSender<MemoryPeer>,
    weitergeleitet: Arc<AtomicUsize>,
}

impl LoopbackRelay {
    pub fn starten() -> Self {
        let (neue_peers, peer_rx) = mpsc::unbounded_channel();
        let weitergeleitet = Arc::new(AtomicUsize::new(0));
        tokio::spawn(relay_schleife(peer_rx, weitergeleitet.clone()));
        Self {
            neue_peers,
            weitergeleitet,
        }
    }

    /// Neuer Client-Transport, dessen Gegenstelle das Relay ist
    pub fn verbinden(&self) -> MemoryTransport {
        let (transport, peer) = MemoryTransport::paar();
        self.neue_peers
            .send(peer)
            .expect("Relay-Task laeuft nicht mehr");
        transport
    }

    /// Anzahl bisher weitergeleiteter `relay_message`-Envelopes
    pub fn weitergeleitet(&self) -> usize {
        self.weitergeleitet.load(Ordering::SeqCst)
    }
}

async fn relay_schleife(
    mut peer_rx: mpsc::UnboundedReceiver<MemoryPeer>,
    weitergeleitet: Arc<AtomicUsize>,
) {
    let (ereignis_tx, mut ereignis_rx) = mpsc::unbounded_channel();
    let mut clients: Vec<RelayClient> = Vec::new();

    loop {
        tokio::select! {
            Some(peer) = peer_rx.recv() => {
                let index = clients.len();
                let (an_client, mut vom_client) = peer.aufteilen();
                clients.push(RelayClient { an_client, user: None });

                let tx = ereignis_tx.clone();
                tokio::spawn(async move {
                    while let Some(frame) = vom_client.recv().await {
                        let _ = tx.send(RelayEreignis::Frame(index, frame));
                    }
                    let _ = tx.send(RelayEreignis::Getrennt(index));
                });
            }
            Some(ereignis) = ereignis_rx.recv() => {
                verarbeiten(&mut clients, ereignis, &weitergeleitet);
            }
        }
    }
}

fn zustellen(client: &RelayClient, envelope: &Envelope) {
    let text = serialize(envelope).expect("Serialisierung fehlgeschlagen");
    let _ = client.an_client.send(TransportEvent::Message(text.into_bytes()));
}

fn verarbeiten(clients: &mut [RelayClient], ereignis: RelayEreignis, weitergeleitet: &AtomicUsize) {
    match ereignis {
        RelayEreignis::Frame(index, frame) => {
            let Ok(envelope) = parse(frame.as_bytes()) else {
                return;
            };
            match envelope {
                Envelope::First { public_key, name } => {
                    let user = WireUser {
                        id: ParticipantId::new(format!("user-{}", index)),
                        name,
                        public_key,
                    };
                    for bestehend in clients.iter().filter_map(|c| c.user.clone()) {
                        zustellen(&clients[index], &Envelope::NewUser { user: bestehend });
                    }
                    clients[index].user = Some(user.clone());
                    let neu = Envelope::NewUser { user };
                    for client in clients.iter().filter(|c| c.user.is_some()) {
                        zustellen(client, &neu);
                    }
                }
                Envelope::SendMessage { recipient, payload } => {
                    let Some(sender) = clients[index].user.as_ref().map(|u| u.id.clone()) else {
                        return;
                    };
                    let ziel = clients
                        .iter()
                        .find(|c| c.user.as_ref().map(|u| &u.id) == Some(&recipient));
                    if let Some(ziel) = ziel {
                        weitergeleitet.fetch_add(1, Ordering::SeqCst);
                        zustellen(ziel, &Envelope::RelayMessage { sender, payload });
                    }
                }
                _ => {}
            }
        }
        RelayEreignis::Getrennt(index) => {
            if let Some(user) = clients[index].user.take() {
                let left = Envelope::UserLeft { user_id: user.id };
                for client in clients.iter().filter(|c| c.user.is_some()) {
                    zustellen(client, &left);
                }
            }
        }
    }
}

/// Ein laufender Chat-Client am Loopback-Relay
pub struct TestClient {
    pub eingabe: mpsc::Sender<String>,
    pub notifications: NotificationStream,
    pub handle: JoinHandle<()>,
}

pub fn client_starten(relay: &LoopbackRelay, name: &str) -> TestClient {
    let (presentation, notifications) = ChannelPresentation::neu();
    let session = Session::neu(name, X25519Provider::default(), relay.verbinden(), presentation)
        .expect("Session konnte nicht erstellt werden");

    let (eingabe, rx) = mpsc::channel(16);
    let handle = tokio::spawn(session.run(rx));
    TestClient {
        eingabe,
        notifications,
        handle,
    }
}

/// Wartet auf die erste Notification, die `passt` erfuellt
pub async fn warte_auf<F>(stream: &mut NotificationStream, passt: F) -> Notification
where
    F: Fn(&Notification) -> bool,
{
    tokio::time::timeout(WARTEZEIT, async {
        loop {
            match stream.next().await {
                Some(n) if passt(&n) => return n,
                Some(_) => continue,
                None => panic!("Notification-Stream endete vorzeitig"),
            }
        }
    })
    .await
    .expect("Timeout beim Warten auf Notification")
}

/// Sammelt alle Notifications bis zum Ende des Streams
pub async fn bis_zum_ende(stream: &mut NotificationStream) -> Vec<Notification> {
    let mut alle = Vec::new();
    let _ = tokio::time::timeout(WARTEZEIT, async {
        while let Some(n) = stream.next().await {
            alle.push(n);
        }
    })
    .await;
    alle
}

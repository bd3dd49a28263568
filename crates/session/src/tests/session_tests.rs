//! Unit-Tests fuer die Session (ohne Relay, Frames direkt ueber den MemoryPeer)

use relaychat_core::{Ciphertext, ParticipantId, PublicKey};
use relaychat_crypto::{CryptoProvider, KeyPair, X25519Provider};
use relaychat_protocol::{parse, serialize, Codec, Envelope, WireUser};

use crate::{
    error::{RosterError, SessionError},
    notification::{Anomaly, Notification, ServerMessage},
    presentation::{ChannelPresentation, NotificationStream},
    session::Session,
    state::SessionState,
    transport::{MemoryPeer, MemoryTransport, Transport, TransportEvent},
};

type TestSession = Session<MemoryTransport, X25519Provider, ChannelPresentation>;

fn neue_session(name: &str) -> (TestSession, MemoryPeer, NotificationStream) {
    let (transport, peer) = MemoryTransport::paar();
    let (presentation, stream) = ChannelPresentation::neu();
    let session = Session::neu(name, X25519Provider::default(), transport, presentation)
        .expect("Session konnte nicht erstellt werden");
    (session, peer, stream)
}

async fn verbundene_session(name: &str) -> (TestSession, MemoryPeer, NotificationStream) {
    let (mut session, mut peer, mut stream) = neue_session(name);
    session.connect().await.expect("Connect fehlgeschlagen");
    // first-Envelope und Start-Notifications verwerfen
    peer.try_empfangen().expect("first fehlt");
    alle(&mut stream);
    (session, peer, stream)
}

fn alle(stream: &mut NotificationStream) -> Vec<Notification> {
    std::iter::from_fn(|| stream.try_next()).collect()
}

fn new_user(id: &str, name: &str, public_key: &PublicKey) -> Vec<u8> {
    let envelope = Envelope::NewUser {
        user: WireUser {
            id: ParticipantId::from(id),
            name: name.to_string(),
            public_key: public_key.clone(),
        },
    };
    serialize(&envelope).unwrap().into_bytes()
}

fn user_left(id: &str) -> Vec<u8> {
    serialize(&Envelope::UserLeft {
        user_id: ParticipantId::from(id),
    })
    .unwrap()
    .into_bytes()
}

fn relay_message(sender: &str, payload: Ciphertext) -> Vec<u8> {
    serialize(&Envelope::RelayMessage {
        sender: ParticipantId::from(sender),
        payload,
    })
    .unwrap()
    .into_bytes()
}

fn schluessel() -> KeyPair {
    X25519Provider::default().generate_keypair().unwrap()
}

// ---------------------------------------------------------------------------
// Verbindungsaufbau
// ---------------------------------------------------------------------------

#[tokio::test]
async fn connect_kuendigt_identitaet_an() {
    let (mut session, mut peer, mut stream) = neue_session("alice");
    assert_eq!(session.state(), SessionState::Disconnected);

    session.connect().await.unwrap();
    assert_eq!(session.state(), SessionState::Announced);

    let frame = peer.try_empfangen().expect("first-Envelope fehlt");
    let envelope = parse(frame.as_bytes()).unwrap();
    assert_eq!(
        envelope,
        Envelope::first("alice", session.identity().public_key().clone())
    );
    assert!(peer.try_empfangen().is_none());

    assert_eq!(
        alle(&mut stream),
        vec![
            Notification::State(SessionState::Connecting),
            Notification::State(SessionState::Announced),
            Notification::Server(ServerMessage::UserJoined {
                name: "alice".into()
            }),
        ]
    );
}

#[tokio::test]
async fn zweites_connect_abgelehnt() {
    let (mut session, _peer, _stream) = verbundene_session("alice").await;
    let result = session.connect().await;
    assert!(matches!(
        result,
        Err(SessionError::BereitsGestartet(SessionState::Announced))
    ));
}

#[tokio::test]
async fn fehlgeschlagener_connect_fuehrt_nach_closed() {
    let (mut transport, _peer) = MemoryTransport::paar();
    transport.close().await.unwrap();
    let (presentation, mut stream) = ChannelPresentation::neu();
    let mut session =
        Session::neu("alice", X25519Provider::default(), transport, presentation).unwrap();

    assert!(session.connect().await.is_err());
    assert_eq!(session.state(), SessionState::Closed);

    let notifications = alle(&mut stream);
    assert_eq!(notifications.last(), Some(&Notification::State(SessionState::Closed)));
    assert!(notifications
        .iter()
        .any(|n| matches!(n, Notification::Server(ServerMessage::ConnectionClosed { .. }))));
}

#[tokio::test]
async fn fehlgeschlagene_ankuendigung_fuehrt_nach_closed() {
    // Relay-Seite weg: connect gelingt, das Senden von `first` nicht
    let (transport, peer) = MemoryTransport::paar();
    drop(peer);
    let (presentation, mut stream) = ChannelPresentation::neu();
    let mut session =
        Session::neu("alice", X25519Provider::default(), transport, presentation).unwrap();

    let result = session.connect().await;
    assert!(matches!(result, Err(SessionError::Transport(_))));
    assert_eq!(session.state(), SessionState::Closed);

    let notifications = alle(&mut stream);
    assert!(!notifications
        .iter()
        .any(|n| matches!(n, Notification::Server(ServerMessage::UserJoined { .. }))));
    assert_eq!(notifications.last(), Some(&Notification::State(SessionState::Closed)));
}

// ---------------------------------------------------------------------------
// Senden / Fan-out
// ---------------------------------------------------------------------------

#[tokio::test]
async fn senden_vor_connect_ist_not_connected() {
    let (mut session, mut peer, mut stream) = neue_session("alice");
    let result = session.send("zu frueh").await;

    assert!(matches!(
        result,
        Err(SessionError::NotConnected(SessionState::Disconnected))
    ));
    assert!(peer.try_empfangen().is_none());
    assert!(alle(&mut stream).is_empty());
}

#[tokio::test]
async fn leeres_roster_sendet_nichts() {
    let (mut session, mut peer, mut stream) = verbundene_session("alice").await;

    assert_eq!(session.send("hallo?").await.unwrap(), 0);
    assert!(peer.try_empfangen().is_none());
    // Lokal-Echo trotzdem
    assert_eq!(
        alle(&mut stream),
        vec![Notification::UserMessage {
            name: "alice".into(),
            text: "hallo?".into()
        }]
    );
}

#[tokio::test]
async fn fan_out_ein_envelope_pro_teilnehmer() {
    let (mut session, mut peer, _stream) = verbundene_session("alice").await;
    let provider = X25519Provider::default();

    let teilnehmer: Vec<(&str, KeyPair)> =
        vec![("b", schluessel()), ("c", schluessel()), ("d", schluessel())];
    for (id, kp) in &teilnehmer {
        session.receive(&new_user(id, id, &kp.public_key)).unwrap();
    }

    assert_eq!(session.send("geheim").await.unwrap(), 3);

    let mut empfaenger = Vec::new();
    while let Some(frame) = peer.try_empfangen() {
        let Envelope::SendMessage { recipient, payload } = parse(frame.as_bytes()).unwrap() else {
            panic!("send_message erwartet");
        };

        let (_, eigenes) = teilnehmer
            .iter()
            .find(|(id, _)| *id == recipient.as_str())
            .expect("Empfaenger unbekannt");
        assert_eq!(provider.decrypt(&payload, &eigenes.private_key).unwrap(), b"geheim");

        // Kein anderer Teilnehmer kann diesen Payload oeffnen
        for (id, fremd) in &teilnehmer {
            if *id != recipient.as_str() {
                assert!(provider.decrypt(&payload, &fremd.private_key).is_err());
            }
        }
        empfaenger.push(recipient);
    }

    let ids: Vec<&str> = empfaenger.iter().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "d"]);
}

#[tokio::test]
async fn ciphertexte_werden_nicht_wiederverwendet() {
    let (mut session, mut peer, _stream) = verbundene_session("alice").await;
    let schluessel_b = schluessel();
    // Zwei IDs mit identischem Public Key: trotzdem zwei verschiedene Ciphertexte
    session.receive(&new_user("b1", "bob", &schluessel_b.public_key)).unwrap();
    session.receive(&new_user("b2", "bob", &schluessel_b.public_key)).unwrap();

    session.send("gleich").await.unwrap();
    let a = peer.try_empfangen().unwrap();
    let b = peer.try_empfangen().unwrap();
    let payload = |f: &str| match parse(f.as_bytes()).unwrap() {
        Envelope::SendMessage { payload, .. } => payload,
        other => panic!("unerwartet: {:?}", other),
    };
    assert_ne!(payload(&a), payload(&b));
}

#[tokio::test]
async fn krypto_fehler_sendet_gar_nichts() {
    let (mut session, mut peer, mut stream) = verbundene_session("alice").await;
    session.receive(&new_user("a", "gut", &schluessel().public_key)).unwrap();
    // "z" sortiert zuletzt; ungueltiger Schluessel bricht den Fan-out ab
    session
        .receive(&new_user("z", "kaputt", &PublicKey::new(vec![1, 2, 3])))
        .unwrap();
    alle(&mut stream);

    let result = session.send("nie gesendet").await;
    assert!(matches!(result, Err(SessionError::Crypto(_))));
    assert!(peer.try_empfangen().is_none());
    assert!(alle(&mut stream).is_empty());
    assert_eq!(session.state(), SessionState::Announced);
}

// ---------------------------------------------------------------------------
// Empfangen
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_user_und_user_left_konvergieren() {
    let (mut session, _peer, mut stream) = verbundene_session("alice").await;
    let kp = schluessel();

    session.receive(&new_user("b", "bob", &kp.public_key)).unwrap();
    assert!(session.roster().contains(&ParticipantId::from("b")));

    session.receive(&user_left("b")).unwrap();
    assert!(session.roster().is_empty());

    assert_eq!(
        alle(&mut stream),
        vec![
            Notification::Server(ServerMessage::UserJoined { name: "bob".into() }),
            Notification::Server(ServerMessage::UserLeft { name: "bob".into() }),
        ]
    );
}

#[tokio::test]
async fn user_left_fuer_unbekannte_id_ist_no_op() {
    let (mut session, _peer, mut stream) = verbundene_session("alice").await;
    assert!(session.receive(&user_left("nie-da")).is_ok());
    assert!(session.roster().is_empty());
    assert!(alle(&mut stream).is_empty());
}

#[tokio::test]
async fn eigene_anmeldung_wird_nicht_ins_roster_uebernommen() {
    let (mut session, _peer, mut stream) = verbundene_session("alice").await;
    let eigener = session.identity().public_key().clone();

    session.receive(&new_user("ich", "alice", &eigener)).unwrap();
    assert!(session.roster().is_empty());
    assert!(alle(&mut stream).is_empty());
}

#[tokio::test]
async fn relay_message_wird_entschluesselt() {
    let (mut session, _peer, mut stream) = verbundene_session("alice").await;
    session.receive(&new_user("b", "bob", &schluessel().public_key)).unwrap();
    alle(&mut stream);

    let payload = X25519Provider::default()
        .encrypt("hi alice".as_bytes(), session.identity().public_key())
        .unwrap();
    session.receive(&relay_message("b", payload)).unwrap();

    assert_eq!(
        alle(&mut stream),
        vec![Notification::UserMessage {
            name: "bob".into(),
            text: "hi alice".into()
        }]
    );
}

#[tokio::test]
async fn unbekannter_absender_wird_verworfen() {
    let (mut session, _peer, mut stream) = verbundene_session("alice").await;
    let payload = X25519Provider::default()
        .encrypt(b"von niemandem", session.identity().public_key())
        .unwrap();

    let result = session.receive(&relay_message("x", payload));
    assert!(matches!(
        result,
        Err(SessionError::Roster(RosterError::NotFound(_)))
    ));
    assert_eq!(session.state(), SessionState::Announced);
    assert_eq!(
        alle(&mut stream),
        vec![Notification::Server(ServerMessage::Anomaly(
            Anomaly::UnknownSender {
                sender: ParticipantId::from("x")
            }
        ))]
    );
}

#[tokio::test]
async fn nicht_entschluesselbarer_payload_ist_anomalie() {
    let (mut session, _peer, mut stream) = verbundene_session("alice").await;
    session.receive(&new_user("b", "bob", &schluessel().public_key)).unwrap();
    alle(&mut stream);

    // Fuer jemand anderen versiegelt
    let payload = X25519Provider::default()
        .encrypt(b"nicht fuer alice", &schluessel().public_key)
        .unwrap();
    let result = session.receive(&relay_message("b", payload));

    assert!(matches!(result, Err(SessionError::Crypto(_))));
    assert_eq!(
        alle(&mut stream),
        vec![Notification::Server(ServerMessage::Anomaly(
            Anomaly::Undecryptable {
                sender: ParticipantId::from("b"),
                name: "bob".into()
            }
        ))]
    );
}

#[tokio::test]
async fn klartext_ohne_utf8_ist_anomalie() {
    let (mut session, _peer, mut stream) = verbundene_session("alice").await;
    session.receive(&new_user("b", "bob", &schluessel().public_key)).unwrap();
    alle(&mut stream);

    let payload = X25519Provider::default()
        .encrypt(&[0xff, 0xfe, 0xfd], session.identity().public_key())
        .unwrap();
    assert!(session.receive(&relay_message("b", payload)).is_err());
    assert!(matches!(
        alle(&mut stream).as_slice(),
        [Notification::Server(ServerMessage::Anomaly(Anomaly::Undecryptable { .. }))]
    ));
}

#[tokio::test]
async fn ungueltiges_envelope_beendet_session_nicht() {
    let (mut session, _peer, mut stream) = verbundene_session("alice").await;

    let kaputt: [&[u8]; 3] = [
        b"kein json",
        br#"{"kind":"gibts_nicht"}"#,
        br#"{"kind":"user_left"}"#,
    ];
    for raw in kaputt {
        assert!(matches!(session.receive(raw), Err(SessionError::Parse(_))));
        session.handle_event(TransportEvent::Message(raw.to_vec())).await;
    }
    assert_eq!(session.state(), SessionState::Announced);
    assert!(alle(&mut stream).is_empty());
}

#[tokio::test]
async fn codec_limit_gilt_fuer_eingehende_envelopes() {
    let (transport, mut peer) = MemoryTransport::paar();
    let (presentation, mut stream) = ChannelPresentation::neu();
    let mut session = Session::neu("alice", X25519Provider::default(), transport, presentation)
        .unwrap()
        .with_codec(Codec::with_max_size(512));
    session.connect().await.unwrap();
    peer.try_empfangen().unwrap();
    alle(&mut stream);

    let gross = relay_message("b", Ciphertext::new(vec![7; 1024]));
    assert!(matches!(session.receive(&gross), Err(SessionError::Parse(_))));
    assert_eq!(session.state(), SessionState::Announced);
    assert!(alle(&mut stream).is_empty());
}

#[tokio::test]
async fn client_envelopes_vom_relay_ignoriert() {
    let (mut session, _peer, mut stream) = verbundene_session("alice").await;
    let first = serialize(&Envelope::first("mallory", schluessel().public_key)).unwrap();
    let send = serialize(&Envelope::send_message(
        ParticipantId::from("b"),
        Ciphertext::new(vec![0; 8]),
    ))
    .unwrap();

    assert!(session.receive(first.as_bytes()).is_ok());
    assert!(session.receive(send.as_bytes()).is_ok());
    assert!(session.roster().is_empty());
    assert!(alle(&mut stream).is_empty());
}

// ---------------------------------------------------------------------------
// Beenden
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transport_closed_ist_terminal() {
    let (mut session, _peer, mut stream) = verbundene_session("alice").await;

    session
        .handle_event(TransportEvent::Closed("Relay faehrt herunter".into()))
        .await;
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(
        alle(&mut stream),
        vec![
            Notification::Server(ServerMessage::ConnectionClosed {
                reason: "Relay faehrt herunter".into()
            }),
            Notification::State(SessionState::Closed),
        ]
    );

    let result = session.send("zu spaet").await;
    assert!(matches!(
        result,
        Err(SessionError::NotConnected(SessionState::Closed))
    ));
}

#[tokio::test]
async fn transport_fehler_ist_terminal() {
    let (mut session, _peer, mut stream) = verbundene_session("alice").await;
    session
        .handle_event(TransportEvent::Error("Reset".into()))
        .await;

    assert_eq!(session.state(), SessionState::Closed);
    let notifications = alle(&mut stream);
    assert!(matches!(
        &notifications[0],
        Notification::Server(ServerMessage::ConnectionClosed { reason }) if reason.contains("Reset")
    ));
}

#[tokio::test]
async fn ereignisse_nach_closed_ignoriert() {
    let (mut session, _peer, mut stream) = verbundene_session("alice").await;
    session.handle_event(TransportEvent::Closed("weg".into())).await;
    alle(&mut stream);

    let kp = schluessel();
    session
        .handle_event(TransportEvent::Message(new_user("b", "bob", &kp.public_key)))
        .await;
    session.handle_event(TransportEvent::Closed("nochmal".into())).await;

    assert!(session.roster().is_empty());
    assert!(alle(&mut stream).is_empty());
}

#[tokio::test]
async fn close_schliesst_transport() {
    let (mut session, mut peer, mut stream) = verbundene_session("alice").await;
    session.close().await;

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(peer.empfangen().await, None);
    assert_eq!(alle(&mut stream).last(), Some(&Notification::State(SessionState::Closed)));

    // Idempotent
    session.close().await;
    assert!(alle(&mut stream).is_empty());
}

#[tokio::test]
async fn run_endet_wenn_eingabe_endet() {
    let (session, mut peer, mut stream) = neue_session("alice");
    let (eingabe, rx) = tokio::sync::mpsc::channel(4);

    let handle = tokio::spawn(session.run(rx));
    eingabe.send("an niemanden".to_string()).await.unwrap();
    drop(eingabe);
    handle.await.unwrap();

    assert!(peer.empfangen().await.is_some()); // first
    assert_eq!(peer.empfangen().await, None);

    let mut notifications = Vec::new();
    while let Some(n) = stream.next().await {
        notifications.push(n);
    }
    assert!(notifications.contains(&Notification::UserMessage {
        name: "alice".into(),
        text: "an niemanden".into()
    }));
    assert_eq!(notifications.last(), Some(&Notification::State(SessionState::Closed)));
}

#[tokio::test]
async fn run_endet_wenn_relay_schliesst() {
    let (session, peer, mut stream) = neue_session("alice");
    let (_eingabe, rx) = tokio::sync::mpsc::channel::<String>(4);

    peer.schliessen("Wartung");
    session.run(rx).await;

    let mut notifications = Vec::new();
    while let Some(n) = stream.next().await {
        notifications.push(n);
    }
    assert!(notifications.contains(&Notification::Server(ServerMessage::ConnectionClosed {
        reason: "Wartung".into()
    })));
}

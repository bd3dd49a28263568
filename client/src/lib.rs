//! relaychat-client – Bibliotheks-Root
//!
//! Verbindet Konfiguration, Terminal und Session zu einem lauffaehigen
//! Chat-Client.

pub mod config;
pub mod terminal;

use std::io::BufRead;

use anyhow::{Context, Result};
use relaychat_crypto::X25519Provider;
use relaychat_protocol::Codec;
use relaychat_session::{Session, WebSocketTransport};
use tokio::sync::mpsc;

use config::ClientConfig;
use terminal::{zeile_auswerten, Eingabe, TerminalPresentation};

/// Puffer fuer noch nicht gesendete Eingabezeilen
const EINGABE_PUFFER: usize = 64;

/// Haelt die Konfiguration des laufenden Clients
pub struct Client {
    pub config: ClientConfig,
}

impl Client {
    pub fn neu(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Verbindet mit dem Relay und chattet bis Eingabe- oder Verbindungsende.
    ///
    /// `zeilen` kommt von [`zeilen_lesen`]. Schliesst das Relay die
    /// Verbindung, kehrt die Funktion zurueck, auch wenn der Leser noch
    /// in einem blockierenden `read` steckt.
    pub async fn starten(self, name: String, zeilen: mpsc::Receiver<String>) -> Result<()> {
        let crypto = X25519Provider::new(self.config.krypto.suite);
        let transport = WebSocketTransport::neu(self.config.relay.url.as_str());
        let codec = Codec::with_max_size(self.config.relay.max_envelope_groesse);

        tracing::info!(
            url = %transport.url(),
            %name,
            suite = ?self.config.krypto.suite,
            max_envelope = codec.max_envelope_size(),
            "Client startet"
        );

        let mut session = Session::neu(name, crypto, transport, TerminalPresentation::stdout())
            .context("Identitaet konnte nicht erzeugt werden")?
            .with_codec(codec);
        session
            .connect()
            .await
            .with_context(|| format!("Relay {} nicht erreichbar", self.config.relay.url))?;

        let (tx, rx) = mpsc::channel(EINGABE_PUFFER);
        let weiterleitung = tokio::spawn(eingabe_weiterleiten(zeilen, tx));

        session.run(rx).await;
        weiterleitung.abort();
        Ok(())
    }
}

/// Liest Zeilen auf einem eigenen OS-Thread.
///
/// Ein blockierendes `read` auf stdin laesst sich nicht abbrechen. Der
/// Thread wird deshalb nicht gejoint und haelt das Prozessende nicht auf.
pub fn zeilen_lesen<R>(eingabe: R) -> Result<mpsc::Receiver<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(EINGABE_PUFFER);
    std::thread::Builder::new()
        .name("eingabe".into())
        .spawn(move || {
            for zeile in eingabe.lines() {
                match zeile {
                    Ok(zeile) => {
                        if tx.blocking_send(zeile).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(fehler = %e, "Eingabe konnte nicht gelesen werden");
                        break;
                    }
                }
            }
        })
        .context("Eingabe-Thread konnte nicht gestartet werden")?;
    Ok(rx)
}

/// Fragt den Anzeigenamen auf der Eingabe ab
pub async fn name_abfragen(zeilen: &mut mpsc::Receiver<String>) -> Result<String> {
    use std::io::Write;

    print!("Name: ");
    std::io::stdout().flush().ok();

    let zeile = zeilen
        .recv()
        .await
        .context("Eingabe beendet, bevor ein Name angegeben wurde")?;

    let name = zeile.trim();
    if name.is_empty() {
        anyhow::bail!("Kein Name angegeben");
    }
    Ok(name.to_string())
}

/// Leitet Eingabezeilen an die Session weiter, bis `/quit` oder EOF
async fn eingabe_weiterleiten(mut zeilen: mpsc::Receiver<String>, tx: mpsc::Sender<String>) {
    while let Some(zeile) = zeilen.recv().await {
        match zeile_auswerten(&zeile) {
            Eingabe::Senden(text) => {
                if tx.send(text).await.is_err() {
                    break;
                }
            }
            Eingabe::Beenden => break,
            Eingabe::Leer => {}
        }
    }
    // tx wird gedroppt: die Session schliesst die Verbindung
}

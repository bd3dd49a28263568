//! relaychat-client – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging, fragt bei Bedarf den
//! Namen ab und startet den Chat.

use std::io::BufReader;

use anyhow::Result;
use relaychat_client::{
    config::{ClientConfig, ConfigQuelle},
    name_abfragen, zeilen_lesen, Client,
};
use relaychat_observability::logging_initialisieren;

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad =
        std::env::var("RELAYCHAT_CONFIG").unwrap_or_else(|_| "relaychat.toml".into());

    let (config, quelle) = ClientConfig::laden(&config_pfad)?;
    config.validieren()?;

    logging_initialisieren(&config.logging.level, &config.logging.format)?;

    if quelle == ConfigQuelle::Standard {
        tracing::warn!(
            pfad = %config_pfad,
            "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
        );
    }
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "relaychat-client wird initialisiert"
    );

    let mut zeilen = zeilen_lesen(BufReader::new(std::io::stdin()))?;
    let name = match config.anzeigename() {
        Some(name) => name.to_string(),
        None => name_abfragen(&mut zeilen).await?,
    };

    Client::neu(config).starten(name, zeilen).await
}

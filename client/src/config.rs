//! Client-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! Standardwerte, sodass der Client ohne Konfigurationsdatei startet.

use relaychat_crypto::CipherSuite;
use relaychat_observability::{log_format_gueltig, log_level_gueltig};
use relaychat_protocol::DEFAULT_MAX_ENVELOPE_SIZE;
use serde::{Deserialize, Serialize};

/// Vollstaendige Client-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Relay-Verbindung
    pub relay: RelayEinstellungen,
    /// Anzeigename
    pub identitaet: IdentitaetEinstellungen,
    /// Verschluesselung
    pub krypto: KryptoEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Relay-Verbindung
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayEinstellungen {
    /// WebSocket-URL des Relays (`ws://` oder `wss://`)
    pub url: String,
    /// Groesste akzeptierte Envelope in Bytes
    pub max_envelope_groesse: usize,
}

impl Default for RelayEinstellungen {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:3333/".into(),
            max_envelope_groesse: DEFAULT_MAX_ENVELOPE_SIZE,
        }
    }
}

/// Anzeigename (leer = beim Start abfragen)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitaetEinstellungen {
    pub name: Option<String>,
}

/// Verschluesselung ausgehender Nachrichten
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KryptoEinstellungen {
    /// "aes-256-gcm" oder "chacha20-poly1305"
    pub suite: CipherSuite,
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error".
    /// Nur einfache Level; Direktiven wie `relaychat_session=debug`
    /// gehen ueber `RC_LOG_LEVEL`.
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

/// Woher die geladene Konfiguration stammt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigQuelle {
    Datei,
    /// Datei fehlt, Standardwerte
    Standard,
}

impl ClientConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    ///
    /// Loggt selbst nichts: beim Laden ist das Logging noch nicht
    /// initialisiert. Der Aufrufer meldet `ConfigQuelle::Standard`.
    pub fn laden(pfad: &str) -> anyhow::Result<(Self, ConfigQuelle)> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok((config, ConfigQuelle::Datei))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok((Self::default(), ConfigQuelle::Standard))
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Prueft die Werte, die serde allein nicht abdeckt
    pub fn validieren(&self) -> anyhow::Result<()> {
        let url = self.relay.url.trim();
        if url.is_empty() {
            anyhow::bail!("relay.url darf nicht leer sein");
        }
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            anyhow::bail!("relay.url muss mit ws:// oder wss:// beginnen: '{url}'");
        }
        if self.relay.max_envelope_groesse == 0 {
            anyhow::bail!("relay.max_envelope_groesse muss groesser als 0 sein");
        }
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!("Ungueltiges Log-Level: '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!("Ungueltiges Log-Format: '{}'", self.logging.format);
        }
        Ok(())
    }

    /// Konfigurierter Name, falls nicht leer
    pub fn anzeigename(&self) -> Option<&str> {
        self.identitaet
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

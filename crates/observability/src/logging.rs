//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `RC_LOG_LEVEL`: Log-Level oder EnvFilter-Direktive
//!   (z.B. `relaychat_session=debug`), ueberschreibt die Konfiguration
//! - `RC_LOG_FORMAT`: Format (text/json), ueberschreibt die Konfiguration
//!
//! In der Konfigurationsdatei sind nur einfache Level erlaubt, siehe
//! [`log_level_gueltig`]. Eine ungueltige Direktive in `RC_LOG_LEVEL`
//! faellt auf `info` zurueck.
//!
//! Ausgabe geht nach stderr, damit sie den Chat-Verlauf auf stdout nicht
//! unterbricht.

use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "RC_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "RC_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// Umgebungsvariablen haben Vorrang vor `level` / `format` aus der
/// Konfiguration. Schlaegt fehl, wenn bereits ein Subscriber gesetzt ist.
pub fn logging_initialisieren(level: &str, format: &str) -> anyhow::Result<()> {
    let level = wert_waehlen(std::env::var(ENV_LOG_LEVEL).ok(), level);
    let format = wert_waehlen(std::env::var(ENV_LOG_FORMAT).ok(), format);

    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let ergebnis = match format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        _ => fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init(),
    };

    ergebnis.map_err(|e| anyhow::anyhow!("Logging konnte nicht initialisiert werden: {e}"))
}

/// Waehlt den Wert aus der Umgebung, sonst den konfigurierten
fn wert_waehlen(aus_env: Option<String>, konfiguriert: &str) -> String {
    aus_env
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| konfiguriert.to_string())
}

/// Validiert ein Log-Level aus der Konfiguration.
/// Nur die fuenf einfachen Level, keine EnvFilter-Direktiven.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}

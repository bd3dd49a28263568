//! Terminal-Darstellung und Eingabe
//!
//! Jeder Name bekommt eine feste Farbe aus einer Palette, abgeleitet aus
//! einem Hash des Namens. Gleicher Name, gleiche Farbe, auf jedem Client.

use std::io::Write;

use relaychat_session::{Presentation, ServerMessage, SessionState};

/// ANSI-Vordergrundfarben fuer Namen
const PALETTE: [&str; 6] = [
    "\x1b[31m", // rot
    "\x1b[32m", // gruen
    "\x1b[33m", // gelb
    "\x1b[34m", // blau
    "\x1b[35m", // magenta
    "\x1b[36m", // cyan
];
const GEDIMMT: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Befehl zum Verlassen des Chats
pub const BEENDEN_BEFEHL: &str = "/quit";

/// Farbe (ANSI-Sequenz) fuer einen Namen
pub fn name_color(name: &str) -> &'static str {
    let hash = name
        .bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
    PALETTE[hash as usize % PALETTE.len()]
}

/// Schreibt Session-Ereignisse zeilenweise in einen Writer
pub struct TerminalPresentation<W> {
    ausgabe: W,
    farbig: bool,
}

impl TerminalPresentation<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::neu(std::io::stdout(), true)
    }
}

impl<W: Write + Send> TerminalPresentation<W> {
    pub fn neu(ausgabe: W, farbig: bool) -> Self {
        Self { ausgabe, farbig }
    }

    pub fn into_inner(self) -> W {
        self.ausgabe
    }

    fn zeile(&mut self, text: std::fmt::Arguments<'_>) {
        let ergebnis = self
            .ausgabe
            .write_fmt(text)
            .and_then(|_| self.ausgabe.write_all(b"\n"))
            .and_then(|_| self.ausgabe.flush());
        if let Err(e) = ergebnis {
            tracing::debug!(fehler = %e, "Terminal-Ausgabe fehlgeschlagen");
        }
    }
}

impl<W: Write + Send> Presentation for TerminalPresentation<W> {
    fn render_user_message(&mut self, name: &str, text: &str) {
        if self.farbig {
            let farbe = name_color(name);
            self.zeile(format_args!("{farbe}{name}{RESET}: {text}"));
        } else {
            self.zeile(format_args!("{name}: {text}"));
        }
    }

    fn render_server_message(&mut self, message: &ServerMessage) {
        if self.farbig {
            self.zeile(format_args!("{GEDIMMT}* {message}{RESET}"));
        } else {
            self.zeile(format_args!("* {message}"));
        }
    }

    fn render_state(&mut self, state: SessionState) {
        // Closed und Announced werden bereits als Server-Meldung sichtbar
        if state == SessionState::Connecting {
            self.zeile(format_args!("* Verbinde mit dem Relay..."));
        }
    }
}

/// Bedeutung einer Eingabezeile
#[derive(Debug, PartialEq, Eq)]
pub enum Eingabe {
    Senden(String),
    Beenden,
    Leer,
}

pub fn zeile_auswerten(zeile: &str) -> Eingabe {
    let text = zeile.trim_end_matches(['\r', '\n']);
    if text.trim() == BEENDEN_BEFEHL {
        Eingabe::Beenden
    } else if text.trim().is_empty() {
        Eingabe::Leer
    } else {
        Eingabe::Senden(text.to_string())
    }
}

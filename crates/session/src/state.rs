//! Verbindungszustand der Session
//!
//! ```text
//! Disconnected -> Connecting -> Announced -> Closed
//!       |              |                       ^
//!       +--------------+-----------------------+
//! ```
//!
//! Linear und einseitig; `Closed` ist absorbierend.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Announced,
    Closed,
}

impl SessionState {
    /// Prueft ob der Uebergang nach `ziel` erlaubt ist
    pub fn kann_wechseln_zu(self, ziel: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, ziel),
            (Disconnected, Connecting)
                | (Connecting, Announced)
                | (Disconnected, Closed)
                | (Connecting, Closed)
                | (Announced, Closed)
        )
    }

    pub fn ist_geschlossen(self) -> bool {
        self == SessionState::Closed
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Announced => "announced",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

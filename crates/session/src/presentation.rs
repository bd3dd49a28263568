//! Presentation – Schnittstelle zur Oberflaeche
//!
//! Die Session ruft die drei `render_*`-Methoden auf. `ChannelPresentation`
//! macht daraus eine lazy, reihenfolgetreue Folge von [`Notification`]s, die
//! endet, sobald die Session gedroppt wird.

use tokio::sync::mpsc;

use crate::notification::{Notification, ServerMessage};
use crate::state::SessionState;

/// Oberflaeche, die Session-Ereignisse darstellt
pub trait Presentation: Send {
    /// Chat-Nachricht eines Teilnehmers (auch die eigene Lokal-Echo)
    fn render_user_message(&mut self, name: &str, text: &str);

    /// Systemmeldung (Join, Leave, Anomalie, Verbindungsende)
    fn render_server_message(&mut self, message: &ServerMessage);

    /// Zustandswechsel der Session
    fn render_state(&mut self, state: SessionState);
}

impl<P: Presentation + ?Sized> Presentation for Box<P> {
    fn render_user_message(&mut self, name: &str, text: &str) {
        (**self).render_user_message(name, text)
    }

    fn render_server_message(&mut self, message: &ServerMessage) {
        (**self).render_server_message(message)
    }

    fn render_state(&mut self, state: SessionState) {
        (**self).render_state(state)
    }
}

/// Leitet jeden Aufruf als [`Notification`] in einen Channel weiter
#[derive(Debug, Clone)]
pub struct ChannelPresentation {
    tx: mpsc::UnboundedSender<Notification>,
}

/// Empfangsseite einer [`ChannelPresentation`]
#[derive(Debug)]
pub struct NotificationStream {
    rx: mpsc::UnboundedReceiver<Notification>,
}

impl ChannelPresentation {
    pub fn neu() -> (Self, NotificationStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, NotificationStream { rx })
    }

    fn weiterleiten(&self, notification: Notification) {
        // Empfaenger weg: niemand sieht mehr zu, nichts zu tun
        if self.tx.send(notification).is_err() {
            tracing::trace!("Notification verworfen, kein Empfaenger");
        }
    }
}

impl Presentation for ChannelPresentation {
    fn render_user_message(&mut self, name: &str, text: &str) {
        self.weiterleiten(Notification::UserMessage {
            name: name.to_string(),
            text: text.to_string(),
        });
    }

    fn render_server_message(&mut self, message: &ServerMessage) {
        self.weiterleiten(Notification::Server(message.clone()));
    }

    fn render_state(&mut self, state: SessionState) {
        self.weiterleiten(Notification::State(state));
    }
}

impl NotificationStream {
    /// Naechste Notification; `None` sobald die Session beendet und gedroppt ist
    pub async fn next(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    /// Nicht-blockierende Variante (fuer Tests und Polling)
    pub fn try_next(&mut self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }
}

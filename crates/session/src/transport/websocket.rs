//! WebSocket-Transport (tokio-tungstenite)
//!
//! Text-Frames tragen Envelopes. Binaer-Frames werden als rohe
//! Envelope-Bytes akzeptiert. Ping/Pong beantwortet tungstenite selbst.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{Transport, TransportEvent};
use crate::error::TransportError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Client-Verbindung zu einem WebSocket-Relay
pub struct WebSocketTransport {
    url: String,
    stream: Option<WsStream>,
}

impl WebSocketTransport {
    pub fn neu(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stream: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn ist_verbunden(&self) -> bool {
        self.stream.is_some()
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        let (stream, antwort) = connect_async(self.url.as_str())
            .await
            .map_err(|e| TransportError::Verbindung(e.to_string()))?;

        tracing::info!(url = %self.url, status = %antwort.status(), "WebSocket verbunden");
        self.stream = Some(stream);
        Ok(())
    }

    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NichtVerbunden)?;
        stream
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::Senden(e.to_string()))
    }

    async fn next_event(&mut self) -> TransportEvent {
        let Some(stream) = self.stream.as_mut() else {
            return TransportEvent::Closed("Nicht verbunden".to_string());
        };

        loop {
            let event = match stream.next().await {
                Some(Ok(Message::Text(text))) => TransportEvent::Message(text.into_bytes()),
                Some(Ok(Message::Binary(daten))) => TransportEvent::Message(daten),
                Some(Ok(Message::Close(frame))) => {
                    let grund = frame
                        .map(|f| f.reason.to_string())
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "Relay hat die Verbindung geschlossen".to_string());
                    TransportEvent::Closed(grund)
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Err(e)) => TransportEvent::Error(e.to_string()),
                None => TransportEvent::Closed("Stream beendet".to_string()),
            };

            if event.ist_terminal() {
                self.stream = None;
            }
            return event;
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close(None).await {
                tracing::debug!(fehler = %e, "WebSocket-Close fehlgeschlagen");
            }
        }
        Ok(())
    }
}

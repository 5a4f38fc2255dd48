//! WebSocket implementation of the realtime channel.

use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use futures_util::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle, time::Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::{
    domain::{ChannelError, ChannelEvent, RealtimeChannel},
    infrastructure::dto::realtime::EventEnvelope,
};

/// Path of the chat namespace on the server
pub const CHAT_PATH: &str = "/chat";

/// How long `close` waits for queued frames to flush
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// What the runner receives from the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// An event from another session
    Received(ChannelEvent),
    /// The transport closed; carries the reason
    Disconnected(String),
}

enum Outbound {
    Event(ChannelEvent),
    Close,
}

/// Build `ws(s)://host/chat?client_id=...` from the HTTP server URL
pub fn websocket_url(server_url: &str, session_id: &str) -> Result<String, ChannelError> {
    let trimmed = server_url.trim_end_matches('/');
    let origin = if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{rest}")
    } else {
        return Err(ChannelError::InvalidUrl(server_url.to_string()));
    };
    Ok(format!("{origin}{CHAT_PATH}?client_id={session_id}"))
}

/// Realtime channel over a single WebSocket connection.
///
/// Outbound events go through an unbounded queue drained by a writer task;
/// inbound frames are decoded by a reader task and forwarded as
/// [`InboundEvent`]s.
pub struct WebSocketChannel {
    session_id: String,
    outbound: mpsc::UnboundedSender<Outbound>,
    writer: Mutex<Option<JoinHandle<()>>>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl WebSocketChannel {
    /// Connect to the chat namespace of `server_url`.
    ///
    /// Returns the channel and the receiver of inbound events.
    pub async fn connect(
        server_url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<InboundEvent>), ChannelError> {
        let session_id = uuid::Uuid::new_v4().to_string();
        let url = websocket_url(server_url, &session_id)?;

        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;
        tracing::info!("Connected realtime channel to {} (session {})", url, session_id);

        let (mut sink, mut source) = stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Outbound>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let writer = tokio::spawn(async move {
            while let Some(outbound) = outbound_rx.recv().await {
                let event = match outbound {
                    Outbound::Event(event) => event,
                    Outbound::Close => break,
                };
                let text = match serde_json::to_string(&EventEnvelope::from(&event)) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!("Failed to encode '{}' event: {}", event.name(), e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    tracing::warn!("Failed to send '{}' event: {}", event.name(), e);
                    break;
                }
                tracing::debug!("Sent '{}' event", event.name());
            }
            if let Err(e) = sink.close().await {
                tracing::debug!("Closing WebSocket sink failed: {}", e);
            }
        });

        let reader = tokio::spawn(async move {
            let reason = loop {
                let Some(frame) = source.next().await else {
                    break "stream ended".to_string();
                };
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(e) => break e.to_string(),
                };
                match frame {
                    Message::Text(text) => match decode_event(text.as_str()) {
                        Some(event) => {
                            if inbound_tx.send(InboundEvent::Received(event)).is_err() {
                                return;
                            }
                        }
                        None => tracing::warn!("Ignoring malformed frame: {}", text.as_str()),
                    },
                    Message::Close(_) => break "closed by server".to_string(),
                    _ => {}
                }
            };
            tracing::info!("Realtime channel disconnected: {}", reason);
            let _ = inbound_tx.send(InboundEvent::Disconnected(reason));
        });

        let channel = Self {
            session_id,
            outbound: outbound_tx,
            writer: Mutex::new(Some(writer)),
            background: Mutex::new(vec![reader]),
        };
        Ok((channel, inbound_rx))
    }

    /// Emit `pulse(session_id)` every `period`, starting one period from now.
    ///
    /// Runs until the channel closes, whatever the session state.
    pub fn start_heartbeat(&self, period: Duration) {
        let outbound = self.outbound.clone();
        let session_id = self.session_id.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let pulse = Outbound::Event(ChannelEvent::Pulse(session_id.clone()));
                if outbound.send(pulse).is_err() {
                    break;
                }
            }
        });
        self.background
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Flush queued events, close the socket and stop background tasks
    pub async fn close(&self) {
        for handle in self
            .background
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
        {
            handle.abort();
        }

        let _ = self.outbound.send(Outbound::Close);
        let writer = self
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(writer) = writer
            && tokio::time::timeout(CLOSE_TIMEOUT, writer).await.is_err()
        {
            tracing::warn!("Timed out flushing realtime channel");
        }
    }
}

fn decode_event(text: &str) -> Option<ChannelEvent> {
    let envelope: EventEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!("Frame is not an event envelope: {}", e);
            return None;
        }
    };
    match ChannelEvent::try_from(envelope) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!("Event failed validation: {}", e);
            None
        }
    }
}

impl RealtimeChannel for WebSocketChannel {
    fn emit(&self, event: ChannelEvent) -> Result<(), ChannelError> {
        self.outbound
            .send(Outbound::Event(event))
            .map_err(|_| ChannelError::Closed)
    }

    fn session_id(&self) -> String {
        self.session_id.clone()
    }
}

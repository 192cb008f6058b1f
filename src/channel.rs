//! Outbound messages to the relay server and the socket.io channel that
//! carries them.

use async_trait::async_trait;
use futures_util::FutureExt;
use rust_socketio::{
    asynchronous::{Client, ClientBuilder},
    Payload, TransportType,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::geo::Coordinate;

pub const LOCATION_UPDATE_EVENT: &str = "busLocationUpdate";
pub const ENDPOINTS_EVENT: &str = "busLocationStart&&StopPoint";

#[derive(Debug, Clone, PartialEq)]
pub enum RelayMessage {
    /// Current device position.
    LocationUpdate(Coordinate),
    /// Current route endpoints, either of which may be unknown.
    Endpoints {
        start_point: Option<Coordinate>,
        stop_point: Option<Coordinate>,
    },
}

impl RelayMessage {
    pub fn event(&self) -> &'static str {
        match self {
            RelayMessage::LocationUpdate(_) => LOCATION_UPDATE_EVENT,
            RelayMessage::Endpoints { .. } => ENDPOINTS_EVENT,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            RelayMessage::LocationUpdate(position) => json!(position),
            RelayMessage::Endpoints {
                start_point,
                stop_point,
            } => json!({
                "startPoint": start_point,
                "stopPoint": stop_point,
            }),
        }
    }
}

/// Client-to-server message channel.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Queue a message. Fire-and-forget: never waits and never reports
    /// delivery.
    fn emit(&self, message: RelayMessage);

    async fn close(&self) {}
}

/// Channel backed by a socket.io connection to the relay server.
///
/// Messages are sent in the order they were emitted by a background task.
pub struct SocketIoChannel {
    client: Client,
    outbox: mpsc::UnboundedSender<RelayMessage>,
}

impl SocketIoChannel {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = ClientBuilder::new(url)
            .transport_type(TransportType::Websocket)
            .on("open", |_, _| {
                async move {
                    tracing::info!("Connected to relay server");
                }
                .boxed()
            })
            .on("error", |payload: Payload, _| {
                async move {
                    tracing::error!("Relay connection error: {:?}", payload);
                }
                .boxed()
            })
            .on("close", |_, _| {
                async move {
                    tracing::info!("Relay connection closed");
                }
                .boxed()
            })
            .connect()
            .await?;

        let (outbox, mut queued) = mpsc::unbounded_channel::<RelayMessage>();
        let sender = client.clone();
        tokio::spawn(async move {
            while let Some(message) = queued.recv().await {
                let event = message.event();
                match sender.emit(event, message.payload()).await {
                    Ok(()) => tracing::debug!("Sent {}", event),
                    Err(e) => tracing::warn!("Failed to send {}: {}", event, e),
                }
            }
        });

        Ok(Self { client, outbox })
    }
}

#[async_trait]
impl Channel for SocketIoChannel {
    fn emit(&self, message: RelayMessage) {
        if self.outbox.send(message).is_err() {
            tracing::warn!("Relay sender has stopped; dropping message");
        }
    }

    async fn close(&self) {
        match self.client.disconnect().await {
            Ok(()) => tracing::info!("Disconnected from relay server"),
            Err(e) => tracing::warn!("Failed to disconnect from relay server: {}", e),
        }
    }
}

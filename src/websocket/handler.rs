// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! WebSocket message handler for the PubSub feed.
//!
//! The handler runs in a dedicated Tokio task and exclusively owns the read
//! half of the socket. It classifies inbound frames, settles pending
//! LISTEN/UNLISTEN requests by nonce, dispatches MESSAGE payloads to typed
//! domain events, and reports the close outcome back to the client.

use futures_util::{StreamExt, stream::SplitStream};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

use super::{
    client::PubSubClient,
    error::PubSubWsError,
    messages::{PubSubWsMessage, parse_raw_message},
};
use crate::{
    events::types::{PubSubEvent, SubscriptionMsg},
    topic::{TopicFamily, topic_family},
};

type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// PubSub WebSocket feed handler.
#[allow(missing_debug_implementations)]
pub struct PubSubFeedHandler {
    client: PubSubClient,
    reader: WsReader,
}

impl PubSubFeedHandler {
    /// Creates a new feed handler owning the read half of the socket.
    #[must_use]
    pub fn new(client: PubSubClient, reader: WsReader) -> Self {
        Self { client, reader }
    }

    /// Runs the read loop until the connection closes.
    ///
    /// A close frame with code 1000 counts as a clean close; transport errors
    /// and stream end classify as abnormal closure (1006).
    pub async fn run(mut self) {
        let (code, reason, was_clean) = loop {
            match self.reader.next().await {
                Some(Ok(Message::Text(text))) => self.handle_text(&text).await,
                Some(Ok(Message::Ping(data))) => {
                    let _ = self.client.send_frame(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = match frame {
                        Some(frame) => (u16::from(frame.code), frame.reason.to_string()),
                        None => (1005, String::new()),
                    };
                    break (code, reason, code == 1000);
                }
                Some(Ok(_)) => {} // Binary/Pong/Frame not used by the protocol
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {e}");
                    self.client
                        .emitter()
                        .emit("error", &PubSubEvent::Error(e.to_string()));
                    break (1006, String::new(), false);
                }
                None => break (1006, String::new(), false),
            }
        };

        self.client.finish_connection(code, reason, was_clean).await;
    }

    async fn handle_text(&self, text: &str) {
        let msg = match parse_raw_message(text) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("Failed to parse message: {e}");
                self.client
                    .emitter()
                    .emit("error", &PubSubEvent::Error(e.to_string()));
                return;
            }
        };

        match msg {
            PubSubWsMessage::Pong => self.client.handle_pong().await,
            PubSubWsMessage::Response { nonce, error } => {
                self.handle_response(nonce, error).await;
            }
            PubSubWsMessage::Message { topic, message } => {
                self.handle_message(topic, &message);
            }
            PubSubWsMessage::Reconnect => {
                tracing::info!("Server requested reconnect");
                self.client
                    .emitter()
                    .emit("reconnect", &PubSubEvent::Reconnect);
            }
            PubSubWsMessage::Disconnect => {
                tracing::info!("Server announced disconnect");
                self.client
                    .emitter()
                    .emit("disconnect", &PubSubEvent::Disconnect);
            }
            PubSubWsMessage::Listen(data) => {
                self.client
                    .emitter()
                    .emit("listen", &PubSubEvent::Payload(data));
            }
            PubSubWsMessage::Unlisten(data) => {
                self.client
                    .emitter()
                    .emit("unlisten", &PubSubEvent::Payload(data));
            }
            PubSubWsMessage::Unknown(msg_type) => {
                tracing::warn!("Unknown message type: {msg_type}");
                self.client.emitter().emit(
                    "error",
                    &PubSubEvent::Error(format!("Unknown message type: {msg_type}")),
                );
            }
        }
    }

    /// Settles the pending request for a RESPONSE frame and starts the
    /// heartbeat after the first successful acknowledgment.
    async fn handle_response(&self, nonce: Option<String>, error: Option<String>) {
        let result = match &error {
            Some(code) => Err(PubSubWsError::from_error_code(code)),
            None => Ok(()),
        };

        if let Some(nonce) = &nonce
            && !self.client.settle_pending(nonce, result.clone())
        {
            tracing::debug!("No pending request for nonce {nonce}");
        }

        match result {
            Err(e) => {
                let message = match &e {
                    PubSubWsError::PubSub { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                tracing::warn!("Request rejected: {message}");
                self.client
                    .emitter()
                    .emit("error", &PubSubEvent::Error(message));
            }
            Ok(()) => {
                self.client
                    .emitter()
                    .emit("response", &PubSubEvent::Response { nonce });
                self.client.ensure_heartbeat().await;
            }
        }
    }

    /// Dispatches a MESSAGE frame: the generic `message` event, a topic-named
    /// event, and the topic family's typed event.
    fn handle_message(&self, topic: String, message: &str) {
        let payload: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to parse payload for {topic}: {e}");
                self.client
                    .emitter()
                    .emit("error", &PubSubEvent::Error(format!("Invalid payload: {e}")));
                return;
            }
        };

        let emitter = self.client.emitter();
        emitter.emit(
            "message",
            &PubSubEvent::Message {
                topic: topic.clone(),
                payload: payload.clone(),
            },
        );
        emitter.emit(&topic, &PubSubEvent::Payload(payload.clone()));

        match topic_family(&topic) {
            Some(TopicFamily::ChannelPoints) => self.handle_channel_points(payload),
            Some(TopicFamily::Bits) => {
                let data = payload.get("data").cloned().unwrap_or(Value::Null);
                emitter.emit("bits", &PubSubEvent::Bits(data));
            }
            Some(TopicFamily::BitsBadge) => {
                let data = payload.get("data").cloned().unwrap_or(Value::Null);
                emitter.emit("bitsbadge", &PubSubEvent::BitsBadge(data));
            }
            Some(TopicFamily::Subscription) => self.handle_subscription(&payload),
            Some(TopicFamily::Whisper) => self.handle_whisper(&payload),
            None => {}
        }
    }

    /// Channel point events are named after the inner message type; redemption
    /// events additionally emit `reward` with the redemption record.
    fn handle_channel_points(&self, payload: Value) {
        let msg_type = payload
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let data = payload.get("data").cloned().unwrap_or(Value::Null);
        let emitter = self.client.emitter();

        if msg_type == "reward-redeemed" {
            let redemption = data.get("redemption").cloned().unwrap_or(Value::Null);
            emitter.emit("reward", &PubSubEvent::Reward(redemption.clone()));
            emitter.emit(&msg_type, &PubSubEvent::Payload(redemption));
        } else {
            emitter.emit(&msg_type, &PubSubEvent::Payload(data));
        }
    }

    /// Sub events are named after their `context` (sub, resub, subgift,
    /// anonsubgift) and carry the normalized record.
    fn handle_subscription(&self, payload: &Value) {
        // The record sits under `data` in LISTEN echoes but at top level in
        // live payloads
        let record = payload.get("data").cloned().unwrap_or_else(|| payload.clone());
        let msg: SubscriptionMsg = match serde_json::from_value(record) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("Failed to parse subscription event: {e}");
                return;
            }
        };
        if msg.context.is_empty() {
            tracing::warn!("Subscription event without context");
            return;
        }
        let context = msg.context.clone();
        self.client
            .emitter()
            .emit(&context, &PubSubEvent::Subscription(Box::new(msg)));
    }

    /// Whispers are named after the inner message type and carry the
    /// structured `data_object` record.
    fn handle_whisper(&self, payload: &Value) {
        let msg_type = payload
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if msg_type.is_empty() {
            tracing::warn!("Whisper event without type");
            return;
        }
        let data = payload
            .get("data_object")
            .cloned()
            .unwrap_or_else(|| payload.clone());
        self.client
            .emitter()
            .emit(msg_type, &PubSubEvent::Whisper(data));
    }
}

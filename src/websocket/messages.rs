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

//! Data structures for PubSub wire messages.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::error::{PubSubWsError, PubSubWsResult};
use crate::common::enums::TopicAction;

/// Outbound LISTEN/UNLISTEN request.
#[derive(Debug, Clone, Serialize)]
pub struct TopicRequest {
    /// Request operation.
    #[serde(rename = "type")]
    pub action: TopicAction,
    /// Correlation nonce echoed back in the RESPONSE frame.
    pub nonce: String,
    /// Request payload.
    pub data: TopicRequestData,
}

/// Payload of a LISTEN/UNLISTEN request.
#[derive(Debug, Clone, Serialize)]
pub struct TopicRequestData {
    /// Topics to subscribe to or unsubscribe from.
    pub topics: Vec<String>,
    /// OAuth token authorizing the request.
    pub auth_token: String,
}

/// Outbound heartbeat probe payload.
pub const PING_PAYLOAD: &str = r#"{"type":"PING"}"#;

/// Inbound message from the PubSub edge.
#[derive(Debug, Clone)]
pub enum PubSubWsMessage {
    /// Heartbeat acknowledgment.
    Pong,
    /// Acknowledgment of a LISTEN/UNLISTEN request.
    Response {
        /// Correlation nonce of the originating request.
        nonce: Option<String>,
        /// Error code, absent or empty on success.
        error: Option<String>,
    },
    /// Published topic message with its raw inner payload.
    Message {
        /// Topic the message was published to.
        topic: String,
        /// Inner payload, a JSON document encoded as a string.
        message: String,
    },
    /// The server requests the client reconnect.
    Reconnect,
    /// The server announces the connection will be dropped.
    Disconnect,
    /// Echo of a LISTEN frame.
    Listen(Value),
    /// Echo of an UNLISTEN frame.
    Unlisten(Value),
    /// A frame with an unrecognized type.
    Unknown(String),
}

/// Generates a request correlation nonce (32 random hex characters).
#[must_use]
pub fn make_nonce() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Parses a raw text frame into a [`PubSubWsMessage`].
///
/// # Errors
///
/// Returns an error if the frame is not valid JSON or a MESSAGE frame is
/// missing its topic or payload.
pub fn parse_raw_message(text: &str) -> PubSubWsResult<PubSubWsMessage> {
    let value: Value = serde_json::from_str(text)?;
    let msg_type = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match msg_type {
        "PONG" => Ok(PubSubWsMessage::Pong),
        "RESPONSE" => {
            let nonce = value
                .get("nonce")
                .and_then(Value::as_str)
                .map(ToString::to_string);
            let error = value
                .get("error")
                .and_then(Value::as_str)
                .filter(|e| !e.is_empty())
                .map(ToString::to_string);
            Ok(PubSubWsMessage::Response { nonce, error })
        }
        "MESSAGE" => {
            let data = value.get("data").ok_or_else(|| {
                PubSubWsError::Parsing("MESSAGE frame missing data".to_string())
            })?;
            let topic = data
                .get("topic")
                .and_then(Value::as_str)
                .ok_or_else(|| PubSubWsError::Parsing("MESSAGE frame missing topic".to_string()))?
                .to_string();
            let message = data
                .get("message")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    PubSubWsError::Parsing("MESSAGE frame missing message".to_string())
                })?
                .to_string();
            Ok(PubSubWsMessage::Message { topic, message })
        }
        "RECONNECT" => Ok(PubSubWsMessage::Reconnect),
        "DISCONNECT" => Ok(PubSubWsMessage::Disconnect),
        "LISTEN" => Ok(PubSubWsMessage::Listen(
            value.get("data").cloned().unwrap_or(Value::Null),
        )),
        "UNLISTEN" => Ok(PubSubWsMessage::Unlisten(
            value.get("data").cloned().unwrap_or(Value::Null),
        )),
        other => Ok(PubSubWsMessage::Unknown(other.to_string())),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn test_listen_request_shape() {
        let request = TopicRequest {
            action: TopicAction::Listen,
            nonce: "abc123".to_string(),
            data: TopicRequestData {
                topics: vec!["whispers.123".to_string()],
                auth_token: "token".to_string(),
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "LISTEN",
                "nonce": "abc123",
                "data": {
                    "topics": ["whispers.123"],
                    "auth_token": "token",
                }
            })
        );
    }

    #[rstest]
    fn test_nonce_length_and_charset() {
        let nonce = make_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(nonce, make_nonce());
    }

    #[rstest]
    fn test_parse_pong() {
        let msg = parse_raw_message(r#"{"type":"PONG"}"#).unwrap();
        assert!(matches!(msg, PubSubWsMessage::Pong));
    }

    #[rstest]
    fn test_parse_response_success() {
        let msg = parse_raw_message(r#"{"type":"RESPONSE","nonce":"n1","error":""}"#).unwrap();
        match msg {
            PubSubWsMessage::Response { nonce, error } => {
                assert_eq!(nonce.as_deref(), Some("n1"));
                assert!(error.is_none());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[rstest]
    fn test_parse_response_error() {
        let msg =
            parse_raw_message(r#"{"type":"RESPONSE","nonce":"n1","error":"ERR_BADAUTH"}"#).unwrap();
        match msg {
            PubSubWsMessage::Response { error, .. } => {
                assert_eq!(error.as_deref(), Some("ERR_BADAUTH"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[rstest]
    fn test_parse_message_frame() {
        let raw = json!({
            "type": "MESSAGE",
            "data": {
                "topic": "channel-bits-events-v2.123",
                "message": "{\"type\":\"bits_event\",\"data\":{\"bits_used\":100}}",
            }
        })
        .to_string();
        let msg = parse_raw_message(&raw).unwrap();
        match msg {
            PubSubWsMessage::Message { topic, message } => {
                assert_eq!(topic, "channel-bits-events-v2.123");
                let inner: Value = serde_json::from_str(&message).unwrap();
                assert_eq!(inner["data"]["bits_used"], 100);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[rstest]
    fn test_parse_message_frame_missing_topic() {
        let raw = r#"{"type":"MESSAGE","data":{"message":"{}"}}"#;
        assert!(matches!(
            parse_raw_message(raw),
            Err(PubSubWsError::Parsing(_))
        ));
    }

    #[rstest]
    #[case(r#"{"type":"RECONNECT"}"#)]
    #[case(r#"{"type":"DISCONNECT"}"#)]
    fn test_parse_control_frames(#[case] raw: &str) {
        assert!(matches!(
            parse_raw_message(raw).unwrap(),
            PubSubWsMessage::Reconnect | PubSubWsMessage::Disconnect
        ));
    }

    #[rstest]
    fn test_parse_unknown_type() {
        let msg = parse_raw_message(r#"{"type":"SOMETHING_ELSE"}"#).unwrap();
        match msg {
            PubSubWsMessage::Unknown(t) => assert_eq!(t, "SOMETHING_ELSE"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[rstest]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_raw_message("not json"),
            Err(PubSubWsError::Json(_))
        ));
    }
}

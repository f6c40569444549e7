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

//! PubSub WebSocket client error types.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Error types for the PubSub WebSocket client.
#[derive(Debug, Clone, Error)]
pub enum PubSubWsError {
    /// Client is not connected.
    #[error("Not connected")]
    NotConnected,
    /// Manual connect is unavailable while auto-connect is enabled.
    #[error("Auto connect is enabled")]
    AutoConnectEnabled,
    /// Manual reconnect is unavailable while auto-reconnect is enabled.
    #[error("Auto reconnect is enabled")]
    AutoReconnectEnabled,
    /// A reconnect sequence is already in flight.
    #[error("Reconnect already in progress")]
    AlreadyReconnecting,
    /// All reconnect attempts have been used.
    #[error("Reconnect attempts exceeded")]
    ReconnectAttemptsExceeded,
    /// Event name normalized to an empty slug.
    #[error("Invalid event name")]
    InvalidEventName,
    /// Transport-level error during WebSocket communication.
    #[error("Transport error: {0}")]
    Transport(String),
    /// Failed to send a message over the WebSocket.
    #[error("Send error: {0}")]
    Send(String),
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),
    /// Parsing error during message processing.
    #[error("Parsing error: {0}")]
    Parsing(String),
    /// Request timed out waiting for the correlated response.
    #[error("Timeout: {0}")]
    Timeout(String),
    /// Error returned by the PubSub edge in a RESPONSE frame.
    #[error("PubSub error {code}: {message}")]
    PubSub {
        /// The error code from the server (e.g. `ERR_BADAUTH`).
        code: String,
        /// Human-readable classification of the code.
        message: String,
    },
}

impl PubSubWsError {
    /// Builds a [`PubSubWsError::PubSub`] from a server error code.
    #[must_use]
    pub fn from_error_code(code: &str) -> Self {
        let message = match code {
            "ERR_BADAUTH" => "Invalid authentication token".to_string(),
            "ERR_BADTOPIC" => "Invalid topic".to_string(),
            "ERR_BADMESSAGE" => "Invalid message".to_string(),
            "ERR_SERVER" => "Server error".to_string(),
            other => format!("Unknown error: {other}"),
        };
        Self::PubSub {
            code: code.to_string(),
            message,
        }
    }
}

impl From<tungstenite::Error> for PubSubWsError {
    fn from(error: tungstenite::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for PubSubWsError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

/// Result type alias for PubSub WebSocket operations.
pub type PubSubWsResult<T> = Result<T, PubSubWsError>;

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("ERR_BADAUTH", "Invalid authentication token")]
    #[case("ERR_BADTOPIC", "Invalid topic")]
    #[case("ERR_BADMESSAGE", "Invalid message")]
    #[case("ERR_SERVER", "Server error")]
    #[case("ERR_WHOKNOWS", "Unknown error: ERR_WHOKNOWS")]
    fn test_error_code_classification(#[case] code: &str, #[case] expected: &str) {
        match PubSubWsError::from_error_code(code) {
            PubSubWsError::PubSub { code: c, message } => {
                assert_eq!(c, code);
                assert_eq!(message, expected);
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}

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

//! Typed domain events delivered to registered listeners.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Details of a connection close.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseInfo {
    /// WebSocket close code.
    pub code: u16,
    /// Reason string carried in the close frame, if any.
    pub reason: String,
    /// Human-readable classification of the close code.
    pub message: String,
    /// Whether the connection closed via a normal close handshake.
    pub was_clean: bool,
}

/// Warning raised when heartbeat round-trip latency exceeds a threshold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyWarning {
    /// Warning message for the latency tier.
    pub message: String,
    /// Measured round-trip latency in milliseconds.
    pub latency_ms: u64,
}

/// Normalized subscription event record.
///
/// Optional fields default to `None` (`false` for the gift flag) when absent
/// from the payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionMsg {
    /// Event context naming the subscription kind (sub, resub, subgift, anonsubgift).
    #[serde(default)]
    pub context: String,
    /// User ID of the subscriber.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Login name of the subscriber.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Display name of the subscriber.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Channel ID the subscription was made in.
    #[serde(default)]
    pub channel_id: String,
    /// Channel name the subscription was made in.
    #[serde(default)]
    pub channel_name: String,
    /// Timestamp of the subscription.
    #[serde(default)]
    pub time: String,
    /// Subscription plan identifier.
    #[serde(default)]
    pub sub_plan: String,
    /// Subscription plan display name.
    #[serde(default)]
    pub sub_plan_name: Option<String>,
    /// Whether the subscription was gifted.
    #[serde(default)]
    pub is_gift: bool,
    /// Number of months subscribed.
    #[serde(default)]
    pub months: Option<u32>,
    /// Cumulative months subscribed.
    #[serde(default)]
    pub cumulative_months: Option<u32>,
    /// Consecutive months subscribed.
    #[serde(default)]
    pub streak_months: Option<u32>,
    /// Message attached to the subscription.
    #[serde(default)]
    pub sub_message: Option<Value>,
    /// User ID of the gift recipient.
    #[serde(default)]
    pub recipient_id: Option<String>,
    /// Login name of the gift recipient.
    #[serde(default)]
    pub recipient_user_name: Option<String>,
    /// Display name of the gift recipient.
    #[serde(default)]
    pub recipient_display_name: Option<String>,
    /// Duration in months of a multi-month gift.
    #[serde(default)]
    pub multi_month_duration: Option<u32>,
}

/// Domain event emitted to registered listeners.
#[derive(Clone, Debug)]
pub enum PubSubEvent {
    /// The connection was established.
    Connected,
    /// The connection closed.
    Disconnected(CloseInfo),
    /// The server requested a reconnect.
    Reconnect,
    /// The server announced it will drop the connection.
    Disconnect,
    /// Topics were acknowledged as subscribed.
    Subscribed(Vec<String>),
    /// Topics were acknowledged as unsubscribed.
    Unsubscribed(Vec<String>),
    /// A heartbeat PING probe was sent.
    Ping,
    /// A heartbeat PONG was received.
    Pong {
        /// Measured round-trip latency in milliseconds.
        latency_ms: u64,
    },
    /// Heartbeat latency exceeded a warning threshold.
    Warning(LatencyWarning),
    /// A protocol or transport error occurred.
    Error(String),
    /// An error-free RESPONSE frame was received.
    Response {
        /// Nonce of the acknowledged request, if present.
        nonce: Option<String>,
    },
    /// A raw MESSAGE frame with its parsed inner payload.
    Message {
        /// Topic the message was published to.
        topic: String,
        /// Parsed inner message payload.
        payload: Value,
    },
    /// A channel point redemption.
    Reward(Value),
    /// A bits usage event.
    Bits(Value),
    /// A bits badge unlock event.
    BitsBadge(Value),
    /// A normalized subscription event.
    Subscription(Box<SubscriptionMsg>),
    /// A whisper message.
    Whisper(Value),
    /// An untyped payload for topic-named and type-named events.
    Payload(Value),
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
    fn test_subscription_msg_defaults() {
        let payload = json!({
            "context": "sub",
            "channel_id": "44322889",
            "channel_name": "some_channel",
            "time": "2026-08-30T12:00:00Z",
            "sub_plan": "1000",
        });
        let msg: SubscriptionMsg = serde_json::from_value(payload).unwrap();

        assert_eq!(msg.context, "sub");
        assert_eq!(msg.channel_id, "44322889");
        assert_eq!(msg.sub_plan, "1000");
        assert!(!msg.is_gift);
        assert!(msg.user_id.is_none());
        assert!(msg.months.is_none());
        assert!(msg.recipient_id.is_none());
        assert!(msg.multi_month_duration.is_none());
    }

    #[rstest]
    fn test_subscription_msg_gift_fields() {
        let payload = json!({
            "context": "subgift",
            "channel_id": "44322889",
            "channel_name": "some_channel",
            "time": "2026-08-30T12:00:00Z",
            "sub_plan": "1000",
            "is_gift": true,
            "months": 3,
            "recipient_id": "13405587",
            "recipient_user_name": "someone",
            "multi_month_duration": 6,
        });
        let msg: SubscriptionMsg = serde_json::from_value(payload).unwrap();

        assert!(msg.is_gift);
        assert_eq!(msg.months, Some(3));
        assert_eq!(msg.recipient_id.as_deref(), Some("13405587"));
        assert_eq!(msg.multi_month_duration, Some(6));
    }
}

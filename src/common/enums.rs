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

//! Enumerations for connection state, topic operations, and latency reporting.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::consts::{LATENCY_HIGH_MS, LATENCY_MEDIUM_MS, LATENCY_VERY_HIGH_MS};

/// Lifecycle state of the PubSub WebSocket connection.
///
/// Stored in an `AtomicU8` by the client; `Disconnected` is both the initial
/// and the terminal state.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    /// No connection is established.
    #[default]
    Disconnected,
    /// The connection handshake is in progress.
    Connecting,
    /// The connection is established and usable.
    Connected,
    /// A close handshake is in progress.
    Disconnecting,
}

impl ConnectionState {
    /// Returns the state encoded for atomic storage.
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        match self {
            Self::Disconnected => 0,
            Self::Connecting => 1,
            Self::Connected => 2,
            Self::Disconnecting => 3,
        }
    }

    /// Decodes a state from atomic storage, defaulting to `Disconnected`.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Connected,
            3 => Self::Disconnecting,
            _ => Self::Disconnected,
        }
    }
}

/// Subscription operation carried in a topic request.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TopicAction {
    /// Subscribe to topics.
    Listen,
    /// Unsubscribe from topics.
    Unlisten,
}

/// Severity tier for heartbeat round-trip latency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, AsRefStr, Display)]
pub enum LatencySeverity {
    /// Latency above 100 ms.
    Medium,
    /// Latency above 1 second.
    High,
    /// Latency above 10 seconds.
    VeryHigh,
}

impl LatencySeverity {
    /// Classifies a round-trip latency measurement, `None` when acceptable.
    #[must_use]
    pub const fn classify(latency_ms: u64) -> Option<Self> {
        if latency_ms > LATENCY_VERY_HIGH_MS {
            Some(Self::VeryHigh)
        } else if latency_ms > LATENCY_HIGH_MS {
            Some(Self::High)
        } else if latency_ms > LATENCY_MEDIUM_MS {
            Some(Self::Medium)
        } else {
            None
        }
    }

    /// Returns the warning message for this tier.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Medium => "Latency is medium",
            Self::High => "Latency is high",
            Self::VeryHigh => "Latency is very high",
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_connection_state_round_trip() {
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Disconnecting,
        ] {
            assert_eq!(ConnectionState::from_u8(state.as_u8()), state);
        }
        assert_eq!(
            ConnectionState::from_u8(255),
            ConnectionState::Disconnected
        );
    }

    #[rstest]
    fn test_topic_action_serialization() {
        assert_eq!(
            serde_json::to_string(&TopicAction::Listen).unwrap(),
            "\"LISTEN\""
        );
        assert_eq!(
            serde_json::to_string(&TopicAction::Unlisten).unwrap(),
            "\"UNLISTEN\""
        );
    }

    #[rstest]
    #[case(0, None)]
    #[case(100, None)]
    #[case(101, Some(LatencySeverity::Medium))]
    #[case(1_000, Some(LatencySeverity::Medium))]
    #[case(1_001, Some(LatencySeverity::High))]
    #[case(10_000, Some(LatencySeverity::High))]
    #[case(10_001, Some(LatencySeverity::VeryHigh))]
    #[case(u64::MAX, Some(LatencySeverity::VeryHigh))]
    fn test_latency_classification(
        #[case] latency_ms: u64,
        #[case] expected: Option<LatencySeverity>,
    ) {
        assert_eq!(LatencySeverity::classify(latency_ms), expected);
    }

    #[rstest]
    fn test_latency_classification_monotonic() {
        let mut last = None;
        for latency in [0, 50, 100, 500, 1_000, 5_000, 10_000, 20_000] {
            let severity = LatencySeverity::classify(latency);
            assert!(severity >= last, "severity decreased at {latency}ms");
            last = severity;
        }
    }
}

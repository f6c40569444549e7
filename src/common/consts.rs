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

//! Constants for the Twitch PubSub edge service.

/// Production PubSub edge WebSocket URL.
pub const PUBSUB_WS_URL: &str = "wss://pubsub-edge.twitch.tv";

/// Interval between heartbeat PING probes in milliseconds.
pub const HEARTBEAT_INTERVAL_MS: u64 = 60_000;

/// Timeout for a correlated LISTEN/UNLISTEN response in milliseconds.
pub const REQUEST_TIMEOUT_MS: u64 = 1_000;

/// Timeout for establishing the WebSocket connection in milliseconds.
pub const CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Round-trip latency above this is reported as medium (milliseconds).
pub const LATENCY_MEDIUM_MS: u64 = 100;

/// Round-trip latency above this is reported as high (milliseconds).
pub const LATENCY_HIGH_MS: u64 = 1_000;

/// Round-trip latency above this is reported as very high and may trigger
/// reconnection (milliseconds).
pub const LATENCY_VERY_HIGH_MS: u64 = 10_000;

/// Maximum number of topics per connection.
pub const MAX_TOPICS_PER_CONNECTION: usize = 50;

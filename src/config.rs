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

//! Configuration for the PubSub client.

use serde::{Deserialize, Serialize};

use crate::common::consts::PUBSUB_WS_URL;

/// Configuration for [`PubSubClient`](crate::websocket::client::PubSubClient).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PubSubConfig {
    /// Optional WebSocket URL override (defaults to the production edge).
    pub url: Option<String>,
    /// OAuth token sent with every LISTEN/UNLISTEN request.
    pub auth_token: String,
    /// Topics subscribed on every (re)connection.
    pub topics: Vec<String>,
    /// Whether `start` opens the connection automatically.
    pub auto_connect: bool,
    /// Whether unclean connection loss triggers automatic reconnection.
    pub auto_reconnect: bool,
    /// Delay between reconnect attempts in milliseconds.
    pub reconnect_interval_ms: u64,
    /// Maximum number of consecutive failed reconnect attempts.
    pub max_reconnect_attempts: u32,
}

impl Default for PubSubConfig {
    fn default() -> Self {
        Self {
            url: None,
            auth_token: String::new(),
            topics: Vec::new(),
            auto_connect: true,
            auto_reconnect: true,
            reconnect_interval_ms: 1_000,
            max_reconnect_attempts: 10,
        }
    }
}

impl PubSubConfig {
    /// Returns the effective WebSocket URL.
    #[must_use]
    pub fn ws_url(&self) -> &str {
        self.url.as_deref().unwrap_or(PUBSUB_WS_URL)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

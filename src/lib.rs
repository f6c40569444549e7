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

//! WebSocket client for the [Twitch PubSub](https://dev.twitch.tv/docs/pubsub/) edge service.
//!
//! The crate maintains a single persistent connection to `wss://pubsub-edge.twitch.tv`,
//! performs the nonce-correlated LISTEN/UNLISTEN handshake for topic subscriptions,
//! monitors liveness with a PING/PONG latency probe, and re-establishes the connection
//! automatically after unclean loss, re-subscribing all registered topics.
//!
//! # Features
//!
//! - **Connection lifecycle**: connect, disconnect, and a bounded reconnect policy
//!   with a fixed retry interval and attempt counter.
//! - **Subscriptions**: batched LISTEN/UNLISTEN requests correlated by nonce and
//!   acknowledged by the server before the topic registry is mutated.
//! - **Heartbeat**: a 60 second PING probe with round-trip latency measurement and
//!   tiered latency warnings.
//! - **Events**: named listeners with case-insensitive, slug-normalized event names
//!   and `*`/`?` wildcard patterns; inbound MESSAGE payloads are classified into
//!   typed domain events (bits, bits badges, channel point redemptions, sub events,
//!   whispers).

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(clippy::missing_errors_doc)]

pub mod common;
pub mod config;
pub mod events;
pub mod topic;
pub mod websocket;

pub use crate::{
    config::PubSubConfig,
    events::{
        emitter::ListenerId,
        types::{CloseInfo, LatencyWarning, PubSubEvent, SubscriptionMsg},
    },
    topic::TopicRegistry,
    websocket::{
        client::PubSubClient,
        error::{PubSubWsError, PubSubWsResult},
    },
};

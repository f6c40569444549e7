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

//! Example binary demonstrating a live PubSub subscription.
//!
//! Connects to the production PubSub edge, subscribes to the given topics,
//! and logs every received event until interrupted.
//!
//! # Environment Variables
//!
//! - `TWITCH_AUTH_TOKEN`: OAuth token with scopes for the requested topics
//! - `TWITCH_CHANNEL_ID`: numeric channel ID to parameterize the topics with
//!
//! # Usage
//!
//! ```bash
//! TWITCH_AUTH_TOKEN=... TWITCH_CHANNEL_ID=44322889 \
//!     cargo run --bin pubsub-ws-data
//! ```

use std::env;

use tokio::signal;
use tracing::level_filters::LevelFilter;
use twitch_pubsub::{PubSubClient, PubSubConfig, PubSubEvent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    let auth_token = env::var("TWITCH_AUTH_TOKEN")
        .map_err(|_| anyhow::anyhow!("Missing environment variable: TWITCH_AUTH_TOKEN"))?;
    let channel_id = env::var("TWITCH_CHANNEL_ID")
        .map_err(|_| anyhow::anyhow!("Missing environment variable: TWITCH_CHANNEL_ID"))?;

    let config = PubSubConfig {
        auth_token,
        topics: vec![
            format!("channel-points-channel-v1.{channel_id}"),
            format!("channel-bits-events-v2.{channel_id}"),
            format!("channel-subscribe-events-v1.{channel_id}"),
        ],
        auto_connect: true,
        auto_reconnect: true,
        ..Default::default()
    };

    let client = PubSubClient::new(config)?;

    client.on("*", |event| {
        tracing::info!("{event:?}");
    })?;
    client.on("reward", |event| {
        if let PubSubEvent::Reward(redemption) = event {
            tracing::info!(
                "Redemption: {}",
                redemption["reward"]["title"].as_str().unwrap_or("?")
            );
        }
    })?;

    tracing::info!("Connecting to PubSub edge...");
    client.start().await?;

    tracing::info!("Listening for events... Press Ctrl+C to exit");
    signal::ctrl_c().await?;

    tracing::info!("Received SIGINT, closing connection...");
    client.disconnect().await?;

    Ok(())
}

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

//! WebSocket client for the Twitch PubSub edge service.
//!
//! The [`PubSubClient`] owns the connection lifecycle: it establishes the
//! socket, maintains the heartbeat, correlates LISTEN/UNLISTEN requests with
//! their RESPONSE frames by nonce, and drives the bounded reconnect policy
//! after unclean connection loss. The client is cheap to clone; all state is
//! shared behind `Arc`s so clones observe the same connection.

use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering},
    },
    time::Duration,
};

use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::{
    Message,
    protocol::{CloseFrame, frame::coding::CloseCode},
};
use tokio_util::sync::CancellationToken;

use super::{
    error::{PubSubWsError, PubSubWsResult},
    handler::PubSubFeedHandler,
    messages::{PING_PAYLOAD, TopicRequest, TopicRequestData, make_nonce},
};
use crate::{
    common::{
        consts::{
            CONNECT_TIMEOUT_MS, HEARTBEAT_INTERVAL_MS, MAX_TOPICS_PER_CONNECTION,
            REQUEST_TIMEOUT_MS,
        },
        enums::{ConnectionState, LatencySeverity, TopicAction},
        parse::{close_reason, unix_ms},
    },
    config::PubSubConfig,
    events::{
        emitter::{EventEmitter, ListenerId},
        types::{CloseInfo, LatencyWarning, PubSubEvent},
    },
    topic::{TopicRegistry, normalize_topics},
};

/// WebSocket client for connecting to the Twitch PubSub edge.
#[derive(Clone)]
pub struct PubSubClient {
    url: String,
    auto_connect: bool,
    auto_reconnect: bool,
    reconnect_interval_ms: u64,
    max_reconnect_attempts: u32,
    auth_token: Arc<tokio::sync::RwLock<String>>,
    state: Arc<AtomicU8>,
    registry: TopicRegistry,
    emitter: EventEmitter,
    pending: Arc<DashMap<String, oneshot::Sender<PubSubWsResult<()>>>>,
    writer: Arc<tokio::sync::RwLock<Option<mpsc::UnboundedSender<Message>>>>,
    reconnect_attempts: Arc<AtomicU32>,
    reconnecting: Arc<AtomicBool>,
    ping_sent_ms: Arc<AtomicU64>,
    latency_ms: Arc<AtomicU64>,
    heartbeat: Arc<tokio::sync::RwLock<Option<CancellationToken>>>,
}

impl Debug for PubSubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubSubClient")
            .field("url", &self.url)
            .field("state", &self.state())
            .field("auto_connect", &self.auto_connect)
            .field("auto_reconnect", &self.auto_reconnect)
            .field("registered_topics", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl PubSubClient {
    /// Creates a new [`PubSubClient`] instance.
    ///
    /// Topics from the configuration are normalized and seeded into the
    /// registry so they are subscribed on every (re)connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration names more topics than a single
    /// connection allows.
    pub fn new(config: PubSubConfig) -> anyhow::Result<Self> {
        let topics = normalize_topics(&config.topics);
        if topics.len() > MAX_TOPICS_PER_CONNECTION {
            anyhow::bail!("A maximum of {MAX_TOPICS_PER_CONNECTION} topics is allowed per connection");
        }

        let registry = TopicRegistry::new();
        registry.add_all(&topics);

        Ok(Self {
            url: config.ws_url().to_string(),
            auto_connect: config.auto_connect,
            auto_reconnect: config.auto_reconnect,
            reconnect_interval_ms: config.reconnect_interval_ms,
            max_reconnect_attempts: config.max_reconnect_attempts,
            auth_token: Arc::new(tokio::sync::RwLock::new(config.auth_token)),
            state: Arc::new(AtomicU8::new(ConnectionState::Disconnected.as_u8())),
            registry,
            emitter: EventEmitter::new(),
            pending: Arc::new(DashMap::new()),
            writer: Arc::new(tokio::sync::RwLock::new(None)),
            reconnect_attempts: Arc::new(AtomicU32::new(0)),
            reconnecting: Arc::new(AtomicBool::new(false)),
            ping_sent_ms: Arc::new(AtomicU64::new(0)),
            latency_ms: Arc::new(AtomicU64::new(0)),
            heartbeat: Arc::new(tokio::sync::RwLock::new(None)),
        })
    }

    /// Returns the WebSocket URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Relaxed))
    }

    /// Returns whether the client is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Returns the last measured heartbeat round-trip latency in milliseconds.
    #[must_use]
    pub fn last_latency(&self) -> u64 {
        self.latency_ms.load(Ordering::Relaxed)
    }

    /// Returns the number of failed reconnect attempts in the current sequence.
    #[must_use]
    pub fn reconnect_count(&self) -> u32 {
        self.reconnect_attempts.load(Ordering::Relaxed)
    }

    /// Returns all registered topics.
    #[must_use]
    pub fn registered_topics(&self) -> Vec<String> {
        self.registry.topics()
    }

    /// Returns the number of registered topics.
    #[must_use]
    pub fn registered_topics_count(&self) -> usize {
        self.registry.len()
    }

    /// Returns whether `topic` is registered.
    #[must_use]
    pub fn is_registered_topic(&self, topic: &str) -> bool {
        self.registry.contains(topic)
    }

    /// Replaces the OAuth token used for subsequent requests.
    pub async fn set_auth_token(&self, token: impl Into<String>) {
        *self.auth_token.write().await = token.into();
    }

    /// Registers `handler` for events named `name`.
    ///
    /// Names are case-insensitive and slug-normalized; `*` and `?` wildcards
    /// match against emitted event names.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` normalizes to an empty slug.
    pub fn on<F>(&self, name: &str, handler: F) -> PubSubWsResult<ListenerId>
    where
        F: Fn(&PubSubEvent) + Send + Sync + 'static,
    {
        self.emitter.on(name, handler)
    }

    /// Removes the listener registered under `name` with `id`.
    ///
    /// Returns whether a listener was removed.
    pub fn off(&self, name: &str, id: ListenerId) -> bool {
        self.emitter.off(name, id)
    }

    /// Opens the connection when auto-connect is enabled, otherwise a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection attempt fails.
    pub async fn start(&self) -> PubSubWsResult<()> {
        if self.auto_connect {
            self.open().await
        } else {
            Ok(())
        }
    }

    /// Connects to the PubSub edge.
    ///
    /// # Errors
    ///
    /// Returns an error if auto-connect is enabled or the connection attempt
    /// fails.
    pub async fn connect(&self) -> PubSubWsResult<()> {
        if self.auto_connect {
            return Err(PubSubWsError::AutoConnectEnabled);
        }
        if self.is_connected() {
            return Ok(());
        }
        self.open().await
    }

    /// Disconnects from the PubSub edge with a normal closure.
    ///
    /// Resolves once the close handshake completes; immediately when already
    /// disconnected.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake does not complete in time.
    pub async fn disconnect(&self) -> PubSubWsResult<()> {
        match self.state() {
            ConnectionState::Disconnected => return Ok(()),
            ConnectionState::Connected => {
                self.set_state(ConnectionState::Disconnecting);
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: "Closed by user".into(),
                };
                if self.send_frame(Message::Close(Some(frame))).await.is_err() {
                    // Writer already gone, nothing to hand-shake with
                    self.set_state(ConnectionState::Disconnected);
                    return Ok(());
                }
            }
            _ => {} // Close already in flight, wait for it below
        }
        self.wait_for_state(ConnectionState::Disconnected, Duration::from_secs(5))
            .await
    }

    /// Reconnects to the PubSub edge.
    ///
    /// # Errors
    ///
    /// Returns an error if auto-reconnect is enabled, a reconnect sequence is
    /// already in flight, or all attempts are exhausted.
    pub async fn reconnect(&self) -> PubSubWsResult<()> {
        if self.auto_reconnect {
            return Err(PubSubWsError::AutoReconnectEnabled);
        }
        self.reconnect_inner().await
    }

    /// Subscribes to `topics`, awaiting server acknowledgment.
    ///
    /// Topics are lower-cased, de-duplicated, and filtered for validity; an
    /// empty batch after normalization is a no-op. The registry is only
    /// mutated once the server acknowledges the request.
    ///
    /// # Errors
    ///
    /// Returns an error if not connected, the server rejects the request, or
    /// no response arrives in time.
    pub async fn subscribe(&self, topics: Vec<String>) -> PubSubWsResult<()> {
        if !self.is_connected() {
            return Err(PubSubWsError::NotConnected);
        }
        let topics = normalize_topics(&topics);
        if topics.is_empty() {
            return Ok(());
        }

        self.request(TopicAction::Listen, topics.clone()).await?;
        self.registry.add_all(&topics);
        self.emitter
            .emit("subscribed", &PubSubEvent::Subscribed(topics));
        Ok(())
    }

    /// Unsubscribes from `topics`, or from all registered topics when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if not connected, the server rejects the request, or
    /// no response arrives in time.
    pub async fn unsubscribe(&self, topics: Option<Vec<String>>) -> PubSubWsResult<()> {
        if !self.is_connected() {
            return Err(PubSubWsError::NotConnected);
        }
        let topics = match topics {
            Some(topics) => normalize_topics(&topics),
            None => self.registry.topics(),
        };
        if topics.is_empty() {
            return Ok(());
        }

        self.request(TopicAction::Unlisten, topics.clone()).await?;
        self.registry.remove_all(&topics);
        self.emitter
            .emit("unsubscribed", &PubSubEvent::Unsubscribed(topics));
        Ok(())
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state.as_u8(), Ordering::Relaxed);
    }

    async fn wait_for_state(
        &self,
        target: ConnectionState,
        timeout: Duration,
    ) -> PubSubWsResult<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.state() != target {
            if tokio::time::Instant::now() >= deadline {
                return Err(PubSubWsError::Timeout(format!(
                    "Timed out waiting for state {target}"
                )));
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(())
    }

    /// Establishes the WebSocket connection and spawns the I/O tasks.
    ///
    /// Returns a boxed future: `open` is reached recursively through the
    /// spawned feed handler (handler -> finish_connection -> reconnect ->
    /// open), so an opaque `async fn` future cannot have its `Send`-ness
    /// resolved by the compiler.
    fn open(&self) -> futures_util::future::BoxFuture<'_, PubSubWsResult<()>> {
        Box::pin(self.open_inner())
    }

    async fn open_inner(&self) -> PubSubWsResult<()> {
        self.set_state(ConnectionState::Connecting);
        tracing::debug!("Connecting to {}", self.url);

        let connect = tokio_tungstenite::connect_async(self.url.as_str());
        let stream = match tokio::time::timeout(Duration::from_millis(CONNECT_TIMEOUT_MS), connect)
            .await
        {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => {
                self.set_state(ConnectionState::Disconnected);
                return Err(PubSubWsError::Transport(e.to_string()));
            }
            Err(_) => {
                self.set_state(ConnectionState::Disconnected);
                return Err(PubSubWsError::Timeout(format!(
                    "Connect timed out after {CONNECT_TIMEOUT_MS}ms"
                )));
            }
        };

        let (mut sink, reader) = stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

        // Write task exclusively owns the sink half; dropping the sender
        // terminates it
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = sink.send(msg).await {
                    tracing::debug!("Write task stopping: {e}");
                    break;
                }
            }
        });

        *self.writer.write().await = Some(tx);
        self.set_state(ConnectionState::Connected);
        self.reconnect_attempts.store(0, Ordering::Relaxed);

        let handler = PubSubFeedHandler::new(self.clone(), reader);
        tokio::spawn(handler.run());

        tracing::info!("Connected to {}", self.url);
        self.emitter.emit("connected", &PubSubEvent::Connected);

        // Re-issue subscriptions for all registered topics
        let registered = self.registry.topics();
        if !registered.is_empty() {
            let client = self.clone();
            tokio::spawn(async move {
                if let Err(e) = client.subscribe(registered).await {
                    tracing::warn!("Failed to restore subscriptions: {e}");
                }
            });
        }

        Ok(())
    }

    /// Drives the bounded reconnect sequence.
    ///
    /// At most one sequence runs at a time. The attempt counter is checked
    /// before each attempt, incremented only on a failed attempt, and reset
    /// to zero on success or once the bound is hit.
    pub(crate) async fn reconnect_inner(&self) -> PubSubWsResult<()> {
        if self.state() == ConnectionState::Connecting {
            return Err(PubSubWsError::AlreadyReconnecting);
        }
        if self
            .reconnecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PubSubWsError::AlreadyReconnecting);
        }

        let result = self.run_reconnect_loop().await;
        self.reconnecting.store(false, Ordering::Release);
        result
    }

    async fn run_reconnect_loop(&self) -> PubSubWsResult<()> {
        loop {
            let attempts = self.reconnect_attempts.load(Ordering::Relaxed);
            if attempts >= self.max_reconnect_attempts {
                self.reconnect_attempts.store(0, Ordering::Relaxed);
                return Err(PubSubWsError::ReconnectAttemptsExceeded);
            }

            if self.is_connected() {
                self.disconnect().await?;
            }

            tokio::time::sleep(Duration::from_millis(self.reconnect_interval_ms)).await;

            match self.open().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    self.reconnect_attempts.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!("Reconnect attempt {} failed: {e}", attempts + 1);
                }
            }
        }
    }

    /// Sends a LISTEN/UNLISTEN request and awaits the correlated response.
    async fn request(&self, action: TopicAction, topics: Vec<String>) -> PubSubWsResult<()> {
        let nonce = make_nonce();
        let auth_token = self.auth_token.read().await.clone();
        let request = TopicRequest {
            action,
            nonce: nonce.clone(),
            data: TopicRequestData { topics, auth_token },
        };
        let payload = serde_json::to_string(&request).map_err(|e| PubSubWsError::Json(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        self.pending.insert(nonce.clone(), tx);

        if let Err(e) = self.send_text(payload).await {
            self.pending.remove(&nonce);
            return Err(e);
        }
        tracing::debug!("Sent {action} request with nonce {nonce}");

        match tokio::time::timeout(Duration::from_millis(REQUEST_TIMEOUT_MS), rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => {
                self.pending.remove(&nonce);
                Err(PubSubWsError::Transport(
                    "Response channel closed".to_string(),
                ))
            }
            Err(_) => {
                self.pending.remove(&nonce);
                Err(PubSubWsError::Timeout(format!(
                    "No response within {REQUEST_TIMEOUT_MS}ms"
                )))
            }
        }
    }

    pub(crate) async fn send_text(&self, payload: String) -> PubSubWsResult<()> {
        self.send_frame(Message::Text(payload.into())).await
    }

    pub(crate) async fn send_frame(&self, message: Message) -> PubSubWsResult<()> {
        match self.writer.read().await.as_ref() {
            Some(tx) => tx
                .send(message)
                .map_err(|e| PubSubWsError::Send(e.to_string())),
            None => Err(PubSubWsError::NotConnected),
        }
    }

    pub(crate) fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    /// Settles the pending request for `nonce`, returning whether one existed.
    pub(crate) fn settle_pending(&self, nonce: &str, result: PubSubWsResult<()>) -> bool {
        if let Some((_, tx)) = self.pending.remove(nonce) {
            let _ = tx.send(result);
            true
        } else {
            false
        }
    }

    /// Starts the heartbeat task if not already running.
    pub(crate) async fn ensure_heartbeat(&self) {
        let mut guard = self.heartbeat.write().await;
        if guard.is_some() {
            return;
        }
        let token = CancellationToken::new();
        *guard = Some(token.clone());
        drop(guard);

        let client = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    () = tokio::time::sleep(Duration::from_millis(HEARTBEAT_INTERVAL_MS)) => {
                        if !client.is_connected() {
                            break;
                        }
                        client.ping_sent_ms.store(unix_ms(), Ordering::Relaxed);
                        if let Err(e) = client.send_text(PING_PAYLOAD.to_string()).await {
                            tracing::warn!("Failed to send ping: {e}");
                            break;
                        }
                        client.emitter.emit("ping", &PubSubEvent::Ping);
                    }
                }
            }
        });
    }

    async fn stop_heartbeat(&self) {
        if let Some(token) = self.heartbeat.write().await.take() {
            token.cancel();
        }
        self.latency_ms.store(0, Ordering::Relaxed);
    }

    /// Handles a heartbeat PONG: records latency and raises tier warnings.
    ///
    /// Very high latency triggers the reconnect policy when auto-reconnect is
    /// enabled.
    pub(crate) async fn handle_pong(&self) {
        // Consume the probe timestamp so a duplicate PONG cannot reuse it
        let sent = self.ping_sent_ms.swap(0, Ordering::Relaxed);
        if sent == 0 {
            return; // No probe outstanding
        }
        let latency = unix_ms().saturating_sub(sent);
        self.latency_ms.store(latency, Ordering::Relaxed);
        self.emitter.emit(
            "pong",
            &PubSubEvent::Pong {
                latency_ms: latency,
            },
        );

        match LatencySeverity::classify(latency) {
            Some(LatencySeverity::VeryHigh) if self.auto_reconnect => {
                tracing::warn!("Latency very high ({latency}ms), reconnecting");
                let client = self.clone();
                tokio::spawn(async move {
                    if let Err(e) = client.reconnect_inner().await {
                        tracing::warn!("Latency-triggered reconnect failed: {e}");
                    }
                });
            }
            Some(severity) => {
                self.emitter.emit(
                    "warning",
                    &PubSubEvent::Warning(LatencyWarning {
                        message: severity.message().to_string(),
                        latency_ms: latency,
                    }),
                );
            }
            None => {}
        }
    }

    /// Finalizes a closed connection and triggers reconnection when unclean.
    pub(crate) async fn finish_connection(&self, code: u16, reason: String, was_clean: bool) {
        self.set_state(ConnectionState::Disconnected);
        self.stop_heartbeat().await;
        *self.writer.write().await = None;

        // Settle anything still awaiting a response
        let nonces: Vec<String> = self.pending.iter().map(|e| e.key().clone()).collect();
        for nonce in nonces {
            self.settle_pending(&nonce, Err(PubSubWsError::NotConnected));
        }

        let message = close_reason(code).to_string();
        tracing::info!("Disconnected: {code} {message} (clean: {was_clean})");
        self.emitter.emit(
            "disconnected",
            &PubSubEvent::Disconnected(CloseInfo {
                code,
                reason,
                message,
                was_clean,
            }),
        );

        if !was_clean && self.auto_reconnect {
            let client = self.clone();
            tokio::spawn(async move {
                match client.reconnect_inner().await {
                    Ok(()) | Err(PubSubWsError::AlreadyReconnecting) => {}
                    Err(e) => {
                        tracing::error!("Automatic reconnect failed: {e}");
                        client.emitter.emit("error", &PubSubEvent::Error(e.to_string()));
                    }
                }
            });
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

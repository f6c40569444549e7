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

//! Topic validation, normalization, and the registry of subscribed topics.

use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexSet;

/// Topic name prefixes accepted by the PubSub edge.
pub const VALID_TOPIC_PREFIXES: &[&str] = &[
    "channel-bits-events-v1",
    "channel-bits-events-v2",
    "channel-bits-badge-unlocks",
    "channel-points-channel-v1",
    "channel-subscribe-events-v1",
    "chat-moderator-actions",
    "automod-queue",
    "user-moderation-notifications",
    "whispers",
];

/// Minimum topic length in characters.
pub const MIN_TOPIC_LEN: usize = 5;

/// Maximum topic length in characters.
pub const MAX_TOPIC_LEN: usize = 100;

/// Topic families dispatched to typed domain events, in match priority order.
const TOPIC_FAMILIES: &[(&str, TopicFamily)] = &[
    ("channel-points-channel", TopicFamily::ChannelPoints),
    ("channel-bits-events", TopicFamily::Bits),
    ("channel-bits-badge-unlocks", TopicFamily::BitsBadge),
    ("channel-subscribe-events", TopicFamily::Subscription),
    ("whispers", TopicFamily::Whisper),
];

/// Family of a topic, used to route MESSAGE payloads to typed events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopicFamily {
    /// Channel point redemption events.
    ChannelPoints,
    /// Bits usage events.
    Bits,
    /// Bits badge unlock events.
    BitsBadge,
    /// Subscription events (sub, resub, gift).
    Subscription,
    /// Whisper messages.
    Whisper,
}

/// Classifies a topic into its dispatch family, first match wins.
#[must_use]
pub fn topic_family(topic: &str) -> Option<TopicFamily> {
    TOPIC_FAMILIES
        .iter()
        .find(|(name, _)| topic.contains(name))
        .map(|(_, family)| *family)
}

/// Returns whether `topic` is a valid PubSub topic.
///
/// Valid topics are 5-100 characters, contain no spaces, and carry one of the
/// known topic name prefixes.
#[must_use]
pub fn is_valid_topic(topic: &str) -> bool {
    if topic.len() < MIN_TOPIC_LEN || topic.len() > MAX_TOPIC_LEN {
        return false;
    }
    if topic.contains(' ') {
        return false;
    }
    let lowered = topic.to_ascii_lowercase();
    VALID_TOPIC_PREFIXES
        .iter()
        .any(|prefix| lowered.contains(prefix))
}

/// Normalizes a batch of topics for a subscription request.
///
/// Lower-cases each topic, removes duplicates preserving first occurrence
/// order, and drops invalid topics.
#[must_use]
pub fn normalize_topics<S: AsRef<str>>(topics: &[S]) -> Vec<String> {
    let mut seen: IndexSet<String> = IndexSet::with_capacity(topics.len());
    for topic in topics {
        let topic = topic.as_ref().to_ascii_lowercase();
        if is_valid_topic(&topic) {
            seen.insert(topic);
        }
    }
    seen.into_iter().collect()
}

/// Shared set of currently subscribed topics.
///
/// Mutated only after the server acknowledges the corresponding LISTEN or
/// UNLISTEN request.
#[derive(Clone, Debug, Default)]
pub struct TopicRegistry {
    inner: Arc<DashMap<String, ()>>,
}

impl TopicRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds topics, ignoring any already present.
    pub fn add_all<S: AsRef<str>>(&self, topics: &[S]) {
        for topic in topics {
            self.inner.insert(topic.as_ref().to_string(), ());
        }
    }

    /// Removes topics, ignoring any not present.
    pub fn remove_all<S: AsRef<str>>(&self, topics: &[S]) {
        for topic in topics {
            self.inner.remove(topic.as_ref());
        }
    }

    /// Returns whether `topic` is registered.
    #[must_use]
    pub fn contains(&self, topic: &str) -> bool {
        self.inner.contains_key(topic)
    }

    /// Returns all registered topics, sorted for deterministic ordering.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.inner.iter().map(|e| e.key().clone()).collect();
        topics.sort();
        topics
    }

    /// Returns the number of registered topics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Removes all registered topics.
    pub fn clear(&self) {
        self.inner.clear();
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

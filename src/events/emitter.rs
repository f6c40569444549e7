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

//! Listener registry with slug-normalized event names and wildcard patterns.

use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
};

use indexmap::IndexMap;

use super::{matching::pattern_matches, types::PubSubEvent};
use crate::{
    common::parse::slug,
    websocket::error::{PubSubWsError, PubSubWsResult},
};

/// Identifier returned by [`EventEmitter::on`] for later removal.
pub type ListenerId = u64;

type Listener = Arc<dyn Fn(&PubSubEvent) + Send + Sync>;

/// Registry of named event listeners.
///
/// Event names are case-insensitive and slug-normalized; a listener registered
/// under a name containing `*` or `?` is invoked for every emitted event whose
/// name matches the pattern. Listeners fire in registration order, exact
/// matches before pattern matches.
#[derive(Clone, Default)]
pub struct EventEmitter {
    listeners: Arc<RwLock<IndexMap<String, Vec<(ListenerId, Listener)>>>>,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<(String, usize)> = self
            .listeners
            .read()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.len())).collect())
            .unwrap_or_default();
        f.debug_struct("EventEmitter").field("listeners", &counts).finish()
    }
}

impl EventEmitter {
    /// Creates an empty emitter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PubSubWsError::InvalidEventName`] if `name` normalizes to an
    /// empty slug.
    pub fn on<F>(&self, name: &str, handler: F) -> PubSubWsResult<ListenerId>
    where
        F: Fn(&PubSubEvent) + Send + Sync + 'static,
    {
        let key = slug(name);
        if key.is_empty() {
            return Err(PubSubWsError::InvalidEventName);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut map = self.listeners.write().expect("listener lock poisoned");
        map.entry(key).or_default().push((id, Arc::new(handler)));
        Ok(id)
    }

    /// Removes the listener registered under `name` with `id`.
    ///
    /// Returns whether a listener was removed.
    pub fn off(&self, name: &str, id: ListenerId) -> bool {
        let key = slug(name);
        if key.is_empty() {
            return false;
        }

        let mut map = self.listeners.write().expect("listener lock poisoned");
        let Some(entries) = map.get_mut(&key) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        let removed = entries.len() < before;
        if entries.is_empty() {
            map.shift_remove(&key);
        }
        removed
    }

    /// Emits `event` under `name` to all matching listeners.
    pub fn emit(&self, name: &str, event: &PubSubEvent) {
        let key = slug(name);
        if key.is_empty() {
            return;
        }

        // Clone matching listeners out so handlers run without the lock held
        let matched: Vec<Listener> = {
            let map = self.listeners.read().expect("listener lock poisoned");
            let mut matched = Vec::new();
            if let Some(entries) = map.get(&key) {
                matched.extend(entries.iter().map(|(_, l)| Arc::clone(l)));
            }
            for (pattern, entries) in map.iter() {
                if pattern != &key
                    && (pattern.contains('*') || pattern.contains('?'))
                    && pattern_matches(&key, pattern)
                {
                    matched.extend(entries.iter().map(|(_, l)| Arc::clone(l)));
                }
            }
            matched
        };

        for listener in matched {
            listener(event);
        }
    }

    /// Returns the number of listeners registered under `name`.
    #[must_use]
    pub fn listener_count(&self, name: &str) -> usize {
        let key = slug(name);
        self.listeners
            .read()
            .expect("listener lock poisoned")
            .get(&key)
            .map_or(0, Vec::len)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rstest::rstest;

    use super::*;

    fn record(log: &Arc<Mutex<Vec<String>>>, tag: &str) -> impl Fn(&PubSubEvent) + use<> {
        let log = Arc::clone(log);
        let tag = tag.to_string();
        move |_event| log.lock().unwrap().push(tag.clone())
    }

    #[rstest]
    fn test_invalid_event_name() {
        let emitter = EventEmitter::new();
        let result = emitter.on("!!!", |_| {});
        assert!(matches!(result, Err(PubSubWsError::InvalidEventName)));
    }

    #[rstest]
    fn test_on_emit_off() {
        let emitter = EventEmitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let id = emitter.on("Pong", record(&log, "a")).unwrap();
        emitter.on("pong", record(&log, "b")).unwrap();

        emitter.emit("PONG", &PubSubEvent::Ping);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);

        assert!(emitter.off("pong", id));
        assert!(!emitter.off("pong", id));

        log.lock().unwrap().clear();
        emitter.emit("pong", &PubSubEvent::Ping);
        assert_eq!(*log.lock().unwrap(), vec!["b"]);
    }

    #[rstest]
    fn test_wildcard_listeners() {
        let emitter = EventEmitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        emitter.on("reward-redeemed", record(&log, "exact")).unwrap();
        emitter.on("reward*", record(&log, "prefix")).unwrap();
        emitter.on("*", record(&log, "all")).unwrap();
        emitter.on("bits", record(&log, "bits")).unwrap();

        emitter.emit("reward-redeemed", &PubSubEvent::Ping);
        assert_eq!(*log.lock().unwrap(), vec!["exact", "prefix", "all"]);

        log.lock().unwrap().clear();
        emitter.emit("pong", &PubSubEvent::Ping);
        assert_eq!(*log.lock().unwrap(), vec!["all"]);
    }

    #[rstest]
    fn test_emit_without_listeners_is_noop() {
        let emitter = EventEmitter::new();
        emitter.emit("nobody-home", &PubSubEvent::Ping);
        assert_eq!(emitter.listener_count("nobody-home"), 0);
    }
}

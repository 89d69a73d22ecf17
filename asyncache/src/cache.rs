// Copyright 2026 asyncache Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{borrow::Cow, fmt::Debug, hash::Hash, sync::Arc};

use asyncache_common::{
    event::{Event, EventListener},
    slab::Token,
};
use equivalent::Equivalent;

use crate::{
    backend::Backend,
    builder::CacheBuilder,
    error::{Error, Result},
    registry::{Entry, EntryState, Registry},
    statistics::Statistics,
};

/// A reference-released asynchronous cache.
///
/// State transitions of an entry:
///
/// | state      | request                       | prefetch           | release                  | release (force) |
/// |------------|-------------------------------|--------------------|--------------------------|-----------------|
/// | absent     | load, `Requested`             | load, `Prefetched` | -                        | -               |
/// | Requested  | -                             | -                  | evict                    | evict           |
/// | Prefetched | poll, `Available`/`Requested` | move to tail       | error                    | evict           |
/// | Available  | -                             | -                  | `Released`, move to tail | evict           |
/// | Released   | `Available`, no load          | move to tail       | error                    | evict           |
///
/// Loading entries are only polled by [`AsyncCache::get`] and by requesting a prefetched entry.
pub struct AsyncCache<B>
where
    B: Backend,
{
    pub(crate) name: Cow<'static, str>,
    pub(crate) backend: B,
    pub(crate) registry: Registry<B::Key, B::Handle, B::Element>,
    pub(crate) event_listener: Option<Arc<dyn EventListener<Key = B::Key>>>,
    pub(crate) statistics: Arc<Statistics>,
}

impl<B> Debug for AsyncCache<B>
where
    B: Backend,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncCache")
            .field("name", &self.name)
            .field("entries", &self.registry.len())
            .field("statistics", &self.statistics)
            .finish()
    }
}

impl<B> AsyncCache<B>
where
    B: Backend,
{
    /// Create a cache over the given backend with the default configuration.
    pub fn new(backend: B) -> Self {
        CacheBuilder::new(backend).build()
    }

    /// Name of the cache.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start loading an element, or continue with an element that is already in the cache.
    ///
    /// Requesting a requested or available element does nothing. Requesting a released element makes it available
    /// again without reloading it.
    ///
    /// Returns `false` if there is no room for the element, even after reclaiming every evictable entry.
    pub fn request(&mut self, key: B::Key) -> bool {
        Statistics::inc(&self.statistics.requests);

        let Some(token) = self.registry.find(&key) else {
            return self.fetch(key, EntryState::Requested).is_some();
        };

        let Some(entry) = self.registry.get_mut(token) else {
            return false;
        };
        match entry.state {
            EntryState::Requested => {}
            EntryState::Available => Statistics::inc(&self.statistics.hits),
            EntryState::Prefetched => match self.backend.get_element(&entry.handle) {
                Some(element) => {
                    entry.element = Some(element);
                    entry.state = EntryState::Available;
                    tracing::trace!("[{}]: prefetched entry {:?} is available", self.name, entry.key);
                }
                None => {
                    entry.state = EntryState::Requested;
                    tracing::trace!("[{}]: prefetched entry {:?} is requested", self.name, entry.key);
                }
            },
            EntryState::Released => {
                entry.state = EntryState::Available;
                Statistics::inc(&self.statistics.hits);
                Statistics::inc(&self.statistics.reloads);
                tracing::trace!("[{}]: released entry {:?} is reloaded", self.name, entry.key);
            }
        }
        true
    }

    /// Start loading an element that may be needed soon.
    ///
    /// A prefetched element is evictable until it is requested. Prefetching a prefetched or released element makes it
    /// the last to be evicted. Prefetching a requested or available element does nothing. Nothing is loaded if there is
    /// no room for the element.
    pub fn prefetch(&mut self, key: B::Key) {
        let Some(token) = self.registry.find(&key) else {
            self.fetch(key, EntryState::Prefetched);
            return;
        };

        let evictable = self.registry.get(token).is_some_and(|entry| entry.state.is_evictable());
        if evictable {
            self.registry.move_to_back(token);
        }
    }

    /// Get the element of an available entry.
    ///
    /// A requested entry is polled and becomes available if the backend has finished loading it. Never creates
    /// entries and never blocks.
    pub fn get<Q>(&mut self, key: &Q) -> Option<B::Element>
    where
        Q: Hash + Equivalent<B::Key> + ?Sized,
    {
        let token = self.registry.find(key)?;
        let entry = self.registry.get_mut(token)?;

        if entry.state == EntryState::Requested {
            if let Some(element) = self.backend.get_element(&entry.handle) {
                entry.element = Some(element);
                entry.state = EntryState::Available;
                tracing::trace!("[{}]: requested entry {:?} is available", self.name, entry.key);
            }
        }

        match entry.state {
            EntryState::Available => entry.element.clone(),
            _ => None,
        }
    }

    /// Mark an element as no longer used.
    ///
    /// A released element may be evicted at any time. Releasing a requested element cancels its load. With `force`, the
    /// element is evicted immediately regardless of its state.
    ///
    /// Releasing a key that is not in the cache does nothing. Releasing a prefetched or released entry without `force`
    /// is rejected with [`Error::InvalidRelease`] and leaves the entry untouched.
    pub fn release<Q>(&mut self, key: &Q, force: bool) -> Result<()>
    where
        Q: Hash + Equivalent<B::Key> + ?Sized,
    {
        match self.registry.find(key) {
            Some(token) => self.release_entry(token, force),
            None => Ok(()),
        }
    }

    /// Mark the element with the given reference as no longer used.
    ///
    /// Same as [`AsyncCache::release`], but the entry is looked up by its element reference. Element references are not
    /// unique if the backend reuses storage, so the reference of an element that has already been evicted may release a
    /// different entry.
    pub fn release_element(&mut self, element: &B::Element, force: bool) -> Result<()> {
        match self.registry.find_by_element(element) {
            Some(token) => self.release_entry(token, force),
            None => Ok(()),
        }
    }

    /// Returns `true` if the cache has no entries in any state.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Count of entries in any state.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Evict every entry, cancelling pending loads and unloading elements that are still in use.
    pub fn clear(&mut self) {
        tracing::debug!("[{}]: clear {} entries", self.name, self.registry.len());
        while let Some(token) = self.registry.front() {
            self.evict(token, Event::Clear);
        }
    }

    /// Returns `true` if the element is loaded in the backend, even if it is released.
    ///
    /// Requested and prefetched entries report `false`, their elements may not exist yet.
    pub fn is_cached<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<B::Key> + ?Sized,
    {
        self.registry
            .find(key)
            .and_then(|token| self.registry.get(token))
            .is_some_and(|entry| matches!(entry.state, EntryState::Available | EntryState::Released))
    }

    /// The backend of the cache.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The mutable backend of the cache.
    ///
    /// Loads and unloads must only be issued by the cache.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Statistics of the cache.
    pub fn statistics(&self) -> &Arc<Statistics> {
        &self.statistics
    }

    fn release_entry(&mut self, token: Token, force: bool) -> Result<()> {
        let Some(entry) = self.registry.get_mut(token) else {
            return Ok(());
        };

        let state = entry.state;
        match state {
            EntryState::Requested => self.evict(token, Event::Remove),
            _ if force => self.evict(token, Event::Remove),
            EntryState::Available => {
                entry.state = EntryState::Released;
                tracing::trace!("[{}]: entry {:?} is released", self.name, entry.key);
                self.registry.move_to_back(token);
            }
            EntryState::Prefetched | EntryState::Released => {
                tracing::warn!(
                    "[{}]: reject to release entry {:?}, the entry is {:?}",
                    self.name,
                    entry.key,
                    state
                );
                return Err(Error::InvalidRelease {
                    key: format!("{:?}", entry.key),
                    state,
                });
            }
        }
        Ok(())
    }

    /// Walk the registry from head to tail, reclaiming evictable entries until the backend reports room.
    ///
    /// Pinned entries are skipped.
    fn make_room_for(&mut self, key: &B::Key) -> bool {
        let mut cursor = self.registry.front();

        while !self.backend.has_room_for(key) {
            let Some(token) = cursor else {
                return false;
            };
            cursor = self.registry.next(token);

            let evictable = self.registry.get(token).is_some_and(|entry| entry.state.is_evictable());
            if evictable {
                self.evict(token, Event::Evict);
                Statistics::inc(&self.statistics.evictions);
            }
        }

        true
    }

    fn fetch(&mut self, key: B::Key, state: EntryState) -> Option<Token> {
        if !self.make_room_for(&key) {
            Statistics::inc(&self.statistics.admission_failures);
            tracing::debug!("[{}]: no room for entry {:?}", self.name, key);
            return None;
        }

        let handle = self.backend.load(&key);
        Statistics::inc(&self.statistics.loads);
        tracing::trace!("[{}]: load entry {:?} as {:?} with handle {:?}", self.name, key, state, handle);

        Some(self.registry.push_back(Entry::new(key, handle, state)))
    }

    /// Unload the backend resource of an entry, then remove the entry from the registry.
    fn evict(&mut self, token: Token, reason: Event) {
        let Some(entry) = self.registry.get(token) else {
            return;
        };
        self.backend.unload(&entry.handle);
        Statistics::inc(&self.statistics.unloads);

        if let Some(entry) = self.registry.remove(token) {
            tracing::debug!("[{}]: evict entry {:?} ({:?}), reason: {:?}", self.name, entry.key, entry.state, reason);
            if let Some(listener) = self.event_listener.as_ref() {
                listener.on_leave(reason, &entry.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::test_utils::{Address, BackDoor, EventRecorder, RecordingBackend};

    type TestCache = AsyncCache<RecordingBackend>;

    fn cache(capacity: usize) -> TestCache {
        AsyncCache::new(RecordingBackend::new(capacity))
    }

    fn ready_cache(capacity: usize) -> TestCache {
        AsyncCache::new(RecordingBackend::new(capacity).with_ready_on_load(true))
    }

    fn state(cache: &mut TestCache, key: u64) -> Option<EntryState> {
        BackDoor::new(cache).state(&key)
    }

    fn keys(cache: &mut TestCache) -> Vec<u64> {
        BackDoor::new(cache).keys()
    }

    #[test_log::test]
    fn test_capacity_scenario() {
        let mut cache = ready_cache(2);

        assert!(cache.request(1));
        assert!(cache.request(2));
        assert!(cache.get(&1).is_some());
        assert!(cache.get(&2).is_some());
        // Nothing is evictable yet.
        assert!(!cache.request(3));
        assert_eq!(cache.backend().loads(), &[1, 2]);

        cache.release(&1, false).unwrap();
        assert!(cache.request(3));
        assert!(!cache.is_cached(&1));
        assert!(cache.is_cached(&2));
        assert_eq!(cache.backend().unloads(), &[1]);
        assert_eq!(Statistics::get(&cache.statistics().admission_failures), 1);
        assert_eq!(Statistics::get(&cache.statistics().evictions), 1);
    }

    #[test_log::test]
    fn test_request_pending_then_get() {
        let mut cache = cache(4);

        assert!(cache.request(1));
        assert_eq!(state(&mut cache, 1), Some(EntryState::Requested));
        assert_eq!(cache.get(&1), None);
        assert!(!cache.is_cached(&1));

        assert!(cache.backend_mut().complete(1));
        let element = cache.get(&1).unwrap();
        assert_eq!(state(&mut cache, 1), Some(EntryState::Available));
        assert_eq!(cache.backend().key_of(&element), Some(1));
        assert!(cache.is_cached(&1));

        // Get never creates entries.
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.len(), 1);
    }

    #[test_log::test]
    fn test_request_idempotence() {
        let mut cache = cache(4);

        assert!(cache.request(1));
        assert!(cache.request(1));
        assert!(cache.request(1));
        assert_eq!(cache.backend().loads(), &[1]);
        assert_eq!(state(&mut cache, 1), Some(EntryState::Requested));

        // Requesting a requested entry does not poll the backend.
        cache.backend_mut().complete(1);
        assert!(cache.request(1));
        assert_eq!(state(&mut cache, 1), Some(EntryState::Requested));

        cache.get(&1).unwrap();
        assert!(cache.request(1));
        assert!(cache.request(1));
        assert_eq!(state(&mut cache, 1), Some(EntryState::Available));
        assert_eq!(cache.backend().loads(), &[1]);
        assert_eq!(cache.len(), 1);
    }

    #[test_log::test]
    fn test_release_and_reload() {
        let mut cache = ready_cache(2);

        assert!(cache.request(1));
        let element = cache.get(&1).unwrap();
        cache.release(&1, false).unwrap();
        assert_eq!(state(&mut cache, 1), Some(EntryState::Released));
        assert!(cache.is_cached(&1));
        assert_eq!(cache.get(&1), None);

        assert!(cache.request(1));
        assert!(cache.is_cached(&1));
        assert_eq!(cache.get(&1), Some(element));
        assert_eq!(cache.backend().loads(), &[1]);
        assert!(cache.backend().unloads().is_empty());
        assert_eq!(Statistics::get(&cache.statistics().reloads), 1);
    }

    #[test_log::test]
    fn test_cancel_pending_load() {
        let listener = Arc::new(EventRecorder::<u64>::default());
        let mut cache = CacheBuilder::new(RecordingBackend::new(2))
            .with_event_listener(listener.clone())
            .build();

        assert!(cache.request(1));
        cache.release(&1, false).unwrap();

        assert_eq!(cache.backend().unloads(), &[1]);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
        assert_eq!(listener.events().as_slice(), &[(Event::Remove, 1)]);
    }

    #[test_log::test]
    fn test_force_release() {
        let mut cache = ready_cache(4);

        assert!(cache.request(1));
        cache.get(&1).unwrap();
        cache.release(&1, true).unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.backend().unloads(), &[1]);

        // Force evicts released and prefetched entries as well.
        assert!(cache.request(2));
        cache.get(&2).unwrap();
        cache.release(&2, false).unwrap();
        cache.release(&2, true).unwrap();
        cache.prefetch(3);
        cache.release(&3, true).unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.backend().unloads(), &[1, 2, 3]);
    }

    #[test_log::test]
    fn test_invalid_release() {
        let mut cache = ready_cache(4);

        assert!(cache.request(1));
        cache.get(&1).unwrap();
        cache.release(&1, false).unwrap();
        assert_eq!(
            cache.release(&1, false),
            Err(Error::InvalidRelease {
                key: "1".to_string(),
                state: EntryState::Released,
            })
        );

        cache.prefetch(2);
        assert!(matches!(
            cache.release(&2, false),
            Err(Error::InvalidRelease {
                state: EntryState::Prefetched,
                ..
            })
        ));

        // Rejected releases leave entries untouched.
        assert_eq!(keys(&mut cache), vec![1, 2]);
        assert_eq!(state(&mut cache, 1), Some(EntryState::Released));
        assert_eq!(state(&mut cache, 2), Some(EntryState::Prefetched));
        assert!(cache.backend().unloads().is_empty());

        // Releasing an absent key does nothing.
        cache.release(&42, false).unwrap();
        cache.release(&42, true).unwrap();
    }

    #[test_log::test]
    fn test_release_by_element() {
        let mut cache = ready_cache(4);

        assert!(cache.request(1));
        assert!(cache.request(2));
        let e1 = cache.get(&1).unwrap();
        let e2 = cache.get(&2).unwrap();

        cache.release_element(&e2, false).unwrap();
        assert_eq!(state(&mut cache, 2), Some(EntryState::Released));
        cache.release_element(&e1, true).unwrap();
        assert!(!cache.is_cached(&1));
        assert_eq!(cache.backend().unloads(), &[1]);

        // Unknown addresses are ignored.
        cache.release_element(&Address(42), true).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test_log::test]
    fn test_prefetch() {
        let mut cache = cache(4);

        cache.prefetch(1);
        assert_eq!(state(&mut cache, 1), Some(EntryState::Prefetched));
        assert!(!cache.is_cached(&1));
        // A prefetched element is not visible before it is requested.
        cache.backend_mut().complete(1);
        assert_eq!(cache.get(&1), None);

        assert!(cache.request(1));
        assert_eq!(state(&mut cache, 1), Some(EntryState::Available));
        assert!(cache.get(&1).is_some());

        // Requesting a prefetched element that is still loading.
        cache.prefetch(2);
        assert!(cache.request(2));
        assert_eq!(state(&mut cache, 2), Some(EntryState::Requested));
        assert_eq!(cache.get(&2), None);
        cache.backend_mut().complete(2);
        assert!(cache.get(&2).is_some());

        // Prefetching requested or available elements does nothing.
        assert!(cache.request(3));
        cache.prefetch(3);
        cache.prefetch(1);
        assert_eq!(keys(&mut cache), vec![1, 2, 3]);
        assert_eq!(state(&mut cache, 3), Some(EntryState::Requested));
        assert_eq!(cache.backend().loads(), &[1, 2, 3]);
    }

    #[test_log::test]
    fn test_prefetch_without_room() {
        let mut cache = ready_cache(1);

        assert!(cache.request(1));
        cache.prefetch(2);
        assert!(!cache.is_cached(&2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.backend().loads(), &[1]);
        assert_eq!(Statistics::get(&cache.statistics().admission_failures), 1);
    }

    #[test_log::test]
    fn test_prefetch_refreshes_eviction_order() {
        let mut cache = ready_cache(3);

        cache.prefetch(1);
        cache.prefetch(2);
        assert!(cache.request(3));
        cache.get(&3).unwrap();
        cache.release(&3, false).unwrap();
        assert_eq!(keys(&mut cache), vec![1, 2, 3]);

        cache.prefetch(1);
        assert_eq!(keys(&mut cache), vec![2, 3, 1]);
        cache.prefetch(3);
        assert_eq!(keys(&mut cache), vec![2, 1, 3]);
        assert_eq!(state(&mut cache, 3), Some(EntryState::Released));

        assert!(cache.request(4));
        assert!(cache.request(5));
        assert_eq!(cache.backend().unloads(), &[2, 1]);
        assert_eq!(keys(&mut cache), vec![3, 4, 5]);
    }

    #[test_log::test]
    fn test_fifo_evictability() {
        let mut cache = ready_cache(4);

        for key in 1..=4 {
            assert!(cache.request(key));
            cache.get(&key).unwrap();
        }
        // Release in an order different from the creation order.
        for key in [3, 1, 4] {
            cache.release(&key, false).unwrap();
        }

        assert!(cache.request(5));
        assert_eq!(cache.backend().unloads(), &[3]);
        assert!(cache.request(6));
        assert_eq!(cache.backend().unloads(), &[3, 1]);
        assert!(cache.is_cached(&4));
    }

    #[test_log::test]
    fn test_pinned_entries_are_skipped() {
        let mut cache = ready_cache(3);

        assert!(cache.request(1));
        cache.get(&1).unwrap();
        assert!(cache.request(2));
        cache.prefetch(3);
        assert_eq!(keys(&mut cache), vec![1, 2, 3]);

        // Only the prefetched entry at the tail can be reclaimed.
        assert!(cache.request(4));
        assert_eq!(cache.backend().unloads(), &[3]);
        assert!(!cache.request(5));
        assert_eq!(keys(&mut cache), vec![1, 2, 4]);
        assert!(BackDoor::new(&mut cache).entries().all(|entry| entry.state().is_pinned()));
    }

    #[test_log::test]
    fn test_clear() {
        let listener = Arc::new(EventRecorder::<u64>::default());
        let mut cache = CacheBuilder::new(RecordingBackend::new(8))
            .with_name("clear")
            .with_event_listener(listener.clone())
            .build();
        assert_eq!(cache.name(), "clear");

        assert!(cache.request(1));
        assert!(cache.request(2));
        cache.backend_mut().complete(2);
        cache.get(&2).unwrap();
        assert!(cache.request(3));
        cache.backend_mut().complete(3);
        cache.get(&3).unwrap();
        cache.release(&3, false).unwrap();
        cache.prefetch(4);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.backend().usage(), 0);
        assert_eq!(cache.backend().unloads().iter().copied().sorted().collect_vec(), vec![1, 2, 3, 4]);
        assert!(listener.events().iter().all(|(event, _)| *event == Event::Clear));
        assert_eq!(listener.events().len(), 4);
    }

    #[test_log::test]
    fn test_evict_event() {
        let listener = Arc::new(EventRecorder::<u64>::default());
        let mut cache = CacheBuilder::new(RecordingBackend::new(1).with_ready_on_load(true))
            .with_event_listener(listener.clone())
            .build();

        cache.prefetch(1);
        assert!(cache.request(2));
        assert_eq!(listener.events().as_slice(), &[(Event::Evict, 1)]);
    }

    #[test_log::test]
    fn test_back_door_lookup() {
        let mut cache = ready_cache(2);
        assert!(cache.request(1));
        let element = cache.get(&1).unwrap();

        let mut back_door = BackDoor::new(&mut cache);
        let handle = *back_door.find(&1).unwrap().handle();
        assert_eq!(back_door.find_by_handle(&handle).unwrap().key(), &1);
        assert_eq!(back_door.find_by_element(&element).unwrap().key(), &1);
        assert_eq!(back_door.find(&1).unwrap().element(), Some(&element));
        assert_eq!(back_door.get_element(&handle), Some(element));
        assert_eq!(back_door.backend().usage(), 1);
    }
}

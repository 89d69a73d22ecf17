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

//! Utilities for testing.

use std::hash::Hash;

use asyncache_common::{
    code::Key,
    event::{Event, EventListener},
};
use equivalent::Equivalent;
use hashbrown::HashMap;
use parking_lot::{Mutex, MutexGuard};

use crate::{
    backend::Backend,
    cache::AsyncCache,
    registry::{Entry, EntryState},
};

/// Element reference issued by [`RecordingBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub u64);

#[derive(Debug)]
struct Resident {
    key: u64,
    ready: bool,
}

/// A backend that holds up to `capacity` elements and records every load and unload.
///
/// Loads stay pending until [`RecordingBackend::complete`] is called for the key, or complete immediately with
/// [`RecordingBackend::with_ready_on_load`]. The element address of a handle is derived from the handle, and handles
/// are never reused.
///
/// The backend panics if it is asked to load beyond its capacity or to unload an unknown handle.
#[derive(Debug)]
pub struct RecordingBackend {
    capacity: usize,
    ready_on_load: bool,
    next_handle: u64,
    residents: HashMap<u64, Resident>,
    loads: Vec<u64>,
    unloads: Vec<u64>,
}

impl RecordingBackend {
    /// Create a backend with room for `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ready_on_load: false,
            next_handle: 0,
            residents: HashMap::new(),
            loads: vec![],
            unloads: vec![],
        }
    }

    /// Complete every load immediately.
    pub fn with_ready_on_load(mut self, ready_on_load: bool) -> Self {
        self.ready_on_load = ready_on_load;
        self
    }

    /// Complete the pending load of the given key. Returns `false` if the key is not loading.
    pub fn complete(&mut self, key: u64) -> bool {
        match self.residents.values_mut().find(|r| r.key == key && !r.ready) {
            Some(resident) => {
                resident.ready = true;
                true
            }
            None => false,
        }
    }

    /// Keys of all loads, in call order.
    pub fn loads(&self) -> &[u64] {
        &self.loads
    }

    /// Keys of all unloads, in call order.
    pub fn unloads(&self) -> &[u64] {
        &self.unloads
    }

    /// Count of loading and loaded elements.
    pub fn usage(&self) -> usize {
        self.residents.len()
    }

    /// Check if the key is loading or loaded.
    pub fn is_resident(&self, key: u64) -> bool {
        self.residents.values().any(|r| r.key == key)
    }

    /// Key of the element at the given address, if it is still loaded.
    pub fn key_of(&self, address: &Address) -> Option<u64> {
        self.residents.get(&address.0).filter(|r| r.ready).map(|r| r.key)
    }
}

impl Backend for RecordingBackend {
    type Key = u64;
    type Handle = u64;
    type Element = Address;

    fn load(&mut self, key: &u64) -> u64 {
        assert!(
            self.residents.len() < self.capacity,
            "load {key} beyond capacity {}",
            self.capacity
        );
        let handle = self.next_handle;
        self.next_handle += 1;
        self.residents.insert(
            handle,
            Resident {
                key: *key,
                ready: self.ready_on_load,
            },
        );
        self.loads.push(*key);
        handle
    }

    fn unload(&mut self, handle: &u64) {
        let resident = self
            .residents
            .remove(handle)
            .unwrap_or_else(|| panic!("unload unknown handle {handle}"));
        self.unloads.push(resident.key);
    }

    fn has_room_for(&self, _: &u64) -> bool {
        self.residents.len() < self.capacity
    }

    fn get_element(&mut self, handle: &u64) -> Option<Address> {
        self.residents
            .get(handle)
            .filter(|r| r.ready)
            .map(|_| Address(*handle))
    }
}

/// An event listener that records all leave events.
#[derive(Debug)]
pub struct EventRecorder<K> {
    events: Mutex<Vec<(Event, K)>>,
}

impl<K> Default for EventRecorder<K> {
    fn default() -> Self {
        Self {
            events: Mutex::new(vec![]),
        }
    }
}

impl<K> EventListener for EventRecorder<K>
where
    K: Key + Send,
{
    type Key = K;

    fn on_leave(&self, reason: Event, key: &K) {
        self.events.lock().push((reason, key.clone()));
    }
}

impl<K> EventRecorder<K> {
    /// Get all recorded events.
    pub fn events(&self) -> MutexGuard<'_, Vec<(Event, K)>> {
        self.events.lock()
    }
}

/// Privileged read-only view of the internals of an [`AsyncCache`].
pub struct BackDoor<'a, B>
where
    B: Backend,
{
    target: &'a mut AsyncCache<B>,
}

impl<'a, B> BackDoor<'a, B>
where
    B: Backend,
{
    /// Open a back door to the given cache.
    pub fn new(target: &'a mut AsyncCache<B>) -> Self {
        Self { target }
    }

    /// Entries in eviction order, from head to tail.
    pub fn entries(&self) -> impl Iterator<Item = &Entry<B::Key, B::Handle, B::Element>> {
        self.target.registry.iter()
    }

    /// Keys in eviction order, from head to tail.
    pub fn keys(&self) -> Vec<B::Key> {
        self.entries().map(|entry| entry.key().clone()).collect()
    }

    /// State of the entry with the given key.
    pub fn state<Q>(&self, key: &Q) -> Option<EntryState>
    where
        Q: Hash + Equivalent<B::Key> + ?Sized,
    {
        self.find(key).map(|entry| entry.state())
    }

    /// Find an entry by key.
    pub fn find<Q>(&self, key: &Q) -> Option<&Entry<B::Key, B::Handle, B::Element>>
    where
        Q: Hash + Equivalent<B::Key> + ?Sized,
    {
        let registry = &self.target.registry;
        registry.find(key).and_then(|token| registry.get(token))
    }

    /// Find an entry by backend handle.
    pub fn find_by_handle(&self, handle: &B::Handle) -> Option<&Entry<B::Key, B::Handle, B::Element>> {
        let registry = &self.target.registry;
        registry.find_by_handle(handle).and_then(|token| registry.get(token))
    }

    /// Find an entry by element reference.
    pub fn find_by_element(&self, element: &B::Element) -> Option<&Entry<B::Key, B::Handle, B::Element>> {
        let registry = &self.target.registry;
        registry.find_by_element(element).and_then(|token| registry.get(token))
    }

    /// Poll the backend for the element of a handle, without changing any entry.
    pub fn get_element(&mut self, handle: &B::Handle) -> Option<B::Element> {
        self.target.backend.get_element(handle)
    }

    /// The backend of the cache.
    pub fn backend(&self) -> &B {
        &self.target.backend
    }
}

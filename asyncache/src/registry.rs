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

use std::hash::Hash;

use asyncache_common::{
    code::Key,
    slab::{SlabList, Token},
    strict_assert, strict_assert_eq,
};
use equivalent::Equivalent;
use hashbrown::HashMap;

/// State of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Requested and waiting for the backend to finish loading.
    Requested,
    /// Loading (or loaded) ahead of a request. Evictable.
    Prefetched,
    /// Loaded and in use.
    Available,
    /// Loaded and no longer in use. Evictable.
    Released,
}

impl EntryState {
    /// Pinned entries are never reclaimed by the admission controller.
    pub fn is_pinned(&self) -> bool {
        matches!(self, EntryState::Requested | EntryState::Available)
    }

    /// Evictable entries may be reclaimed at any time.
    pub fn is_evictable(&self) -> bool {
        !self.is_pinned()
    }
}

/// Registry record tracking the state of one key.
#[derive(Debug)]
pub struct Entry<K, H, E> {
    pub(crate) key: K,
    pub(crate) state: EntryState,
    pub(crate) handle: H,
    pub(crate) element: Option<E>,
}

impl<K, H, E> Entry<K, H, E> {
    pub(crate) fn new(key: K, handle: H, state: EntryState) -> Self {
        Self {
            key,
            state,
            handle,
            element: None,
        }
    }

    /// Key of the entry.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// State of the entry.
    pub fn state(&self) -> EntryState {
        self.state
    }

    /// Backend handle of the entry.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Element reference, set once the backend reported the element as loaded.
    ///
    /// A released entry keeps the reference of its still loaded element.
    pub fn element(&self) -> Option<&E> {
        self.element.as_ref()
    }
}

/// Entries in eviction order with a key index.
///
/// The head of the order holds the entries that became evictable earliest.
pub(crate) struct Registry<K, H, E> {
    entries: SlabList<Entry<K, H, E>>,
    index: HashMap<K, Token>,
}

impl<K, H, E> Registry<K, H, E>
where
    K: Key,
    H: Eq,
    E: Eq,
{
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SlabList::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn find<Q>(&self, key: &Q) -> Option<Token>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.index.get(key).copied()
    }

    #[cfg_attr(not(any(test, feature = "test_utils")), expect(dead_code))]
    pub fn find_by_handle(&self, handle: &H) -> Option<Token> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.handle == *handle)
            .map(|(token, _)| token)
    }

    /// Element references are not unique if the backend reuses storage, the first match is returned.
    pub fn find_by_element(&self, element: &E) -> Option<Token> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.element.as_ref() == Some(element))
            .map(|(token, _)| token)
    }

    pub fn get(&self, token: Token) -> Option<&Entry<K, H, E>> {
        self.entries.get(token)
    }

    pub fn get_mut(&mut self, token: Token) -> Option<&mut Entry<K, H, E>> {
        self.entries.get_mut(token)
    }

    pub fn push_back(&mut self, entry: Entry<K, H, E>) -> Token {
        strict_assert!(!self.index.contains_key(&entry.key));
        let key = entry.key.clone();
        let token = self.entries.push_back(entry);
        self.index.insert(key, token);
        token
    }

    pub fn move_to_back(&mut self, token: Token) {
        let moved = self.entries.move_to_back(token);
        strict_assert!(moved);
    }

    pub fn remove(&mut self, token: Token) -> Option<Entry<K, H, E>> {
        let entry = self.entries.remove(token)?;
        let indexed = self.index.remove(&entry.key);
        strict_assert_eq!(indexed, Some(token));
        Some(entry)
    }

    pub fn front(&self) -> Option<Token> {
        self.entries.front()
    }

    pub fn next(&self, token: Token) -> Option<Token> {
        self.entries.next(token)
    }

    #[cfg_attr(not(any(test, feature = "test_utils")), expect(dead_code))]
    pub fn iter(&self) -> impl Iterator<Item = &Entry<K, H, E>> {
        self.entries.iter().map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        strict_assert_eq!(self.entries.len(), self.index.len());
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

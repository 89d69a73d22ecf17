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

use std::num::NonZeroUsize;

/// Stable identifier of an occupied slot in a [`Slab`].
///
/// A token stays valid until its slot is removed. After that the slot may be reused, and the same token value may
/// refer to a different value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token(NonZeroUsize);

impl Token {
    fn new(index: usize) -> Self {
        Self(NonZeroUsize::MIN.saturating_add(index))
    }

    /// Index of the slot inside the slab.
    pub fn index(&self) -> usize {
        self.0.get() - 1
    }
}

/// A vector-backed arena with a free list of vacant slots.
#[derive(Debug, Clone)]
pub struct Slab<T> {
    entries: Vec<Entry<T>>,
    len: usize,
    next: usize,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slab<T> {
    /// Create an empty slab.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next: 0,
            len: 0,
        }
    }

    /// Create an empty slab with preallocated slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            next: 0,
            len: 0,
        }
    }

    /// Insert a value and return the token of its slot.
    pub fn insert(&mut self, val: T) -> Token {
        let index = self.next;
        self.insert_at(index, val);
        Token::new(index)
    }

    /// Remove the value with the given token, if the slot is occupied.
    pub fn remove(&mut self, token: Token) -> Option<T> {
        self.remove_at(token.index())
    }

    /// Get the value with the given token.
    pub fn get(&self, token: Token) -> Option<&T> {
        match self.entries.get(token.index()) {
            Some(Entry::Occupied(val)) => Some(val),
            _ => None,
        }
    }

    /// Get the mutable value with the given token.
    pub fn get_mut(&mut self, token: Token) -> Option<&mut T> {
        match self.entries.get_mut(token.index()) {
            Some(Entry::Occupied(val)) => Some(val),
            _ => None,
        }
    }

    /// Check if the slot of the given token is occupied.
    pub fn contains(&self, token: Token) -> bool {
        self.get(token).is_some()
    }

    /// Count of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the slab has no occupied slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the occupied slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Token, &T)> {
        self.entries.iter().enumerate().filter_map(|(index, entry)| match entry {
            Entry::Occupied(val) => Some((Token::new(index), val)),
            Entry::Vacant(_) => None,
        })
    }

    fn insert_at(&mut self, index: usize, val: T) {
        self.len += 1;

        if index == self.entries.len() {
            self.entries.push(Entry::Occupied(val));
            self.next = index + 1;
        } else {
            self.next = match self.entries[index] {
                Entry::Vacant(next) => next,
                Entry::Occupied(_) => unreachable!("free list points to an occupied slot"),
            };
            self.entries[index] = Entry::Occupied(val);
        }
    }

    fn remove_at(&mut self, index: usize) -> Option<T> {
        let entry = self.entries.get_mut(index)?;

        if matches!(entry, Entry::Vacant(_)) {
            return None;
        }

        match std::mem::replace(entry, Entry::Vacant(self.next)) {
            Entry::Vacant(_) => unreachable!(),
            Entry::Occupied(val) => {
                self.len -= 1;
                self.next = index;
                Some(val)
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Entry<T> {
    Vacant(usize),
    Occupied(T),
}

mod list;

pub use list::{Iter, SlabList};

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

use super::{Slab, Token};

struct Node<T> {
    val: T,

    prev: Option<Token>,
    next: Option<Token>,
}

/// A doubly linked list whose nodes live in a [`Slab`].
///
/// Every node is addressed by the [`Token`] returned on insertion, so unlinking a node or moving it to the back are
/// O(1) operations.
pub struct SlabList<T> {
    slab: Slab<Node<T>>,
    head: Option<Token>,
    tail: Option<Token>,
}

impl<T> Default for SlabList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SlabList<T> {
    /// Create an empty list.
    pub const fn new() -> Self {
        Self {
            slab: Slab::new(),
            head: None,
            tail: None,
        }
    }

    /// Create an empty list with preallocated nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slab: Slab::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    /// Token of the head node.
    pub fn front(&self) -> Option<Token> {
        self.head
    }

    /// Token of the node after the given one.
    pub fn next(&self, token: Token) -> Option<Token> {
        self.slab.get(token).and_then(|node| node.next)
    }

    /// Get the value of the node with the given token.
    pub fn get(&self, token: Token) -> Option<&T> {
        self.slab.get(token).map(|node| &node.val)
    }

    /// Get the mutable value of the node with the given token.
    pub fn get_mut(&mut self, token: Token) -> Option<&mut T> {
        self.slab.get_mut(token).map(|node| &mut node.val)
    }

    /// Append a value at the tail.
    pub fn push_back(&mut self, val: T) -> Token {
        let token = self.slab.insert(Node {
            val,
            prev: None,
            next: None,
        });
        self.link_back(token);
        token
    }

    /// Unlink and return the value of the node with the given token.
    pub fn remove(&mut self, token: Token) -> Option<T> {
        if !self.slab.contains(token) {
            return None;
        }
        self.unlink(token);
        self.slab.remove(token).map(|node| node.val)
    }

    /// Move the node with the given token to the tail.
    ///
    /// Returns `false` if the token does not address a node of the list.
    pub fn move_to_back(&mut self, token: Token) -> bool {
        if !self.slab.contains(token) {
            return false;
        }
        if self.tail != Some(token) {
            self.unlink(token);
            self.link_back(token);
        }
        true
    }

    /// Iterate over the values from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            token: self.head,
            list: self,
        }
    }

    /// Count of nodes.
    pub fn len(&self) -> usize {
        self.slab.len()
    }

    /// Check if the list has no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn link_back(&mut self, token: Token) {
        let prev = self.tail;
        if let Some(node) = self.slab.get_mut(token) {
            node.prev = prev;
            node.next = None;
        }
        match prev.and_then(|prev| self.slab.get_mut(prev)) {
            Some(node) => node.next = Some(token),
            None => self.head = Some(token),
        }
        self.tail = Some(token);
    }

    fn unlink(&mut self, token: Token) {
        let (prev, next) = match self.slab.get_mut(token) {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };
        match prev.and_then(|prev| self.slab.get_mut(prev)) {
            Some(node) => node.next = next,
            None => self.head = next,
        }
        match next.and_then(|next| self.slab.get_mut(next)) {
            Some(node) => node.prev = prev,
            None => self.tail = prev,
        }
    }
}

/// Iterator over the values of a [`SlabList`] from head to tail.
pub struct Iter<'a, T> {
    token: Option<Token>,
    list: &'a SlabList<T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Token, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.token?;
        let node = self.list.slab.get(token)?;
        self.token = node.next;
        Some((token, &node.val))
    }
}

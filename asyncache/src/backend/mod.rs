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

use std::fmt::Debug;

use asyncache_common::code::Key;

/// Storage, loading and capacity accounting behind an [`AsyncCache`](crate::AsyncCache).
///
/// The cache never owns element memory. It asks the backend to load elements, polls the backend until an element is
/// ready, and tells the backend to unload elements it no longer tracks.
///
/// # Contract
///
/// - [`Backend::load`] must return immediately. The returned handle identifies the load and the loaded element until
///   it is passed to [`Backend::unload`].
/// - [`Backend::unload`] is called exactly once per handle returned by [`Backend::load`]. It must release the resource
///   immediately and cancel the load if it is still in flight. It must not fail.
/// - [`Backend::has_room_for`] is the only capacity signal the cache uses. The cache calls it repeatedly while
///   reclaiming evictable entries, so it must reflect unloads immediately.
/// - [`Backend::get_element`] must not block. A failed load is expressed by never becoming ready.
/// - Once [`Backend::get_element`] returns an element for a handle, that element reference stays valid, and the
///   storage it refers to is not reused, until the handle is unloaded. Released entries are made available again
///   without asking the backend, relying on this guarantee.
pub trait Backend {
    /// Key identifying an element.
    type Key: Key;
    /// Backend-assigned identifier of a load and its element.
    type Handle: Clone + Eq + Debug;
    /// Non-owning reference to a loaded element, e.g. an index into backend-owned storage.
    type Element: Clone + Eq + Debug;

    /// Start loading the element with the given key.
    fn load(&mut self, key: &Self::Key) -> Self::Handle;

    /// Unload the element with the given handle, cancelling the load if it is still in flight.
    fn unload(&mut self, handle: &Self::Handle);

    /// Check if there is room to load the element with the given key.
    fn has_room_for(&self, key: &Self::Key) -> bool;

    /// Get the element with the given handle if it is loaded.
    fn get_element(&mut self, handle: &Self::Handle) -> Option<Self::Element>;
}

pub mod runtime;

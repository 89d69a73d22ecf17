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

//! A reference-released asynchronous cache engine.
//!
//! The engine decides *when* an element is fetched, *when* it becomes visible to callers, *when* it may be evicted and
//! *in which order* eviction happens. Loading, storage and capacity accounting are delegated to a [`Backend`].
//!
//! Elements requested through [`AsyncCache::request`] become available some time later and stay pinned until they
//! are released. A released element remains in the backend until it is reclaimed to make room for another one, and
//! can be requested again without reloading it. Released and prefetched elements are reclaimed in the order they
//! became evictable.
//!
//! [`AsyncCache`] is driven from a single logical thread. Use [`SyncCache`] to share one cache between threads.

mod backend;
mod builder;
mod cache;
mod error;
mod registry;
mod statistics;
mod sync;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

mod prelude;
pub use prelude::*;

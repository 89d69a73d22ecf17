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

use std::{borrow::Cow, sync::Arc};

use asyncache_common::event::EventListener;

use crate::{backend::Backend, cache::AsyncCache, registry::Registry, statistics::Statistics, sync::SyncCache};

/// Builder of [`AsyncCache`] and [`SyncCache`].
pub struct CacheBuilder<B>
where
    B: Backend,
{
    name: Cow<'static, str>,
    backend: B,
    capacity_hint: usize,
    event_listener: Option<Arc<dyn EventListener<Key = B::Key>>>,
}

impl<B> CacheBuilder<B>
where
    B: Backend,
{
    /// Create a builder over the given backend.
    pub fn new(backend: B) -> Self {
        Self {
            name: "asyncache".into(),
            backend,
            capacity_hint: 16,
            event_listener: None,
        }
    }

    /// Set the name of the cache. The name prefixes the log lines of the cache.
    ///
    /// The default name is `asyncache`.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the count of entries the registry preallocates room for.
    ///
    /// The optimized value is supposed to be the max count of elements the backend can hold.
    ///
    /// The default value is 16.
    pub fn with_capacity_hint(mut self, capacity_hint: usize) -> Self {
        self.capacity_hint = capacity_hint;
        self
    }

    /// Set the listener notified whenever an entry leaves the cache.
    pub fn with_event_listener(mut self, event_listener: Arc<dyn EventListener<Key = B::Key>>) -> Self {
        self.event_listener = Some(event_listener);
        self
    }

    /// Build the cache.
    pub fn build(self) -> AsyncCache<B> {
        tracing::debug!(
            "[{}]: build cache with capacity hint {}",
            self.name,
            self.capacity_hint
        );
        AsyncCache {
            name: self.name,
            backend: self.backend,
            registry: Registry::with_capacity(self.capacity_hint),
            event_listener: self.event_listener,
            statistics: Arc::new(Statistics::default()),
        }
    }

    /// Build the cache behind a mutex, so it can be shared between threads.
    pub fn build_sync(self) -> SyncCache<B> {
        SyncCache::from(self.build())
    }
}

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

use std::{hash::Hash, sync::Arc};

use equivalent::Equivalent;
use parking_lot::{Mutex, MutexGuard};

use crate::{backend::Backend, cache::AsyncCache, error::Result, statistics::Statistics};

/// An [`AsyncCache`] behind a mutex.
///
/// Every operation locks the whole cache, including the backend calls it makes. Clones share the same cache.
pub struct SyncCache<B>
where
    B: Backend,
{
    inner: Arc<Mutex<AsyncCache<B>>>,
    statistics: Arc<Statistics>,
}

impl<B> Clone for SyncCache<B>
where
    B: Backend,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            statistics: self.statistics.clone(),
        }
    }
}

impl<B> From<AsyncCache<B>> for SyncCache<B>
where
    B: Backend,
{
    fn from(cache: AsyncCache<B>) -> Self {
        let statistics = cache.statistics().clone();
        Self {
            inner: Arc::new(Mutex::new(cache)),
            statistics,
        }
    }
}

impl<B> SyncCache<B>
where
    B: Backend,
{
    /// See [`AsyncCache::request`].
    pub fn request(&self, key: B::Key) -> bool {
        self.inner.lock().request(key)
    }

    /// See [`AsyncCache::prefetch`].
    pub fn prefetch(&self, key: B::Key) {
        self.inner.lock().prefetch(key)
    }

    /// See [`AsyncCache::get`].
    pub fn get<Q>(&self, key: &Q) -> Option<B::Element>
    where
        Q: Hash + Equivalent<B::Key> + ?Sized,
    {
        self.inner.lock().get(key)
    }

    /// See [`AsyncCache::release`].
    pub fn release<Q>(&self, key: &Q, force: bool) -> Result<()>
    where
        Q: Hash + Equivalent<B::Key> + ?Sized,
    {
        self.inner.lock().release(key, force)
    }

    /// See [`AsyncCache::release_element`].
    pub fn release_element(&self, element: &B::Element, force: bool) -> Result<()> {
        self.inner.lock().release_element(element, force)
    }

    /// See [`AsyncCache::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// See [`AsyncCache::len`].
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// See [`AsyncCache::clear`].
    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    /// See [`AsyncCache::is_cached`].
    pub fn is_cached<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<B::Key> + ?Sized,
    {
        self.inner.lock().is_cached(key)
    }

    /// Statistics of the cache. Reading them does not lock the cache.
    pub fn statistics(&self) -> &Arc<Statistics> {
        &self.statistics
    }

    /// Lock the cache for a sequence of operations, or to access the backend.
    pub fn lock(&self) -> MutexGuard<'_, AsyncCache<B>> {
        self.inner.lock()
    }
}

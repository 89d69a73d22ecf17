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

use std::{fmt::Debug, future::Future, sync::Arc};

use asyncache_common::{
    code::Key,
    slab::{Slab, Token},
};
use futures_util::future::{BoxFuture, FutureExt};
use tokio::{runtime::Handle, task::JoinHandle};

use super::Backend;

type Loader<K, V> = Arc<dyn Fn(K) -> BoxFuture<'static, V> + Send + Sync>;

/// Handle of a load issued by [`RuntimeBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadHandle {
    token: Token,
    generation: u64,
}

/// Reference to an element loaded by [`RuntimeBackend`].
///
/// The reference addresses a slot of the backend and the load that filled it. Slots are reused after their element
/// is unloaded, and a reference to an unloaded element never resolves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    token: Token,
    generation: u64,
}

enum State<V> {
    Loading(JoinHandle<V>),
    Ready(Arc<V>),
    Failed,
}

struct Slot<V> {
    generation: u64,
    state: State<V>,
}

/// A backend that loads elements on a tokio runtime.
///
/// Each load spawns the loader future onto the runtime. The backend holds at most `capacity` loading or loaded
/// elements. Unloading a loading element aborts its task. A load whose task panics is never ready.
pub struct RuntimeBackend<K, V> {
    runtime: Handle,
    loader: Loader<K, V>,
    slots: Slab<Slot<V>>,
    capacity: usize,
    generation: u64,
}

impl<K, V> Debug for RuntimeBackend<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeBackend")
            .field("capacity", &self.capacity)
            .field("usage", &self.slots.len())
            .finish()
    }
}

impl<K, V> RuntimeBackend<K, V>
where
    K: Key,
    V: Send + Sync + 'static,
{
    /// Create a backend that spawns `loader` futures onto the given runtime.
    pub fn new<F, FU>(runtime: Handle, capacity: usize, loader: F) -> Self
    where
        F: Fn(K) -> FU + Send + Sync + 'static,
        FU: Future<Output = V> + Send + 'static,
    {
        Self {
            runtime,
            loader: Arc::new(move |key| loader(key).boxed()),
            slots: Slab::with_capacity(capacity),
            capacity,
            generation: 0,
        }
    }

    /// Get the value of a loaded element.
    ///
    /// Returns `None` once the element has been unloaded, even if its slot holds another element.
    pub fn value(&self, element: &ElementRef) -> Option<Arc<V>> {
        match self.slot(element.token, element.generation) {
            Some(Slot {
                state: State::Ready(value),
                ..
            }) => Some(value.clone()),
            _ => None,
        }
    }

    /// Max count of loading and loaded elements.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Count of loading and loaded elements.
    pub fn usage(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, token: Token, generation: u64) -> Option<&Slot<V>> {
        self.slots.get(token).filter(|slot| slot.generation == generation)
    }

    fn slot_mut(&mut self, token: Token, generation: u64) -> Option<&mut Slot<V>> {
        self.slots.get_mut(token).filter(|slot| slot.generation == generation)
    }
}

impl<K, V> Backend for RuntimeBackend<K, V>
where
    K: Key,
    V: Send + Sync + 'static,
{
    type Key = K;
    type Handle = LoadHandle;
    type Element = ElementRef;

    fn load(&mut self, key: &K) -> LoadHandle {
        let task = self.runtime.spawn((self.loader)(key.clone()));
        self.generation += 1;
        let generation = self.generation;
        let token = self.slots.insert(Slot {
            generation,
            state: State::Loading(task),
        });
        LoadHandle { token, generation }
    }

    fn unload(&mut self, handle: &LoadHandle) {
        if self.slot(handle.token, handle.generation).is_none() {
            tracing::warn!("[runtime backend]: unload stale handle {:?}", handle);
            return;
        }
        if let Some(Slot {
            state: State::Loading(task),
            ..
        }) = self.slots.remove(handle.token)
        {
            task.abort();
        }
    }

    fn has_room_for(&self, _: &K) -> bool {
        self.slots.len() < self.capacity
    }

    fn get_element(&mut self, handle: &LoadHandle) -> Option<ElementRef> {
        let slot = self.slot_mut(handle.token, handle.generation)?;

        if let State::Loading(task) = &mut slot.state {
            if !task.is_finished() {
                return None;
            }
            slot.state = match task.now_or_never() {
                Some(Ok(value)) => State::Ready(Arc::new(value)),
                Some(Err(e)) => {
                    tracing::warn!("[runtime backend]: load {:?} failed: {}", handle, e);
                    State::Failed
                }
                None => return None,
            };
        }

        match slot.state {
            State::Ready(_) => Some(ElementRef {
                token: handle.token,
                generation: handle.generation,
            }),
            State::Loading(_) | State::Failed => None,
        }
    }
}

impl<K, V> Drop for RuntimeBackend<K, V> {
    fn drop(&mut self) {
        for (_, slot) in self.slots.iter() {
            if let State::Loading(task) = &slot.state {
                task.abort();
            }
        }
    }
}

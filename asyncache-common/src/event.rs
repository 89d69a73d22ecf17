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

use crate::code::Key;

/// Reason for an entry leaving the cache registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Reclaimed by the admission controller to make room for a new entry.
    Evict,
    /// Removed by a release, either a cancelled pending load or a forced release.
    Remove,
    /// Removed by clearing the cache.
    Clear,
}

/// Trait for the customized event listener.
pub trait EventListener: Send + Sync + 'static {
    /// Associated key type.
    type Key;

    /// Called after the backend resource of an entry is unloaded and the entry has left the registry.
    #[expect(unused_variables)]
    fn on_leave(&self, reason: Event, key: &Self::Key)
    where
        Self::Key: Key,
    {
    }
}

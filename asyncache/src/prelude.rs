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

pub use asyncache_common::{
    code::Key,
    event::{Event, EventListener},
};

pub use crate::{
    backend::{
        runtime::{ElementRef, LoadHandle, RuntimeBackend},
        Backend,
    },
    builder::CacheBuilder,
    cache::AsyncCache,
    error::{Error, Result},
    registry::{Entry, EntryState},
    statistics::Statistics,
    sync::SyncCache,
};

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

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters of cache operations and backend calls.
///
/// All counters are updated with relaxed ordering.
#[derive(Debug, Default)]
pub struct Statistics {
    /// Calls of `request`.
    pub requests: AtomicUsize,
    /// Requests that found the element available or released.
    pub hits: AtomicUsize,
    /// Backend loads.
    pub loads: AtomicUsize,
    /// Released entries made available again without a backend load.
    pub reloads: AtomicUsize,
    /// Backend unloads.
    pub unloads: AtomicUsize,
    /// Entries reclaimed by the admission controller.
    pub evictions: AtomicUsize,
    /// Fetches that failed because no room could be made.
    pub admission_failures: AtomicUsize,
}

impl Statistics {
    pub(crate) fn inc(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Load a counter.
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::Relaxed)
    }
}

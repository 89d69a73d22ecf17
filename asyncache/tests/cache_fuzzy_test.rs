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

//! Randomized operation sequences checking the cache invariants after every step.

use std::collections::{HashMap, HashSet};

use asyncache::{
    test_utils::{BackDoor, RecordingBackend},
    AsyncCache, CacheBuilder, EntryState, Error,
};
use itertools::Itertools;
use rand::{rngs::SmallRng, Rng, SeedableRng};

const CAPACITY: usize = 8;
const KEYS: u64 = 24;
const STEPS: usize = 5000;
const SEEDS: u64 = 8;

type TestCache = AsyncCache<RecordingBackend>;

fn states(cache: &mut TestCache) -> HashMap<u64, EntryState> {
    BackDoor::new(cache)
        .entries()
        .map(|entry| (*entry.key(), entry.state()))
        .collect()
}

fn check_invariants(cache: &mut TestCache) {
    let back_door = BackDoor::new(cache);
    let keys = back_door.keys();

    // At most one entry per key.
    assert_eq!(keys.iter().unique().count(), keys.len());
    // Every entry owns exactly one backend resource.
    assert_eq!(back_door.backend().usage(), keys.len());
    assert!(keys.len() <= CAPACITY);

    for entry in back_door.entries() {
        assert!(back_door.backend().is_resident(*entry.key()));
        match entry.state() {
            EntryState::Requested | EntryState::Prefetched => assert!(entry.element().is_none()),
            EntryState::Available | EntryState::Released => assert!(entry.element().is_some()),
        }
    }
}

fn run(seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut cache = CacheBuilder::new(RecordingBackend::new(CAPACITY))
        .with_name(format!("fuzzy-{seed}"))
        .with_capacity_hint(CAPACITY)
        .build();

    for _ in 0..STEPS {
        let key = rng.random_range(0..KEYS);
        let before = states(&mut cache);
        let pinned: HashSet<u64> = before
            .iter()
            .filter(|(_, state)| state.is_pinned())
            .map(|(key, _)| *key)
            .collect();

        // Pinned entries that the operation is allowed to remove.
        let mut removable = HashSet::new();

        match rng.random_range(0..100) {
            0..30 => {
                let ok = cache.request(key);
                if before.contains_key(&key) {
                    assert!(ok);
                }
                if ok {
                    assert!(!cache.is_empty());
                    assert!(BackDoor::new(&mut cache).find(&key).is_some());
                }
            }
            30..45 => cache.prefetch(key),
            45..60 => {
                let element = cache.get(&key);
                let state = BackDoor::new(&mut cache).state(&key);
                assert_eq!(element.is_some(), state == Some(EntryState::Available));
            }
            60..80 => {
                removable.insert(key);
                let res = cache.release(&key, false);
                match before.get(&key) {
                    Some(EntryState::Prefetched | EntryState::Released) => {
                        assert!(matches!(res, Err(Error::InvalidRelease { .. })))
                    }
                    _ => assert!(res.is_ok()),
                }
            }
            80..83 => {
                removable.insert(key);
                cache.release(&key, true).unwrap();
                assert!(!cache.is_cached(&key));
            }
            83..99 => {
                cache.backend_mut().complete(key);
            }
            _ => {
                removable.extend(pinned.iter().copied());
                let len = cache.len();
                let unloads = cache.backend().unloads().len();
                cache.clear();
                assert!(cache.is_empty());
                assert_eq!(cache.backend().unloads().len(), unloads + len);
            }
        }

        // Only explicit releases and clears may unpin or remove pinned entries.
        let after = states(&mut cache);
        for key in pinned.difference(&removable) {
            assert!(
                after.get(key).is_some_and(|state| state.is_pinned()),
                "pinned entry {key} ({:?}) was reclaimed",
                before[key]
            );
        }

        check_invariants(&mut cache);
    }
}

#[test_log::test]
fn test_random_operations() {
    for seed in 0..SEEDS {
        run(seed);
    }
}

#[test_log::test]
fn test_pinned_entries_survive_admission() {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut cache = AsyncCache::new(RecordingBackend::new(CAPACITY).with_ready_on_load(true));

    for _ in 0..STEPS {
        let key = rng.random_range(0..KEYS);
        let pinned = states(&mut cache)
            .into_iter()
            .filter(|(_, state)| state.is_pinned())
            .map(|(key, _)| key)
            .collect_vec();

        if rng.random_bool(0.5) {
            cache.request(key);
            cache.get(&key);
        } else {
            cache.prefetch(key);
        }

        // Admission never reclaims pinned entries.
        let after = states(&mut cache);
        for key in pinned {
            assert!(after[&key].is_pinned(), "pinned entry {key} was reclaimed");
        }

        if rng.random_bool(0.3) {
            let _ = cache.release(&key, false);
        }
        check_invariants(&mut cache);
    }
}

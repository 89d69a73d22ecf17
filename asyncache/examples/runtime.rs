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

use std::time::Duration;

use asyncache::{CacheBuilder, RuntimeBackend};
use tokio::runtime::Handle;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter("asyncache=trace").init();

    let backend = RuntimeBackend::new(Handle::current(), 2, |key: u64| async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        format!("element {key}")
    });
    let mut cache = CacheBuilder::new(backend).with_name("demo").build();

    assert!(cache.request(1));
    assert!(cache.request(2));
    assert!(!cache.request(3));

    let element = loop {
        if let Some(element) = cache.get(&1) {
            break element;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    };
    println!("{:?}", cache.backend().value(&element));

    cache.release(&1, false).unwrap();
    assert!(cache.request(3));
    assert!(!cache.is_cached(&1));

    cache.clear();
    assert!(cache.is_empty());
}

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

use std::{fmt::Debug, hash::Hash};

/// Key of a cache entry.
///
/// Keys are compared for equality when looking up entries and hashed by the registry index.
pub trait Key: Hash + Eq + Clone + Debug + 'static {}

impl<T> Key for T where T: Hash + Eq + Clone + Debug + 'static {}

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

use crate::registry::EntryState;

/// Cache error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Only requested or available entries can be released without forcing eviction.
    #[error("invalid release: entry {key} is {state:?}, only requested or available entries can be released")]
    InvalidRelease {
        /// Debug representation of the entry key.
        key: String,
        /// State of the entry when the release was attempted.
        state: EntryState,
    },
}

/// Cache result.
pub type Result<T> = std::result::Result<T, Error>;

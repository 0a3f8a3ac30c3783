// Copyright 2025 eraflo
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

//! The resource barrier and synchronization model.
//!
//! Explicit APIs need to be told when a resource moves from one use to another;
//! implicit APIs work it out themselves. Barriers are declared the same way for
//! both, and each backend decides whether they translate to native barriers or
//! are validated and dropped.

pub mod barrier;
pub mod frame;
pub mod tracker;

pub use self::barrier::*;
pub use self::frame::*;
pub use self::tracker::*;

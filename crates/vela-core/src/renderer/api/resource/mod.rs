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

//! GPU resources: generation-checked handles, their descriptors and the pools
//! backends keep them in.

pub mod buffer;
pub mod handle;
pub mod pool;
pub mod render_target;
pub mod shader;
pub mod texture;

pub use self::buffer::*;
pub use self::handle::*;
pub use self::pool::*;
pub use self::render_target::*;
pub use self::shader::*;
pub use self::texture::*;

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

//! Shader modules. Shader code is opaque to the layer and handed to the
//! backend untouched.

use super::handle::ShaderId;
use crate::renderer::api::util::ShaderStage;
use std::borrow::Cow;

/// The source data for a shader module, in whichever language the backend consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderSource<'a> {
    /// SPIR-V bytecode.
    Spirv(Cow<'a, [u8]>),
    /// WGSL text.
    Wgsl(Cow<'a, str>),
    /// GLSL text.
    Glsl(Cow<'a, str>),
    /// Metal Shading Language text.
    Msl(Cow<'a, str>),
    /// HLSL text.
    Hlsl(Cow<'a, str>),
    /// A backend-specific precompiled blob.
    Binary(Cow<'a, [u8]>),
}

impl ShaderSource<'_> {
    /// The size of the code in bytes.
    pub fn len(&self) -> usize {
        match self {
            ShaderSource::Spirv(bytes) | ShaderSource::Binary(bytes) => bytes.len(),
            ShaderSource::Wgsl(text)
            | ShaderSource::Glsl(text)
            | ShaderSource::Msl(text)
            | ShaderSource::Hlsl(text) => text.len(),
        }
    }

    /// Whether there is no code at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Describes a shader module to be created by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<&'a str>,
    /// The shader code.
    pub source: ShaderSource<'a>,
    /// The stage the module is for.
    pub stage: ShaderStage,
    /// The name of the entry point function.
    pub entry_point: &'a str,
}

/// A handle to a shader module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shader {
    /// The generation-checked key of the module.
    pub id: ShaderId,
    /// The stage the module was created for.
    pub stage: ShaderStage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_length_counts_bytes() {
        assert_eq!(ShaderSource::Wgsl(Cow::Borrowed("fn main() {}")).len(), 12);
        assert!(ShaderSource::Spirv(Cow::Borrowed(&[])).is_empty());
    }
}

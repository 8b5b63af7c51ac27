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

use std::collections::HashMap;

use crate::constants::{gl, GLenum};

/// The value of a queryable context parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    /// A single integer limit.
    Int(i32),
    /// A pair of integers such as `MAX_VIEWPORT_DIMS`.
    IntPair([i32; 2]),
    /// A string such as `VENDOR`.
    Text(String),
}

/// Limits and extensions of a real context, captured when it is bound.
///
/// The facade answers `getParameter` and `getExtension` from this snapshot,
/// so those queries never reach the real context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capabilities {
    parameters: HashMap<GLenum, ParameterValue>,
    extensions: Vec<String>,
}

impl Capabilities {
    /// An empty capability set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The minimum limits every WebGL 1 implementation guarantees.
    pub fn webgl_minimums() -> Self {
        Self::new()
            .with_parameter(gl::MAX_VERTEX_ATTRIBS, ParameterValue::Int(8))
            .with_parameter(gl::MAX_VERTEX_UNIFORM_VECTORS, ParameterValue::Int(128))
            .with_parameter(gl::MAX_FRAGMENT_UNIFORM_VECTORS, ParameterValue::Int(16))
            .with_parameter(gl::MAX_VARYING_VECTORS, ParameterValue::Int(8))
            .with_parameter(gl::MAX_TEXTURE_SIZE, ParameterValue::Int(64))
            .with_parameter(gl::MAX_RENDERBUFFER_SIZE, ParameterValue::Int(1))
            .with_parameter(gl::MAX_TEXTURE_IMAGE_UNITS, ParameterValue::Int(8))
            .with_parameter(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, ParameterValue::Int(8))
    }

    /// Sets a parameter, replacing any previous value.
    #[must_use]
    pub fn with_parameter(mut self, pname: GLenum, value: ParameterValue) -> Self {
        self.parameters.insert(pname, value);
        self
    }

    /// Adds a supported extension.
    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.extensions.contains(&name) {
            self.extensions.push(name);
        }
        self
    }

    /// Looks up a parameter.
    pub fn parameter(&self, pname: GLenum) -> Option<&ParameterValue> {
        self.parameters.get(&pname)
    }

    /// Looks up an integer parameter.
    pub fn int_parameter(&self, pname: GLenum) -> Option<i32> {
        match self.parameters.get(&pname) {
            Some(ParameterValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// Whether the named extension is supported.
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| ext == name)
    }

    /// Supported extensions, in the order they were reported.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimums_include_vertex_attribs() {
        let caps = Capabilities::webgl_minimums();
        assert_eq!(caps.int_parameter(gl::MAX_VERTEX_ATTRIBS), Some(8));
        assert_eq!(caps.parameter(gl::VENDOR), None);
    }

    #[test]
    fn extensions_are_deduplicated() {
        let caps = Capabilities::new()
            .with_extension("OES_element_index_uint")
            .with_extension("OES_element_index_uint");
        assert_eq!(caps.extensions().len(), 1);
        assert!(caps.has_extension("OES_element_index_uint"));
        assert!(!caps.has_extension("WEBGL_depth_texture"));
    }

    #[test]
    fn non_int_parameter_is_not_an_int() {
        let caps =
            Capabilities::new().with_parameter(gl::MAX_VIEWPORT_DIMS, ParameterValue::IntPair([4096, 4096]));
        assert_eq!(caps.int_parameter(gl::MAX_VIEWPORT_DIMS), None);
    }
}

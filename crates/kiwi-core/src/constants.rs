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

//! The GL constants table.
//!
//! Constants are pass-through data: the core never interprets them beyond
//! forwarding them to the bound context. The table is generated once, together
//! with the typed constants in [`gl`], and shared read-only by every facade.

/// Raw GL enumerant.
pub type GLenum = u32;

/// Declares the typed constants and the matching static lookup table.
macro_rules! kiwi_gl_constants {
    (
        $(#[$attr:meta])*
        $vis:vis static $table:ident;
        $(
            $(#[$const_attr:meta])*
            const $name:ident = $value:expr;
        )*
    ) => {
        /// Typed GL constants, usable directly in facade calls.
        #[allow(missing_docs)]
        pub mod gl {
            use super::GLenum;
            $(
                $(#[$const_attr])*
                pub const $name: GLenum = $value;
            )*
        }

        $(#[$attr])*
        $vis static $table: Constants = Constants {
            entries: &[
                $( (stringify!($name), $value), )*
            ],
        };
    };
}

/// An immutable mapping from symbolic GL names to their numeric values.
#[derive(Debug)]
pub struct Constants {
    entries: &'static [(&'static str, GLenum)],
}

impl Constants {
    /// Looks up the value of a symbolic name such as `"TRIANGLES"`.
    pub fn get(&self, name: &str) -> Option<GLenum> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, value)| *value)
    }

    /// Returns the first symbolic name carrying `value`.
    ///
    /// Several GL names share a value (`NONE`, `POINTS`, `ZERO`), so this is
    /// only meant for diagnostics.
    pub fn name_of(&self, value: GLenum) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| *name)
    }

    /// Iterates over every `(name, value)` pair in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, GLenum)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

kiwi_gl_constants! {
    /// The shared WebGL 1 constants table.
    pub static GL;

    // Primitive modes
    const POINTS = 0x0000;
    const LINES = 0x0001;
    const LINE_LOOP = 0x0002;
    const LINE_STRIP = 0x0003;
    const TRIANGLES = 0x0004;
    const TRIANGLE_STRIP = 0x0005;
    const TRIANGLE_FAN = 0x0006;

    // Clear mask bits
    const DEPTH_BUFFER_BIT = 0x0100;
    const STENCIL_BUFFER_BIT = 0x0400;
    const COLOR_BUFFER_BIT = 0x4000;

    // Data types
    const BYTE = 0x1400;
    const UNSIGNED_BYTE = 0x1401;
    const SHORT = 0x1402;
    const UNSIGNED_SHORT = 0x1403;
    const INT = 0x1404;
    const UNSIGNED_INT = 0x1405;
    const FLOAT = 0x1406;

    // Buffers
    const ARRAY_BUFFER = 0x8892;
    const ELEMENT_ARRAY_BUFFER = 0x8893;
    const STREAM_DRAW = 0x88E0;
    const STATIC_DRAW = 0x88E4;
    const DYNAMIC_DRAW = 0x88E8;

    // Shaders and programs
    const FRAGMENT_SHADER = 0x8B30;
    const VERTEX_SHADER = 0x8B31;
    const COMPILE_STATUS = 0x8B81;
    const LINK_STATUS = 0x8B82;
    const ACTIVE_UNIFORMS = 0x8B86;
    const ACTIVE_ATTRIBUTES = 0x8B89;

    // Errors
    const NO_ERROR = 0x0000;
    const INVALID_ENUM = 0x0500;
    const INVALID_VALUE = 0x0501;
    const INVALID_OPERATION = 0x0502;
    const OUT_OF_MEMORY = 0x0505;
    const CONTEXT_LOST_WEBGL = 0x9242;

    // Limits and strings
    const MAX_TEXTURE_SIZE = 0x0D33;
    const MAX_VIEWPORT_DIMS = 0x0D3A;
    const VENDOR = 0x1F00;
    const RENDERER = 0x1F01;
    const VERSION = 0x1F02;
    const MAX_RENDERBUFFER_SIZE = 0x84E8;
    const MAX_VERTEX_ATTRIBS = 0x8869;
    const MAX_TEXTURE_IMAGE_UNITS = 0x8872;
    const MAX_COMBINED_TEXTURE_IMAGE_UNITS = 0x8B4D;
    const SHADING_LANGUAGE_VERSION = 0x8B8C;
    const MAX_VERTEX_UNIFORM_VECTORS = 0x8DFB;
    const MAX_VARYING_VECTORS = 0x8DFC;
    const MAX_FRAGMENT_UNIFORM_VECTORS = 0x8DFD;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_constants_match_table() {
        assert_eq!(GL.get("TRIANGLES"), Some(gl::TRIANGLES));
        assert_eq!(GL.get("VERTEX_SHADER"), Some(0x8B31));
        assert_eq!(GL.get("FLOAT"), Some(gl::FLOAT));
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(GL.get("NOT_A_CONSTANT"), None);
    }

    #[test]
    fn name_of_returns_first_declared_alias() {
        assert_eq!(GL.name_of(gl::ARRAY_BUFFER), Some("ARRAY_BUFFER"));
        assert_eq!(GL.name_of(0x0000), Some("POINTS"));
    }

    #[test]
    fn table_preserves_declaration_order() {
        let first: Vec<_> = GL.iter().take(2).map(|(name, _)| name).collect();
        assert_eq!(first, vec!["POINTS", "LINES"]);
        assert!(!GL.is_empty());
    }
}

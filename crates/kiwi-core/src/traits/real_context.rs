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

use std::fmt::{self, Debug};

use crate::constants::GLenum;
use crate::context::Capabilities;
use crate::error::ContextError;

/// The name a real context gave to one of its objects.
///
/// Only meaningful for the context that produced it. The actuator never lets
/// one escape the binding it was created under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RealName(pub u32);

impl fmt::Display for RealName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gl:{}", self.0)
    }
}

/// A concrete GL execution context.
///
/// Calls mirror the GL entry points one to one. Every call may fail with a
/// [`ContextError`]; a context that has been lost answers every call with
/// [`ContextError::ContextLost`].
pub trait RealContext: Debug + Send {
    /// The limits and extensions of this context.
    ///
    /// Read once when the context is bound.
    fn capabilities(&mut self) -> Result<Capabilities, ContextError>;

    /// Creates a shader object of `shader_type`.
    /// ## Errors
    /// * `InvalidEnum` - If `shader_type` is neither a vertex nor a fragment shader.
    fn create_shader(&mut self, shader_type: GLenum) -> Result<RealName, ContextError>;

    /// Replaces the source of a shader.
    fn shader_source(&mut self, shader: RealName, source: &str) -> Result<(), ContextError>;

    /// Compiles a shader.
    /// ## Errors
    /// * `CompileFailed` - With the info log if compilation fails.
    fn compile_shader(&mut self, shader: RealName) -> Result<(), ContextError>;

    /// Creates a program object.
    fn create_program(&mut self) -> Result<RealName, ContextError>;

    /// Attaches a shader to a program.
    fn attach_shader(&mut self, program: RealName, shader: RealName) -> Result<(), ContextError>;

    /// Links a program.
    /// ## Errors
    /// * `LinkFailed` - With the info log if linking fails.
    fn link_program(&mut self, program: RealName) -> Result<(), ContextError>;

    /// Location of a vertex attribute, `-1` if the program has none by that name.
    fn get_attrib_location(&mut self, program: RealName, name: &str) -> Result<i32, ContextError>;

    /// Location of a uniform, `None` if the program has none by that name.
    fn get_uniform_location(
        &mut self,
        program: RealName,
        name: &str,
    ) -> Result<Option<i32>, ContextError>;

    /// Creates a buffer object.
    fn create_buffer(&mut self) -> Result<RealName, ContextError>;

    /// Binds `buffer` to `target`, or unbinds the target when `None`.
    fn bind_buffer(&mut self, target: GLenum, buffer: Option<RealName>) -> Result<(), ContextError>;

    /// Uploads `data` into the buffer bound to `target`.
    fn buffer_data(&mut self, target: GLenum, data: &[u8], usage: GLenum)
        -> Result<(), ContextError>;

    /// Sets the viewport rectangle.
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<(), ContextError>;

    /// Sets the clear color.
    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32)
        -> Result<(), ContextError>;

    /// Clears the buffers selected by `mask`.
    fn clear(&mut self, mask: GLenum) -> Result<(), ContextError>;

    /// Installs a program, or none.
    fn use_program(&mut self, program: Option<RealName>) -> Result<(), ContextError>;

    /// Enables a vertex attribute array.
    fn enable_vertex_attrib_array(&mut self, index: u32) -> Result<(), ContextError>;

    /// Describes the layout of a vertex attribute in the bound array buffer.
    fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        data_type: GLenum,
        normalized: bool,
        stride: i32,
        offset: i64,
    ) -> Result<(), ContextError>;

    /// Sets a float uniform of the current program. `values` holds one to four
    /// components.
    fn uniform(&mut self, location: i32, values: &[f32]) -> Result<(), ContextError>;

    /// Draws non-indexed primitives.
    fn draw_arrays(&mut self, mode: GLenum, first: i32, count: i32) -> Result<(), ContextError>;

    /// Draws indexed primitives from the bound element array buffer.
    fn draw_elements(
        &mut self,
        mode: GLenum,
        count: i32,
        index_type: GLenum,
        offset: i64,
    ) -> Result<(), ContextError>;
}

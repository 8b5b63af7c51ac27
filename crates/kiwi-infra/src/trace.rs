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

//! A context wrapper that journals every call it forwards.

use std::sync::{Arc, Mutex};

use kiwi_core::{Capabilities, ContextError, GLenum, RealContext, RealName};

/// One call received by a [`TraceContext`], with its arguments.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Call {
    Capabilities,
    CreateShader { shader_type: GLenum },
    ShaderSource { shader: RealName, source: String },
    CompileShader { shader: RealName },
    CreateProgram,
    AttachShader { program: RealName, shader: RealName },
    LinkProgram { program: RealName },
    GetAttribLocation { program: RealName, name: String },
    GetUniformLocation { program: RealName, name: String },
    CreateBuffer,
    BindBuffer { target: GLenum, buffer: Option<RealName> },
    BufferData { target: GLenum, len: usize, usage: GLenum },
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    ClearColor { color: [f32; 4] },
    Clear { mask: GLenum },
    UseProgram { program: Option<RealName> },
    EnableVertexAttribArray { index: u32 },
    VertexAttribPointer {
        index: u32,
        size: i32,
        data_type: GLenum,
        normalized: bool,
        stride: i32,
        offset: i64,
    },
    Uniform { location: i32, values: Vec<f32> },
    DrawArrays { mode: GLenum, first: i32, count: i32 },
    DrawElements { mode: GLenum, count: i32, index_type: GLenum, offset: i64 },
}

impl Call {
    /// The GL entry point name.
    pub fn name(&self) -> &'static str {
        match self {
            Call::Capabilities => "getParameter",
            Call::CreateShader { .. } => "createShader",
            Call::ShaderSource { .. } => "shaderSource",
            Call::CompileShader { .. } => "compileShader",
            Call::CreateProgram => "createProgram",
            Call::AttachShader { .. } => "attachShader",
            Call::LinkProgram { .. } => "linkProgram",
            Call::GetAttribLocation { .. } => "getAttribLocation",
            Call::GetUniformLocation { .. } => "getUniformLocation",
            Call::CreateBuffer => "createBuffer",
            Call::BindBuffer { .. } => "bindBuffer",
            Call::BufferData { .. } => "bufferData",
            Call::Viewport { .. } => "viewport",
            Call::ClearColor { .. } => "clearColor",
            Call::Clear { .. } => "clear",
            Call::UseProgram { .. } => "useProgram",
            Call::EnableVertexAttribArray { .. } => "enableVertexAttribArray",
            Call::VertexAttribPointer { .. } => "vertexAttribPointer",
            Call::Uniform { .. } => "uniform",
            Call::DrawArrays { .. } => "drawArrays",
            Call::DrawElements { .. } => "drawElements",
        }
    }
}

/// The journal a [`TraceContext`] appends to. Cloning shares it.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    /// An empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: Call) {
        log::trace!("traced {}", call.name());
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    /// A copy of every call so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// The entry point names of every call so far.
    pub fn names(&self) -> Vec<&'static str> {
        self.calls
            .lock()
            .map(|calls| calls.iter().map(Call::name).collect())
            .unwrap_or_default()
    }

    /// Number of calls so far.
    pub fn len(&self) -> usize {
        self.calls.lock().map_or(0, |calls| calls.len())
    }

    /// Returns `true` if nothing was called.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of calls for which `predicate` holds.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls
            .lock()
            .map_or(0, |calls| calls.iter().filter(|call| predicate(call)).count())
    }

    /// Forgets every call so far.
    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }
}

/// Wraps a context and journals each call before forwarding it.
///
/// The journal survives the wrapper, so a test can keep a [`CallLog`] while
/// the context itself is boxed and handed to an actuator.
#[derive(Debug)]
pub struct TraceContext<C> {
    inner: C,
    log: CallLog,
}

impl<C: RealContext> TraceContext<C> {
    /// Wraps `inner`, journaling into a fresh log.
    pub fn new(inner: C) -> Self {
        Self::with_log(inner, CallLog::new())
    }

    /// Wraps `inner`, journaling into `log`.
    pub fn with_log(inner: C, log: CallLog) -> Self {
        Self { inner, log }
    }

    /// A handle on the journal.
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// The wrapped context.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// The wrapped context, mutably.
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: RealContext> RealContext for TraceContext<C> {
    fn capabilities(&mut self) -> Result<Capabilities, ContextError> {
        self.log.push(Call::Capabilities);
        self.inner.capabilities()
    }

    fn create_shader(&mut self, shader_type: GLenum) -> Result<RealName, ContextError> {
        self.log.push(Call::CreateShader { shader_type });
        self.inner.create_shader(shader_type)
    }

    fn shader_source(&mut self, shader: RealName, source: &str) -> Result<(), ContextError> {
        self.log.push(Call::ShaderSource {
            shader,
            source: source.to_string(),
        });
        self.inner.shader_source(shader, source)
    }

    fn compile_shader(&mut self, shader: RealName) -> Result<(), ContextError> {
        self.log.push(Call::CompileShader { shader });
        self.inner.compile_shader(shader)
    }

    fn create_program(&mut self) -> Result<RealName, ContextError> {
        self.log.push(Call::CreateProgram);
        self.inner.create_program()
    }

    fn attach_shader(&mut self, program: RealName, shader: RealName) -> Result<(), ContextError> {
        self.log.push(Call::AttachShader { program, shader });
        self.inner.attach_shader(program, shader)
    }

    fn link_program(&mut self, program: RealName) -> Result<(), ContextError> {
        self.log.push(Call::LinkProgram { program });
        self.inner.link_program(program)
    }

    fn get_attrib_location(&mut self, program: RealName, name: &str) -> Result<i32, ContextError> {
        self.log.push(Call::GetAttribLocation {
            program,
            name: name.to_string(),
        });
        self.inner.get_attrib_location(program, name)
    }

    fn get_uniform_location(
        &mut self,
        program: RealName,
        name: &str,
    ) -> Result<Option<i32>, ContextError> {
        self.log.push(Call::GetUniformLocation {
            program,
            name: name.to_string(),
        });
        self.inner.get_uniform_location(program, name)
    }

    fn create_buffer(&mut self) -> Result<RealName, ContextError> {
        self.log.push(Call::CreateBuffer);
        self.inner.create_buffer()
    }

    fn bind_buffer(&mut self, target: GLenum, buffer: Option<RealName>) -> Result<(), ContextError> {
        self.log.push(Call::BindBuffer { target, buffer });
        self.inner.bind_buffer(target, buffer)
    }

    fn buffer_data(&mut self, target: GLenum, data: &[u8], usage: GLenum) -> Result<(), ContextError> {
        self.log.push(Call::BufferData {
            target,
            len: data.len(),
            usage,
        });
        self.inner.buffer_data(target, data, usage)
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<(), ContextError> {
        self.log.push(Call::Viewport {
            x,
            y,
            width,
            height,
        });
        self.inner.viewport(x, y, width, height)
    }

    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) -> Result<(), ContextError> {
        self.log.push(Call::ClearColor {
            color: [red, green, blue, alpha],
        });
        self.inner.clear_color(red, green, blue, alpha)
    }

    fn clear(&mut self, mask: GLenum) -> Result<(), ContextError> {
        self.log.push(Call::Clear { mask });
        self.inner.clear(mask)
    }

    fn use_program(&mut self, program: Option<RealName>) -> Result<(), ContextError> {
        self.log.push(Call::UseProgram { program });
        self.inner.use_program(program)
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) -> Result<(), ContextError> {
        self.log.push(Call::EnableVertexAttribArray { index });
        self.inner.enable_vertex_attrib_array(index)
    }

    fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        data_type: GLenum,
        normalized: bool,
        stride: i32,
        offset: i64,
    ) -> Result<(), ContextError> {
        self.log.push(Call::VertexAttribPointer {
            index,
            size,
            data_type,
            normalized,
            stride,
            offset,
        });
        self.inner
            .vertex_attrib_pointer(index, size, data_type, normalized, stride, offset)
    }

    fn uniform(&mut self, location: i32, values: &[f32]) -> Result<(), ContextError> {
        self.log.push(Call::Uniform {
            location,
            values: values.to_vec(),
        });
        self.inner.uniform(location, values)
    }

    fn draw_arrays(&mut self, mode: GLenum, first: i32, count: i32) -> Result<(), ContextError> {
        self.log.push(Call::DrawArrays { mode, first, count });
        self.inner.draw_arrays(mode, first, count)
    }

    fn draw_elements(
        &mut self,
        mode: GLenum,
        count: i32,
        index_type: GLenum,
        offset: i64,
    ) -> Result<(), ContextError> {
        self.log.push(Call::DrawElements {
            mode,
            count,
            index_type,
            offset,
        });
        self.inner.draw_elements(mode, count, index_type, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeadlessContext;
    use kiwi_core::gl;

    #[test]
    fn calls_are_journaled_and_forwarded() {
        let mut context = TraceContext::new(HeadlessContext::new());
        let log = context.log();

        let buffer = context.create_buffer().unwrap();
        context.bind_buffer(gl::ARRAY_BUFFER, Some(buffer)).unwrap();
        assert!(context.clear(0xFFFF_FFFF).is_err());

        assert_eq!(log.names(), vec!["createBuffer", "bindBuffer", "clear"]);
        assert_eq!(context.inner().bound_buffer(gl::ARRAY_BUFFER), Some(buffer));
    }

    #[test]
    fn log_outlives_the_context() {
        let log = CallLog::new();
        {
            let mut context = TraceContext::with_log(HeadlessContext::new(), log.clone());
            context.viewport(0, 0, 800, 600).unwrap();
        }
        assert_eq!(
            log.calls(),
            vec![Call::Viewport {
                x: 0,
                y: 0,
                width: 800,
                height: 600
            }]
        );
        assert_eq!(log.count(|call| matches!(call, Call::Viewport { .. })), 1);
        log.clear();
        assert!(log.is_empty());
    }
}

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

//! A software GL context with no rasterizer.
//!
//! Keeps shader, program and buffer objects in memory and applies the GL
//! error rules to every call. Useful wherever a real driver is unavailable:
//! tests, servers, and recovery drills that need a context to lose.

mod objects;

pub use self::objects::DrawCall;

use ahash::AHashMap;
use kiwi_core::glsl;
use kiwi_core::{
    gl, Capabilities, ContextError, GLenum, ParameterValue, RealContext, RealName, ShaderStage,
};

use self::objects::{AttribPointer, ProgramObject, ShaderObject, VertexAttrib};

fn type_size(data_type: GLenum) -> Option<usize> {
    match data_type {
        gl::BYTE | gl::UNSIGNED_BYTE => Some(1),
        gl::SHORT | gl::UNSIGNED_SHORT => Some(2),
        gl::INT | gl::UNSIGNED_INT | gl::FLOAT => Some(4),
        _ => None,
    }
}

fn invalid_operation(op: &'static str, reason: impl Into<String>) -> ContextError {
    ContextError::InvalidOperation {
        op,
        reason: reason.into(),
    }
}

fn invalid_value(op: &'static str, reason: impl Into<String>) -> ContextError {
    ContextError::InvalidValue {
        op,
        reason: reason.into(),
    }
}

/// An in-memory GL context.
#[derive(Debug)]
pub struct HeadlessContext {
    capabilities: Capabilities,
    next_name: u32,
    shaders: AHashMap<RealName, ShaderObject>,
    programs: AHashMap<RealName, ProgramObject>,
    buffers: AHashMap<RealName, Vec<u8>>,
    bound_buffers: AHashMap<GLenum, RealName>,
    current_program: Option<RealName>,
    attribs: Vec<VertexAttrib>,
    uniforms: AHashMap<(RealName, i32), Vec<f32>>,
    viewport: [i32; 4],
    clear_color: [f32; 4],
    clears: u32,
    draws: Vec<DrawCall>,
    lost: bool,
    max_buffers: Option<usize>,
}

impl Default for HeadlessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessContext {
    /// A context reporting the WebGL 1 minimum limits.
    pub fn new() -> Self {
        let capabilities = Capabilities::webgl_minimums()
            .with_parameter(gl::MAX_VIEWPORT_DIMS, ParameterValue::IntPair([4096, 4096]))
            .with_parameter(gl::VENDOR, ParameterValue::Text("kiwi".into()))
            .with_parameter(gl::RENDERER, ParameterValue::Text("kiwi headless".into()))
            .with_parameter(gl::VERSION, ParameterValue::Text("WebGL 1.0 (kiwi headless)".into()))
            .with_extension("OES_element_index_uint");
        Self::with_capabilities(capabilities)
    }

    /// A context reporting the given capabilities.
    ///
    /// `MAX_VERTEX_ATTRIBS` decides how many attribute slots exist.
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        let max_attribs = capabilities
            .int_parameter(gl::MAX_VERTEX_ATTRIBS)
            .and_then(|max| usize::try_from(max).ok())
            .unwrap_or(8);
        Self {
            capabilities,
            next_name: 1,
            shaders: AHashMap::new(),
            programs: AHashMap::new(),
            buffers: AHashMap::new(),
            bound_buffers: AHashMap::new(),
            current_program: None,
            attribs: vec![VertexAttrib::default(); max_attribs],
            uniforms: AHashMap::new(),
            viewport: [0; 4],
            clear_color: [0.0; 4],
            clears: 0,
            draws: Vec::new(),
            lost: false,
            max_buffers: None,
        }
    }

    /// Simulates a lost context. Every later call fails with
    /// [`ContextError::ContextLost`].
    pub fn lose_context(&mut self) {
        log::debug!("headless context lost");
        self.lost = true;
    }

    /// Caps the number of buffer objects; `createBuffer` fails once `max`
    /// buffers exist, the way a driver out of memory would.
    #[must_use]
    pub fn with_buffer_limit(mut self, max: usize) -> Self {
        self.max_buffers = Some(max);
        self
    }

    /// Whether [`HeadlessContext::lose_context`] was called.
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Draws accepted so far, in order.
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Number of accepted `clear` calls.
    pub fn clear_count(&self) -> u32 {
        self.clears
    }

    /// The current viewport as `[x, y, width, height]`.
    pub fn viewport(&self) -> [i32; 4] {
        self.viewport
    }

    /// The current clear color.
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// The bytes stored in a buffer.
    pub fn buffer_contents(&self, buffer: RealName) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    /// The buffer bound to `target`.
    pub fn bound_buffer(&self, target: GLenum) -> Option<RealName> {
        self.bound_buffers.get(&target).copied()
    }

    /// The program in use.
    pub fn current_program(&self) -> Option<RealName> {
        self.current_program
    }

    /// Whether `program` exists and linked successfully.
    pub fn is_linked(&self, program: RealName) -> bool {
        self.programs.get(&program).is_some_and(|p| p.linked)
    }

    /// The last value set for a uniform location of `program`.
    pub fn uniform_value(&self, program: RealName, location: i32) -> Option<&[f32]> {
        self.uniforms.get(&(program, location)).map(Vec::as_slice)
    }

    /// Number of live shader, program and buffer objects.
    pub fn object_count(&self) -> usize {
        self.shaders.len() + self.programs.len() + self.buffers.len()
    }

    fn live(&self) -> Result<(), ContextError> {
        if self.lost {
            Err(ContextError::ContextLost)
        } else {
            Ok(())
        }
    }

    fn allocate(&mut self) -> RealName {
        let name = RealName(self.next_name);
        self.next_name += 1;
        name
    }

    fn shader_mut(&mut self, op: &'static str, shader: RealName) -> Result<&mut ShaderObject, ContextError> {
        self.shaders
            .get_mut(&shader)
            .ok_or_else(|| invalid_value(op, format!("{shader} is not a shader")))
    }

    fn linked_program(&self, op: &'static str, program: RealName) -> Result<&ProgramObject, ContextError> {
        match self.programs.get(&program) {
            Some(object) if object.linked => Ok(object),
            Some(_) => Err(invalid_operation(op, format!("{program} is not linked"))),
            None => Err(invalid_value(op, format!("{program} is not a program"))),
        }
    }

    fn check_buffer_target(op: &'static str, target: GLenum) -> Result<(), ContextError> {
        match target {
            gl::ARRAY_BUFFER | gl::ELEMENT_ARRAY_BUFFER => Ok(()),
            value => Err(ContextError::InvalidEnum { op, value }),
        }
    }

    fn check_mode(op: &'static str, mode: GLenum) -> Result<(), ContextError> {
        if mode <= gl::TRIANGLE_FAN {
            Ok(())
        } else {
            Err(ContextError::InvalidEnum { op, value: mode })
        }
    }

    /// The program a draw would use.
    fn draw_program(&self, op: &'static str) -> Result<RealName, ContextError> {
        let program = self
            .current_program
            .ok_or_else(|| invalid_operation(op, "no program in use"))?;
        self.linked_program(op, program)?;
        Ok(program)
    }

    /// Checks that every enabled attribute can read `vertices` vertices.
    fn check_attribs(&self, op: &'static str, vertices: usize) -> Result<(), ContextError> {
        if vertices == 0 {
            return Ok(());
        }
        for (index, attrib) in self.attribs.iter().enumerate() {
            if !attrib.enabled {
                continue;
            }
            let pointer = attrib.pointer.ok_or_else(|| {
                invalid_operation(op, format!("attribute {index} is enabled without a pointer"))
            })?;
            let element = type_size(pointer.data_type).unwrap_or(4) * pointer.size as usize;
            let stride = if pointer.stride == 0 {
                element
            } else {
                pointer.stride as usize
            };
            let needed = (vertices - 1)
                .checked_mul(stride)
                .and_then(|span| span.checked_add(element))
                .and_then(|span| span.checked_add(pointer.offset as usize))
                .ok_or_else(|| invalid_value(op, format!("attribute {index} range overflows")))?;
            let available = self.buffers.get(&pointer.buffer).map_or(0, Vec::len);
            if needed > available {
                return Err(invalid_operation(
                    op,
                    format!("attribute {index} reads {needed} bytes from a {available}-byte buffer"),
                ));
            }
        }
        Ok(())
    }

    /// Highest index referenced by an indexed draw.
    fn max_index(
        &self,
        op: &'static str,
        count: usize,
        index_type: GLenum,
        offset: usize,
    ) -> Result<Option<u32>, ContextError> {
        let buffer = self
            .bound_buffers
            .get(&gl::ELEMENT_ARRAY_BUFFER)
            .ok_or_else(|| invalid_operation(op, "no element array buffer bound"))?;
        let bytes = self.buffers.get(buffer).map_or(&[][..], Vec::as_slice);

        let size = match index_type {
            gl::UNSIGNED_BYTE | gl::UNSIGNED_SHORT => type_size(index_type).unwrap_or(1),
            gl::UNSIGNED_INT if self.capabilities.has_extension("OES_element_index_uint") => 4,
            value => return Err(ContextError::InvalidEnum { op, value }),
        };
        if offset % size != 0 {
            return Err(invalid_operation(op, "offset is not a multiple of the index size"));
        }
        let end = count
            .checked_mul(size)
            .and_then(|len| len.checked_add(offset))
            .ok_or_else(|| invalid_value(op, "index range overflows"))?;
        let indices = bytes.get(offset..end).ok_or_else(|| {
            invalid_operation(
                op,
                format!("{count} indices at offset {offset} overflow a {}-byte buffer", bytes.len()),
            )
        })?;

        Ok(indices
            .chunks_exact(size)
            .map(|chunk| match size {
                1 => u32::from(chunk[0]),
                2 => u32::from(bytemuck::pod_read_unaligned::<u16>(chunk)),
                _ => bytemuck::pod_read_unaligned::<u32>(chunk),
            })
            .max())
    }
}

impl RealContext for HeadlessContext {
    fn capabilities(&mut self) -> Result<Capabilities, ContextError> {
        self.live()?;
        Ok(self.capabilities.clone())
    }

    fn create_shader(&mut self, shader_type: GLenum) -> Result<RealName, ContextError> {
        self.live()?;
        let stage = ShaderStage::from_gl(shader_type).ok_or(ContextError::InvalidEnum {
            op: "createShader",
            value: shader_type,
        })?;
        let name = self.allocate();
        self.shaders.insert(
            name,
            ShaderObject {
                stage,
                source: String::new(),
                compiled: false,
            },
        );
        Ok(name)
    }

    fn shader_source(&mut self, shader: RealName, source: &str) -> Result<(), ContextError> {
        self.live()?;
        self.shader_mut("shaderSource", shader)?.source = source.to_string();
        Ok(())
    }

    fn compile_shader(&mut self, shader: RealName) -> Result<(), ContextError> {
        self.live()?;
        let object = self.shader_mut("compileShader", shader)?;
        object.compiled = false;
        if !glsl::has_entry_point(&object.source) {
            return Err(ContextError::CompileFailed {
                log: "ERROR: 'main' : function not defined".into(),
            });
        }
        if !glsl::braces_balanced(&object.source) {
            return Err(ContextError::CompileFailed {
                log: "ERROR: unbalanced braces".into(),
            });
        }
        object.compiled = true;
        Ok(())
    }

    fn create_program(&mut self) -> Result<RealName, ContextError> {
        self.live()?;
        let name = self.allocate();
        self.programs.insert(name, ProgramObject::default());
        Ok(name)
    }

    fn attach_shader(&mut self, program: RealName, shader: RealName) -> Result<(), ContextError> {
        self.live()?;
        let op = "attachShader";
        let stage = self
            .shaders
            .get(&shader)
            .map(|object| object.stage)
            .ok_or_else(|| invalid_value(op, format!("{shader} is not a shader")))?;
        let shaders = &self.shaders;
        let object = self
            .programs
            .get_mut(&program)
            .ok_or_else(|| invalid_value(op, format!("{program} is not a program")))?;
        if object.shaders.contains(&shader) {
            return Err(invalid_operation(op, format!("{shader} is already attached")));
        }
        if object
            .shaders
            .iter()
            .any(|attached| shaders.get(attached).is_some_and(|s| s.stage == stage))
        {
            return Err(invalid_operation(op, format!("a {stage:?} shader is already attached")));
        }
        object.shaders.push(shader);
        Ok(())
    }

    fn link_program(&mut self, program: RealName) -> Result<(), ContextError> {
        self.live()?;
        let max_attribs = self.attribs.len();
        let shaders = &self.shaders;
        let object = self
            .programs
            .get_mut(&program)
            .ok_or_else(|| invalid_value("linkProgram", format!("{program} is not a program")))?;
        object.linked = false;

        let attached: Vec<&ShaderObject> = object
            .shaders
            .iter()
            .filter_map(|name| shaders.get(name))
            .collect();
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            match attached.iter().find(|shader| shader.stage == stage) {
                Some(shader) if shader.compiled => {}
                Some(_) => {
                    return Err(ContextError::LinkFailed {
                        log: format!("the {stage:?} shader is not compiled"),
                    })
                }
                None => {
                    return Err(ContextError::LinkFailed {
                        log: format!("missing {stage:?} shader"),
                    })
                }
            }
        }

        let mut declarations = glsl::Declarations::default();
        for shader in &attached {
            declarations.merge(glsl::scan(&shader.source, shader.stage));
        }
        if declarations.attributes.len() > max_attribs {
            return Err(ContextError::LinkFailed {
                log: format!(
                    "{} attributes exceed MAX_VERTEX_ATTRIBS ({max_attribs})",
                    declarations.attributes.len()
                ),
            });
        }
        object.declarations = declarations;
        object.linked = true;
        Ok(())
    }

    fn get_attrib_location(&mut self, program: RealName, name: &str) -> Result<i32, ContextError> {
        self.live()?;
        let object = self.linked_program("getAttribLocation", program)?;
        Ok(object
            .declarations
            .attributes
            .iter()
            .position(|attribute| attribute == name)
            .map_or(-1, |index| index as i32))
    }

    fn get_uniform_location(
        &mut self,
        program: RealName,
        name: &str,
    ) -> Result<Option<i32>, ContextError> {
        self.live()?;
        let object = self.linked_program("getUniformLocation", program)?;
        Ok(object
            .declarations
            .uniforms
            .iter()
            .position(|uniform| uniform == name)
            .map(|index| index as i32))
    }

    fn create_buffer(&mut self) -> Result<RealName, ContextError> {
        self.live()?;
        if self.max_buffers.is_some_and(|max| self.buffers.len() >= max) {
            return Err(invalid_operation("createBuffer", "buffer limit reached"));
        }
        let name = self.allocate();
        self.buffers.insert(name, Vec::new());
        Ok(name)
    }

    fn bind_buffer(&mut self, target: GLenum, buffer: Option<RealName>) -> Result<(), ContextError> {
        self.live()?;
        Self::check_buffer_target("bindBuffer", target)?;
        match buffer {
            Some(name) if !self.buffers.contains_key(&name) => Err(invalid_operation(
                "bindBuffer",
                format!("{name} is not a buffer"),
            )),
            Some(name) => {
                self.bound_buffers.insert(target, name);
                Ok(())
            }
            None => {
                self.bound_buffers.remove(&target);
                Ok(())
            }
        }
    }

    fn buffer_data(&mut self, target: GLenum, data: &[u8], usage: GLenum) -> Result<(), ContextError> {
        self.live()?;
        let op = "bufferData";
        Self::check_buffer_target(op, target)?;
        if !matches!(usage, gl::STATIC_DRAW | gl::DYNAMIC_DRAW | gl::STREAM_DRAW) {
            return Err(ContextError::InvalidEnum { op, value: usage });
        }
        let buffer = self
            .bound_buffers
            .get(&target)
            .ok_or_else(|| invalid_operation(op, "no buffer bound to the target"))?;
        if let Some(store) = self.buffers.get_mut(buffer) {
            store.clear();
            store.extend_from_slice(data);
        }
        Ok(())
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<(), ContextError> {
        self.live()?;
        if width < 0 || height < 0 {
            return Err(invalid_value("viewport", "negative width or height"));
        }
        self.viewport = [x, y, width, height];
        Ok(())
    }

    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) -> Result<(), ContextError> {
        self.live()?;
        self.clear_color = [red, green, blue, alpha].map(|c| c.clamp(0.0, 1.0));
        Ok(())
    }

    fn clear(&mut self, mask: GLenum) -> Result<(), ContextError> {
        self.live()?;
        let known = gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT;
        if mask & !known != 0 {
            return Err(invalid_value("clear", format!("unknown bits in mask 0x{mask:04X}")));
        }
        self.clears += 1;
        Ok(())
    }

    fn use_program(&mut self, program: Option<RealName>) -> Result<(), ContextError> {
        self.live()?;
        if let Some(name) = program {
            self.linked_program("useProgram", name)?;
        }
        self.current_program = program;
        Ok(())
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) -> Result<(), ContextError> {
        self.live()?;
        let attrib = self
            .attribs
            .get_mut(index as usize)
            .ok_or_else(|| invalid_value("enableVertexAttribArray", format!("index {index} out of range")))?;
        attrib.enabled = true;
        Ok(())
    }

    fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        data_type: GLenum,
        _normalized: bool,
        stride: i32,
        offset: i64,
    ) -> Result<(), ContextError> {
        self.live()?;
        let op = "vertexAttribPointer";
        if !(1..=4).contains(&size) || !(0..=255).contains(&stride) || offset < 0 {
            return Err(invalid_value(op, "size, stride or offset out of range"));
        }
        if type_size(data_type).is_none() || data_type == gl::INT || data_type == gl::UNSIGNED_INT {
            return Err(ContextError::InvalidEnum { op, value: data_type });
        }
        let buffer = self
            .bound_buffers
            .get(&gl::ARRAY_BUFFER)
            .copied()
            .ok_or_else(|| invalid_operation(op, "no array buffer bound"))?;
        let attrib = self
            .attribs
            .get_mut(index as usize)
            .ok_or_else(|| invalid_value(op, format!("index {index} out of range")))?;
        attrib.pointer = Some(AttribPointer {
            buffer,
            size,
            data_type,
            stride,
            offset,
        });
        Ok(())
    }

    fn uniform(&mut self, location: i32, values: &[f32]) -> Result<(), ContextError> {
        self.live()?;
        let op = "uniform";
        if values.is_empty() || values.len() > 4 {
            return Err(invalid_value(op, format!("{} components", values.len())));
        }
        let program = self
            .current_program
            .ok_or_else(|| invalid_operation(op, "no program in use"))?;
        let active = self.linked_program(op, program)?.declarations.uniforms.len();
        if location < 0 || location as usize >= active {
            return Err(invalid_operation(op, format!("location {location} is not active")));
        }
        self.uniforms.insert((program, location), values.to_vec());
        Ok(())
    }

    fn draw_arrays(&mut self, mode: GLenum, first: i32, count: i32) -> Result<(), ContextError> {
        self.live()?;
        let op = "drawArrays";
        Self::check_mode(op, mode)?;
        if first < 0 || count < 0 {
            return Err(invalid_value(op, "negative first or count"));
        }
        let program = self.draw_program(op)?;
        let end = first
            .checked_add(count)
            .ok_or_else(|| invalid_value(op, "first + count overflows"))?;
        let vertices = if count == 0 { 0 } else { end as usize };
        self.check_attribs(op, vertices)?;
        self.draws.push(DrawCall::Arrays {
            mode,
            first,
            count,
            program,
        });
        Ok(())
    }

    fn draw_elements(
        &mut self,
        mode: GLenum,
        count: i32,
        index_type: GLenum,
        offset: i64,
    ) -> Result<(), ContextError> {
        self.live()?;
        let op = "drawElements";
        Self::check_mode(op, mode)?;
        if count < 0 || offset < 0 {
            return Err(invalid_value(op, "negative count or offset"));
        }
        let program = self.draw_program(op)?;
        let max_index = self.max_index(op, count as usize, index_type, offset as usize)?;
        self.check_attribs(op, max_index.map_or(0, |max| max as usize + 1))?;
        self.draws.push(DrawCall::Elements {
            mode,
            count,
            index_type,
            offset,
            program,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const VERTEX: &str = "attribute vec4 a_position; uniform vec2 u_mouse; void main() { gl_Position = a_position; }";
    const FRAGMENT: &str = "precision mediump float; uniform float time; void main() { gl_FragColor = vec4(1, 0, 0.5, time); }";

    fn linked_program(context: &mut HeadlessContext) -> RealName {
        let vs = context.create_shader(gl::VERTEX_SHADER).unwrap();
        context.shader_source(vs, VERTEX).unwrap();
        context.compile_shader(vs).unwrap();
        let fs = context.create_shader(gl::FRAGMENT_SHADER).unwrap();
        context.shader_source(fs, FRAGMENT).unwrap();
        context.compile_shader(fs).unwrap();
        let program = context.create_program().unwrap();
        context.attach_shader(program, vs).unwrap();
        context.attach_shader(program, fs).unwrap();
        context.link_program(program).unwrap();
        program
    }

    fn triangle_buffer(context: &mut HeadlessContext) -> RealName {
        let buffer = context.create_buffer().unwrap();
        context.bind_buffer(gl::ARRAY_BUFFER, Some(buffer)).unwrap();
        let vertices = [-1.0f32, -1.0, 1.0, -1.0, 0.0, 1.0];
        context
            .buffer_data(gl::ARRAY_BUFFER, bytemuck::cast_slice(&vertices), gl::STATIC_DRAW)
            .unwrap();
        buffer
    }

    #[test]
    fn invalid_shader_type_is_rejected() {
        let mut context = HeadlessContext::new();
        assert_eq!(
            context.create_shader(0xDEAD),
            Err(ContextError::InvalidEnum {
                op: "createShader",
                value: 0xDEAD
            })
        );
    }

    #[test]
    fn compile_requires_main() {
        let mut context = HeadlessContext::new();
        let shader = context.create_shader(gl::VERTEX_SHADER).unwrap();
        context.shader_source(shader, "attribute vec4 a;").unwrap();
        assert!(matches!(
            context.compile_shader(shader),
            Err(ContextError::CompileFailed { .. })
        ));
    }

    #[test]
    fn link_requires_both_stages() {
        let mut context = HeadlessContext::new();
        let vs = context.create_shader(gl::VERTEX_SHADER).unwrap();
        context.shader_source(vs, VERTEX).unwrap();
        context.compile_shader(vs).unwrap();
        let program = context.create_program().unwrap();
        context.attach_shader(program, vs).unwrap();
        assert!(matches!(
            context.link_program(program),
            Err(ContextError::LinkFailed { .. })
        ));
        assert!(!context.is_linked(program));
    }

    #[test]
    fn second_shader_of_a_stage_cannot_be_attached() {
        let mut context = HeadlessContext::new();
        let a = context.create_shader(gl::VERTEX_SHADER).unwrap();
        let b = context.create_shader(gl::VERTEX_SHADER).unwrap();
        let program = context.create_program().unwrap();
        context.attach_shader(program, a).unwrap();
        assert!(matches!(
            context.attach_shader(program, b),
            Err(ContextError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn linked_program_reports_locations() {
        let mut context = HeadlessContext::new();
        let program = linked_program(&mut context);
        assert_eq!(context.get_attrib_location(program, "a_position"), Ok(0));
        assert_eq!(context.get_attrib_location(program, "a_missing"), Ok(-1));
        assert_eq!(context.get_uniform_location(program, "time"), Ok(Some(1)));
        assert_eq!(context.get_uniform_location(program, "nope"), Ok(None));
    }

    #[test]
    fn triangle_draw_is_recorded() {
        let mut context = HeadlessContext::new();
        let program = linked_program(&mut context);
        let buffer = triangle_buffer(&mut context);
        assert_eq!(context.buffer_contents(buffer).map(<[u8]>::len), Some(24));

        context.use_program(Some(program)).unwrap();
        context.enable_vertex_attrib_array(0).unwrap();
        context
            .vertex_attrib_pointer(0, 2, gl::FLOAT, false, 0, 0)
            .unwrap();
        context.draw_arrays(gl::TRIANGLES, 0, 3).unwrap();

        assert_eq!(
            context.draw_calls(),
            &[DrawCall::Arrays {
                mode: gl::TRIANGLES,
                first: 0,
                count: 3,
                program
            }]
        );
    }

    #[test]
    fn draw_past_the_end_of_a_buffer_fails() {
        let mut context = HeadlessContext::new();
        let program = linked_program(&mut context);
        triangle_buffer(&mut context);
        context.use_program(Some(program)).unwrap();
        context.enable_vertex_attrib_array(0).unwrap();
        context
            .vertex_attrib_pointer(0, 2, gl::FLOAT, false, 0, 0)
            .unwrap();
        assert!(matches!(
            context.draw_arrays(gl::TRIANGLES, 0, 4),
            Err(ContextError::InvalidOperation { .. })
        ));
        assert!(context.draw_calls().is_empty());
    }

    #[test]
    fn draw_elements_checks_indices() {
        let mut context = HeadlessContext::new();
        let program = linked_program(&mut context);
        triangle_buffer(&mut context);
        context.use_program(Some(program)).unwrap();
        context.enable_vertex_attrib_array(0).unwrap();
        context
            .vertex_attrib_pointer(0, 2, gl::FLOAT, false, 0, 0)
            .unwrap();

        assert!(context
            .draw_elements(gl::TRIANGLES, 3, gl::UNSIGNED_SHORT, 0)
            .is_err());

        let indices = context.create_buffer().unwrap();
        context
            .bind_buffer(gl::ELEMENT_ARRAY_BUFFER, Some(indices))
            .unwrap();
        let data = [0u16, 1, 2, 3];
        context
            .buffer_data(gl::ELEMENT_ARRAY_BUFFER, bytemuck::cast_slice(&data), gl::STATIC_DRAW)
            .unwrap();

        context
            .draw_elements(gl::TRIANGLES, 3, gl::UNSIGNED_SHORT, 0)
            .unwrap();
        // index 3 is past the three vertices in the array buffer
        assert!(context
            .draw_elements(gl::TRIANGLES, 3, gl::UNSIGNED_SHORT, 2)
            .is_err());
        assert_eq!(context.draw_calls().len(), 1);
    }

    #[test]
    fn out_of_range_draws_are_rejected_not_panicking() {
        let mut context = HeadlessContext::new();
        let program = linked_program(&mut context);
        triangle_buffer(&mut context);
        context.use_program(Some(program)).unwrap();
        context.enable_vertex_attrib_array(0).unwrap();
        context
            .vertex_attrib_pointer(0, 2, gl::FLOAT, false, 0, 0)
            .unwrap();

        assert!(matches!(
            context.draw_arrays(gl::TRIANGLES, i32::MAX, 1),
            Err(ContextError::InvalidValue { .. })
        ));

        let indices = context.create_buffer().unwrap();
        context
            .bind_buffer(gl::ELEMENT_ARRAY_BUFFER, Some(indices))
            .unwrap();
        context
            .buffer_data(gl::ELEMENT_ARRAY_BUFFER, &[0, 0, 0, 0], gl::STATIC_DRAW)
            .unwrap();
        let offset = i64::MAX / 4 * 4;
        assert!(context
            .draw_elements(gl::TRIANGLES, i32::MAX, gl::UNSIGNED_INT, offset)
            .is_err());

        // The context is still usable afterwards.
        context.draw_arrays(gl::TRIANGLES, 0, 3).unwrap();
        assert_eq!(context.draw_calls().len(), 1);
    }

    #[test]
    fn uniform_needs_an_active_location() {
        let mut context = HeadlessContext::new();
        let program = linked_program(&mut context);
        context.use_program(Some(program)).unwrap();
        context.uniform(1, &[0.5]).unwrap();
        assert_relative_eq!(context.uniform_value(program, 1).unwrap()[0], 0.5);
        assert!(context.uniform(7, &[0.5]).is_err());
    }

    #[test]
    fn clear_color_is_clamped() {
        let mut context = HeadlessContext::new();
        RealContext::clear_color(&mut context, 1.5, 0.25, -1.0, 1.0).unwrap();
        let [r, g, b, a] = context.clear_color();
        assert_relative_eq!(r, 1.0);
        assert_relative_eq!(g, 0.25);
        assert_relative_eq!(b, 0.0);
        assert_relative_eq!(a, 1.0);
    }

    #[test]
    fn buffer_limit_rejects_extra_buffers() {
        let mut context = HeadlessContext::new().with_buffer_limit(1);
        let first = context.create_buffer().unwrap();
        assert!(matches!(
            context.create_buffer(),
            Err(ContextError::InvalidOperation { op: "createBuffer", .. })
        ));
        assert!(context.buffer_contents(first).is_some());
    }

    #[test]
    fn lost_context_rejects_everything() {
        let mut context = HeadlessContext::new();
        context.lose_context();
        assert_eq!(context.create_buffer(), Err(ContextError::ContextLost));
        assert_eq!(context.clear(gl::COLOR_BUFFER_BIT), Err(ContextError::ContextLost));
        assert!(context.capabilities().is_err());
    }
}

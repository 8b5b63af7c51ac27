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

//! The application-facing GL context.

use kiwi_actuator::{lock, PlayError, PlayReport, SharedActuator};
use kiwi_core::{
    BufferData, BufferHandle, Constants, ContextAttributes, GLenum, Instruction, Op,
    ParameterValue, ProgramHandle, Record, Recorder, RenderType, ResourceHandle, ResourceId,
    RetentionPolicy, SessionId, ShaderHandle, Value, GL,
};
use log::{debug, warn};

use crate::handle_table::HandleTable;

/// A uniform location handed out by [`GlContext::get_uniform_location`].
///
/// Locations name the uniform rather than a slot of one particular real
/// context, so they stay valid when the context is swapped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniformLocation {
    program: ResourceId,
    name: String,
    index: i32,
}

impl UniformLocation {
    /// The program the location belongs to.
    pub fn program(&self) -> ProgramHandle {
        ProgramHandle::from_id(self.program)
    }

    /// The uniform's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declaration index reported when the location was queried.
    pub fn index(&self) -> i32 {
        self.index
    }
}

/// A WebGL-style context that records every call and defers execution to
/// the next draw.
///
/// Creating calls return handles immediately. Nothing reaches a real context
/// until [`GlContext::draw_arrays`] or [`GlContext::draw_elements`], which
/// hand the recorded instructions to the shared actuator and return what
/// happened.
#[derive(Debug)]
pub struct GlContext {
    actuator: SharedActuator,
    session: SessionId,
    render_type: RenderType,
    attributes: ContextAttributes,
    recorder: Recorder,
    handles: HandleTable,
}

impl GlContext {
    /// Creates a facade recording into a new session of `actuator`.
    pub fn new(
        actuator: SharedActuator,
        render_type: RenderType,
        attributes: ContextAttributes,
    ) -> Result<Self, PlayError> {
        let session = lock(&actuator)?.open_session();
        debug!("{render_type} context created for session {session:?}");
        Ok(Self {
            actuator,
            session,
            render_type,
            attributes,
            recorder: Recorder::new(),
            handles: HandleTable::default(),
        })
    }

    /// Chooses what happens to the record log after a flush.
    ///
    /// Only takes effect before anything is recorded; later calls keep the
    /// current policy and log a warning.
    #[must_use]
    pub fn with_retention(mut self, policy: RetentionPolicy) -> Self {
        if self.recorder.is_empty() {
            self.recorder.set_policy(policy);
        } else if policy != self.recorder.policy() {
            warn!(
                "retention {policy:?} ignored for session {:?}: {} records already logged under {:?}",
                self.session,
                self.recorder.len(),
                self.recorder.policy()
            );
        }
        self
    }

    /// The session this facade records into.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// The GL flavour requested at creation.
    pub fn render_type(&self) -> RenderType {
        self.render_type
    }

    /// The drawing-buffer attributes requested at creation.
    pub fn attributes(&self) -> &ContextAttributes {
        &self.attributes
    }

    /// `getContextAttributes`.
    pub fn get_context_attributes(&self) -> ContextAttributes {
        self.attributes
    }

    /// The shared constants table.
    pub fn constants(&self) -> &'static Constants {
        &GL
    }

    /// The retention policy of the record log.
    pub fn retention(&self) -> RetentionPolicy {
        self.recorder.policy()
    }

    /// Records waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.recorder.len()
    }

    /// A handle created by this facade.
    pub fn handle(&self, id: ResourceId) -> Option<&ResourceHandle> {
        self.handles.get(id)
    }

    /// Number of handles created by this facade.
    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    fn record(&mut self, record: Record) {
        self.recorder.increase(record);
    }

    // --- Resources ---

    /// `createShader`. An invalid type still yields a handle; the real
    /// context rejects it when played.
    pub fn create_shader(&mut self, shader_type: GLenum) -> ShaderHandle {
        let id = self.handles.insert(ResourceHandle::shader(shader_type));
        self.record(
            Record::new(Op::CreateShader)
                .literal(Value::Enum(shader_type))
                .returning(id),
        );
        ShaderHandle::from_id(id)
    }

    /// `shaderSource`.
    pub fn shader_source(&mut self, shader: &ShaderHandle, source: &str) {
        if let Some(meta) = self.handles.shader_mut(shader.id()) {
            meta.source = Some(source.to_string());
        }
        self.record(Record::new(Op::ShaderSource).handle(shader.id()).literal(source));
    }

    /// `compileShader`.
    pub fn compile_shader(&mut self, shader: &ShaderHandle) {
        if let Some(meta) = self.handles.shader_mut(shader.id()) {
            meta.compile_requested = true;
        }
        self.record(Record::new(Op::CompileShader).handle(shader.id()));
    }

    /// `createProgram`.
    pub fn create_program(&mut self) -> ProgramHandle {
        let id = self.handles.insert(ResourceHandle::program());
        self.record(Record::new(Op::CreateProgram).returning(id));
        ProgramHandle::from_id(id)
    }

    /// `attachShader`.
    pub fn attach_shader(&mut self, program: &ProgramHandle, shader: &ShaderHandle) {
        if let Some(meta) = self.handles.program_mut(program.id()) {
            if !meta.shaders.contains(&shader.id()) {
                meta.shaders.push(shader.id());
            }
        }
        self.record(
            Record::new(Op::AttachShader)
                .handle(program.id())
                .handle(shader.id()),
        );
    }

    /// `linkProgram`. Attribute and uniform names are reflected from the
    /// attached shader sources at this point.
    pub fn link_program(&mut self, program: &ProgramHandle) {
        let declarations = self.handles.reflect(program.id());
        if let Some(meta) = self.handles.program_mut(program.id()) {
            meta.link_requested = true;
            meta.attributes = declarations.attributes;
            meta.uniforms = declarations.uniforms;
        }
        self.record(Record::new(Op::LinkProgram).handle(program.id()));
    }

    /// `getAttribLocation`, answered from the reflected attribute names.
    /// `-1` when the program declares no such attribute.
    pub fn get_attrib_location(&mut self, program: &ProgramHandle, name: &str) -> i32 {
        let location = self
            .handles
            .program(program.id())
            .and_then(|meta| meta.attributes.iter().position(|a| a == name))
            .map_or(-1, |index| index as i32);
        self.record(
            Record::new(Op::GetAttribLocation)
                .handle(program.id())
                .literal(name)
                .literal(location),
        );
        location
    }

    /// `getUniformLocation`, answered from the reflected uniform names.
    pub fn get_uniform_location(
        &mut self,
        program: &ProgramHandle,
        name: &str,
    ) -> Option<UniformLocation> {
        let index = self
            .handles
            .program(program.id())
            .and_then(|meta| meta.uniforms.iter().position(|u| u == name))
            .map(|index| index as i32);
        self.record(
            Record::new(Op::GetUniformLocation)
                .handle(program.id())
                .literal(name)
                .literal(index.unwrap_or(-1)),
        );
        index.map(|index| UniformLocation {
            program: program.id(),
            name: name.to_string(),
            index,
        })
    }

    /// `createBuffer`.
    pub fn create_buffer(&mut self) -> BufferHandle {
        let id = self.handles.insert(ResourceHandle::buffer());
        self.record(Record::new(Op::CreateBuffer).returning(id));
        BufferHandle::from_id(id)
    }

    /// `bindBuffer`; `None` unbinds the target.
    pub fn bind_buffer(&mut self, target: GLenum, buffer: Option<&BufferHandle>) {
        self.record(
            Record::new(Op::BindBuffer)
                .literal(Value::Enum(target))
                .optional_handle(buffer.map(BufferHandle::id)),
        );
    }

    /// `bufferData`. The data is captured now.
    pub fn buffer_data(&mut self, target: GLenum, data: impl Into<BufferData>, usage: GLenum) {
        let data: BufferData = data.into();
        self.record(
            Record::new(Op::BufferData)
                .literal(Value::Enum(target))
                .literal(data)
                .literal(Value::Enum(usage)),
        );
    }

    // --- State ---

    /// `viewport`.
    pub fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(
            Record::new(Op::Viewport)
                .literal(x)
                .literal(y)
                .literal(width)
                .literal(height),
        );
    }

    /// `clearColor`.
    pub fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.record(
            Record::new(Op::ClearColor)
                .literal(red)
                .literal(green)
                .literal(blue)
                .literal(alpha),
        );
    }

    /// `clear`.
    pub fn clear(&mut self, mask: GLenum) {
        self.record(Record::new(Op::Clear).literal(Value::Enum(mask)));
    }

    /// `useProgram`; `None` uninstalls the current program.
    pub fn use_program(&mut self, program: Option<&ProgramHandle>) {
        self.record(Record::new(Op::UseProgram).optional_handle(program.map(ProgramHandle::id)));
    }

    /// `enableVertexAttribArray`.
    pub fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.record(Record::new(Op::EnableVertexAttribArray).literal(i64::from(index)));
    }

    /// `vertexAttribPointer`.
    pub fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        data_type: GLenum,
        normalized: bool,
        stride: i32,
        offset: i64,
    ) {
        self.record(
            Record::new(Op::VertexAttribPointer)
                .literal(i64::from(index))
                .literal(size)
                .literal(Value::Enum(data_type))
                .literal(normalized)
                .literal(stride)
                .literal(offset),
        );
    }

    fn uniform(&mut self, location: &UniformLocation, values: Vec<f32>) {
        self.record(
            Record::new(Op::Uniform)
                .handle(location.program)
                .literal(location.name.as_str())
                .literal(Value::Floats(values)),
        );
    }

    /// `uniform1f`.
    pub fn uniform1f(&mut self, location: &UniformLocation, x: f32) {
        self.uniform(location, vec![x]);
    }

    /// `uniform2f`.
    pub fn uniform2f(&mut self, location: &UniformLocation, x: f32, y: f32) {
        self.uniform(location, vec![x, y]);
    }

    /// `uniform3f`.
    pub fn uniform3f(&mut self, location: &UniformLocation, x: f32, y: f32, z: f32) {
        self.uniform(location, vec![x, y, z]);
    }

    /// `uniform4f`.
    pub fn uniform4f(&mut self, location: &UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        self.uniform(location, vec![x, y, z, w]);
    }

    /// `uniform2fv`.
    pub fn uniform2fv(&mut self, location: &UniformLocation, value: &[f32; 2]) {
        self.uniform(location, value.to_vec());
    }

    /// `uniform3fv`.
    pub fn uniform3fv(&mut self, location: &UniformLocation, value: &[f32; 3]) {
        self.uniform(location, value.to_vec());
    }

    /// `uniform4fv`.
    pub fn uniform4fv(&mut self, location: &UniformLocation, value: &[f32; 4]) {
        self.uniform(location, value.to_vec());
    }

    // --- Queries ---

    /// `getParameter`, answered from the capabilities the bound context
    /// reported when it was bound. `None` when nothing is bound or the
    /// parameter is unknown.
    pub fn get_parameter(&self, pname: GLenum) -> Option<ParameterValue> {
        let actuator = lock(&self.actuator).ok()?;
        actuator.capabilities()?.parameter(pname).cloned()
    }

    /// `getExtension`: whether the bound context supports `name`.
    pub fn get_extension(&self, name: &str) -> bool {
        lock(&self.actuator)
            .ok()
            .and_then(|actuator| actuator.capabilities().map(|caps| caps.has_extension(name)))
            .unwrap_or(false)
    }

    /// Whether a real context is currently bound to the actuator.
    pub fn is_context_bound(&self) -> bool {
        lock(&self.actuator).is_ok_and(|actuator| actuator.binding().is_some())
    }

    // --- Draws ---

    /// `drawArrays`. Plays everything recorded so far.
    pub fn draw_arrays(
        &mut self,
        mode: GLenum,
        first: i32,
        count: i32,
    ) -> Result<PlayReport, PlayError> {
        self.record(
            Record::new(Op::DrawArrays)
                .literal(Value::Enum(mode))
                .literal(first)
                .literal(count),
        );
        self.flush()
    }

    /// `drawElements`. Plays everything recorded so far.
    pub fn draw_elements(
        &mut self,
        mode: GLenum,
        count: i32,
        index_type: GLenum,
        offset: i64,
    ) -> Result<PlayReport, PlayError> {
        self.record(
            Record::new(Op::DrawElements)
                .literal(Value::Enum(mode))
                .literal(count)
                .literal(Value::Enum(index_type))
                .literal(offset),
        );
        self.flush()
    }

    /// Hands the log to the actuator. If the play cannot start (no context,
    /// poisoned lock), the instructions are kept for the next flush.
    fn flush(&mut self) -> Result<PlayReport, PlayError> {
        let instructions: Vec<Instruction> = self.recorder.flush();
        debug!(
            "flushing {} instructions of session {:?}",
            instructions.len(),
            self.session
        );
        let session = self.session;
        let played =
            lock(&self.actuator).and_then(|mut actuator| actuator.play(session, &instructions));
        if played.is_err() {
            self.recorder.requeue(instructions);
        }
        played
    }
}

impl Drop for GlContext {
    fn drop(&mut self) {
        if let Ok(mut actuator) = lock(&self.actuator) {
            actuator.close_session(self.session);
        }
    }
}


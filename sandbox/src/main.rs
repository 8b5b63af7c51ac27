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

use anyhow::{Context, Result};
use kiwi_actuator::{lock, Actuator, PlayReport};
use kiwi_core::{gl, ContextAttributes, RenderType};
use kiwi_gl::GlContext;
use kiwi_infra::{HeadlessContext, TraceContext};
use log::{info, warn};

const VERTEX: &str = "attribute vec4 a_position;
uniform vec2 u_mouse;
void main() {
    gl_Position = a_position;
}";

const FRAGMENT: &str = "precision mediump float;
uniform float time;
void main() {
    gl_FragColor = vec4(1, 0, 0.5, time);
}";

/// Reads context attributes from the JSON file named on the command line, if any.
fn attributes() -> Result<ContextAttributes> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading context attributes from {path}"))?;
            Ok(ContextAttributes::from_json_str(&json)?)
        }
        None => Ok(ContextAttributes::default()),
    }
}

fn record_triangle(gl: &mut GlContext) {
    let vertex = gl.create_shader(gl::VERTEX_SHADER);
    gl.shader_source(&vertex, VERTEX);
    gl.compile_shader(&vertex);

    let fragment = gl.create_shader(gl::FRAGMENT_SHADER);
    gl.shader_source(&fragment, FRAGMENT);
    gl.compile_shader(&fragment);

    let program = gl.create_program();
    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);

    let position = gl.get_attrib_location(&program, "a_position");
    let time = gl.get_uniform_location(&program, "time");

    let buffer = gl.create_buffer();
    gl.bind_buffer(gl::ARRAY_BUFFER, Some(&buffer));
    gl.buffer_data(
        gl::ARRAY_BUFFER,
        vec![-1.0f32, -1.0, 1.0, -1.0, 0.0, 1.0],
        gl::STATIC_DRAW,
    );

    gl.viewport(0, 0, 800, 600);
    gl.clear_color(0.0, 0.0, 0.0, 1.0);
    gl.clear(gl::COLOR_BUFFER_BIT);
    gl.use_program(Some(&program));
    if let Some(time) = &time {
        gl.uniform1f(time, 1.0);
    }

    let index = u32::try_from(position).unwrap_or(0);
    gl.enable_vertex_attrib_array(index);
    gl.vertex_attrib_pointer(index, 2, gl::FLOAT, false, 0, 0);
}

fn summarize(label: &str, report: &PlayReport) {
    info!(
        "{label}: {} instructions on {}, {} executed, {} materialized",
        report.outcomes.len(),
        report.binding,
        report.executed(),
        report.materialized.len()
    );
    for failure in report.failures() {
        warn!("{label}: {failure}");
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let actuator = Actuator::shared();
    let mut gl = GlContext::new(actuator.clone(), RenderType::WebGl, attributes()?)?;
    info!(
        "recording for a {} context with {:?}",
        gl.render_type(),
        gl.get_context_attributes()
    );

    record_triangle(&mut gl);
    info!("{} calls recorded, nothing played yet", gl.pending());

    let traced = TraceContext::new(HeadlessContext::new());
    let calls = traced.log();
    lock(&actuator)?.bind(Box::new(traced));
    if let Some(renderer) = gl.get_parameter(gl::RENDERER) {
        info!("bound renderer {renderer:?}");
    }

    let report = gl.draw_arrays(gl::TRIANGLES, 0, 3)?;
    summarize("first frame", &report);
    info!("the context received: {}", calls.names().join(", "));

    // A new context knows none of the resources; they are rebuilt on first use.
    lock(&actuator)?.bind(Box::new(HeadlessContext::new()));
    let report = gl.draw_arrays(gl::TRIANGLES, 0, 3)?;
    summarize("after rebind", &report);

    let stats = lock(&actuator)?.stats().clone();
    info!(
        "{} plays, {} draws, {} resources materialized",
        stats.plays, stats.draw_calls, stats.resources_materialized
    );
    Ok(())
}

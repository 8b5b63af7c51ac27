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

use kiwi_actuator::{Actuator, Outcome, PlayError};
use kiwi_core::{
    gl, BufferData, Instruction, Op, Record, Recorder, ResourceId, RetentionPolicy, Value,
};
use kiwi_infra::{Call, CallLog, HeadlessContext, TraceContext};

const VERTEX: &str = "attribute vec4 a_position;\
    uniform vec2 u_mouse;\
    void main() {\
    gl_Position = a_position;\
    }";

const FRAGMENT: &str = "precision mediump float;\
    uniform float time;\
    void main() {\
    gl_FragColor = vec4(1, 0, 0.5, time);\
    }";

struct Triangle {
    vertex: ResourceId,
    fragment: ResourceId,
    program: ResourceId,
    buffer: ResourceId,
}

fn record_shader(recorder: &mut Recorder, shader_type: u32, source: &str) -> ResourceId {
    let shader = ResourceId::next();
    recorder.increase(
        Record::new(Op::CreateShader)
            .literal(Value::Enum(shader_type))
            .returning(shader),
    );
    recorder.increase(Record::new(Op::ShaderSource).handle(shader).literal(source));
    recorder.increase(Record::new(Op::CompileShader).handle(shader));
    shader
}

fn record_resources(recorder: &mut Recorder, fragment_source: &str) -> Triangle {
    let vertex = record_shader(recorder, gl::VERTEX_SHADER, VERTEX);
    let fragment = record_shader(recorder, gl::FRAGMENT_SHADER, fragment_source);

    let program = ResourceId::next();
    recorder.increase(Record::new(Op::CreateProgram).returning(program));
    recorder.increase(Record::new(Op::AttachShader).handle(program).handle(vertex));
    recorder.increase(Record::new(Op::AttachShader).handle(program).handle(fragment));
    recorder.increase(Record::new(Op::LinkProgram).handle(program));

    let buffer = ResourceId::next();
    recorder.increase(Record::new(Op::CreateBuffer).returning(buffer));
    recorder.increase(
        Record::new(Op::BindBuffer)
            .literal(Value::Enum(gl::ARRAY_BUFFER))
            .handle(buffer),
    );
    recorder.increase(
        Record::new(Op::BufferData)
            .literal(Value::Enum(gl::ARRAY_BUFFER))
            .literal(BufferData::from(vec![-1.0f32, -1.0, 1.0, -1.0, 0.0, 1.0]))
            .literal(Value::Enum(gl::STATIC_DRAW)),
    );

    Triangle {
        vertex,
        fragment,
        program,
        buffer,
    }
}

fn record_frame(recorder: &mut Recorder, triangle: &Triangle) -> u64 {
    recorder.increase(
        Record::new(Op::Viewport)
            .literal(0)
            .literal(0)
            .literal(800)
            .literal(600),
    );
    recorder.increase(
        Record::new(Op::ClearColor)
            .literal(0.0f32)
            .literal(0.0f32)
            .literal(0.0f32)
            .literal(1.0f32),
    );
    recorder.increase(Record::new(Op::Clear).literal(Value::Enum(gl::COLOR_BUFFER_BIT)));
    recorder.increase(Record::new(Op::UseProgram).handle(triangle.program));
    recorder.increase(Record::new(Op::EnableVertexAttribArray).literal(0));
    recorder.increase(
        Record::new(Op::VertexAttribPointer)
            .literal(0)
            .literal(2)
            .literal(Value::Enum(gl::FLOAT))
            .literal(false)
            .literal(0)
            .literal(0),
    );
    recorder.increase(
        Record::new(Op::DrawArrays)
            .literal(Value::Enum(gl::TRIANGLES))
            .literal(0)
            .literal(3),
    )
}

fn traced() -> (Box<TraceContext<HeadlessContext>>, CallLog) {
    let context = TraceContext::new(HeadlessContext::new());
    let log = context.log();
    (Box::new(context), log)
}

#[test]
fn test_triangle_plays_in_order() {
    // --- 1. ARRANGE ---
    let mut actuator = Actuator::new();
    let session = actuator.open_session();
    let (context, log) = traced();
    actuator.bind(context);
    log.clear();

    let mut recorder = Recorder::new();
    let triangle = record_resources(&mut recorder, FRAGMENT);
    let draw = record_frame(&mut recorder, &triangle);

    // --- 2. ACT ---
    let report = actuator
        .play(session, &recorder.flush())
        .expect("a context is bound");

    // --- 3. ASSERT ---
    assert!(report.is_ok(), "unexpected failures: {:?}", report.failures().collect::<Vec<_>>());
    assert_eq!(report.outcomes.len(), 20);
    assert_eq!(
        log.names(),
        vec![
            "createShader",
            "shaderSource",
            "compileShader",
            "createShader",
            "shaderSource",
            "compileShader",
            "createProgram",
            "attachShader",
            "attachShader",
            "linkProgram",
            "createBuffer",
            "bindBuffer",
            "bufferData",
            "viewport",
            "clearColor",
            "clear",
            "useProgram",
            "enableVertexAttribArray",
            "vertexAttribPointer",
            "drawArrays",
        ]
    );
    assert_eq!(
        log.calls().last(),
        Some(&Call::DrawArrays {
            mode: gl::TRIANGLES,
            first: 0,
            count: 3
        })
    );
    assert_eq!(report.outcome_at(draw).map(|o| o.op), Some(Op::DrawArrays));

    // One real resource per handle, all distinct.
    let names: Vec<_> = [triangle.vertex, triangle.fragment, triangle.program, triangle.buffer]
        .iter()
        .map(|id| actuator.resolution(session, *id).expect("resolved").name)
        .collect();
    for (i, name) in names.iter().enumerate() {
        assert!(!names[i + 1..].contains(name), "{name} resolved twice");
    }
    assert_eq!(actuator.stats().draw_calls, 1);
    assert_eq!(actuator.stats().instructions_executed, 20);
}

#[test]
fn test_nothing_bound_is_context_unavailable() {
    let mut actuator = Actuator::new();
    let session = actuator.open_session();
    let mut recorder = Recorder::new();
    let triangle = record_resources(&mut recorder, FRAGMENT);
    record_frame(&mut recorder, &triangle);

    assert_eq!(
        actuator.play(session, &recorder.flush()),
        Err(PlayError::ContextUnavailable)
    );
}

#[test]
fn test_same_instructions_on_two_bindings_use_disjoint_resources() {
    // --- 1. ARRANGE ---
    let mut actuator = Actuator::new();
    let session = actuator.open_session();
    let mut recorder = Recorder::with_policy(RetentionPolicy::Cumulative);
    let triangle = record_resources(&mut recorder, FRAGMENT);
    record_frame(&mut recorder, &triangle);
    let instructions: Vec<Instruction> = recorder.flush();

    // --- 2. ACT ---
    actuator.bind(Box::new(HeadlessContext::new()));
    let first = actuator.play(session, &instructions).expect("bound");
    let on_first = actuator.resolution(session, triangle.program).expect("resolved");

    actuator.bind(Box::new(HeadlessContext::new()));
    let second = actuator.play(session, &instructions).expect("bound");
    let on_second = actuator.resolution(session, triangle.program).expect("resolved");

    // --- 3. ASSERT ---
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_ne!(first.binding, second.binding);
    assert_eq!(on_first.binding, first.binding);
    assert_eq!(on_second.binding, second.binding);
    assert_ne!(on_first, on_second);
}

#[test]
fn test_foreign_handle_aborts_the_play() {
    // --- 1. ARRANGE ---
    let mut actuator = Actuator::new();
    let owner = actuator.open_session();
    let intruder = actuator.open_session();
    let (context, log) = traced();
    actuator.bind(context);

    let mut owner_recorder = Recorder::new();
    let buffer = ResourceId::next();
    owner_recorder.increase(Record::new(Op::CreateBuffer).returning(buffer));
    assert!(actuator.play(owner, &owner_recorder.flush()).expect("bound").is_ok());
    log.clear();

    let mut recorder = Recorder::new();
    recorder.increase(Record::new(Op::Clear).literal(Value::Enum(gl::COLOR_BUFFER_BIT)));
    let bind = recorder.increase(
        Record::new(Op::BindBuffer)
            .literal(Value::Enum(gl::ARRAY_BUFFER))
            .handle(buffer),
    );
    recorder.increase(Record::new(Op::Clear).literal(Value::Enum(gl::COLOR_BUFFER_BIT)));

    // --- 2. ACT ---
    let report = actuator.play(intruder, &recorder.flush()).expect("bound");

    // --- 3. ASSERT ---
    assert_eq!(report.aborted_at, Some(bind));
    assert_eq!(
        report.outcome_at(bind).map(|o| &o.status),
        Some(&Outcome::Failed(PlayError::InvalidReference {
            position: bind,
            id: buffer
        }))
    );
    assert_eq!(report.outcomes[2].status, Outcome::Skipped);
    assert_eq!(log.names(), vec!["clear"], "the bind must not reach the context");
}

#[test]
fn test_rebind_materializes_earlier_definitions() {
    // --- 1. ARRANGE ---
    let mut actuator = Actuator::new();
    let session = actuator.open_session();
    actuator.bind(Box::new(HeadlessContext::new()));

    let mut recorder = Recorder::new();
    let triangle = record_resources(&mut recorder, FRAGMENT);
    record_frame(&mut recorder, &triangle);
    assert!(actuator.play(session, &recorder.flush()).expect("bound").is_ok());

    let (replacement, log) = traced();
    actuator.bind(replacement);
    log.clear();

    // --- 2. ACT ---
    record_frame(&mut recorder, &triangle);
    let report = actuator.play(session, &recorder.flush()).expect("bound");

    // --- 3. ASSERT ---
    assert!(report.is_ok(), "unexpected failures: {:?}", report.failures().collect::<Vec<_>>());
    assert_eq!(report.outcomes.len(), 7);
    assert_eq!(report.materialized.len(), 4);
    for id in [triangle.vertex, triangle.fragment, triangle.program, triangle.buffer] {
        assert!(report.materialized.contains(&id), "{id} was not materialized");
    }
    assert_eq!(log.count(|call| matches!(call, Call::CreateShader { .. })), 2);
    assert_eq!(log.count(|call| matches!(call, Call::CreateProgram)), 1);
    assert_eq!(log.count(|call| matches!(call, Call::BufferData { len: 24, .. })), 1);
    assert_eq!(log.count(|call| matches!(call, Call::DrawArrays { .. })), 1);
    assert_eq!(actuator.stats().resources_materialized, 4);
}

#[test]
fn test_failed_compile_becomes_dependency_failure() {
    // --- 1. ARRANGE ---
    let mut actuator = Actuator::new();
    let session = actuator.open_session();
    let (context, log) = traced();
    actuator.bind(context);

    let mut recorder = Recorder::new();
    let triangle = record_resources(&mut recorder, "void mane() {}");
    let draw = record_frame(&mut recorder, &triangle);
    let instructions = recorder.flush();
    let position_of = |op: Op| {
        instructions
            .iter()
            .find(|i| i.op() == op)
            .map(Instruction::position)
            .expect("recorded")
    };

    // --- 2. ACT ---
    let report = actuator.play(session, &instructions).expect("bound");

    // --- 3. ASSERT ---
    assert!(!report.is_ok());
    assert_eq!(report.aborted_at, None);
    assert_eq!(
        report.outcome_at(position_of(Op::LinkProgram)).map(|o| &o.status),
        Some(&Outcome::Failed(PlayError::DependencyFailure {
            position: position_of(Op::LinkProgram),
            dependency: triangle.fragment,
        }))
    );
    assert_eq!(
        report.outcome_at(position_of(Op::UseProgram)).map(|o| &o.status),
        Some(&Outcome::Failed(PlayError::DependencyFailure {
            position: position_of(Op::UseProgram),
            dependency: triangle.program,
        }))
    );
    assert_eq!(
        report.outcome_at(draw).map(|o| &o.status),
        Some(&Outcome::Failed(PlayError::DependencyFailure {
            position: draw,
            dependency: triangle.program,
        }))
    );
    assert_eq!(
        report.outcome_at(position_of(Op::Viewport)).map(|o| &o.status),
        Some(&Outcome::Executed)
    );
    assert_eq!(log.count(|call| matches!(call, Call::DrawArrays { .. })), 0);
    assert_eq!(log.count(|call| matches!(call, Call::LinkProgram { .. })), 0);
}

#[test]
fn test_cumulative_replay_reuses_definitions() {
    // --- 1. ARRANGE ---
    let mut actuator = Actuator::new();
    let session = actuator.open_session();
    let (context, log) = traced();
    actuator.bind(context);

    let mut recorder = Recorder::with_policy(RetentionPolicy::Cumulative);
    let triangle = record_resources(&mut recorder, FRAGMENT);
    record_frame(&mut recorder, &triangle);
    assert!(actuator.play(session, &recorder.flush()).expect("bound").is_ok());

    // --- 2. ACT ---
    record_frame(&mut recorder, &triangle);
    let report = actuator.play(session, &recorder.flush()).expect("bound");

    // --- 3. ASSERT ---
    assert!(report.is_ok(), "unexpected failures: {:?}", report.failures().collect::<Vec<_>>());
    assert_eq!(report.outcomes.len(), 27);
    let reused = report
        .outcomes
        .iter()
        .filter(|o| o.status == Outcome::Reused)
        .count();
    // 4 creations plus 2 sources, 2 compiles, 2 attachments and the link.
    assert_eq!(reused, 11);
    assert_eq!(log.count(|call| matches!(call, Call::CreateShader { .. })), 2);
    assert_eq!(log.count(|call| matches!(call, Call::AttachShader { .. })), 2);
    assert_eq!(log.count(|call| matches!(call, Call::DrawArrays { .. })), 3);
}

#[test]
fn test_closed_session_is_unknown() {
    let mut actuator = Actuator::new();
    actuator.bind(Box::new(HeadlessContext::new()));
    let session = actuator.open_session();
    actuator.close_session(session);

    assert_eq!(
        actuator.play(session, &[]),
        Err(PlayError::UnknownSession(session))
    );
}

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

//! Error types shared by the recording and playback layers.

use crate::constants::GLenum;

/// An error reported by a real execution context for a single call.
///
/// The variants follow the GL error model: the context either rejects the
/// call outright, or reports a compile/link failure with its info log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// An enum argument is not accepted by the operation.
    #[error("invalid enum 0x{value:04X} for {op}")]
    InvalidEnum {
        /// The GL operation name.
        op: &'static str,
        /// The rejected value.
        value: GLenum,
    },
    /// A numeric argument is out of range.
    #[error("invalid value for {op}: {reason}")]
    InvalidValue {
        /// The GL operation name.
        op: &'static str,
        /// What was wrong with the value.
        reason: String,
    },
    /// The operation is not allowed in the current context state.
    #[error("invalid operation {op}: {reason}")]
    InvalidOperation {
        /// The GL operation name.
        op: &'static str,
        /// Why the state forbids the call.
        reason: String,
    },
    /// Shader compilation failed.
    #[error("shader compilation failed: {log}")]
    CompileFailed {
        /// The compiler info log.
        log: String,
    },
    /// Program linking failed.
    #[error("program link failed: {log}")]
    LinkFailed {
        /// The linker info log.
        log: String,
    },
    /// The context was lost and no longer accepts calls.
    #[error("the context was lost")]
    ContextLost,
}

/// An instruction argument did not have the shape its operation expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The argument list is shorter than the operation requires.
    #[error("instruction {position} ({op}) has no argument {index}")]
    MissingArgument {
        /// Position of the originating record.
        position: u64,
        /// The operation name.
        op: &'static str,
        /// The missing argument index.
        index: usize,
    },
    /// The argument exists but is of the wrong kind.
    #[error("instruction {position} ({op}) argument {index}: expected {expected}")]
    UnexpectedArgument {
        /// Position of the originating record.
        position: u64,
        /// The operation name.
        op: &'static str,
        /// The offending argument index.
        index: usize,
        /// A description of what was expected.
        expected: &'static str,
    },
    /// A creation instruction carries no declared return id.
    #[error("instruction {position} ({op}) does not declare the id it creates")]
    MissingReturnId {
        /// Position of the originating record.
        position: u64,
        /// The operation name.
        op: &'static str,
    },
}

impl DecodeError {
    /// Position of the instruction that failed to decode.
    pub fn position(&self) -> u64 {
        match self {
            DecodeError::MissingArgument { position, .. }
            | DecodeError::UnexpectedArgument { position, .. }
            | DecodeError::MissingReturnId { position, .. } => *position,
        }
    }
}

/// An error while loading context configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid context attributes: {0}")]
    Json(#[from] serde_json::Error),
    /// The render type string is not `webgl` or `webgl2`.
    #[error("unsupported render type '{0}', expected 'webgl' or 'webgl2'")]
    UnsupportedRenderType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_error_display() {
        let err = ContextError::InvalidEnum {
            op: "createShader",
            value: 0x1234,
        };
        assert_eq!(format!("{err}"), "invalid enum 0x1234 for createShader");

        let err = ContextError::CompileFailed {
            log: "missing main".to_string(),
        };
        assert_eq!(format!("{err}"), "shader compilation failed: missing main");
    }

    #[test]
    fn decode_error_display() {
        let err = DecodeError::UnexpectedArgument {
            position: 7,
            op: "bindBuffer",
            index: 1,
            expected: "handle",
        };
        assert_eq!(
            format!("{err}"),
            "instruction 7 (bindBuffer) argument 1: expected handle"
        );
    }

    #[test]
    fn config_error_wraps_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(format!("{err}").starts_with("invalid context attributes:"));
    }
}

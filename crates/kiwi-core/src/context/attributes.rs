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

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The GL flavour a facade is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderType {
    /// WebGL 1.
    #[default]
    WebGl,
    /// WebGL 2.
    WebGl2,
}

impl RenderType {
    /// The canonical context-type string.
    pub const fn as_str(self) -> &'static str {
        match self {
            RenderType::WebGl => "webgl",
            RenderType::WebGl2 => "webgl2",
        }
    }
}

impl fmt::Display for RenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webgl" => Ok(RenderType::WebGl),
            "webgl2" => Ok(RenderType::WebGl2),
            _ => Err(ConfigError::UnsupportedRenderType(s.to_string())),
        }
    }
}

/// Drawing-buffer attributes requested when a context is created.
///
/// Missing fields take the defaults below when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextAttributes {
    /// Whether the drawing buffer has an alpha channel.
    pub alpha: bool,
    /// Whether the drawing buffer has a depth buffer.
    pub depth: bool,
    /// Whether the drawing buffer has a stencil buffer.
    pub stencil: bool,
    /// Whether to antialias.
    pub antialias: bool,
    /// Whether colors are premultiplied by alpha.
    pub premultiplied_alpha: bool,
    /// Whether the buffer is preserved after presentation.
    pub preserve_drawing_buffer: bool,
    /// Whether creation fails on a slow (software) implementation.
    pub fail_if_major_performance_caveat: bool,
}

impl Default for ContextAttributes {
    fn default() -> Self {
        Self {
            alpha: false,
            depth: true,
            stencil: true,
            antialias: false,
            premultiplied_alpha: true,
            preserve_drawing_buffer: false,
            fail_if_major_performance_caveat: false,
        }
    }
}

impl ContextAttributes {
    /// Parses attributes from a JSON object with camelCase keys.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let attributes = ContextAttributes::default();
        assert!(!attributes.alpha);
        assert!(attributes.depth);
        assert!(attributes.stencil);
        assert!(attributes.premultiplied_alpha);
        assert!(!attributes.preserve_drawing_buffer);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let attributes =
            ContextAttributes::from_json_str(r#"{ "alpha": true, "preserveDrawingBuffer": true }"#)
                .unwrap();
        assert!(attributes.alpha);
        assert!(attributes.preserve_drawing_buffer);
        assert!(attributes.depth);
        assert!(!attributes.antialias);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            ContextAttributes::from_json_str("{ alpha: }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn render_type_parsing() {
        assert_eq!("webgl".parse::<RenderType>().unwrap(), RenderType::WebGl);
        assert_eq!("WebGL2".parse::<RenderType>().unwrap(), RenderType::WebGl2);
        assert!(matches!(
            "vulkan".parse::<RenderType>(),
            Err(ConfigError::UnsupportedRenderType(_))
        ));
        assert_eq!(RenderType::WebGl2.to_string(), "webgl2");
    }
}

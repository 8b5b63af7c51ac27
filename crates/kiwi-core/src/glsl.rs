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

//! Lightweight GLSL declaration scanning.
//!
//! This is not a compiler. It finds top-level `attribute`/`in` and `uniform`
//! declarations so attribute and uniform locations can be answered from
//! recorded shader sources, and performs the structural checks a software
//! context needs to accept or reject a shader.

use crate::handle::ShaderStage;

/// Names declared by a shader, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    /// Vertex inputs (`attribute`, or `in` in a vertex shader).
    pub attributes: Vec<String>,
    /// Uniforms.
    pub uniforms: Vec<String>,
}

impl Declarations {
    /// Appends the names of `other` that are not declared yet.
    pub fn merge(&mut self, other: Declarations) {
        for name in other.attributes {
            if !self.attributes.contains(&name) {
                self.attributes.push(name);
            }
        }
        for name in other.uniforms {
            if !self.uniforms.contains(&name) {
                self.uniforms.push(name);
            }
        }
    }
}

/// Removes `//` and `/* */` comments, keeping line breaks.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn skip_layout(statement: &str) -> &str {
    match statement.strip_prefix("layout") {
        Some(rest) => match rest.find(')') {
            Some(end) => rest[end + 1..].trim_start(),
            None => "",
        },
        None => statement,
    }
}

/// Scans top-level declarations of a shader written for `stage`.
pub fn scan(source: &str, stage: ShaderStage) -> Declarations {
    let stripped = strip_comments(source);
    let mut declarations = Declarations::default();

    for statement in stripped.split(|c| matches!(c, ';' | '{' | '}')) {
        let statement = skip_layout(statement.trim());
        let mut tokens = statement.split_whitespace().peekable();

        while matches!(
            tokens.peek(),
            Some(&("invariant" | "flat" | "smooth" | "centroid"))
        ) {
            tokens.next();
        }

        let target = match tokens.next() {
            Some("attribute") => &mut declarations.attributes,
            Some("in") if stage == ShaderStage::Vertex => &mut declarations.attributes,
            Some("uniform") => &mut declarations.uniforms,
            _ => continue,
        };

        if matches!(tokens.peek(), Some(&("lowp" | "mediump" | "highp"))) {
            tokens.next();
        }
        // type
        if tokens.next().is_none() {
            continue;
        }

        let declarators = tokens.collect::<Vec<_>>().join(" ");
        for declarator in declarators.split(',') {
            let name = declarator
                .split(|c| c == '[' || c == '=')
                .next()
                .unwrap_or_default()
                .trim();
            if is_identifier(name) && !target.iter().any(|known| known == name) {
                target.push(name.to_string());
            }
        }
    }

    declarations
}

/// Whether the source defines `void main`.
pub fn has_entry_point(source: &str) -> bool {
    let stripped = strip_comments(source).replace('(', " ( ");
    let tokens: Vec<&str> = stripped.split_whitespace().collect();
    tokens.windows(2).any(|pair| pair == ["void", "main"])
}

/// Whether every `{` has a matching `}`.
pub fn braces_balanced(source: &str) -> bool {
    let mut depth = 0i32;
    for c in strip_comments(source).chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn scans_webgl1_vertex_shader() {
        let declarations = scan(VERTEX, ShaderStage::Vertex);
        assert_eq!(declarations.attributes, vec!["a_position"]);
        assert_eq!(declarations.uniforms, vec!["u_mouse"]);
    }

    #[test]
    fn precision_statement_is_not_a_declaration() {
        let declarations = scan(FRAGMENT, ShaderStage::Fragment);
        assert!(declarations.attributes.is_empty());
        assert_eq!(declarations.uniforms, vec!["time"]);
    }

    #[test]
    fn comments_multiple_declarators_and_arrays() {
        let source = "// attribute vec2 commented;\n\
            /* uniform vec4 hidden; */\n\
            uniform highp vec2 u_resolution, u_translation;\n\
            uniform vec4 u_colors[4];\n\
            void main() {}";
        let declarations = scan(source, ShaderStage::Vertex);
        assert!(declarations.attributes.is_empty());
        assert_eq!(
            declarations.uniforms,
            vec!["u_resolution", "u_translation", "u_colors"]
        );
    }

    #[test]
    fn glsl3_inputs_depend_on_stage() {
        let source = "#version 300 es\nlayout(location = 0) in vec2 a_pos;\nin vec3 a_color;\nvoid main() {}";
        assert_eq!(
            scan(source, ShaderStage::Vertex).attributes,
            vec!["a_pos", "a_color"]
        );
        assert!(scan(source, ShaderStage::Fragment).attributes.is_empty());
    }

    #[test]
    fn merge_skips_known_names() {
        let mut declarations = scan(VERTEX, ShaderStage::Vertex);
        declarations.merge(scan(FRAGMENT, ShaderStage::Fragment));
        declarations.merge(scan(VERTEX, ShaderStage::Vertex));
        assert_eq!(declarations.uniforms, vec!["u_mouse", "time"]);
        assert_eq!(declarations.attributes, vec!["a_position"]);
    }

    #[test]
    fn structural_checks() {
        assert!(has_entry_point(VERTEX));
        assert!(!has_entry_point("void mainly() {}"));
        assert!(braces_balanced(VERTEX));
        assert!(!braces_balanced("void main() {"));
        assert!(!braces_balanced("}{"));
    }
}

//! Embedded shader sources.
//!
//! The renderer's three programs are compiled from WGSL kept in-crate and
//! resolved by name through [`ShaderLibrary`], so applications can override a
//! program by registering their own source under the same name before the
//! renderer initializes.

use indexmap::IndexMap;

/// Names of the built-in shader programs.
pub mod names {
    /// Flat color program for pre-transformed geometry.
    pub const COLOR: &str = "color";
    /// Per-vertex colored polygon batch program.
    pub const POLYGON_BATCH: &str = "polygon_batch";
    /// Instanced textured-quad sprite batch program.
    pub const SPRITE_BATCH: &str = "sprite_batch";
}

/// WGSL for the flat color program: clip-space positions, vertex colors,
/// no matrix.
const COLOR_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.position = vec4<f32>(input.position, 1.0);
    output.color = input.color;
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return input.color;
}
"#;

/// WGSL for the polygon batch: interleaved position + color vertices
/// transformed by the view-projection matrix.
const POLYGON_BATCH_SHADER: &str = r#"
struct Globals {
    matrix: mat4x4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.position = globals.matrix * vec4<f32>(input.position, 1.0);
    output.color = input.color;
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return input.color;
}
"#;

/// WGSL for the sprite batch: a shared unit quad instanced with per-sprite
/// transform, crop rectangle, and tint. The crop remaps the quad's UVs into
/// the selected sub-region; the transform columns arrive as four vec4
/// attributes (column-major).
const SPRITE_BATCH_SHADER: &str = r#"
struct Globals {
    matrix: mat4x4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var t_sprite: texture_2d<f32>;
@group(1) @binding(1)
var s_sprite: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) coords: vec2<f32>,
    @location(2) crop: vec4<f32>,
    @location(3) tint: vec4<f32>,
    @location(4) transform_0: vec4<f32>,
    @location(5) transform_1: vec4<f32>,
    @location(6) transform_2: vec4<f32>,
    @location(7) transform_3: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) coords: vec2<f32>,
    @location(1) tint: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    let transform = mat4x4<f32>(
        input.transform_0,
        input.transform_1,
        input.transform_2,
        input.transform_3,
    );

    var output: VertexOutput;
    output.position = globals.matrix * transform * vec4<f32>(input.position, 1.0);
    output.coords = input.crop.xy + input.coords * input.crop.zw;
    output.tint = input.tint;
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(t_sprite, s_sprite, input.coords) * input.tint;
}
"#;

/// Named registry of shader sources.
pub struct ShaderLibrary {
    sources: IndexMap<String, String>,
}

impl ShaderLibrary {
    /// Create a library seeded with the built-in programs.
    pub fn new() -> Self {
        let mut library = Self {
            sources: IndexMap::new(),
        };
        library.add(names::COLOR, COLOR_SHADER);
        library.add(names::POLYGON_BATCH, POLYGON_BATCH_SHADER);
        library.add(names::SPRITE_BATCH, SPRITE_BATCH_SHADER);
        library
    }

    /// Register (or replace) a source under `name`.
    pub fn add(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(name.into(), source.into());
    }

    /// Look up a source by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.sources.get(name).map(String::as_str)
    }

    /// Registered program names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_registered() {
        let library = ShaderLibrary::new();
        assert!(library.get(names::COLOR).is_some());
        assert!(library.get(names::POLYGON_BATCH).is_some());
        assert!(library.get(names::SPRITE_BATCH).is_some());
        assert!(library.get("missing").is_none());
    }

    #[test]
    fn test_sources_can_be_overridden() {
        let mut library = ShaderLibrary::new();
        library.add(names::COLOR, "// custom");
        assert_eq!(library.get(names::COLOR), Some("// custom"));
    }
}

/// WGSL for instanced boxes: per-instance centre and scale, Lambert shading
/// with +Z as up.
pub const BOX_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    light_dir: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) center: vec3<f32>,
    @location(3) scale: vec3<f32>,
    @location(4) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_box(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let world_pos = instance.center + vertex.position * instance.scale;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(world_pos, 1.0);
    // Axis-aligned scaling keeps face normals unchanged.
    out.normal = vertex.normal;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_box(in: VertexOutput) -> @location(0) vec4<f32> {
    let ambient = 0.35;
    let diffuse = max(dot(normalize(in.normal), normalize(uniforms.light_dir.xyz)), 0.0);
    return vec4<f32>(in.color.rgb * (ambient + 0.65 * diffuse), in.color.a);
}
"#;

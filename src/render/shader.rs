use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use crate::camera::PerspectiveCamera;
use crate::scene::{DrawItem, Scene};

/// Camera, light and ambient terms shared by every object in a pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// xyz towards the light, w intensity.
    pub light_direction: [f32; 4],
    /// rgb color, w is 1 when the light casts shadows.
    pub light_color: [f32; 4],
    pub ambient_color: [f32; 4],
}

impl FrameUniform {
    pub fn new(scene: &Scene, view_proj: Mat4, eye: Vec3) -> Self {
        let sun = scene.sun();
        let casts = if sun.cast_shadow { 1.0 } else { 0.0 };
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_view_proj: sun.view_proj().to_cols_array_2d(),
            camera_position: eye.extend(1.0).into(),
            light_direction: sun.direction().extend(sun.intensity).into(),
            light_color: sun.color.extend(casts).into(),
            ambient_color: scene.ambient().color.extend(1.0).into(),
        }
    }

    pub fn for_camera(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        Self::new(scene, camera.view_proj(), camera.position)
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub color: [f32; 4],
    /// xy texture repeat, z textured flag, w environment map flag.
    pub uv: [f32; 4],
    /// x receives shadow, y shininess.
    pub params: [f32; 4],
}

impl ObjectUniform {
    pub fn new(item: &DrawItem<'_>, textured: bool) -> Self {
        let material = item.material;
        let normal = Mat3::from_mat4(item.model).inverse().transpose();
        Self {
            model: item.model.to_cols_array_2d(),
            normal: mat3_to_3x4(normal),
            color: material.color.extend(1.0).into(),
            uv: [
                material.uv_repeat.x,
                material.uv_repeat.y,
                flag(textured),
                flag(material.env_map),
            ],
            params: [flag(item.receive_shadow), material.shininess, 0.0, 0.0],
        }
    }
}

/// Light space transform for the depth-only shadow pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct ShadowUniform {
    pub view_proj: [[f32; 4]; 4],
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

pub(crate) const LIT_SHADER: &str = r#"
struct FrameUniform {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    light_direction: vec4<f32>,
    light_color: vec4<f32>,
    ambient_color: vec4<f32>,
}

struct ObjectUniform {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
    uv: vec4<f32>,
    params: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> frame: FrameUniform;
@group(0) @binding(1)
var shadow_map: texture_depth_2d;
@group(0) @binding(2)
var shadow_sampler: sampler_comparison;
@group(0) @binding(3)
var env_map: texture_cube<f32>;
@group(0) @binding(4)
var env_sampler: sampler;

@group(1) @binding(0)
var<uniform> object: ObjectUniform;
@group(1) @binding(1)
var base_texture: texture_2d<f32>;
@group(1) @binding(2)
var base_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) light_space: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = frame.view_proj * world_position;
    out.world_pos = world_position.xyz;
    out.normal = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    ) * input.normal;
    out.uv = input.uv * object.uv.xy;
    out.light_space = frame.light_view_proj * world_position;
    return out;
}

fn shadow_factor(light_space: vec4<f32>) -> f32 {
    let ndc = light_space.xyz / light_space.w;
    let coords = vec2<f32>(ndc.x * 0.5 + 0.5, ndc.y * -0.5 + 0.5);
    let lit = textureSampleCompareLevel(shadow_map, shadow_sampler, coords, ndc.z - 0.002);
    let inside = step(0.0, coords.x) * step(coords.x, 1.0)
        * step(0.0, coords.y) * step(coords.y, 1.0)
        * step(ndc.z, 1.0);
    return mix(1.0, lit, inside * object.params.x * frame.light_color.w);
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(input.normal);
    let to_light = normalize(frame.light_direction.xyz);
    let to_eye = normalize(frame.camera_position.xyz - input.world_pos);

    let texel = textureSample(base_texture, base_sampler, input.uv).rgb;
    let base = object.color.rgb * mix(vec3<f32>(1.0), texel, object.uv.z);

    let reflected = reflect(-to_eye, normal);
    let env = textureSample(env_map, env_sampler, reflected).rgb;

    let shadow = shadow_factor(input.light_space);
    let diffuse = max(dot(normal, to_light), 0.0) * frame.light_direction.w;
    let halfway = normalize(to_light + to_eye);
    let specular = pow(max(dot(normal, halfway), 0.0), object.params.y) * 0.067;

    let direct = (base * diffuse + vec3<f32>(specular)) * frame.light_color.rgb * shadow;
    let lit = frame.ambient_color.rgb * base + direct;
    return vec4<f32>(mix(lit, lit * env, object.uv.w), 1.0);
}
"#;

pub(crate) const SHADOW_SHADER: &str = r#"
struct ShadowUniform {
    view_proj: mat4x4<f32>,
}

struct ObjectUniform {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
    uv: vec4<f32>,
    params: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> light: ShadowUniform;

@group(1) @binding(0)
var<uniform> object: ObjectUniform;

@vertex
fn vs_shadow(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return light.view_proj * object.model * vec4<f32>(position, 1.0);
}
"#;

/// Fullscreen triangle that downsamples one mip level into the next.
pub(crate) const BLIT_SHADER: &str = r#"
struct BlitOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;

@vertex
fn vs_blit(@builtin(vertex_index) index: u32) -> BlitOutput {
    let corner = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: BlitOutput;
    out.position = vec4<f32>(corner * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(corner.x, 1.0 - corner.y);
    return out;
}

@fragment
fn fs_blit(input: BlitOutput) -> @location(0) vec4<f32> {
    return textureSample(source, source_sampler, input.uv);
}
"#;

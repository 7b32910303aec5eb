/// WGSL shader for lit, fogged, instanced scene meshes.
///
/// Lighting: ambient, one directional sun and one point light with range
/// falloff, all Lambertian, plus per-instance emissive. Geometry is drawn
/// double-sided; back faces flip their normal.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    sun_dir: vec4<f32>,
    sun_color: vec4<f32>,
    point_pos: vec4<f32>,
    point_color: vec4<f32>,
    fog_color: vec4<f32>,
    fog_range: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) emissive: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) emissive: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    out.emissive = instance.emissive.rgb;
    return out;
}

fn point_falloff(dist: f32, range: f32) -> f32 {
    let inv_sq = 1.0 / max(dist * dist, 0.01);
    if (range <= 0.0) {
        return inv_sq;
    }
    let r = dist / range;
    let fade = clamp(1.0 - r * r * r * r, 0.0, 1.0);
    return inv_sq * fade * fade;
}

@fragment
fn fs_main(in: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    var n = normalize(in.world_normal);
    if (!front) {
        n = -n;
    }

    var light = uniforms.ambient.rgb;
    light += uniforms.sun_color.rgb * max(dot(n, uniforms.sun_dir.xyz), 0.0);

    if (uniforms.point_color.w > 0.5) {
        let to_light = uniforms.point_pos.xyz - in.world_pos;
        let dist = length(to_light);
        let l = to_light / max(dist, 1e-4);
        let falloff = point_falloff(dist, uniforms.point_pos.w);
        light += uniforms.point_color.rgb * max(dot(n, l), 0.0) * falloff;
    }

    var rgb = in.color.rgb * light + in.emissive;

    if (uniforms.fog_color.w > 0.5) {
        let dist = distance(in.world_pos, uniforms.camera_pos.xyz);
        let f = clamp(
            (dist - uniforms.fog_range.x) / (uniforms.fog_range.y - uniforms.fog_range.x),
            0.0,
            1.0,
        );
        rgb = mix(rgb, uniforms.fog_color.rgb, f);
    }

    return vec4<f32>(rgb, in.color.a);
}
"#;

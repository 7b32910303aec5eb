//! CPU-side triangle meshes for each shape template.
//!
//! Layouts follow the usual conventions: boxes, cones and cylinders are
//! centered with height along +Y and the first radial vertex on +Z; planes
//! and circles lie in XY facing +Z. Front faces wind counter-clockwise.

use bytemuck::{Pod, Zeroable};
use std::f32::consts::TAU;
use village_scene::ShapeTemplate;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    fn push(&mut self, position: [f32; 3], normal: [f32; 3]) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex { position, normal });
        index
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build the mesh for a shape template.
pub fn build_mesh(shape: &ShapeTemplate) -> MeshData {
    match *shape {
        ShapeTemplate::Box {
            width,
            height,
            depth,
        } => box_mesh(width, height, depth),
        ShapeTemplate::Cone {
            radius,
            height,
            radial_segments,
        } => cylinder_mesh(0.0, radius, height, radial_segments),
        ShapeTemplate::Cylinder {
            radius_top,
            radius_bottom,
            height,
            radial_segments,
        } => cylinder_mesh(radius_top, radius_bottom, height, radial_segments),
        ShapeTemplate::Plane { width, height } => plane_mesh(width, height),
        ShapeTemplate::Circle { radius, segments } => circle_mesh(radius, segments),
    }
}

fn box_mesh(width: f32, height: f32, depth: f32) -> MeshData {
    let (x, y, z) = (width * 0.5, height * 0.5, depth * 0.5);
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0],  [[-x, -y,  z], [ x, -y,  z], [ x,  y,  z], [-x,  y,  z]]),
        ([0.0, 0.0, -1.0], [[ x, -y, -z], [-x, -y, -z], [-x,  y, -z], [ x,  y, -z]]),
        ([1.0, 0.0, 0.0],  [[ x, -y,  z], [ x, -y, -z], [ x,  y, -z], [ x,  y,  z]]),
        ([-1.0, 0.0, 0.0], [[-x, -y, -z], [-x, -y,  z], [-x,  y,  z], [-x,  y, -z]]),
        ([0.0, 1.0, 0.0],  [[-x,  y,  z], [ x,  y,  z], [ x,  y, -z], [-x,  y, -z]]),
        ([0.0, -1.0, 0.0], [[-x, -y, -z], [ x, -y, -z], [ x, -y,  z], [-x, -y,  z]]),
    ];
    let mut mesh = MeshData::default();
    for (normal, corners) in faces {
        let base = mesh.vertices.len() as u32;
        for corner in corners {
            mesh.push(corner, normal);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

/// Open or capped cylinder; a zero top radius gives a cone.
fn cylinder_mesh(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> MeshData {
    let half = height * 0.5;
    let slope = (radius_bottom - radius_top) / height;
    let mut mesh = MeshData::default();

    let mut top = Vec::with_capacity(segments as usize + 1);
    let mut bottom = Vec::with_capacity(segments as usize + 1);
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        let n = normalize([sin, slope, cos]);
        top.push(mesh.push([radius_top * sin, half, radius_top * cos], n));
        bottom.push(mesh.push([radius_bottom * sin, -half, radius_bottom * cos], n));
    }
    for i in 0..segments as usize {
        let (a, b, c, d) = (top[i], bottom[i], bottom[i + 1], top[i + 1]);
        mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    if radius_top > 0.0 {
        cap(&mut mesh, radius_top, half, segments, true);
    }
    if radius_bottom > 0.0 {
        cap(&mut mesh, radius_bottom, -half, segments, false);
    }
    mesh
}

fn cap(mesh: &mut MeshData, radius: f32, y: f32, segments: u32, up: bool) {
    let normal = if up { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };
    let center = mesh.push([0.0, y, 0.0], normal);
    let ring: Vec<u32> = (0..=segments)
        .map(|i| {
            let theta = i as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            mesh.push([radius * sin, y, radius * cos], normal)
        })
        .collect();
    for pair in ring.windows(2) {
        if up {
            mesh.indices.extend_from_slice(&[center, pair[0], pair[1]]);
        } else {
            mesh.indices.extend_from_slice(&[center, pair[1], pair[0]]);
        }
    }
}

fn plane_mesh(width: f32, height: f32) -> MeshData {
    let (x, y) = (width * 0.5, height * 0.5);
    let n = [0.0, 0.0, 1.0];
    let mut mesh = MeshData::default();
    for corner in [[-x, -y, 0.0], [x, -y, 0.0], [x, y, 0.0], [-x, y, 0.0]] {
        mesh.push(corner, n);
    }
    mesh.indices = vec![0, 1, 2, 2, 3, 0];
    mesh
}

fn circle_mesh(radius: f32, segments: u32) -> MeshData {
    let n = [0.0, 0.0, 1.0];
    let mut mesh = MeshData::default();
    let center = mesh.push([0.0, 0.0, 0.0], n);
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        mesh.push([radius * cos, radius * sin, 0.0], n);
    }
    for i in 0..segments {
        mesh.indices
            .extend_from_slice(&[center, center + 1 + i, center + 2 + i]);
    }
    mesh
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > 0.0 {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        v
    }
}

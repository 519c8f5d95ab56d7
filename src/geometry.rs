use std::f32::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Interleaved vertex layout shared by every mesh uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    fn new(position: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self {
            position: position.into(),
            normal: normal.into(),
            uv,
        }
    }
}

/// Triangle list produced from a [`Primitive`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Local space bounds of the mesh, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| Vec3::from(v.position)))
    }
}

/// Parametric shape descriptions. All shapes are centered on their local origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    /// Cylinder along the local Y axis.
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        segments: u32,
    },
    /// Cone along the local Y axis with its apex at the top.
    Cone {
        radius: f32,
        height: f32,
        segments: u32,
    },
    /// Plane in the local XY plane facing +Z.
    Plane { width: f32, height: f32 },
}

impl Primitive {
    pub fn cylinder(radius: f32, height: f32, segments: u32) -> Self {
        Self::Cylinder {
            radius_top: radius,
            radius_bottom: radius,
            height,
            segments,
        }
    }

    /// Size of the local axis aligned bounding box.
    pub fn extents(&self) -> Vec3 {
        match *self {
            Self::Box {
                width,
                height,
                depth,
            } => Vec3::new(width, height, depth),
            Self::Cylinder {
                radius_top,
                radius_bottom,
                height,
                ..
            } => {
                let radius = radius_top.max(radius_bottom);
                Vec3::new(radius * 2.0, height, radius * 2.0)
            }
            Self::Cone { radius, height, .. } => Vec3::new(radius * 2.0, height, radius * 2.0),
            Self::Plane { width, height } => Vec3::new(width, height, 0.0),
        }
    }

    /// Short lowercase name used in summaries and GPU labels.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Cylinder { .. } => "cylinder",
            Self::Cone { .. } => "cone",
            Self::Plane { .. } => "plane",
        }
    }

    pub fn mesh(&self) -> Mesh {
        match *self {
            Self::Box {
                width,
                height,
                depth,
            } => box_mesh(Vec3::new(width, height, depth)),
            Self::Cylinder {
                radius_top,
                radius_bottom,
                height,
                segments,
            } => cylinder_mesh(radius_top, radius_bottom, height, segments),
            Self::Cone {
                radius,
                height,
                segments,
            } => cylinder_mesh(0.0, radius, height, segments),
            Self::Plane { width, height } => plane_mesh(width, height),
        }
    }
}

/// Identifier for the GPU buffers backing one [`Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

impl GeometryId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A primitive together with its triangulated mesh. Shared between scene
/// nodes through `Arc`; the renderer keys its buffer cache on [`GeometryId`].
#[derive(Debug)]
pub struct Geometry {
    id: GeometryId,
    primitive: Primitive,
    mesh: Mesh,
}

impl Geometry {
    pub fn new(primitive: Primitive) -> Arc<Self> {
        Arc::new(Self {
            id: GeometryId::next(),
            mesh: primitive.mesh(),
            primitive,
        })
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

/// Position and orientation relative to a parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}

/// Axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Bounds of this box after applying `matrix`, computed from its corners.
    pub fn transformed(&self, matrix: Mat4) -> Aabb {
        let corners = (0..8).map(|i| {
            let pick = |bit: usize, lo: f32, hi: f32| if i & bit == 0 { lo } else { hi };
            let corner = Vec3::new(
                pick(1, self.min.x, self.max.x),
                pick(2, self.min.y, self.max.y),
                pick(4, self.min.z, self.max.z),
            );
            matrix.transform_point3(corner)
        });
        // eight corners are always present
        Aabb::from_points(corners).unwrap_or(*self)
    }
}

fn box_mesh(size: Vec3) -> Mesh {
    let half = size * 0.5;
    // (normal, u axis, v axis) with u x v == normal so faces wind counter clockwise
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let mut mesh = Mesh::default();
    for (normal, u, v) in faces {
        let center = normal * half;
        let half_u = u.abs().dot(half);
        let half_v = v.abs().dot(half);
        push_quad(&mut mesh, center, u * half_u, v * half_v, normal);
    }
    mesh
}

fn plane_mesh(width: f32, height: f32) -> Mesh {
    let mut mesh = Mesh::default();
    push_quad(
        &mut mesh,
        Vec3::ZERO,
        Vec3::X * (width * 0.5),
        Vec3::Y * (height * 0.5),
        Vec3::Z,
    );
    mesh
}

fn push_quad(mesh: &mut Mesh, center: Vec3, u: Vec3, v: Vec3, normal: Vec3) {
    let base = mesh.vertices.len() as u32;
    let corners = [
        (-1.0, -1.0, [0.0, 1.0]),
        (1.0, -1.0, [1.0, 1.0]),
        (1.0, 1.0, [1.0, 0.0]),
        (-1.0, 1.0, [0.0, 0.0]),
    ];
    for (su, sv, uv) in corners {
        mesh.vertices
            .push(Vertex::new(center + u * su + v * sv, normal, uv));
    }
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

fn cylinder_mesh(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Mesh {
    let segments = segments.max(3);
    let half = height * 0.5;
    let slope = if height > 0.0 {
        (radius_bottom - radius_top) / height
    } else {
        0.0
    };
    let mut mesh = Mesh::default();

    // row 0 is the top ring, row 1 the bottom ring
    for row in 0..=1u32 {
        let v = row as f32;
        let radius = radius_top + v * (radius_bottom - radius_top);
        let y = half - v * height;
        for col in 0..=segments {
            let u = col as f32 / segments as f32;
            let (sin, cos) = (u * TAU).sin_cos();
            let position = Vec3::new(radius * sin, y, radius * cos);
            let normal = Vec3::new(sin, slope, cos).normalize();
            mesh.vertices.push(Vertex::new(position, normal, [u, v]));
        }
    }
    let stride = segments + 1;
    for col in 0..segments {
        let a = col;
        let b = stride + col;
        let c = stride + col + 1;
        let d = col + 1;
        mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    if radius_top > 0.0 {
        push_cap(&mut mesh, radius_top, half, segments, true);
    }
    if radius_bottom > 0.0 {
        push_cap(&mut mesh, radius_bottom, -half, segments, false);
    }
    mesh
}

fn push_cap(mesh: &mut Mesh, radius: f32, y: f32, segments: u32, top: bool) {
    let normal = if top { Vec3::Y } else { Vec3::NEG_Y };
    let center = mesh.vertices.len() as u32;
    mesh.vertices
        .push(Vertex::new(Vec3::new(0.0, y, 0.0), normal, [0.5, 0.5]));
    for col in 0..=segments {
        let (sin, cos) = (col as f32 / segments as f32 * TAU).sin_cos();
        mesh.vertices.push(Vertex::new(
            Vec3::new(radius * sin, y, radius * cos),
            normal,
            [sin * 0.5 + 0.5, cos * 0.5 + 0.5],
        ));
    }
    for col in 0..segments {
        let current = center + 1 + col;
        let next = current + 1;
        if top {
            mesh.indices.extend_from_slice(&[center, current, next]);
        } else {
            mesh.indices.extend_from_slice(&[center, next, current]);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).abs().max_element() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn box_bounds_match_dimensions() {
        let mesh = Primitive::Box {
            width: 1.8,
            height: 3.8,
            depth: 0.05,
        }
        .mesh();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        let bounds = mesh.bounds().unwrap();
        assert_vec_close(bounds.size(), Vec3::new(1.8, 3.8, 0.05));
        assert_vec_close(bounds.min + bounds.max, Vec3::ZERO);
    }

    #[test]
    fn box_faces_wind_towards_their_normal() {
        let mesh = Primitive::Box {
            width: 1.0,
            height: 2.0,
            depth: 3.0,
        }
        .mesh();
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize]);
            let face = (Vec3::from(b.position) - Vec3::from(a.position))
                .cross(Vec3::from(c.position) - Vec3::from(a.position));
            assert!(face.dot(Vec3::from(a.normal)) > 0.0);
        }
    }

    #[test]
    fn cylinder_spans_its_height_and_radius() {
        let mesh = Primitive::cylinder(0.05, 0.2, 32).mesh();
        let bounds = mesh.bounds().unwrap();
        assert_vec_close(bounds.size(), Vec3::new(0.1, 0.2, 0.1));
        for vertex in &mesh.vertices {
            assert!((Vec3::from(vertex.normal).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn cone_has_a_single_cap_and_apex() {
        let mesh = Primitive::Cone {
            radius: 0.75,
            height: 1.5,
            segments: 4,
        }
        .mesh();
        let bounds = mesh.bounds().unwrap();
        assert!((bounds.max.y - 0.75).abs() < 1e-6);
        assert!((bounds.min.y + 0.75).abs() < 1e-6);
        let apex_count = mesh
            .vertices
            .iter()
            .filter(|v| (v.position[1] - 0.75).abs() < 1e-6)
            .count();
        // top ring collapses to the apex, no top cap
        assert_eq!(apex_count, 5);
    }

    #[test]
    fn transformed_bounds_follow_rotation() {
        let bounds = Primitive::cylinder(0.05, 0.2, 32).mesh().bounds().unwrap();
        let rotation = Transform::IDENTITY.with_rotation(Quat::from_rotation_z(FRAC_PI_2));
        let rotated = bounds.transformed(rotation.matrix());
        assert!((rotated.size().x - 0.2).abs() < 1e-5);
        assert!((rotated.size().y - 0.1).abs() < 1e-5);
    }

    #[test]
    fn geometry_ids_are_unique() {
        let a = Geometry::new(Primitive::Plane {
            width: 1.0,
            height: 1.0,
        });
        let b = Geometry::new(*a.primitive());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.primitive(), b.primitive());
    }
}

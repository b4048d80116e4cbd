//! Unit meshes for the four primitive kinds
//!
//! Every visual shape is drawn as a scaled instance of one unit mesh: a cube
//! of edge 1, a sphere of radius 1, and a cylinder and cone of radius 1 and
//! length 1 along Z. The cone's base sits at +Z and its apex at -Z.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use vd_core::VisualShape;

use crate::vertex::{MeshVertex, PrimitiveInstance};

const SPHERE_STACKS: u32 = 16;
const SPHERE_SLICES: u32 = 24;
const ROUND_SEGMENTS: u32 = 24;

/// Mesh family a visual shape is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Unit cube
    Cuboid,
    /// Unit sphere
    Sphere,
    /// Unit cylinder along Z
    Cylinder,
    /// Unit cone along Z
    Cone,
}

impl PrimitiveKind {
    /// All kinds in batch order
    pub const ALL: [PrimitiveKind; 4] = [
        PrimitiveKind::Cuboid,
        PrimitiveKind::Sphere,
        PrimitiveKind::Cylinder,
        PrimitiveKind::Cone,
    ];

    /// Position of this kind in [`InstanceBatches`]
    pub fn index(self) -> usize {
        match self {
            PrimitiveKind::Cuboid => 0,
            PrimitiveKind::Sphere => 1,
            PrimitiveKind::Cylinder => 2,
            PrimitiveKind::Cone => 3,
        }
    }

    /// Build the unit mesh for this kind
    pub fn mesh(self) -> PrimitiveMesh {
        match self {
            PrimitiveKind::Cuboid => cube_mesh(),
            PrimitiveKind::Sphere => sphere_mesh(SPHERE_STACKS, SPHERE_SLICES),
            PrimitiveKind::Cylinder => cylinder_mesh(ROUND_SEGMENTS),
            PrimitiveKind::Cone => cone_mesh(ROUND_SEGMENTS),
        }
    }
}

/// Per-kind instance lists, indexed by [`PrimitiveKind::index`]
pub type InstanceBatches = [Vec<PrimitiveInstance>; 4];

/// Indexed triangle mesh
#[derive(Debug, Clone, Default)]
pub struct PrimitiveMesh {
    /// Vertices
    pub vertices: Vec<MeshVertex>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl PrimitiveMesh {
    fn push(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(MeshVertex {
            position: position.to_array(),
            normal: normal.to_array(),
        });
        index
    }

    fn quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }
}

/// Mesh kind and per-axis scale that turn a unit mesh into `shape`
pub fn unit_transform(shape: &VisualShape) -> (PrimitiveKind, Vec3) {
    match *shape {
        VisualShape::Cuboid { size } => (PrimitiveKind::Cuboid, size),
        VisualShape::Sphere { radius } => (PrimitiveKind::Sphere, Vec3::splat(radius)),
        VisualShape::Cylinder { radius, length } => {
            (PrimitiveKind::Cylinder, Vec3::new(radius, radius, length))
        }
        VisualShape::Cone { radius, length } => {
            (PrimitiveKind::Cone, Vec3::new(radius, radius, length))
        }
    }
}

fn cube_mesh() -> PrimitiveMesh {
    // (normal, u, v) with u x v = normal
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let mut mesh = PrimitiveMesh::default();
    for (normal, u, v) in FACES {
        let center = normal * 0.5;
        let (u, v) = (u * 0.5, v * 0.5);
        let a = mesh.push(center - u - v, normal);
        let b = mesh.push(center + u - v, normal);
        let c = mesh.push(center + u + v, normal);
        let d = mesh.push(center - u + v, normal);
        mesh.quad(a, b, c, d);
    }
    mesh
}

fn sphere_mesh(stacks: u32, slices: u32) -> PrimitiveMesh {
    let mut mesh = PrimitiveMesh::default();
    for stack in 0..=stacks {
        let polar = std::f32::consts::PI * stack as f32 / stacks as f32;
        let (ring, y) = polar.sin_cos();
        for slice in 0..=slices {
            let azimuth = TAU * slice as f32 / slices as f32;
            let (sin, cos) = azimuth.sin_cos();
            let point = Vec3::new(ring * cos, y, ring * sin);
            mesh.push(point, point);
        }
    }

    let row = slices + 1;
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * row + slice;
            let b = a + row;
            mesh.quad(a, a + 1, b + 1, b);
        }
    }
    mesh
}

/// Unit circle point at segment `i`
fn rim(i: u32, segments: u32) -> Vec2 {
    let (sin, cos) = (TAU * i as f32 / segments as f32).sin_cos();
    Vec2::new(cos, sin)
}

/// Flat disc at `z` facing `normal_z`
fn cap(mesh: &mut PrimitiveMesh, segments: u32, z: f32, normal_z: f32) {
    let normal = Vec3::Z * normal_z;
    let center = mesh.push(Vec3::new(0.0, 0.0, z), normal);
    let first = mesh.vertices.len() as u32;
    for i in 0..=segments {
        let p = rim(i, segments);
        mesh.push(Vec3::new(p.x, p.y, z), normal);
    }
    for i in 0..segments {
        mesh.indices
            .extend_from_slice(&[center, first + i, first + i + 1]);
    }
}

fn cylinder_mesh(segments: u32) -> PrimitiveMesh {
    let mut mesh = PrimitiveMesh::default();
    let first = mesh.vertices.len() as u32;
    for i in 0..=segments {
        let p = rim(i, segments);
        let normal = Vec3::new(p.x, p.y, 0.0);
        mesh.push(Vec3::new(p.x, p.y, -0.5), normal);
        mesh.push(Vec3::new(p.x, p.y, 0.5), normal);
    }
    for i in 0..segments {
        let a = first + i * 2;
        mesh.quad(a, a + 2, a + 3, a + 1);
    }
    cap(&mut mesh, segments, 0.5, 1.0);
    cap(&mut mesh, segments, -0.5, -1.0);
    mesh
}

fn cone_mesh(segments: u32) -> PrimitiveMesh {
    let mut mesh = PrimitiveMesh::default();
    // Radius grows by 1 per unit of length from the apex, so the side
    // normal leans back towards the apex at 45 degrees
    for i in 0..segments {
        let (p0, p1) = (rim(i, segments), rim(i + 1, segments));
        let mid = rim(2 * i + 1, segments * 2);
        let n0 = Vec3::new(p0.x, p0.y, -1.0).normalize();
        let n1 = Vec3::new(p1.x, p1.y, -1.0).normalize();
        let apex_normal = Vec3::new(mid.x, mid.y, -1.0).normalize();
        let a = mesh.push(Vec3::new(p0.x, p0.y, 0.5), n0);
        let b = mesh.push(Vec3::new(p1.x, p1.y, 0.5), n1);
        let apex = mesh.push(Vec3::new(0.0, 0.0, -0.5), apex_normal);
        mesh.indices.extend_from_slice(&[a, b, apex]);
    }
    cap(&mut mesh, segments, 0.5, 1.0);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn check_indices(mesh: &PrimitiveMesh) {
        assert_eq!(mesh.indices.len() % 3, 0);
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|i| *i < count));
        for vertex in &mesh.vertices {
            assert_relative_eq!(Vec3::from_array(vertex.normal).length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_cube_spans_unit_edge() {
        let mesh = PrimitiveKind::Cuboid.mesh();
        check_indices(&mesh);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for vertex in &mesh.vertices {
            assert!(vertex.position.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn test_sphere_vertices_on_unit_radius() {
        let mesh = PrimitiveKind::Sphere.mesh();
        check_indices(&mesh);
        for vertex in &mesh.vertices {
            assert_relative_eq!(Vec3::from_array(vertex.position).length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_cylinder_and_cone_lie_along_z() {
        for kind in [PrimitiveKind::Cylinder, PrimitiveKind::Cone] {
            let mesh = kind.mesh();
            check_indices(&mesh);
            for vertex in &mesh.vertices {
                let p = Vec3::from_array(vertex.position);
                assert!(p.z.abs() <= 0.5 + 1e-6);
                assert!(p.truncate().length() <= 1.0 + 1e-5);
            }
        }

        // Apex at -Z, base rim at +Z
        let cone = PrimitiveKind::Cone.mesh();
        assert!(cone.vertices.iter().any(|v| v.position == [0.0, 0.0, -0.5]));
        let base: Vec<_> = cone
            .vertices
            .iter()
            .filter(|v| Vec3::from_array(v.position).truncate().length() > 0.99)
            .collect();
        assert!(!base.is_empty());
        assert!(base.iter().all(|v| v.position[2] == 0.5));
    }

    #[test]
    fn test_unit_transform_scales() {
        let (kind, scale) = unit_transform(&VisualShape::Cone {
            radius: 0.05,
            length: 0.3,
        });
        assert_eq!(kind, PrimitiveKind::Cone);
        assert_eq!(scale, Vec3::new(0.05, 0.05, 0.3));

        let size = Vec3::new(0.6, 0.8, 0.3);
        assert_eq!(
            unit_transform(&VisualShape::Cuboid { size }),
            (PrimitiveKind::Cuboid, size)
        );
    }

    #[test]
    fn test_kind_indices_are_distinct() {
        for (i, kind) in PrimitiveKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}

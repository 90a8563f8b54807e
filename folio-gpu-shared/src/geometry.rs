use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Interleaved position + normal vertex used by every lit mesh.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// CPU-side mesh ready for upload.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Append a flat-shaded triangle whose normal points away from the origin.
    /// Only valid for convex shapes centred on the origin.
    fn push_outward_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let mut normal = (b - a).cross(c - a).normalize_or_zero();
        let (b, c) = if normal.dot(a + b + c) < 0.0 {
            normal = -normal;
            (c, b)
        } else {
            (b, c)
        };
        let base = self.vertices.len() as u32;
        for p in [a, b, c] {
            self.vertices.push(MeshVertex {
                position: p.to_array(),
                normal: normal.to_array(),
            });
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

/// The fixed set of shapes the background scene is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Thin vertical bar of the decoration group.
    Bar,
    Octahedron,
    Icosahedron,
    Torus,
}

impl MeshKind {
    pub const ALL: [MeshKind; 4] = [
        MeshKind::Bar,
        MeshKind::Octahedron,
        MeshKind::Icosahedron,
        MeshKind::Torus,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Bar => "Bar",
            Self::Octahedron => "Octahedron",
            Self::Icosahedron => "Icosahedron",
            Self::Torus => "Torus",
        }
    }

    /// Generate the geometry for this shape at its scene dimensions.
    pub fn build(&self) -> MeshData {
        match self {
            Self::Bar => box_geometry(0.2, 2.0, 0.2),
            Self::Octahedron => octahedron(0.5),
            Self::Icosahedron => icosahedron(0.5),
            Self::Torus => torus(0.4, 0.1, 8, 20),
        }
    }
}

/// Axis-aligned box centred on the origin, 4 vertices per face.
pub fn box_geometry(width: f32, height: f32, depth: f32) -> MeshData {
    let h = Vec3::new(width, height, depth) * 0.5;
    // (normal, u axis, v axis) per face; u x v == normal keeps winding CCW.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut mesh = MeshData::default();
    for (n, u, v) in faces {
        let base = mesh.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (n + u * su + v * sv) * h;
            mesh.vertices.push(MeshVertex {
                position: p.to_array(),
                normal: n.to_array(),
            });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// Regular octahedron with the given circumradius, flat shaded.
pub fn octahedron(radius: f32) -> MeshData {
    let v = [
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ];
    let faces: [[usize; 3]; 8] = [
        [0, 2, 4], [0, 4, 3], [0, 3, 5], [0, 5, 2],
        [1, 2, 5], [1, 5, 3], [1, 3, 4], [1, 4, 2],
    ];
    polyhedron(&v, &faces, radius)
}

/// Regular icosahedron with the given circumradius, flat shaded.
pub fn icosahedron(radius: f32) -> MeshData {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let v = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ];
    let faces: [[usize; 3]; 20] = [
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];
    polyhedron(&v, &faces, radius)
}

fn polyhedron(vertices: &[Vec3], faces: &[[usize; 3]], radius: f32) -> MeshData {
    let mut mesh = MeshData::default();
    for face in faces {
        let [a, b, c] = face.map(|i| vertices[i].normalize() * radius);
        mesh.push_outward_triangle(a, b, c);
    }
    mesh
}

/// Torus in the XY plane with smooth normals.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();

    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            mesh.vertices.push(MeshVertex {
                position: position.to_array(),
                normal: (position - center).normalize_or_zero().to_array(),
            });
        }
    }

    let row = tubular_segments + 1;
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

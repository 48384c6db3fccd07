//! Procedural geometry for the three shapes the viewer knows.
//!
//! Every generator produces counter-clockwise front faces, which is what the
//! pipelines cull against. The skybox is meant to be seen from inside, so its
//! faces wind the other way and its normals point inward.

use std::f32::consts::PI;

use cgmath::Vector3;

use crate::data_structures::vertex::{MeshData, Vertex};

pub const SPHERE_SECTORS: u32 = 36;
pub const SPHERE_STACKS: u32 = 18;

/// A UV sphere. `u` runs around the equator, `v` from the north pole (0) to the south pole (1).
pub fn uv_sphere(radius: f32, sectors: u32, stacks: u32) -> MeshData {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);
    let mut vertices = Vec::with_capacity(((stacks + 1) * (sectors + 1)) as usize);

    for i in 0..=stacks {
        let phi = PI / 2.0 - i as f32 * PI / stacks as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for j in 0..=sectors {
            let theta = j as f32 * 2.0 * PI / sectors as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let normal = [cos_phi * cos_theta, sin_phi, -cos_phi * sin_theta];
            vertices.push(Vertex::new(
                normal.map(|n| n * radius),
                normal,
                [j as f32 / sectors as f32, i as f32 / stacks as f32],
            ));
        }
    }

    let mut indices = Vec::with_capacity((6 * sectors * (stacks - 1)) as usize);
    for i in 0..stacks {
        let mut k1 = i * (sectors + 1);
        let mut k2 = k1 + sectors + 1;
        for _ in 0..sectors {
            // The first and last stacks collapse into the poles: one triangle per sector.
            if i != 0 {
                indices.extend_from_slice(&[k1, k2, k1 + 1]);
            }
            if i != stacks - 1 {
                indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
            }
            k1 += 1;
            k2 += 1;
        }
    }

    MeshData { vertices, indices }
}

// (normal, u axis, v axis) with u x v == normal
const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
];

fn box_faces(size: Vector3<f32>, inward: bool) -> MeshData {
    let half = size / 2.0;
    let scale = |v: [f32; 3]| Vector3::new(v[0] * half.x, v[1] * half.y, v[2] * half.z);

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in FACES {
        let centre = scale(normal);
        let (u, v) = (scale(u), scale(v));
        let base = vertices.len() as u32;
        let face_normal = if inward { normal.map(|n| -n) } else { normal };
        let corners = [
            (centre - u - v, [0.0, 1.0]),
            (centre + u - v, [1.0, 1.0]),
            (centre + u + v, [1.0, 0.0]),
            (centre - u + v, [0.0, 0.0]),
        ];
        for (position, tex_coords) in corners {
            vertices.push(Vertex::new(position.into(), face_normal, tex_coords));
        }
        if inward {
            indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        } else {
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }
    MeshData { vertices, indices }
}

/// An axis-aligned box centred on the origin with flat per-face normals.
pub fn cuboid(size: Vector3<f32>) -> MeshData {
    box_faces(size, false)
}

/// A cube of edge `size` seen from the inside.
pub fn skybox(size: f32) -> MeshData {
    box_faces(Vector3::new(size, size, size), true)
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;

    fn face_normal(mesh: &MeshData, tri: &[u32]) -> (Vector3<f32>, Vector3<f32>) {
        let p = |i: u32| Vector3::from(mesh.vertices[i as usize].position);
        let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
        ((b - a).cross(c - a), (a + b + c) / 3.0)
    }

    fn assert_indices_in_range(mesh: &MeshData) {
        assert_eq!(mesh.indices.len() % 3, 0);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn sphere_has_expected_counts() {
        let mesh = uv_sphere(1.0, SPHERE_SECTORS, SPHERE_STACKS);
        assert_eq!(mesh.vertices.len(), 19 * 37);
        assert_eq!(mesh.indices.len(), 6 * 36 * 17);
        assert_indices_in_range(&mesh);
    }

    #[test]
    fn sphere_vertices_lie_on_the_radius_with_unit_normals() {
        let mesh = uv_sphere(2.5, 12, 8);
        for v in &mesh.vertices {
            let p = Vector3::from(v.position);
            assert!((p.magnitude() - 2.5).abs() < 1e-4);
            assert!((Vector3::from(v.normal).magnitude() - 1.0).abs() < 1e-5);
            assert!(v.tex_coords.iter().all(|t| (0.0..=1.0).contains(t)));
        }
    }

    #[test]
    fn sphere_faces_point_outward() {
        let mesh = uv_sphere(1.0, 16, 8);
        for tri in mesh.indices.chunks(3) {
            let (normal, centroid) = face_normal(&mesh, tri);
            assert!(normal.magnitude() > 0.0, "degenerate triangle {tri:?}");
            assert!(normal.dot(centroid) > 0.0, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn cuboid_spans_its_size_and_faces_outward() {
        let mesh = cuboid(Vector3::new(1.5, 1.5, 1.5));
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_indices_in_range(&mesh);
        for v in &mesh.vertices {
            assert!(v.position.iter().all(|c| (c.abs() - 0.75).abs() < 1e-6));
        }
        for tri in mesh.indices.chunks(3) {
            let (normal, centroid) = face_normal(&mesh, tri);
            assert!(normal.dot(centroid) > 0.0);
            let stored = Vector3::from(mesh.vertices[tri[0] as usize].normal);
            assert!(normal.normalize().dot(stored) > 0.999);
        }
    }

    #[test]
    fn skybox_faces_point_inward() {
        let mesh = skybox(20.0);
        assert_indices_in_range(&mesh);
        for tri in mesh.indices.chunks(3) {
            let (normal, centroid) = face_normal(&mesh, tri);
            assert!(normal.dot(centroid) < 0.0);
            let stored = Vector3::from(mesh.vertices[tri[0] as usize].normal);
            assert!(normal.normalize().dot(stored) > 0.999);
        }
    }
}

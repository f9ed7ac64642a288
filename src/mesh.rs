// Primitive mesh generation for the goal scene

use glam::{Mat4, Vec3};
use std::f32::consts::PI;

/// Vertex format shared by every mesh in the scene.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    /// Vertex buffer layout: position at location 0, normal at location 1.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshTopology {
    Triangles,
    Lines,
}

/// CPU-side mesh geometry. Built once during scene construction and
/// uploaded to the GPU unchanged.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub topology: MeshTopology,
}

impl MeshData {
    fn triangles(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            topology: MeshTopology::Triangles,
        }
    }

    /// Bake a matrix into the geometry: positions by the full matrix,
    /// normals by its linear part (renormalized).
    pub fn apply_matrix(&mut self, m: Mat4) {
        let linear = glam::Mat3::from_mat4(m);
        for v in &mut self.vertices {
            let p = m.transform_point3(Vec3::from_array(v.position));
            v.position = p.to_array();
            let n = (linear * Vec3::from_array(v.normal)).normalize_or_zero();
            v.normal = n.to_array();
        }
    }

    /// Clone-and-translate, for bilaterally symmetric parts.
    pub fn translated(&self, x: f32, y: f32, z: f32) -> Self {
        let mut out = self.clone();
        out.apply_matrix(Mat4::from_translation(Vec3::new(x, y, z)));
        out
    }

    /// Axis-aligned bounds of the baked geometry.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for v in &self.vertices {
            let p = Vec3::from_array(v.position);
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }

    /// Closed cylinder of the given radius and height, centered at the
    /// origin with the axis along +Y.
    pub fn cylinder(radius: f32, height: f32, segments: u32) -> Self {
        let half = height / 2.0;
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        // Side wall: two rings with outward normals.
        for ring in 0..2 {
            let y = if ring == 0 { -half } else { half };
            for seg in 0..=segments {
                let theta = 2.0 * PI * seg as f32 / segments as f32;
                let (sin, cos) = theta.sin_cos();
                vertices.push(Vertex::new(
                    Vec3::new(radius * cos, y, radius * sin),
                    Vec3::new(cos, 0.0, sin),
                ));
            }
        }
        let ring_stride = segments + 1;
        for seg in 0..segments {
            let a = seg;
            let b = seg + 1;
            let c = ring_stride + seg;
            let d = ring_stride + seg + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }

        // Caps: center vertex plus a rim per cap.
        for (y, normal) in [(-half, -Vec3::Y), (half, Vec3::Y)] {
            let center = vertices.len() as u32;
            vertices.push(Vertex::new(Vec3::new(0.0, y, 0.0), normal));
            for seg in 0..=segments {
                let theta = 2.0 * PI * seg as f32 / segments as f32;
                let (sin, cos) = theta.sin_cos();
                vertices.push(Vertex::new(
                    Vec3::new(radius * cos, y, radius * sin),
                    normal,
                ));
            }
            for seg in 0..segments {
                let rim = center + 1 + seg;
                if y < 0.0 {
                    indices.extend_from_slice(&[center, rim, rim + 1]);
                } else {
                    indices.extend_from_slice(&[center, rim + 1, rim]);
                }
            }
        }

        Self::triangles(vertices, indices)
    }

    /// Axis-aligned box centered at the origin, one normal per face.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
        let faces: [(Vec3, [Vec3; 4]); 6] = [
            // +Z
            (
                Vec3::Z,
                [
                    Vec3::new(-x, -y, z),
                    Vec3::new(x, -y, z),
                    Vec3::new(x, y, z),
                    Vec3::new(-x, y, z),
                ],
            ),
            // -Z
            (
                -Vec3::Z,
                [
                    Vec3::new(x, -y, -z),
                    Vec3::new(-x, -y, -z),
                    Vec3::new(-x, y, -z),
                    Vec3::new(x, y, -z),
                ],
            ),
            // +Y
            (
                Vec3::Y,
                [
                    Vec3::new(-x, y, z),
                    Vec3::new(x, y, z),
                    Vec3::new(x, y, -z),
                    Vec3::new(-x, y, -z),
                ],
            ),
            // -Y
            (
                -Vec3::Y,
                [
                    Vec3::new(-x, -y, -z),
                    Vec3::new(x, -y, -z),
                    Vec3::new(x, -y, z),
                    Vec3::new(-x, -y, z),
                ],
            ),
            // +X
            (
                Vec3::X,
                [
                    Vec3::new(x, -y, z),
                    Vec3::new(x, -y, -z),
                    Vec3::new(x, y, -z),
                    Vec3::new(x, y, z),
                ],
            ),
            // -X
            (
                -Vec3::X,
                [
                    Vec3::new(-x, -y, -z),
                    Vec3::new(-x, -y, z),
                    Vec3::new(-x, y, z),
                    Vec3::new(-x, y, -z),
                ],
            ),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            let base = vertices.len() as u32;
            for corner in corners {
                vertices.push(Vertex::new(corner, normal));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        Self::triangles(vertices, indices)
    }

    /// UV sphere centered at the origin.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();
            for seg in 0..=segments {
                let theta = 2.0 * PI * seg as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();
                let n = Vec3::new(x, y, z);
                vertices.push(Vertex::new(n * radius, n));
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;
                indices.extend_from_slice(&[
                    current,
                    next,
                    current + 1,
                    current + 1,
                    next,
                    next + 1,
                ]);
            }
        }

        Self::triangles(vertices, indices)
    }

    /// Torus in the XY plane: a tube of `tube_radius` swept around a ring of
    /// `ring_radius` centered at the origin.
    pub fn torus(
        ring_radius: f32,
        tube_radius: f32,
        radial_segments: u32,
        tubular_segments: u32,
    ) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for j in 0..=radial_segments {
            let phi = 2.0 * PI * j as f32 / radial_segments as f32;
            for i in 0..=tubular_segments {
                let theta = 2.0 * PI * i as f32 / tubular_segments as f32;
                let center = Vec3::new(ring_radius * theta.cos(), ring_radius * theta.sin(), 0.0);
                let position = Vec3::new(
                    (ring_radius + tube_radius * phi.cos()) * theta.cos(),
                    (ring_radius + tube_radius * phi.cos()) * theta.sin(),
                    tube_radius * phi.sin(),
                );
                let normal = (position - center).normalize_or_zero();
                vertices.push(Vertex::new(position, normal));
            }
        }

        let stride = tubular_segments + 1;
        for j in 0..radial_segments {
            for i in 0..tubular_segments {
                let a = j * stride + i;
                let b = (j + 1) * stride + i;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        Self::triangles(vertices, indices)
    }

    /// Single double-sided triangle (both windings, opposing normals).
    pub fn triangle(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let front = (b - a).cross(c - a).normalize_or_zero();
        let vertices = vec![
            Vertex::new(a, front),
            Vertex::new(b, front),
            Vertex::new(c, front),
            Vertex::new(a, -front),
            Vertex::new(c, -front),
            Vertex::new(b, -front),
        ];
        let indices = vec![0, 1, 2, 3, 4, 5];
        Self::triangles(vertices, indices)
    }

    /// Line-list mesh from endpoint pairs (helper geometry).
    pub fn lines(segments: &[(Vec3, Vec3)]) -> Self {
        let mut vertices = Vec::with_capacity(segments.len() * 2);
        let mut indices = Vec::with_capacity(segments.len() * 2);
        for (a, b) in segments {
            let base = vertices.len() as u32;
            vertices.push(Vertex::new(*a, Vec3::ZERO));
            vertices.push(Vertex::new(*b, Vec3::ZERO));
            indices.extend_from_slice(&[base, base + 1]);
        }
        Self {
            vertices,
            indices,
            topology: MeshTopology::Lines,
        }
    }

    /// Square grid on the XZ plane, excluding the two center lines (those
    /// are drawn separately in a different color).
    pub fn grid(size: f32, divisions: u32) -> Self {
        let half = size / 2.0;
        let step = size / divisions as f32;
        let mut segments = Vec::new();
        for i in 0..=divisions {
            let offset = -half + i as f32 * step;
            if offset.abs() < step / 2.0 {
                continue; // center line
            }
            segments.push((Vec3::new(-half, 0.0, offset), Vec3::new(half, 0.0, offset)));
            segments.push((Vec3::new(offset, 0.0, -half), Vec3::new(offset, 0.0, half)));
        }
        Self::lines(&segments)
    }
}

use glam::{Mat4, Vec3};

use crate::error::GfxError;
use crate::gpu::{BufferTarget, Gpu, RenderContext, Topology};

/// Anything the shader program can draw with one indexed call.
pub trait Drawable<G: Gpu> {
    fn positions(&self) -> Option<&G::Buffer>;
    fn normals(&self) -> Option<&G::Buffer>;
    fn colors(&self) -> Option<&G::Buffer> {
        None
    }
    fn indices(&self) -> &G::Buffer;
    fn index_count(&self) -> i32;
    fn topology(&self) -> Topology {
        Topology::Triangles
    }
    fn model_matrix(&self) -> Mat4 {
        Mat4::IDENTITY
    }
}

/// CPU-side triangle geometry. Positions carry w = 1, normals w = 0.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub center: Vec3,
    pub positions: Vec<[f32; 4]>,
    pub normals: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

// (normal, u, v) per face, with u × v = normal so quads wind CCW from outside
const FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

impl MeshData {
    /// Cube of edge `size` around the origin whose faces are split into
    /// `2^segmentations` quads along each edge.
    pub fn cube(center: Vec3, size: f32, segmentations: u32) -> Self {
        let divisions = 1u32 << segmentations.min(crate::controls::SEGMENTATIONS_RANGE.1);
        let row = divisions + 1;
        let half = size * 0.5;
        let step = size / divisions as f32;

        let per_face = (row * row) as usize;
        let mut positions = Vec::with_capacity(per_face * 6);
        let mut normals = Vec::with_capacity(per_face * 6);
        let mut indices = Vec::with_capacity((divisions * divisions) as usize * 36);

        for (normal, u, v) in FACES {
            let base = positions.len() as u32;
            for j in 0..row {
                for i in 0..row {
                    let p = normal * half
                        + u * (-half + step * i as f32)
                        + v * (-half + step * j as f32);
                    positions.push(p.extend(1.0).to_array());
                    normals.push(normal.extend(0.0).to_array());
                }
            }
            for j in 0..divisions {
                for i in 0..divisions {
                    let a = base + j * row + i;
                    let b = a + 1;
                    let c = b + row;
                    let d = a + row;
                    indices.extend_from_slice(&[a, b, c, a, c, d]);
                }
            }
        }

        Self {
            center,
            positions,
            normals,
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Geometry living in GPU buffers.
pub struct GpuMesh<G: Gpu> {
    positions: G::Buffer,
    normals: G::Buffer,
    indices: G::Buffer,
    count: i32,
    model: Mat4,
}

impl<G: Gpu> GpuMesh<G> {
    pub fn upload(ctx: &RenderContext<G>, data: &MeshData) -> Result<Self, GfxError> {
        let gpu = ctx.gpu();
        let positions = gpu.create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(&data.positions))?;
        let normals = gpu.create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(&data.normals))?;
        let indices = gpu.create_buffer(BufferTarget::Index, bytemuck::cast_slice(&data.indices))?;
        Ok(Self {
            positions,
            normals,
            indices,
            count: data.indices.len() as i32,
            model: Mat4::from_translation(data.center),
        })
    }

    /// Deletes the buffers. The mesh is gone afterwards.
    pub fn release(self, ctx: &RenderContext<G>) {
        let gpu = ctx.gpu();
        gpu.delete_buffer(&self.positions);
        gpu.delete_buffer(&self.normals);
        gpu.delete_buffer(&self.indices);
    }
}

impl<G: Gpu> Drawable<G> for GpuMesh<G> {
    fn positions(&self) -> Option<&G::Buffer> {
        Some(&self.positions)
    }

    fn normals(&self) -> Option<&G::Buffer> {
        Some(&self.normals)
    }

    fn indices(&self) -> &G::Buffer {
        &self.indices
    }

    fn index_count(&self) -> i32 {
        self.count
    }

    fn model_matrix(&self) -> Mat4 {
        self.model
    }
}

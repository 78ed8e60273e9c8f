//! Graphics backend seam.
//!
//! Everything the demo sends to the GPU goes through [`Gpu`]. The browser
//! build implements it on top of WebGL2; [`trace::TraceGpu`] implements it
//! headlessly by recording the command stream.

use std::cell::Cell;

use crate::error::GfxError;

pub mod trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Vertex,
    Index,
}

/// Primitive topology used by an indexed draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    #[default]
    Triangles,
}

/// A single uniform upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major.
    Mat4([f32; 16]),
}

pub trait Gpu {
    type Shader;
    type Program;
    type Uniform;
    type Buffer;
    type Texture;

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<Self::Shader, GfxError>;
    fn link_program(&self, shaders: &[Self::Shader]) -> Result<Self::Program, GfxError>;
    fn use_program(&self, program: &Self::Program);

    /// `None` when the linked program has no active attribute with that name.
    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;
    /// `None` when the linked program has no active uniform with that name.
    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<Self::Uniform>;
    fn set_uniform(&self, location: &Self::Uniform, value: UniformValue);

    /// Creates an `size`³ single-channel byte texture with linear filtering and
    /// repeat wrapping on every axis.
    fn create_texture_3d(&self, size: u32, texels: &[u8]) -> Result<Self::Texture, GfxError>;
    fn bind_texture_3d(&self, unit: u32, texture: &Self::Texture);

    fn create_buffer(&self, target: BufferTarget, bytes: &[u8]) -> Result<Self::Buffer, GfxError>;
    fn delete_buffer(&self, buffer: &Self::Buffer);

    /// Binds `buffer` as a tightly packed float stream feeding `location`.
    fn enable_attrib(&self, location: u32, buffer: &Self::Buffer, components: i32);
    fn disable_attrib(&self, location: u32);
    fn bind_index_buffer(&self, buffer: &Self::Buffer);
    /// Draws `count` u32 indices from the bound index buffer.
    fn draw_elements(&self, topology: Topology, count: i32);

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, rgba: [f32; 4]);
    fn clear(&self);
    fn enable_depth_test(&self);
}

/// Owns the backend and the "currently bound program" token.
///
/// Programs are identified by an id handed out at link time, so several
/// contexts can coexist without sharing any global state.
pub struct RenderContext<G: Gpu> {
    gpu: G,
    active: Cell<Option<u32>>,
    next_program: Cell<u32>,
}

impl<G: Gpu> RenderContext<G> {
    pub fn new(gpu: G) -> Self {
        Self {
            gpu,
            active: Cell::new(None),
            next_program: Cell::new(0),
        }
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub(crate) fn allocate_program_id(&self) -> u32 {
        let id = self.next_program.get();
        self.next_program.set(id + 1);
        id
    }

    /// Issues `use_program` only when `id` is not already bound.
    pub(crate) fn bind_program(&self, id: u32, program: &G::Program) {
        if self.active.get() != Some(id) {
            self.gpu.use_program(program);
            self.active.set(Some(id));
        }
    }

    pub fn active_program(&self) -> Option<u32> {
        self.active.get()
    }
}

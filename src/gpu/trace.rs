//! Headless backend that records every call instead of drawing.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use super::{BufferTarget, Gpu, ShaderStage, Topology, UniformValue};
use crate::error::GfxError;
use crate::uniforms::{Attribute, Param};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CompileShader(ShaderStage),
    LinkProgram { id: u32, shaders: usize },
    UseProgram(u32),
    Uniform { name: String, value: UniformValue },
    CreateTexture3d { id: u32, size: u32, texels: usize },
    BindTexture3d { unit: u32, texture: u32 },
    CreateBuffer { id: u32, target: BufferTarget, bytes: usize },
    DeleteBuffer(u32),
    EnableAttrib { location: u32, buffer: u32, components: i32 },
    DisableAttrib(u32),
    BindIndexBuffer(u32),
    DrawElements { topology: Topology, count: i32 },
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    ClearColor([f32; 4]),
    Clear,
    EnableDepthTest,
}

/// Records commands and resolves only the names it was told the program declares.
pub struct TraceGpu {
    uniforms: HashSet<String>,
    attributes: Vec<String>,
    fail_compile: Option<String>,
    fail_link: Option<String>,
    fail_buffers: Cell<bool>,
    next_id: Cell<u32>,
    log: RefCell<Vec<Command>>,
}

impl Default for TraceGpu {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceGpu {
    /// A backend whose programs declare every uniform and attribute the magma
    /// shaders use.
    pub fn new() -> Self {
        Self::with_declared(
            Param::ALL.iter().map(|p| p.glsl_name()),
            Attribute::ALL.iter().map(|a| a.glsl_name()),
        )
    }

    pub fn with_declared<'a>(
        uniforms: impl IntoIterator<Item = &'a str>,
        attributes: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            uniforms: uniforms.into_iter().map(str::to_owned).collect(),
            attributes: attributes.into_iter().map(str::to_owned).collect(),
            fail_compile: None,
            fail_link: None,
            fail_buffers: Cell::new(false),
            next_id: Cell::new(1),
            log: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_compile(mut self, log: &str) -> Self {
        self.fail_compile = Some(log.to_owned());
        self
    }

    pub fn failing_link(mut self, log: &str) -> Self {
        self.fail_link = Some(log.to_owned());
        self
    }

    /// While set, every `create_buffer` call fails. Can be toggled on a
    /// backend already owned by a context.
    pub fn set_buffer_failure(&self, fail: bool) {
        self.fail_buffers.set(fail);
    }

    pub fn commands(&self) -> Vec<Command> {
        self.log.borrow().clone()
    }

    /// Drains the recorded commands.
    pub fn take(&self) -> Vec<Command> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    /// Every value written to the uniform called `name`, oldest first.
    pub fn uniform_writes(&self, name: &str) -> Vec<UniformValue> {
        self.log
            .borrow()
            .iter()
            .filter_map(|cmd| match cmd {
                Command::Uniform { name: n, value } if n == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    fn id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn push(&self, command: Command) {
        self.log.borrow_mut().push(command);
    }
}

impl Gpu for TraceGpu {
    type Shader = ShaderStage;
    type Program = u32;
    type Uniform = String;
    type Buffer = u32;
    type Texture = u32;

    fn compile_shader(&self, stage: ShaderStage, _source: &str) -> Result<ShaderStage, GfxError> {
        self.push(Command::CompileShader(stage));
        match &self.fail_compile {
            Some(log) => Err(GfxError::Compile {
                stage: stage.label(),
                log: log.clone(),
            }),
            None => Ok(stage),
        }
    }

    fn link_program(&self, shaders: &[ShaderStage]) -> Result<u32, GfxError> {
        if let Some(log) = &self.fail_link {
            return Err(GfxError::Link(log.clone()));
        }
        let id = self.id();
        self.push(Command::LinkProgram {
            id,
            shaders: shaders.len(),
        });
        Ok(id)
    }

    fn use_program(&self, program: &u32) {
        self.push(Command::UseProgram(*program));
    }

    fn attrib_location(&self, _program: &u32, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .position(|a| a == name)
            .map(|index| index as u32)
    }

    fn uniform_location(&self, _program: &u32, name: &str) -> Option<String> {
        self.uniforms.contains(name).then(|| name.to_owned())
    }

    fn set_uniform(&self, location: &String, value: UniformValue) {
        self.push(Command::Uniform {
            name: location.clone(),
            value,
        });
    }

    fn create_texture_3d(&self, size: u32, texels: &[u8]) -> Result<u32, GfxError> {
        let expected = (size as usize).pow(3);
        if texels.len() != expected {
            return Err(GfxError::TextureUpload(format!(
                "expected {expected} texels, got {}",
                texels.len()
            )));
        }
        let id = self.id();
        self.push(Command::CreateTexture3d {
            id,
            size,
            texels: texels.len(),
        });
        Ok(id)
    }

    fn bind_texture_3d(&self, unit: u32, texture: &u32) {
        self.push(Command::BindTexture3d {
            unit,
            texture: *texture,
        });
    }

    fn create_buffer(&self, target: BufferTarget, bytes: &[u8]) -> Result<u32, GfxError> {
        if self.fail_buffers.get() {
            return Err(GfxError::Create("buffer"));
        }
        let id = self.id();
        self.push(Command::CreateBuffer {
            id,
            target,
            bytes: bytes.len(),
        });
        Ok(id)
    }

    fn delete_buffer(&self, buffer: &u32) {
        self.push(Command::DeleteBuffer(*buffer));
    }

    fn enable_attrib(&self, location: u32, buffer: &u32, components: i32) {
        self.push(Command::EnableAttrib {
            location,
            buffer: *buffer,
            components,
        });
    }

    fn disable_attrib(&self, location: u32) {
        self.push(Command::DisableAttrib(location));
    }

    fn bind_index_buffer(&self, buffer: &u32) {
        self.push(Command::BindIndexBuffer(*buffer));
    }

    fn draw_elements(&self, topology: Topology, count: i32) {
        self.push(Command::DrawElements { topology, count });
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.push(Command::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.push(Command::ClearColor(rgba));
    }

    fn clear(&self) {
        self.push(Command::Clear);
    }

    fn enable_depth_test(&self) {
        self.push(Command::EnableDepthTest);
    }
}

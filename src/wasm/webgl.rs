use web_sys::{WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader, WebGlTexture, WebGlUniformLocation};

use crate::error::GfxError;
use crate::gpu::{BufferTarget, Gpu, ShaderStage, Topology, UniformValue};

/// [`Gpu`] on top of a WebGL2 context.
pub struct WebGl {
    gl: GL,
}

impl WebGl {
    pub fn new(gl: GL) -> Self {
        Self { gl }
    }

    fn buffer_target(target: BufferTarget) -> u32 {
        match target {
            BufferTarget::Vertex => GL::ARRAY_BUFFER,
            BufferTarget::Index => GL::ELEMENT_ARRAY_BUFFER,
        }
    }
}

impl Gpu for WebGl {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Uniform = WebGlUniformLocation;
    type Buffer = WebGlBuffer;
    type Texture = WebGlTexture;

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<WebGlShader, GfxError> {
        let kind = match stage {
            ShaderStage::Vertex => GL::VERTEX_SHADER,
            ShaderStage::Fragment => GL::FRAGMENT_SHADER,
        };
        let shader = self.gl.create_shader(kind).ok_or(GfxError::Create("shader"))?;
        self.gl.shader_source(&shader, source);
        self.gl.compile_shader(&shader);

        let compiled = self
            .gl
            .get_shader_parameter(&shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false);
        if compiled {
            Ok(shader)
        } else {
            let log = self.gl.get_shader_info_log(&shader).unwrap_or_default();
            self.gl.delete_shader(Some(&shader));
            Err(GfxError::Compile {
                stage: stage.label(),
                log,
            })
        }
    }

    fn link_program(&self, shaders: &[WebGlShader]) -> Result<WebGlProgram, GfxError> {
        let program = self.gl.create_program().ok_or(GfxError::Create("program"))?;
        for shader in shaders {
            self.gl.attach_shader(&program, shader);
        }
        self.gl.link_program(&program);

        let linked = self
            .gl
            .get_program_parameter(&program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false);
        if linked {
            Ok(program)
        } else {
            let log = self.gl.get_program_info_log(&program).unwrap_or_default();
            self.gl.delete_program(Some(&program));
            Err(GfxError::Link(log))
        }
    }

    fn use_program(&self, program: &WebGlProgram) {
        self.gl.use_program(Some(program));
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> Option<u32> {
        u32::try_from(self.gl.get_attrib_location(program, name)).ok()
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    fn set_uniform(&self, location: &WebGlUniformLocation, value: UniformValue) {
        let loc = Some(location);
        match value {
            UniformValue::Float(x) => self.gl.uniform1f(loc, x),
            UniformValue::Int(x) => self.gl.uniform1i(loc, x),
            UniformValue::Vec2([x, y]) => self.gl.uniform2f(loc, x, y),
            UniformValue::Vec3([x, y, z]) => self.gl.uniform3f(loc, x, y, z),
            UniformValue::Vec4([x, y, z, w]) => self.gl.uniform4f(loc, x, y, z, w),
            UniformValue::Mat4(m) => self.gl.uniform_matrix4fv_with_f32_array(loc, false, &m),
        }
    }

    fn create_texture_3d(&self, size: u32, texels: &[u8]) -> Result<WebGlTexture, GfxError> {
        let texture = self.gl.create_texture().ok_or(GfxError::Create("texture"))?;
        self.gl.bind_texture(GL::TEXTURE_3D, Some(&texture));

        self.gl.tex_parameteri(GL::TEXTURE_3D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
        self.gl.tex_parameteri(GL::TEXTURE_3D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
        self.gl.tex_parameteri(GL::TEXTURE_3D, GL::TEXTURE_WRAP_S, GL::REPEAT as i32);
        self.gl.tex_parameteri(GL::TEXTURE_3D, GL::TEXTURE_WRAP_T, GL::REPEAT as i32);
        self.gl.tex_parameteri(GL::TEXTURE_3D, GL::TEXTURE_WRAP_R, GL::REPEAT as i32);
        // rows of single-byte texels are not 4-byte aligned for odd sizes
        self.gl.pixel_storei(GL::UNPACK_ALIGNMENT, 1);

        let edge = size as i32;
        let upload = self.gl.tex_image_3d_with_opt_u8_array(
            GL::TEXTURE_3D,
            0,
            GL::R8 as i32,
            edge,
            edge,
            edge,
            0,
            GL::RED,
            GL::UNSIGNED_BYTE,
            Some(texels),
        );
        let error = self.gl.get_error();
        self.gl.bind_texture(GL::TEXTURE_3D, None);

        let failure = match upload {
            Err(err) => Some(format!("{err:?}")),
            Ok(()) if error != GL::NO_ERROR => Some(format!("GL error 0x{error:04x}")),
            Ok(()) => None,
        };
        match failure {
            Some(reason) => {
                self.gl.delete_texture(Some(&texture));
                Err(GfxError::TextureUpload(reason))
            }
            None => Ok(texture),
        }
    }

    fn bind_texture_3d(&self, unit: u32, texture: &WebGlTexture) {
        self.gl.active_texture(GL::TEXTURE0 + unit);
        self.gl.bind_texture(GL::TEXTURE_3D, Some(texture));
    }

    fn create_buffer(&self, target: BufferTarget, bytes: &[u8]) -> Result<WebGlBuffer, GfxError> {
        let target = Self::buffer_target(target);
        let buffer = self.gl.create_buffer().ok_or(GfxError::Create("buffer"))?;
        self.gl.bind_buffer(target, Some(&buffer));
        self.gl.buffer_data_with_u8_array(target, bytes, GL::STATIC_DRAW);
        Ok(buffer)
    }

    fn delete_buffer(&self, buffer: &WebGlBuffer) {
        self.gl.delete_buffer(Some(buffer));
    }

    fn enable_attrib(&self, location: u32, buffer: &WebGlBuffer, components: i32) {
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        self.gl.enable_vertex_attrib_array(location);
        self.gl
            .vertex_attrib_pointer_with_i32(location, components, GL::FLOAT, false, 0, 0);
    }

    fn disable_attrib(&self, location: u32) {
        self.gl.disable_vertex_attrib_array(location);
    }

    fn bind_index_buffer(&self, buffer: &WebGlBuffer) {
        self.gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(buffer));
    }

    fn draw_elements(&self, topology: Topology, count: i32) {
        let mode = match topology {
            Topology::Triangles => GL::TRIANGLES,
        };
        self.gl.draw_elements_with_i32(mode, count, GL::UNSIGNED_INT, 0);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.viewport(x, y, width, height);
    }

    fn clear_color(&self, [r, g, b, a]: [f32; 4]) {
        self.gl.clear_color(r, g, b, a);
    }

    fn clear(&self) {
        self.gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
    }

    fn enable_depth_test(&self) {
        self.gl.enable(GL::DEPTH_TEST);
    }
}

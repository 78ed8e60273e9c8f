//! Linked shader program with cached uniform and attribute locations.

use glam::Mat4;

use crate::controls::ControlState;
use crate::error::GfxError;
use crate::gpu::{Gpu, RenderContext, ShaderStage, UniformValue};
use crate::mesh::Drawable;
use crate::uniforms::{AttribTable, Param, UniformTable};

pub const MAGMA_VERT: &str = include_str!("shaders/magma.vert.glsl");
pub const MAGMA_FRAG: &str = include_str!("shaders/magma.frag.glsl");

/// Texture unit the noise volume is bound to.
pub const NOISE_TEXTURE_UNIT: u32 = 0;

/// One compiled stage, ready to be linked.
pub struct Shader<G: Gpu> {
    handle: G::Shader,
}

impl<G: Gpu> Shader<G> {
    pub fn compile(ctx: &RenderContext<G>, stage: ShaderStage, source: &str) -> Result<Self, GfxError> {
        let handle = ctx.gpu().compile_shader(stage, source).map_err(|err| {
            log::error!("{err}");
            err
        })?;
        Ok(Self { handle })
    }
}

pub struct ShaderProgram<G: Gpu> {
    id: u32,
    program: G::Program,
    attribs: AttribTable,
    uniforms: UniformTable<G::Uniform>,
}

impl<G: Gpu> ShaderProgram<G> {
    pub fn new(ctx: &RenderContext<G>, shaders: Vec<Shader<G>>) -> Result<Self, GfxError> {
        let gpu = ctx.gpu();
        let handles: Vec<G::Shader> = shaders.into_iter().map(|s| s.handle).collect();
        let program = gpu.link_program(&handles).map_err(|err| {
            log::error!("{err}");
            err
        })?;

        let attribs = AttribTable::resolve(|name| gpu.attrib_location(&program, name));
        let uniforms = UniformTable::resolve(|name| gpu.uniform_location(&program, name));
        let missing: Vec<&str> = Param::ALL
            .iter()
            .filter(|p| !uniforms.is_bound(**p))
            .map(|p| p.glsl_name())
            .collect();
        if !missing.is_empty() {
            log::debug!("program leaves out uniforms: {}", missing.join(", "));
        }

        Ok(Self {
            id: ctx.allocate_program_id(),
            program,
            attribs,
            uniforms,
        })
    }

    /// Compiles and links the magma vertex and fragment stages.
    pub fn magma(ctx: &RenderContext<G>) -> Result<Self, GfxError> {
        let vert = Shader::compile(ctx, ShaderStage::Vertex, MAGMA_VERT)?;
        let frag = Shader::compile(ctx, ShaderStage::Fragment, MAGMA_FRAG)?;
        Self::new(ctx, vec![vert, frag])
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn uniforms(&self) -> &UniformTable<G::Uniform> {
        &self.uniforms
    }

    pub fn attribs(&self) -> &AttribTable {
        &self.attribs
    }

    pub fn bind(&self, ctx: &RenderContext<G>) {
        ctx.bind_program(self.id, &self.program);
    }

    /// Writes one uniform when the program declares it.
    pub fn set(&self, ctx: &RenderContext<G>, param: Param, value: UniformValue) -> bool {
        self.bind(ctx);
        self.uniforms
            .write(param, |location| ctx.gpu().set_uniform(location, value))
    }

    /// Uploads `model` and its inverse transpose, recomputed from `model`.
    pub fn set_model_matrix(&self, ctx: &RenderContext<G>, model: Mat4) {
        self.set(ctx, Param::Model, UniformValue::Mat4(model.to_cols_array()));
        if self.uniforms.is_bound(Param::ModelInvTr) {
            let inv_tr = model.transpose().inverse();
            self.set(ctx, Param::ModelInvTr, UniformValue::Mat4(inv_tr.to_cols_array()));
        }
    }

    pub fn set_view_proj_matrix(&self, ctx: &RenderContext<G>, view_proj: Mat4) {
        self.set(ctx, Param::ViewProj, UniformValue::Mat4(view_proj.to_cols_array()));
    }

    pub fn set_geometry_color(&self, ctx: &RenderContext<G>, rgba: [f32; 4]) {
        self.set(ctx, Param::Color, UniformValue::Vec4(rgba));
    }

    /// Binds the noise volume to [`NOISE_TEXTURE_UNIT`] and points the sampler at it.
    pub fn set_noise_tex(&self, ctx: &RenderContext<G>, texture: &G::Texture) {
        self.bind(ctx);
        self.uniforms.write(Param::NoiseTex, |location| {
            let gpu = ctx.gpu();
            gpu.bind_texture_3d(NOISE_TEXTURE_UNIT, texture);
            gpu.set_uniform(location, UniformValue::Int(NOISE_TEXTURE_UNIT as i32));
        });
    }

    /// Pushes every per-frame control into its uniform.
    pub fn set_shader_params(&self, ctx: &RenderContext<G>, controls: &ControlState, time_seconds: f32) {
        use UniformValue::{Float, Vec2, Vec3, Vec4};

        let fbm = &controls.fbm;
        let values = [
            (Param::CubeSize, Float(controls.size)),
            (Param::WaveSpeed, Float(controls.wave_speed)),
            (Param::WaveAmpl, Float(controls.wave_ampl)),
            (Param::Time, Float(time_seconds)),
            (Param::W0, Float(fbm.w0)),
            (Param::MixW, Float(fbm.mix_w)),
            (Param::Expo, Float(fbm.expo)),
            (Param::FlowSpeed, Vec2(fbm.flow_speed)),
            (Param::GradDisp, Vec3(fbm.grad_disp)),
            (Param::IRange, Vec3(fbm.i_range)),
            (Param::Octs, Vec3(fbm.octs)),
            (Param::Scaling, Vec3(fbm.scaling)),
            (Param::GradRot, Vec4(fbm.grad_rot)),
        ];
        for (param, value) in values {
            self.set(ctx, param, value);
        }
    }

    /// Binds the streams both sides provide, draws, then disables them again.
    pub fn draw(&self, ctx: &RenderContext<G>, drawable: &dyn Drawable<G>) {
        self.bind(ctx);
        let gpu = ctx.gpu();
        let streams = [
            (self.attribs.position, drawable.positions()),
            (self.attribs.normal, drawable.normals()),
            (self.attribs.color, drawable.colors()),
        ];
        for (location, buffer) in streams {
            if let (Some(location), Some(buffer)) = (location, buffer) {
                gpu.enable_attrib(location, buffer, 4);
            }
        }

        gpu.bind_index_buffer(drawable.indices());
        gpu.draw_elements(drawable.topology(), drawable.index_count());

        for location in [self.attribs.position, self.attribs.normal, self.attribs.color]
            .into_iter()
            .flatten()
        {
            gpu.disable_attrib(location);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::gpu::trace::{Command, TraceGpu};
    use crate::mesh::{GpuMesh, MeshData};

    fn program(gpu: TraceGpu) -> (RenderContext<TraceGpu>, ShaderProgram<TraceGpu>) {
        let ctx = RenderContext::new(gpu);
        let program = ShaderProgram::magma(&ctx).unwrap();
        ctx.gpu().take();
        (ctx, program)
    }

    #[test]
    fn link_failure_carries_the_log() {
        let ctx = RenderContext::new(TraceGpu::new().failing_link("missing main"));
        let err = ShaderProgram::magma(&ctx).err().unwrap();
        assert_eq!(err, GfxError::Link("missing main".to_owned()));
    }

    #[test]
    fn compile_failure_names_the_stage() {
        let ctx = RenderContext::new(TraceGpu::new().failing_compile("0:1 syntax error"));
        let err = ShaderProgram::magma(&ctx).err().unwrap();
        assert!(matches!(err, GfxError::Compile { stage: "vertex", .. }));
    }

    #[test]
    fn program_is_bound_once_across_setters() {
        let (ctx, program) = program(TraceGpu::new());
        program.set_geometry_color(&ctx, [1.0; 4]);
        program.set_view_proj_matrix(&ctx, Mat4::IDENTITY);
        program.set_shader_params(&ctx, &ControlState::default(), 1.0);

        let binds = ctx
            .gpu()
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::UseProgram(_)))
            .count();
        assert_eq!(binds, 1);
        assert_eq!(ctx.active_program(), Some(program.id()));
    }

    #[test]
    fn second_program_rebinds() {
        let ctx = RenderContext::new(TraceGpu::new());
        let a = ShaderProgram::magma(&ctx).unwrap();
        let b = ShaderProgram::magma(&ctx).unwrap();
        ctx.gpu().take();

        a.set_geometry_color(&ctx, [0.0; 4]);
        b.set_geometry_color(&ctx, [0.0; 4]);
        a.set_geometry_color(&ctx, [0.0; 4]);

        let binds: Vec<Command> = ctx
            .gpu()
            .commands()
            .into_iter()
            .filter(|c| matches!(c, Command::UseProgram(_)))
            .collect();
        assert_eq!(binds.len(), 3);
    }

    #[test]
    fn grad_rot_uploads_all_four_components() {
        let (ctx, program) = program(TraceGpu::new());
        program.set_shader_params(&ctx, &ControlState::default(), 0.0);
        assert_eq!(
            ctx.gpu().uniform_writes("fbm_gradRot"),
            vec![UniformValue::Vec4([-1.5, -2.0, -2.5, 0.006])]
        );
        assert_eq!(
            ctx.gpu().uniform_writes("fbm_flowSpeed"),
            vec![UniformValue::Vec2([0.002, 0.0007])]
        );
    }

    #[test]
    fn noise_texture_goes_to_unit_zero() {
        let (ctx, program) = program(TraceGpu::new());
        program.set_noise_tex(&ctx, &42);
        let commands = ctx.gpu().commands();
        assert!(commands.contains(&Command::BindTexture3d { unit: 0, texture: 42 }));
        assert_eq!(ctx.gpu().uniform_writes("u_NoiseTex"), vec![UniformValue::Int(0)]);
    }

    #[test]
    fn missing_sampler_skips_texture_binding() {
        let (ctx, program) = program(TraceGpu::with_declared(["u_Time"], ["vs_Pos"]));
        program.set_noise_tex(&ctx, &42);
        assert!(!ctx
            .gpu()
            .commands()
            .iter()
            .any(|c| matches!(c, Command::BindTexture3d { .. })));
    }

    #[test]
    fn draw_binds_only_shared_streams() {
        let (ctx, program) = program(TraceGpu::with_declared([], ["vs_Nor", "vs_Pos", "vs_Col"]));
        let mesh = GpuMesh::upload(&ctx, &MeshData::cube(Vec3::ZERO, 1.0, 0)).unwrap();
        ctx.gpu().take();

        program.draw(&ctx, &mesh);
        let commands = ctx.gpu().commands();
        let enabled: Vec<u32> = commands
            .iter()
            .filter_map(|c| match c {
                Command::EnableAttrib { location, components: 4, .. } => Some(*location),
                _ => None,
            })
            .collect();
        // vs_Pos resolved to 1 and vs_Nor to 0; the mesh has no color stream
        assert_eq!(enabled, vec![1, 0]);
        assert!(commands.contains(&Command::DrawElements {
            topology: crate::gpu::Topology::Triangles,
            count: 36
        }));
        assert_eq!(
            &commands[commands.len() - 3..],
            &[
                Command::DisableAttrib(1),
                Command::DisableAttrib(0),
                Command::DisableAttrib(2)
            ]
        );
    }
}

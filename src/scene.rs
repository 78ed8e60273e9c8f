//! The single demo scene and its per-frame loop.

use glam::Vec3;
use rand::Rng;

use crate::camera::Camera;
use crate::config::DemoConfig;
use crate::controls::ControlState;
use crate::error::{ControlError, GfxError};
use crate::gpu::{Gpu, RenderContext};
use crate::mesh::{Drawable, GpuMesh, MeshData};
use crate::noise::NoiseVolume;
use crate::renderer::Renderer;
use crate::shader::ShaderProgram;
use crate::stats::{FrameReport, FrameStats};

/// Controls that decide the cube geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tessellation {
    segmentations: u32,
    size: f32,
}

impl Tessellation {
    fn of(controls: &ControlState) -> Self {
        Self {
            segmentations: controls.segmentations,
            size: controls.size,
        }
    }
}

pub struct Scene<G: Gpu> {
    ctx: RenderContext<G>,
    renderer: Renderer,
    camera: Camera,
    shader: ShaderProgram<G>,
    noise: G::Texture,
    controls: ControlState,
    tessellation: Tessellation,
    mesh: GpuMesh<G>,
    rebuilds: u64,
    stats: FrameStats,
}

impl<G: Gpu> Scene<G> {
    pub fn new(gpu: G, config: &DemoConfig, rng: &mut impl Rng) -> Result<Self, GfxError> {
        let ctx = RenderContext::new(gpu);
        let controls = config.controls.clone();

        let mesh = build_mesh(&ctx, &controls)?;
        let camera = Camera::new(
            Vec3::from_array(config.camera_eye),
            Vec3::from_array(config.camera_target),
        );

        let renderer = Renderer::new();
        renderer.set_clear_color(&ctx, config.clear_color);
        ctx.gpu().enable_depth_test();

        let shader = ShaderProgram::magma(&ctx)?;
        let volume = NoiseVolume::generate(controls.noise_size, rng)?;
        let noise = volume.upload(&ctx)?;
        shader.set_noise_tex(&ctx, &noise);

        log::info!("scene ready");
        Ok(Self {
            ctx,
            renderer,
            camera,
            shader,
            noise,
            tessellation: Tessellation::of(&controls),
            controls,
            mesh,
            rebuilds: 0,
            stats: FrameStats::default(),
        })
    }

    /// One animation frame. `clock` reads the host's monotonic clock in
    /// milliseconds; it is sampled when the frame starts and again after the
    /// draw calls are issued.
    pub fn tick(
        &mut self,
        mut clock: impl FnMut() -> f64,
        width: u32,
        height: u32,
    ) -> Result<Option<FrameReport>, GfxError> {
        self.camera.update();
        let now_ms = clock();
        self.stats.begin(now_ms);

        self.renderer.set_size(width, height);
        self.renderer.viewport(&self.ctx);
        self.renderer.clear(&self.ctx);

        if Tessellation::of(&self.controls) != self.tessellation {
            self.rebuild()?;
        }

        let tint = self.controls.base_color.to_rgba();
        self.shader
            .set_shader_params(&self.ctx, &self.controls, (now_ms * 0.001) as f32);
        let drawables: [&dyn Drawable<G>; 1] = [&self.mesh];
        self.renderer
            .render(&self.ctx, &self.camera, &self.shader, &drawables, tint);

        Ok(self.stats.end(clock()))
    }

    /// Surface resize: takes effect on the next tick.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.set_size(width, height);
        if height > 0 {
            self.camera.set_aspect_ratio(width as f32 / height as f32);
            self.camera.update_projection_matrix();
        }
        log::debug!("resized to {width}x{height}");
    }

    /// Rebuilds the cube from the current controls regardless of what changed.
    pub fn load_scene(&mut self) -> Result<(), GfxError> {
        self.rebuild()
    }

    pub fn set_control(&mut self, field: &str, text: &str) -> Result<(), ControlError> {
        self.controls.set(field, text).map_err(|err| {
            log::warn!("{err}");
            err
        })
    }

    /// On failure the previous mesh and tessellation stay current, so the
    /// next tick retries.
    fn rebuild(&mut self) -> Result<(), GfxError> {
        let mesh = build_mesh(&self.ctx, &self.controls)?;
        let old = std::mem::replace(&mut self.mesh, mesh);
        old.release(&self.ctx);
        self.tessellation = Tessellation::of(&self.controls);
        self.rebuilds += 1;
        Ok(())
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn context(&self) -> &RenderContext<G> {
        &self.ctx
    }

    pub fn noise_texture(&self) -> &G::Texture {
        &self.noise
    }

    /// Mesh rebuilds since startup, not counting the initial mesh.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}

fn build_mesh<G: Gpu>(ctx: &RenderContext<G>, controls: &ControlState) -> Result<GpuMesh<G>, GfxError> {
    let data = MeshData::cube(Vec3::ZERO, controls.size, controls.segmentations);
    log::debug!(
        "building cube: size {}, segmentations {}, {} triangles",
        controls.size,
        controls.segmentations,
        data.triangle_count()
    );
    GpuMesh::upload(ctx, &data)
}

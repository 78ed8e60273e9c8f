use crate::camera::Camera;
use crate::gpu::{Gpu, RenderContext};
use crate::mesh::Drawable;
use crate::shader::ShaderProgram;

/// Clears the surface and issues one draw per drawable, in list order.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_clear_color<G: Gpu>(&self, ctx: &RenderContext<G>, rgba: [f32; 4]) {
        ctx.gpu().clear_color(rgba);
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn viewport<G: Gpu>(&self, ctx: &RenderContext<G>) {
        ctx.gpu().viewport(0, 0, self.width as i32, self.height as i32);
    }

    pub fn clear<G: Gpu>(&self, ctx: &RenderContext<G>) {
        ctx.gpu().clear();
    }

    pub fn render<G: Gpu>(
        &self,
        ctx: &RenderContext<G>,
        camera: &Camera,
        shader: &ShaderProgram<G>,
        drawables: &[&dyn Drawable<G>],
        tint: [f32; 4],
    ) {
        shader.set_view_proj_matrix(ctx, camera.view_proj());
        shader.set_geometry_color(ctx, tint);
        for drawable in drawables {
            shader.set_model_matrix(ctx, drawable.model_matrix());
            shader.draw(ctx, *drawable);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::gpu::trace::{Command, TraceGpu};
    use crate::gpu::UniformValue;
    use crate::mesh::{GpuMesh, MeshData};

    #[test]
    fn each_drawable_gets_its_own_model_matrix_and_draw() {
        let ctx = RenderContext::new(TraceGpu::new());
        let shader = ShaderProgram::magma(&ctx).unwrap();
        let left = GpuMesh::upload(&ctx, &MeshData::cube(Vec3::NEG_X, 1.0, 0)).unwrap();
        let right = GpuMesh::upload(&ctx, &MeshData::cube(Vec3::X, 1.0, 1)).unwrap();
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        ctx.gpu().take();

        Renderer::new().render(&ctx, &camera, &shader, &[&left, &right], [1.0, 0.0, 0.0, 1.0]);

        let gpu = ctx.gpu();
        assert_eq!(
            gpu.uniform_writes("u_Model"),
            vec![
                UniformValue::Mat4(Mat4::from_translation(Vec3::NEG_X).to_cols_array()),
                UniformValue::Mat4(Mat4::from_translation(Vec3::X).to_cols_array()),
            ]
        );
        assert_eq!(gpu.uniform_writes("u_Color"), vec![UniformValue::Vec4([1.0, 0.0, 0.0, 1.0])]);
        let draws: Vec<i32> = gpu
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::DrawElements { count, .. } => Some(*count),
                _ => None,
            })
            .collect();
        assert_eq!(draws, vec![36, 144]);
    }

    #[test]
    fn viewport_follows_size() {
        let ctx = RenderContext::new(TraceGpu::new());
        let mut renderer = Renderer::new();
        renderer.set_size(640, 480);
        renderer.viewport(&ctx);
        assert_eq!(
            ctx.gpu().commands(),
            vec![Command::Viewport {
                x: 0,
                y: 0,
                width: 640,
                height: 480
            }]
        );
    }
}

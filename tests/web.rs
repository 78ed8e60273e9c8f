#![cfg(target_arch = "wasm32")]

use magma_cube::gpu::RenderContext;
use magma_cube::noise::NoiseVolume;
use magma_cube::shader::ShaderProgram;
use magma_cube::uniforms::Param;
use magma_cube::wasm::webgl::WebGl;
use magma_cube::{DemoConfig, Scene};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

wasm_bindgen_test_configure!(run_in_browser);

fn webgl() -> WebGl {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .unwrap()
        .dyn_into()
        .unwrap();
    canvas.set_width(64);
    canvas.set_height(64);
    let gl: WebGl2RenderingContext = canvas
        .get_context("webgl2")
        .unwrap()
        .expect("WebGL2 available")
        .dyn_into()
        .unwrap();
    WebGl::new(gl)
}

#[wasm_bindgen_test]
fn magma_program_links_and_resolves_controls() {
    let ctx = RenderContext::new(webgl());
    let program = ShaderProgram::magma(&ctx).expect("magma shaders link");

    for param in [Param::ViewProj, Param::Time, Param::NoiseTex, Param::GradRot, Param::FlowSpeed] {
        assert!(program.uniforms().is_bound(param), "{param:?}");
    }
    assert!(program.attribs().position.is_some());
}

#[wasm_bindgen_test]
fn noise_volume_uploads() {
    let ctx = RenderContext::new(webgl());
    let volume = NoiseVolume::generate(16, &mut SmallRng::seed_from_u64(2)).unwrap();
    assert!(volume.upload(&ctx).is_ok());
}

#[wasm_bindgen_test]
fn scene_renders_frames() {
    let mut config = DemoConfig::default();
    config.controls.noise_size = 16;
    let mut scene = Scene::new(webgl(), &config, &mut SmallRng::seed_from_u64(3)).unwrap();
    scene.resize(64, 64);
    scene.tick(|| 0.0, 64, 64).unwrap();
    scene.set_control("segmentations", "3").unwrap();
    scene.tick(|| 16.0, 64, 64).unwrap();
    assert_eq!(scene.rebuild_count(), 1);
}

//! Browser entry points.

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

use crate::config::DemoConfig;
use crate::scene::Scene;

mod render;
pub mod webgl;

use render::SharedScene;
use webgl::WebGl;

fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    Ok(())
}

/// Handle returned to the page so the control panel can reach the scene.
#[wasm_bindgen]
pub struct MagmaDemo {
    scene: SharedScene,
}

#[wasm_bindgen]
impl MagmaDemo {
    /// Applies one panel edit, e.g. `set_control("gradRot", "(-1.5, -2, -2.5, 0.006)")`.
    pub fn set_control(&self, field: &str, value: &str) -> Result<(), JsValue> {
        self.scene
            .borrow_mut()
            .set_control(field, value)
            .map_err(js_error)
    }

    /// The "Load Scene" action.
    pub fn load_scene(&self) -> Result<(), JsValue> {
        self.scene.borrow_mut().load_scene().map_err(js_error)
    }

    /// Current controls as JSON, for seeding the panel.
    pub fn controls_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.scene.borrow().controls()).map_err(js_error)
    }
}

/// Builds the scene on the configured canvas and starts rendering.
///
/// `config_json` wins over the canvas `data-config` attribute; with neither
/// the defaults apply.
#[wasm_bindgen]
pub fn start_demo(config_json: Option<String>) -> Result<MagmaDemo, JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let mut config = DemoConfig::from_json(config_json.as_deref().unwrap_or_default()).map_err(js_error)?;
    let canvas = document
        .get_element_by_id(&config.canvas_id)
        .ok_or("canvas not found")?
        .dyn_into::<HtmlCanvasElement>()?;
    if config_json.is_none() {
        if let Some(attr) = canvas.get_attribute("data-config") {
            config = DemoConfig::from_json(&attr).map_err(js_error)?;
        }
    }

    if console_log::init_with_level(config.log_level).is_err() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let gl: WebGl2RenderingContext = canvas
        .get_context("webgl2")?
        .ok_or("WebGL 2 not supported")?
        .dyn_into()?;

    let seed = config
        .noise_seed
        .unwrap_or_else(|| (js_sys::Math::random() * u64::MAX as f64) as u64);
    let mut rng = SmallRng::seed_from_u64(seed);
    log::debug!("noise seed {seed}");

    let scene = Scene::new(WebGl::new(gl), &config, &mut rng).map_err(js_error)?;
    let scene = Rc::new(RefCell::new(scene));
    render::start(canvas, scene.clone())?;
    Ok(MagmaDemo { scene })
}

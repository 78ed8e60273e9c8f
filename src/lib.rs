//! Magma cube: a subdivided cube displaced and shaded by fractal noise over a
//! random 3D texture, driven by a live parameter panel.
//!
//! Everything except the browser glue builds and tests on the host; the
//! [`gpu::trace::TraceGpu`] backend stands in for WebGL there.

pub mod camera;
pub mod config;
pub mod controls;
pub mod error;
pub mod gpu;
pub mod mesh;
pub mod noise;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod stats;
pub mod uniforms;

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use config::DemoConfig;
pub use controls::{ControlState, FbmParams, HexColor};
pub use error::{ConfigError, ControlError, GfxError};
pub use gpu::{Gpu, RenderContext};
pub use scene::Scene;

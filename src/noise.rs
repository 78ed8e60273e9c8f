//! Random 3D noise volume sampled by the magma fragment shader.

use rand::Rng;

use crate::error::GfxError;
use crate::gpu::{Gpu, RenderContext};

/// Largest edge length every WebGL2 implementation accepts for 3D textures.
pub const MAX_NOISE_SIZE: u32 = 256;

/// An `size`³ volume of independent uniformly random bytes, x fastest.
#[derive(Debug, Clone)]
pub struct NoiseVolume {
    size: u32,
    texels: Vec<u8>,
}

impl NoiseVolume {
    pub fn generate(size: u32, rng: &mut impl Rng) -> Result<Self, GfxError> {
        if size == 0 || size > MAX_NOISE_SIZE {
            return Err(GfxError::InvalidNoiseSize {
                size,
                max: MAX_NOISE_SIZE,
            });
        }
        log::info!("generating {size}^3 noise volume");
        let mut texels = vec![0u8; (size as usize).pow(3)];
        rng.fill(texels.as_mut_slice());
        Ok(Self { size, texels })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn texels(&self) -> &[u8] {
        &self.texels
    }

    /// Uploads the volume as a filtered, repeating single-channel texture.
    pub fn upload<G: Gpu>(&self, ctx: &RenderContext<G>) -> Result<G::Texture, GfxError> {
        let texture = ctx.gpu().create_texture_3d(self.size, &self.texels)?;
        log::debug!("uploaded {} noise texels", self.texels.len());
        Ok(texture)
    }
}

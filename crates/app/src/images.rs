//! Texture decoding through the `image` crate.

use std::path::Path;

use desk_scene_core::{PixelBuffer, Result, SceneError, TextureLoader};

#[derive(Debug, Default)]
pub struct ImageLoader;

impl TextureLoader for ImageLoader {
    fn load_image(&self, path: &Path) -> Result<PixelBuffer> {
        decode(path)
    }
}

/// Decodes any supported image file into RGBA8.
pub fn decode(path: &Path) -> Result<PixelBuffer> {
    let image = image::open(path)
        .map_err(|err| SceneError::msg(format!("{}: {err}", path.display())))?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(PixelBuffer {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

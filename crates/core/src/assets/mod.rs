use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    config::AssetConfig,
    render::{GraphicsApi, PixelBuffer, TextureHandle},
    Result, SceneError,
};

/// Every texture the scene binds. The set is closed: a registry only exists
/// once all of them are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureSlot {
    EnvironmentFront,
    EnvironmentBack,
    EnvironmentLeft,
    EnvironmentRight,
    EnvironmentTop,
    EnvironmentBottom,
    DeskWood,
    Carpet,
    CdFront,
    CdBack,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 10] = [
        TextureSlot::EnvironmentFront,
        TextureSlot::EnvironmentBack,
        TextureSlot::EnvironmentLeft,
        TextureSlot::EnvironmentRight,
        TextureSlot::EnvironmentTop,
        TextureSlot::EnvironmentBottom,
        TextureSlot::DeskWood,
        TextureSlot::Carpet,
        TextureSlot::CdFront,
        TextureSlot::CdBack,
    ];

    pub fn default_file_name(self) -> &'static str {
        match self {
            TextureSlot::EnvironmentFront => "environment_front.jpg",
            TextureSlot::EnvironmentBack => "environment_back.jpg",
            TextureSlot::EnvironmentLeft => "environment_left.jpg",
            TextureSlot::EnvironmentRight => "environment_right.jpg",
            TextureSlot::EnvironmentTop => "environment_top.jpg",
            TextureSlot::EnvironmentBottom => "environment_bottom.jpg",
            TextureSlot::DeskWood => "wood.jpg",
            TextureSlot::Carpet => "carpet.jpg",
            TextureSlot::CdFront => "cd_front.png",
            TextureSlot::CdBack => "cd_back.png",
        }
    }
}

/// Image decoding collaborator.
pub trait TextureLoader {
    fn load_image(&self, path: &Path) -> Result<PixelBuffer>;
}

/// Uploaded textures keyed by slot.
#[derive(Debug)]
pub struct TextureRegistry {
    handles: BTreeMap<TextureSlot, TextureHandle>,
}

impl TextureRegistry {
    /// Builds a registry from already uploaded handles. Fails if any slot is
    /// missing.
    pub fn from_handles(handles: BTreeMap<TextureSlot, TextureHandle>) -> Result<Self> {
        if let Some(slot) = TextureSlot::ALL
            .into_iter()
            .find(|slot| !handles.contains_key(slot))
        {
            return Err(SceneError::MissingTexture(slot));
        }
        Ok(Self { handles })
    }

    /// Decodes and uploads every slot. On failure, textures uploaded so far
    /// are released before the error is returned.
    pub fn load(
        loader: &dyn TextureLoader,
        gfx: &mut dyn GraphicsApi,
        assets: &AssetConfig,
    ) -> Result<Self> {
        let mut handles = BTreeMap::new();
        for slot in TextureSlot::ALL {
            let path = assets.directory.join(assets.texture_file(slot));
            match decode(loader, slot, &path) {
                Ok(pixels) => {
                    let handle = gfx.upload_texture(&pixels);
                    tracing::debug!(?slot, path = %path.display(), ?handle, "texture uploaded");
                    handles.insert(slot, handle);
                }
                Err(err) => {
                    for handle in handles.into_values() {
                        gfx.release_texture(handle);
                    }
                    return Err(err);
                }
            }
        }
        Self::from_handles(handles)
    }

    pub fn handle(&self, slot: TextureSlot) -> TextureHandle {
        // Every slot is present once the registry is constructed.
        self.handles[&slot]
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Deletes every texture. Consumes the registry so it runs once.
    pub fn release(self, gfx: &mut dyn GraphicsApi) {
        for handle in self.handles.into_values() {
            gfx.release_texture(handle);
        }
    }
}

fn decode(loader: &dyn TextureLoader, slot: TextureSlot, path: &Path) -> Result<PixelBuffer> {
    let pixels = loader.load_image(path).map_err(|err| match err {
        err @ SceneError::TextureDecode { .. } => err,
        other => SceneError::TextureDecode {
            slot,
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })?;
    if !pixels.is_well_formed() {
        return Err(SceneError::TextureDecode {
            slot,
            path: path.to_path_buf(),
            message: format!(
                "{}x{} image carries {} bytes",
                pixels.width,
                pixels.height,
                pixels.rgba.len()
            ),
        });
    }
    Ok(pixels)
}

use std::path::Path;

use crate::{config::AssetConfig, render::GraphicsApi, Result};

/// An imported mesh hierarchy. The scene only loads, draws and releases it.
pub trait SceneModel: std::fmt::Debug {
    /// Creates whatever GPU-side resources the model needs.
    fn initialize(&mut self, gfx: &mut dyn GraphicsApi) -> Result<()>;
    fn draw(&self, gfx: &mut dyn GraphicsApi);
    fn release(&mut self, gfx: &mut dyn GraphicsApi);
}

/// Model file importer collaborator.
pub trait SceneImporter {
    fn load(&self, directory: &Path, file_name: &str) -> Result<Box<dyn SceneModel>>;
}

/// The two models the scene is built from.
#[derive(Debug)]
pub struct SceneModels {
    pub computer: Box<dyn SceneModel>,
    pub cd_tray: Box<dyn SceneModel>,
}

impl SceneModels {
    /// Imports and initialises both models. If the second one fails, the
    /// first is released again.
    pub fn load(
        importer: &dyn SceneImporter,
        gfx: &mut dyn GraphicsApi,
        assets: &AssetConfig,
    ) -> Result<Self> {
        let mut computer = load_one(importer, gfx, &assets.directory, &assets.computer_model)?;
        match load_one(importer, gfx, &assets.directory, &assets.cd_model) {
            Ok(cd_tray) => Ok(Self { computer, cd_tray }),
            Err(err) => {
                computer.release(gfx);
                Err(err)
            }
        }
    }

    pub fn release(mut self, gfx: &mut dyn GraphicsApi) {
        self.computer.release(gfx);
        self.cd_tray.release(gfx);
    }
}

fn load_one(
    importer: &dyn SceneImporter,
    gfx: &mut dyn GraphicsApi,
    directory: &Path,
    file_name: &str,
) -> Result<Box<dyn SceneModel>> {
    let mut model = importer.load(directory, file_name)?;
    if let Err(err) = model.initialize(gfx) {
        model.release(gfx);
        return Err(err);
    }
    tracing::info!(file_name, "model loaded");
    Ok(model)
}

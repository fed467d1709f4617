//! Wavefront OBJ importer backed by `tobj`.

use std::path::{Path, PathBuf};

use desk_scene_core::{
    render::Mesh, GraphicsApi, PixelBuffer, Result, SceneError, SceneImporter, SceneModel,
    TextureHandle,
};

use crate::images;

#[derive(Debug, Default)]
pub struct ObjImporter;

impl SceneImporter for ObjImporter {
    fn load(&self, directory: &Path, file_name: &str) -> Result<Box<dyn SceneModel>> {
        let path = directory.join(file_name);
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };

        let (models, materials) =
            tobj::load_obj(&path, &options).map_err(|err| SceneError::SceneImport {
                path: path.clone(),
                message: err.to_string(),
            })?;

        if models.is_empty() {
            return Err(SceneError::SceneImport {
                path,
                message: "file contains no geometry".to_string(),
            });
        }

        let materials = materials.unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), %err, "materials unavailable, drawing untextured");
            Vec::new()
        });

        let parts = models
            .into_iter()
            .map(|model| {
                let texture = model
                    .mesh
                    .material_id
                    .and_then(|id| materials.get(id))
                    .and_then(|material| material.diffuse_texture.as_deref())
                    .and_then(|file| load_material_texture(&directory.join(file)));
                MeshPart {
                    mesh: convert_mesh(model.name, &model.mesh),
                    texture,
                    handle: None,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(path = %path.display(), parts = parts.len(), "obj parsed");
        Ok(Box::new(ObjModel { path, parts }))
    }
}

fn load_material_texture(path: &Path) -> Option<PixelBuffer> {
    match images::decode(path) {
        Ok(pixels) => Some(pixels),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "material texture skipped");
            None
        }
    }
}

fn convert_mesh(name: String, mesh: &tobj::Mesh) -> Mesh {
    Mesh {
        name,
        positions: mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect(),
        normals: mesh
            .normals
            .chunks_exact(3)
            .map(|n| [n[0], n[1], n[2]])
            .collect(),
        tex_coords: mesh
            .texcoords
            .chunks_exact(2)
            .map(|t| [t[0], t[1]])
            .collect(),
        indices: mesh.indices.clone(),
    }
}

#[derive(Debug)]
struct MeshPart {
    mesh: Mesh,
    texture: Option<PixelBuffer>,
    handle: Option<TextureHandle>,
}

/// Imported OBJ file: one mesh per object/group, each with an optional
/// diffuse texture uploaded on initialisation.
#[derive(Debug)]
pub struct ObjModel {
    path: PathBuf,
    parts: Vec<MeshPart>,
}

impl SceneModel for ObjModel {
    fn initialize(&mut self, gfx: &mut dyn GraphicsApi) -> Result<()> {
        for part in &mut self.parts {
            if let Some(pixels) = &part.texture {
                part.handle = Some(gfx.upload_texture(pixels));
            }
        }
        tracing::debug!(path = %self.path.display(), "obj resources uploaded");
        Ok(())
    }

    fn draw(&self, gfx: &mut dyn GraphicsApi) {
        for part in &self.parts {
            gfx.bind_texture(part.handle);
            gfx.draw_mesh(&part.mesh);
        }
        gfx.bind_texture(None);
    }

    fn release(&mut self, gfx: &mut dyn GraphicsApi) {
        for part in &mut self.parts {
            if let Some(handle) = part.handle.take() {
                gfx.release_texture(handle);
            }
        }
    }
}

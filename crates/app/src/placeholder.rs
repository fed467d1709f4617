//! Built-in stand-ins for the model and texture files, so the scene can run
//! without an asset directory.

use std::path::Path;

use desk_scene_core::{
    render::Mesh, GraphicsApi, PixelBuffer, Result, SceneImporter, SceneModel, TextureLoader,
};

/// Produces a box roughly the size of the real model for each file name.
#[derive(Debug, Default)]
pub struct PlaceholderImporter;

impl SceneImporter for PlaceholderImporter {
    fn load(&self, _directory: &Path, file_name: &str) -> Result<Box<dyn SceneModel>> {
        let half = if file_name.eq_ignore_ascii_case("CD.obj") {
            [120.0, 15.0, 200.0]
        } else {
            [600.0, 300.0, 550.0]
        };
        Ok(Box::new(BoxModel {
            mesh: cuboid(file_name, half),
        }))
    }
}

#[derive(Debug)]
struct BoxModel {
    mesh: Mesh,
}

impl SceneModel for BoxModel {
    fn initialize(&mut self, _gfx: &mut dyn GraphicsApi) -> Result<()> {
        Ok(())
    }

    fn draw(&self, gfx: &mut dyn GraphicsApi) {
        gfx.draw_mesh(&self.mesh);
    }

    fn release(&mut self, _gfx: &mut dyn GraphicsApi) {}
}

/// Axis-aligned box with outward counter-clockwise faces.
fn cuboid(name: &str, [hx, hy, hz]: [f32; 3]) -> Mesh {
    // (normal, u, v) per face with u x v == normal.
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut mesh = Mesh {
        name: name.to_string(),
        ..Mesh::default()
    };
    for (normal, u, v) in faces {
        let base = mesh.positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let corner = |axis: usize| normal[axis] + su * u[axis] + sv * v[axis];
            mesh.positions
                .push([corner(0) * hx, corner(1) * hy, corner(2) * hz]);
            mesh.normals.push(normal);
            mesh.tex_coords.push([(su + 1.0) / 2.0, (sv + 1.0) / 2.0]);
        }
        mesh.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// Generates an 8x8 checkerboard tinted per file name.
#[derive(Debug, Default)]
pub struct CheckerboardLoader;

impl TextureLoader for CheckerboardLoader {
    fn load_image(&self, path: &Path) -> Result<PixelBuffer> {
        let seed = path
            .file_name()
            .map(|name| {
                name.to_string_lossy()
                    .bytes()
                    .fold(7u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
            })
            .unwrap_or(0);
        let tint = [
            (seed & 0xff) as u8,
            ((seed >> 8) & 0xff) as u8,
            ((seed >> 16) & 0xff) as u8,
        ];

        const SIZE: u32 = 8;
        let mut rgba = Vec::with_capacity((SIZE * SIZE * 4) as usize);
        for y in 0..SIZE {
            for x in 0..SIZE {
                let [r, g, b] = if (x + y) % 2 == 0 { tint } else { [255, 255, 255] };
                rgba.extend([r, g, b, 255]);
            }
        }
        Ok(PixelBuffer {
            width: SIZE,
            height: SIZE,
            rgba,
        })
    }
}

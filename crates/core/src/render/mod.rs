//! Seam between the scene and the graphics API binding.
//!
//! [`GraphicsApi`] is the narrow surface the composer, lighting rig and
//! texture registry draw through. [`CommandRecorder`] implements it by
//! recording a serialisable command stream and tracking the matrix stack,
//! which is what the headless host and the tests run against.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::lighting::{LightDescriptor, LightId};

mod recorder;

pub use recorder::{CommandRecorder, RenderCommand};

/// Opaque texture name handed out by the graphics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Decoded RGBA8 image data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl PixelBuffer {
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgba.len() == self.width as usize * self.height as usize * 4
    }
}

/// Fixed-function state toggled through [`GraphicsApi::set_capability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    DepthTest,
    CullFace,
    Lighting,
    Light(LightId),
    ColorMaterial,
    Normalize,
    Texture2D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullFace {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Perspective projection as configured on resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }
}

/// A textured quad. Vertices are listed counter-clockwise as seen from the
/// side `normal` points to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub positions: [Vec3; 4],
    pub tex_coords: [[f32; 2]; 4],
    pub normal: Vec3,
}

impl Quad {
    /// Whether the vertex order is counter-clockwise around `normal`, i.e.
    /// whether the quad survives back-face culling when viewed from that side.
    pub fn is_front_facing(&self) -> bool {
        let [a, b, c, _] = self.positions;
        (b - a).cross(c - a).dot(self.normal) > 0.0
    }
}

/// Flat annulus in the local XY plane, facing +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiskShape {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub slices: u32,
    pub loops: u32,
}

/// Screen-space text drawn inside the current viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayText {
    pub x: f32,
    pub y: f32,
    pub color: [f32; 3],
    pub font: String,
    pub size: f32,
    pub text: String,
}

/// Triangle mesh handed over by a model importer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// The graphics API binding, as seen by the scene.
pub trait GraphicsApi {
    fn set_clear_color(&mut self, rgba: [f32; 4]);
    fn clear(&mut self);
    fn set_capability(&mut self, capability: Capability, enabled: bool);
    fn set_cull_face(&mut self, face: CullFace);
    fn set_front_face(&mut self, winding: Winding);
    fn set_viewport(&mut self, viewport: Viewport);
    /// Replaces the projection and resets the model-view matrix.
    fn set_projection(&mut self, projection: &Projection);

    fn push_matrix(&mut self);
    fn pop_matrix(&mut self);
    fn translate(&mut self, offset: Vec3);
    fn rotate(&mut self, degrees: f32, axis: Vec3);
    fn scale(&mut self, factors: Vec3);

    fn set_color(&mut self, rgb: [f32; 3]);
    fn bind_texture(&mut self, texture: Option<TextureHandle>);
    fn draw_quad(&mut self, quad: &Quad);
    /// Draws the unit cube spanning `[-1, 1]` on every axis.
    fn draw_box(&mut self);
    fn draw_disk(&mut self, disk: &DiskShape);
    fn draw_mesh(&mut self, mesh: &Mesh);
    fn draw_text(&mut self, text: &OverlayText);

    fn set_global_ambient(&mut self, rgba: [f32; 4]);
    fn configure_light(&mut self, id: LightId, light: &LightDescriptor);
    /// Places a light in the current model-view space.
    fn set_light_position(&mut self, id: LightId, position: Vec3);

    fn upload_texture(&mut self, pixels: &PixelBuffer) -> TextureHandle;
    fn release_texture(&mut self, texture: TextureHandle);
    fn flush(&mut self);
}

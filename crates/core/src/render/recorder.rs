use std::collections::BTreeSet;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::{
    Capability, CullFace, DiskShape, GraphicsApi, Mesh, OverlayText, PixelBuffer, Projection,
    Quad, TextureHandle, Viewport, Winding,
};
use crate::{
    lighting::{LightDescriptor, LightId},
    Result,
};

/// One call made through [`GraphicsApi`]. Draw calls carry the model-view
/// matrix that was current when they were issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    SetClearColor { rgba: [f32; 4] },
    Clear,
    SetCapability { capability: Capability, enabled: bool },
    SetCullFace { face: CullFace },
    SetFrontFace { winding: Winding },
    SetViewport { viewport: Viewport },
    SetProjection { projection: Projection },
    PushMatrix,
    PopMatrix,
    Translate { offset: Vec3 },
    Rotate { degrees: f32, axis: Vec3 },
    Scale { factors: Vec3 },
    SetColor { rgb: [f32; 3] },
    BindTexture { texture: Option<TextureHandle> },
    DrawQuad { quad: Quad, model: Mat4 },
    DrawBox { model: Mat4 },
    DrawDisk { disk: DiskShape, model: Mat4 },
    DrawMesh { name: String, triangles: usize, model: Mat4 },
    DrawText { text: OverlayText },
    SetGlobalAmbient { rgba: [f32; 4] },
    ConfigureLight { id: LightId, light: LightDescriptor },
    SetLightPosition { id: LightId, position: Vec3, model: Mat4 },
    UploadTexture { texture: TextureHandle, width: u32, height: u32 },
    ReleaseTexture { texture: TextureHandle },
    Flush,
}

/// [`GraphicsApi`] implementation that records every call and keeps a
/// software matrix stack.
#[derive(Debug)]
pub struct CommandRecorder {
    commands: Vec<RenderCommand>,
    current: Mat4,
    stack: Vec<Mat4>,
    underflows: usize,
    next_texture: u32,
    live_textures: BTreeSet<TextureHandle>,
}

impl Default for CommandRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            current: Mat4::IDENTITY,
            stack: Vec::new(),
            underflows: 0,
            next_texture: 1,
            live_textures: BTreeSet::new(),
        }
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Drains the recorded commands, keeping matrix and texture state.
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of pops issued against an empty stack.
    pub fn underflows(&self) -> usize {
        self.underflows
    }

    /// Every push so far has been matched by exactly one pop.
    pub fn is_balanced(&self) -> bool {
        self.stack.is_empty() && self.underflows == 0
    }

    pub fn model_view(&self) -> Mat4 {
        self.current
    }

    /// Textures uploaded and not yet released.
    pub fn live_textures(&self) -> &BTreeSet<TextureHandle> {
        &self.live_textures
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.commands)?)
    }

    fn record(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }
}

impl GraphicsApi for CommandRecorder {
    fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.record(RenderCommand::SetClearColor { rgba });
    }

    fn clear(&mut self) {
        self.record(RenderCommand::Clear);
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        self.record(RenderCommand::SetCapability {
            capability,
            enabled,
        });
    }

    fn set_cull_face(&mut self, face: CullFace) {
        self.record(RenderCommand::SetCullFace { face });
    }

    fn set_front_face(&mut self, winding: Winding) {
        self.record(RenderCommand::SetFrontFace { winding });
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.record(RenderCommand::SetViewport { viewport });
    }

    fn set_projection(&mut self, projection: &Projection) {
        self.current = Mat4::IDENTITY;
        self.record(RenderCommand::SetProjection {
            projection: *projection,
        });
    }

    fn push_matrix(&mut self) {
        self.stack.push(self.current);
        self.record(RenderCommand::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        match self.stack.pop() {
            Some(matrix) => self.current = matrix,
            None => {
                tracing::warn!("matrix stack underflow");
                self.underflows += 1;
            }
        }
        self.record(RenderCommand::PopMatrix);
    }

    fn translate(&mut self, offset: Vec3) {
        self.current *= Mat4::from_translation(offset);
        self.record(RenderCommand::Translate { offset });
    }

    fn rotate(&mut self, degrees: f32, axis: Vec3) {
        let axis = axis.normalize_or_zero();
        if axis != Vec3::ZERO {
            self.current *= Mat4::from_axis_angle(axis, degrees.to_radians());
        }
        self.record(RenderCommand::Rotate { degrees, axis });
    }

    fn scale(&mut self, factors: Vec3) {
        self.current *= Mat4::from_scale(factors);
        self.record(RenderCommand::Scale { factors });
    }

    fn set_color(&mut self, rgb: [f32; 3]) {
        self.record(RenderCommand::SetColor { rgb });
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.record(RenderCommand::BindTexture { texture });
    }

    fn draw_quad(&mut self, quad: &Quad) {
        let model = self.current;
        self.record(RenderCommand::DrawQuad { quad: *quad, model });
    }

    fn draw_box(&mut self) {
        let model = self.current;
        self.record(RenderCommand::DrawBox { model });
    }

    fn draw_disk(&mut self, disk: &DiskShape) {
        let model = self.current;
        self.record(RenderCommand::DrawDisk { disk: *disk, model });
    }

    fn draw_mesh(&mut self, mesh: &Mesh) {
        let model = self.current;
        self.record(RenderCommand::DrawMesh {
            name: mesh.name.clone(),
            triangles: mesh.triangle_count(),
            model,
        });
    }

    fn draw_text(&mut self, text: &OverlayText) {
        self.record(RenderCommand::DrawText { text: text.clone() });
    }

    fn set_global_ambient(&mut self, rgba: [f32; 4]) {
        self.record(RenderCommand::SetGlobalAmbient { rgba });
    }

    fn configure_light(&mut self, id: LightId, light: &LightDescriptor) {
        self.record(RenderCommand::ConfigureLight {
            id,
            light: light.clone(),
        });
    }

    fn set_light_position(&mut self, id: LightId, position: Vec3) {
        let model = self.current;
        self.record(RenderCommand::SetLightPosition {
            id,
            position,
            model,
        });
    }

    fn upload_texture(&mut self, pixels: &PixelBuffer) -> TextureHandle {
        let texture = TextureHandle(self.next_texture);
        self.next_texture += 1;
        self.live_textures.insert(texture);
        self.record(RenderCommand::UploadTexture {
            texture,
            width: pixels.width,
            height: pixels.height,
        });
        texture
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if !self.live_textures.remove(&texture) {
            tracing::warn!(?texture, "release of unknown texture");
        }
        self.record(RenderCommand::ReleaseTexture { texture });
    }

    fn flush(&mut self) {
        self.record(RenderCommand::Flush);
    }
}

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::render::{Capability, GraphicsApi};

/// The two fixed-function lights the scene uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightId {
    /// Broad, non-directional light above the scene (light 0).
    Point,
    /// Narrow spotlight that follows the computer (light 1).
    Spot,
}

/// Cone of a spotlight, in the light's local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotCone {
    pub direction: Vec3,
    pub cutoff_degrees: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightDescriptor {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// `None` for an omnidirectional light.
    pub spot: Option<SpotCone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub global_ambient: [f32; 4],
    pub point: LightDescriptor,
    /// Point light position in camera-rotated world space.
    pub point_position: Vec3,
    pub spot: LightDescriptor,
    /// Spotlight position relative to the computer.
    pub spot_position: Vec3,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            global_ambient: [0.2, 0.2, 0.2, 1.0],
            point: LightDescriptor {
                ambient: [0.3, 0.3, 0.3, 1.0],
                diffuse: [0.8, 0.8, 0.8, 1.0],
                specular: [0.5, 0.5, 0.5, 1.0],
                spot: None,
            },
            point_position: Vec3::new(0.0, 1500.0, 0.0),
            spot: LightDescriptor {
                ambient: [0.6, 0.6, 0.0, 1.0],
                diffuse: [1.0, 1.0, 0.8, 1.0],
                specular: [1.0, 1.0, 1.0, 1.0],
                spot: Some(SpotCone {
                    direction: Vec3::NEG_Y,
                    cutoff_degrees: 25.0,
                }),
            },
            spot_position: Vec3::new(0.0, 900.0, 300.0),
        }
    }
}

/// Configures both lights once and re-places them every frame.
#[derive(Debug, Clone)]
pub struct LightingRig {
    config: LightingConfig,
    spot_dirty: bool,
}

impl LightingRig {
    pub fn new(config: LightingConfig) -> Self {
        Self {
            config,
            spot_dirty: false,
        }
    }

    pub fn configure(&mut self, gfx: &mut dyn GraphicsApi) {
        gfx.set_global_ambient(self.config.global_ambient);
        gfx.configure_light(LightId::Point, &self.config.point);
        gfx.configure_light(LightId::Spot, &self.config.spot);
        gfx.set_capability(Capability::Lighting, true);
        gfx.set_capability(Capability::Light(LightId::Point), true);
        gfx.set_capability(Capability::Light(LightId::Spot), true);
        gfx.set_capability(Capability::ColorMaterial, true);
        gfx.set_capability(Capability::Normalize, true);
        self.spot_dirty = false;
    }

    /// Changes the spotlight's ambient colour. Takes effect on the next
    /// [`LightingRig::sync`].
    pub fn set_spot_ambient(&mut self, rgb: [f32; 3]) {
        let [r, g, b] = rgb;
        let alpha = self.config.spot.ambient[3];
        self.config.spot.ambient = [r, g, b, alpha];
        self.spot_dirty = true;
    }

    pub fn spot_ambient(&self) -> [f32; 3] {
        let [r, g, b, _] = self.config.spot.ambient;
        [r, g, b]
    }

    /// Re-issues the spotlight if its colour changed since the last upload.
    pub fn sync(&mut self, gfx: &mut dyn GraphicsApi) -> bool {
        if !self.spot_dirty {
            return false;
        }
        gfx.configure_light(LightId::Spot, &self.config.spot);
        self.spot_dirty = false;
        true
    }

    pub fn position_point(&self, gfx: &mut dyn GraphicsApi) {
        gfx.set_light_position(LightId::Point, self.config.point_position);
    }

    pub fn position_spot(&self, gfx: &mut dyn GraphicsApi) {
        gfx.set_light_position(LightId::Spot, self.config.spot_position);
    }
}

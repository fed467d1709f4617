use std::{collections::BTreeMap, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    animation::RetriggerPolicy, assets::TextureSlot, lighting::LightingConfig,
    transform::TravelAxis, Result, SceneError, TransformState,
};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub assets: AssetConfig,
    pub controls: ControlConfig,
    pub animation: AnimationConfig,
    pub view: ViewConfig,
    pub lighting: LightingConfig,
    /// Camera and object placement at session start.
    pub initial: TransformState,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing sections fall back to their
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks what the JSON shape cannot: the start placement lies inside
    /// the ranges input keeps it in, and every eject phase can reach its
    /// exit condition.
    pub fn validate(&self) -> Result<()> {
        self.controls.validate()?;
        self.animation.validate()?;

        let c = &self.controls;
        let initial = &self.initial;
        if initial.locked {
            return Err(invalid("initial.locked must be false"));
        }
        in_rotation_range("initial.rotation_x", initial.rotation_x, c)?;
        // The upper scale limit is accepted as a start value; keys never
        // reach it.
        if !(initial.object_scale > 0.0 && initial.object_scale <= c.max_scale) {
            return Err(invalid(format!(
                "initial.object_scale {} is outside (0, {}]",
                initial.object_scale, c.max_scale
            )));
        }
        finite("initial.rotation_y", initial.rotation_y)?;
        finite("initial.scene_distance", initial.scene_distance)?;
        within_travel("initial.object_x", initial.object_x, &c.x_axis, initial.object_scale)?;
        within_travel("initial.object_z", initial.object_z, &c.z_axis, initial.object_scale)?;

        let showcase = &self.animation.showcase;
        in_rotation_range("animation.showcase.rotation_x", showcase.rotation_x, c)?;
        finite("animation.showcase.rotation_y", showcase.rotation_y)?;
        finite("animation.showcase.scene_distance", showcase.scene_distance)?;
        finite("animation.showcase.object_x", showcase.object_x)?;
        finite("animation.showcase.object_z", showcase.object_z)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Where models and textures are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub directory: PathBuf,
    pub computer_model: String,
    pub cd_model: String,
    /// File names replacing [`TextureSlot::default_file_name`] for individual
    /// slots.
    pub textures: BTreeMap<TextureSlot, String>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("assets"),
            computer_model: "Computer.obj".to_string(),
            cd_model: "CD.obj".to_string(),
            textures: BTreeMap::new(),
        }
    }
}

impl AssetConfig {
    pub fn texture_file(&self, slot: TextureSlot) -> &str {
        self.textures
            .get(&slot)
            .map(String::as_str)
            .unwrap_or_else(|| slot.default_file_name())
    }
}

/// Step sizes and travel limits used by the input controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub rotation_step: f32,
    pub translation_step: f32,
    pub scale_step: f32,
    pub distance_step: f32,
    pub max_rotation_x: f32,
    /// Exclusive upper limit for the object scale.
    pub max_scale: f32,
    pub x_axis: TravelAxis,
    pub z_axis: TravelAxis,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            rotation_step: 5.0,
            translation_step: 20.0,
            scale_step: 0.05,
            distance_step: 700.0,
            max_rotation_x: 90.0,
            max_scale: 1.3,
            x_axis: TravelAxis {
                nominal_min: -260.0,
                nominal_max: 260.0,
                min_extent: 1200.0,
                max_extent: 1200.0,
            },
            z_axis: TravelAxis {
                nominal_min: -200.0,
                nominal_max: 220.0,
                min_extent: 5.0,
                max_extent: 1100.0,
            },
        }
    }
}

impl ControlConfig {
    fn validate(&self) -> Result<()> {
        positive("controls.rotation_step", self.rotation_step)?;
        positive("controls.translation_step", self.translation_step)?;
        positive("controls.scale_step", self.scale_step)?;
        positive("controls.distance_step", self.distance_step)?;
        positive("controls.max_rotation_x", self.max_rotation_x)?;
        positive("controls.max_scale", self.max_scale)
    }
}

/// Camera placement forced when the eject sequence starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Showcase {
    pub scene_distance: f32,
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub object_x: f32,
    pub object_z: f32,
}

impl Default for Showcase {
    fn default() -> Self {
        Self {
            scene_distance: 1700.0,
            rotation_x: 30.0,
            rotation_y: 30.0,
            object_x: 0.0,
            object_z: 0.0,
        }
    }
}

/// Timing and travel of the eject sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub eject_period_ms: u64,
    pub spin_down_period_ms: u64,
    pub pop_period_ms: u64,
    pub close_period_ms: u64,
    pub tray_step: f32,
    pub tray_target: f32,
    pub spin_start: f32,
    pub spin_step: f32,
    pub lift_start: f32,
    pub lift_step: f32,
    pub lift_target: f32,
    pub showcase: Showcase,
    pub retrigger: RetriggerPolicy,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            eject_period_ms: 50,
            spin_down_period_ms: 120,
            pop_period_ms: 20,
            close_period_ms: 35,
            tray_step: 10.0,
            tray_target: 210.0,
            spin_start: 60.0,
            spin_step: 1.0,
            lift_start: 115.0,
            lift_step: 5.0,
            lift_target: 145.0,
            showcase: Showcase::default(),
            retrigger: RetriggerPolicy::default(),
        }
    }
}

impl AnimationConfig {
    /// Every phase must reach its exit condition, so steps are positive.
    fn validate(&self) -> Result<()> {
        for (name, period) in [
            ("animation.eject_period_ms", self.eject_period_ms),
            ("animation.spin_down_period_ms", self.spin_down_period_ms),
            ("animation.pop_period_ms", self.pop_period_ms),
            ("animation.close_period_ms", self.close_period_ms),
        ] {
            if period == 0 {
                return Err(invalid(format!("{name} must be at least 1")));
            }
        }
        positive("animation.tray_step", self.tray_step)?;
        positive("animation.tray_target", self.tray_target)?;
        positive("animation.spin_step", self.spin_step)?;
        positive("animation.lift_step", self.lift_step)?;
        finite("animation.spin_start", self.spin_start)?;
        finite("animation.lift_start", self.lift_start)?;
        finite("animation.lift_target", self.lift_target)
    }
}

fn invalid(message: impl Into<String>) -> SceneError {
    SceneError::InvalidSetting(message.into())
}

fn finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be a finite number")))
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be positive, got {value}")))
    }
}

fn in_rotation_range(name: &str, value: f32, controls: &ControlConfig) -> Result<()> {
    if (0.0..=controls.max_rotation_x).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!(
            "{name} {value} is outside [0, {}]",
            controls.max_rotation_x
        )))
    }
}

fn within_travel(name: &str, value: f32, axis: &TravelAxis, scale: f32) -> Result<()> {
    let (min, max) = (axis.min_bound(scale), axis.max_bound(scale));
    if value > min && value < max {
        Ok(())
    } else {
        Err(invalid(format!(
            "{name} {value} is outside ({min}, {max}) at scale {scale}"
        )))
    }
}

/// Projection and overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub overlay: OverlayConfig,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 1.0,
            far: 20_000.0,
            overlay: OverlayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Width in pixels of the corner viewport, anchored bottom-right.
    pub width: u32,
    pub font: String,
    pub font_size: f32,
    pub color: [f32; 3],
    /// Vertical position of the first line inside the overlay viewport.
    pub top: f32,
    pub line_spacing: f32,
    pub lines: Vec<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            width: 180,
            font: "tahoma italic".to_string(),
            font_size: 10.0,
            color: [1.0, 1.0, 0.0],
            top: 100.0,
            line_spacing: 20.0,
            lines: vec![
                "W/S A/D: rotate".to_string(),
                "Arrows: move computer".to_string(),
                "PgUp/PgDn: scale".to_string(),
                "+/-: zoom".to_string(),
                "C: eject disk".to_string(),
            ],
        }
    }
}

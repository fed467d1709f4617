use serde::{Deserialize, Serialize};

/// Camera and object placement shared by input handling, the eject sequence
/// and the frame composer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformState {
    /// Tilt of the whole scene in degrees, kept within `[0, 90]`.
    pub rotation_x: f32,
    /// Turn of the whole scene in degrees. Unbounded.
    pub rotation_y: f32,
    pub scene_distance: f32,
    pub object_x: f32,
    pub object_z: f32,
    /// Uniform scale of the computer, kept within `(0, max_scale)`.
    pub object_scale: f32,
    /// Set while the eject sequence runs; input is ignored until cleared.
    pub locked: bool,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            scene_distance: 2500.0,
            object_x: 0.0,
            object_z: 0.0,
            object_scale: 1.0,
            locked: false,
        }
    }
}

/// Travel window of the computer along one desk axis.
///
/// The nominal bounds hold at scale 1. When the object grows, each side of
/// its footprint widens by `extent * scale / 2 - extent / 2`, and the window
/// narrows by the same amount so the silhouette stays on the desk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelAxis {
    pub nominal_min: f32,
    pub nominal_max: f32,
    /// Nominal extent of the object on the negative side of the axis.
    pub min_extent: f32,
    /// Nominal extent of the object on the positive side of the axis.
    pub max_extent: f32,
}

impl TravelAxis {
    pub fn min_bound(&self, scale: f32) -> f32 {
        self.nominal_min + growth(self.min_extent, scale)
    }

    pub fn max_bound(&self, scale: f32) -> f32 {
        self.nominal_max - growth(self.max_extent, scale)
    }

    /// Width of the open interval the object may occupy at `scale`.
    pub fn travel_range(&self, scale: f32) -> f32 {
        self.max_bound(scale) - self.min_bound(scale)
    }

    /// Moves `value` by `delta` if the result stays strictly inside the
    /// window for `scale`.
    pub fn step(&self, value: f32, delta: f32, scale: f32) -> Option<f32> {
        let next = value + delta;
        let inside = if delta < 0.0 {
            next > self.min_bound(scale)
        } else {
            next < self.max_bound(scale)
        };
        inside.then_some(next)
    }
}

fn growth(extent: f32, scale: f32) -> f32 {
    extent * scale / 2.0 - extent / 2.0
}

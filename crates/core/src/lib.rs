//! Core library for the Desk Scene application.
//!
//! The crate owns everything between the windowing host and the graphics
//! binding: camera and object placement, the clamped key handling, the CD
//! eject state machine and the per-frame draw hierarchy. Model import,
//! image decoding and the graphics API itself are reached through the
//! traits in [`model`], [`assets`] and [`render`].

pub mod animation;
pub mod assets;
pub mod config;
pub mod error;
pub mod input;
pub mod lighting;
pub mod model;
pub mod render;
pub mod scene;
pub mod session;
pub mod timeline;
pub mod transform;

pub use animation::{AnimationPhase, AnimationRuntime, AnimationSequencer, RetriggerPolicy};
pub use assets::{TextureLoader, TextureRegistry, TextureSlot};
pub use config::{AnimationConfig, AppConfig, AssetConfig, ControlConfig, ViewConfig};
pub use error::{Result, SceneError};
pub use input::{Command, InputController, Key, KeyOutcome};
pub use lighting::{LightDescriptor, LightId, LightingRig};
pub use model::{SceneImporter, SceneModel, SceneModels};
pub use render::{CommandRecorder, GraphicsApi, PixelBuffer, RenderCommand, TextureHandle};
pub use scene::{FrameContext, SceneComposer, SceneLayout};
pub use session::{FrameHandler, Session};
pub use timeline::{PlaybackClock, Scheduler};
pub use transform::{TransformState, TravelAxis};

use std::time::Duration;

use crate::{
    animation::{AnimationPhase, AnimationSequencer},
    assets::{TextureLoader, TextureRegistry},
    config::{AppConfig, ViewConfig},
    input::{InputController, Key, KeyOutcome},
    lighting::LightingRig,
    model::{SceneImporter, SceneModels},
    render::{Capability, CullFace, GraphicsApi, Projection, Viewport, Winding},
    scene::{FrameContext, SceneComposer, SceneLayout},
    Result, TransformState,
};

/// Disk spin speeds are expressed per frame at this rate.
const REFERENCE_FPS: f32 = 60.0;

/// Callbacks the windowing host drives. All of them run on one thread.
pub trait FrameHandler {
    fn on_resize(&mut self, gfx: &mut dyn GraphicsApi, width: u32, height: u32);
    fn on_key(&mut self, key: Key, now: Duration) -> KeyOutcome;
    /// Lets the eject sequence fire at most one phase tick.
    fn pump_timers(&mut self, now: Duration) -> bool;
    fn on_frame(&mut self, gfx: &mut dyn GraphicsApi, now: Duration);
}

/// One running scene: owns all mutable state and every loaded resource.
#[derive(Debug)]
pub struct Session {
    view: ViewConfig,
    transform: TransformState,
    input: InputController,
    sequencer: AnimationSequencer,
    lighting: LightingRig,
    composer: SceneComposer,
    textures: TextureRegistry,
    models: SceneModels,
    viewport: Viewport,
    projection: Projection,
    spin_angle: f32,
    last_frame: Option<Duration>,
}

impl Session {
    /// Sets up render state and loads every model and texture, then applies
    /// the initial viewport. An invalid configuration is rejected before any
    /// graphics call. Any failure here ends the session; resources created
    /// before the failure are released.
    pub fn initialize(
        config: AppConfig,
        importer: &dyn SceneImporter,
        loader: &dyn TextureLoader,
        gfx: &mut dyn GraphicsApi,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        config.validate()?;
        tracing::info!(width, height, assets = %config.assets.directory.display(), "initialising scene");

        gfx.set_clear_color([0.0, 0.0, 0.0, 1.0]);
        gfx.set_capability(Capability::DepthTest, true);
        gfx.set_capability(Capability::CullFace, true);
        gfx.set_cull_face(CullFace::Back);
        gfx.set_front_face(Winding::CounterClockwise);
        gfx.set_capability(Capability::Texture2D, true);

        let mut lighting = LightingRig::new(config.lighting.clone());
        lighting.configure(gfx);

        let models = SceneModels::load(importer, gfx, &config.assets)?;
        let textures = match TextureRegistry::load(loader, gfx, &config.assets) {
            Ok(textures) => textures,
            Err(err) => {
                models.release(gfx);
                return Err(err);
            }
        };

        let mut session = Self {
            view: config.view.clone(),
            transform: config.initial,
            input: InputController::new(config.controls.clone()),
            sequencer: AnimationSequencer::new(config.animation.clone()),
            lighting,
            composer: SceneComposer::new(SceneLayout::default(), config.view.overlay.clone()),
            textures,
            models,
            viewport: Viewport::default(),
            projection: Projection {
                fov_y_degrees: config.view.fov_y_degrees,
                aspect: 1.0,
                near: config.view.near,
                far: config.view.far,
            },
            spin_angle: 0.0,
            last_frame: None,
        };
        session.on_resize(gfx, width, height);
        tracing::info!("scene ready");
        Ok(session)
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn sequencer(&self) -> &AnimationSequencer {
        &self.sequencer
    }

    pub fn phase(&self) -> AnimationPhase {
        self.sequencer.phase()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    pub fn lighting(&self) -> &LightingRig {
        &self.lighting
    }

    /// Changes the spotlight colour; applied on the next frame.
    pub fn set_spot_ambient(&mut self, rgb: [f32; 3]) {
        self.lighting.set_spot_ambient(rgb);
    }

    /// Starts the eject sequence directly, bypassing the key lock. The
    /// sequencer's retrigger policy decides what happens mid-run.
    pub fn start_animation(&mut self, now: Duration) -> bool {
        let started = self.sequencer.start(&mut self.transform, now);
        if started {
            tracing::info!("eject sequence started");
        }
        started
    }

    /// Releases every model and texture. Consumes the session so it can only
    /// happen once.
    pub fn teardown(self, gfx: &mut dyn GraphicsApi) {
        self.models.release(gfx);
        self.textures.release(gfx);
        tracing::info!("scene released");
    }
}

impl FrameHandler for Session {
    fn on_resize(&mut self, gfx: &mut dyn GraphicsApi, width: u32, height: u32) {
        let height = height.max(1);
        self.viewport = Viewport {
            x: 0,
            y: 0,
            width,
            height,
        };
        self.projection = Projection {
            fov_y_degrees: self.view.fov_y_degrees,
            aspect: width as f32 / height as f32,
            near: self.view.near,
            far: self.view.far,
        };
        gfx.set_viewport(self.viewport);
        gfx.set_projection(&self.projection);
        tracing::debug!(width, height, "viewport resized");
    }

    fn on_key(&mut self, key: Key, now: Duration) -> KeyOutcome {
        let outcome = self.input.handle_key(key, &mut self.transform);
        if outcome == KeyOutcome::StartAnimation {
            self.start_animation(now);
        }
        outcome
    }

    fn pump_timers(&mut self, now: Duration) -> bool {
        self.sequencer.update(now, &mut self.transform)
    }

    fn on_frame(&mut self, gfx: &mut dyn GraphicsApi, now: Duration) {
        let elapsed = self
            .last_frame
            .map(|last| now.saturating_sub(last))
            .unwrap_or(Duration::ZERO);
        self.last_frame = Some(now);
        let spin = self.sequencer.runtime().spin_speed * elapsed.as_secs_f32() * REFERENCE_FPS;
        self.spin_angle = (self.spin_angle + spin) % 360.0;

        self.lighting.sync(gfx);

        let frame = FrameContext {
            transform: &self.transform,
            runtime: self.sequencer.runtime(),
            spin_angle: self.spin_angle,
            textures: &self.textures,
            models: &self.models,
            lighting: &self.lighting,
            viewport: self.viewport,
        };
        self.composer.compose(gfx, &frame);
    }
}

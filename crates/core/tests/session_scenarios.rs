//! End-to-end scenarios driving a [`Session`] the way a windowing host
//! would, with fake collaborators and the recording graphics backend.

use std::{cell::RefCell, path::Path, rc::Rc, time::Duration};

use desk_scene_core::{
    AnimationPhase, AppConfig, CommandRecorder, FrameHandler, GraphicsApi, Key, KeyOutcome,
    LightId, PixelBuffer, RenderCommand, Result, SceneError, SceneImporter, SceneModel, Session,
    TextureLoader, TransformState,
};

#[derive(Debug)]
struct FakeModel {
    name: String,
    released: Rc<RefCell<Vec<String>>>,
}

impl SceneModel for FakeModel {
    fn initialize(&mut self, _gfx: &mut dyn GraphicsApi) -> Result<()> {
        Ok(())
    }

    fn draw(&self, gfx: &mut dyn GraphicsApi) {
        gfx.draw_mesh(&desk_scene_core::render::Mesh {
            name: self.name.clone(),
            ..Default::default()
        });
    }

    fn release(&mut self, _gfx: &mut dyn GraphicsApi) {
        self.released.borrow_mut().push(self.name.clone());
    }
}

#[derive(Default)]
struct FakeImporter {
    released: Rc<RefCell<Vec<String>>>,
}

impl SceneImporter for FakeImporter {
    fn load(&self, _directory: &Path, file_name: &str) -> Result<Box<dyn SceneModel>> {
        Ok(Box::new(FakeModel {
            name: file_name.to_string(),
            released: self.released.clone(),
        }))
    }
}

#[derive(Default)]
struct FakeLoader {
    broken: Option<&'static str>,
}

impl TextureLoader for FakeLoader {
    fn load_image(&self, path: &Path) -> Result<PixelBuffer> {
        if self.broken.is_some_and(|name| path.ends_with(name)) {
            return Err(SceneError::msg("unsupported format"));
        }
        Ok(PixelBuffer {
            width: 4,
            height: 4,
            rgba: vec![200; 64],
        })
    }
}

fn session_with(config: AppConfig, gfx: &mut CommandRecorder) -> Session {
    Session::initialize(
        config,
        &FakeImporter::default(),
        &FakeLoader::default(),
        gfx,
        800,
        600,
    )
    .expect("session initialises")
}

const FRAME: Duration = Duration::from_millis(16);
const TIMER_STEP: Duration = Duration::from_millis(5);

/// Runs the host loop until the sequencer is idle again, rendering roughly
/// every 16 ms. Returns the number of phase ticks that fired.
fn run_until_idle(session: &mut Session, gfx: &mut CommandRecorder, mut now: Duration) -> usize {
    let mut ticks = 0;
    let mut next_frame = now;
    while session.phase() != AnimationPhase::Idle {
        now += TIMER_STEP;
        if session.pump_timers(now) {
            ticks += 1;
        }
        if now >= next_frame {
            session.on_frame(gfx, now);
            assert!(gfx.is_balanced());
            next_frame = now + FRAME;
        }
        assert!(now < Duration::from_secs(120), "sequence never finished");
    }
    ticks
}

#[test]
fn eject_sequence_ends_in_showcase_placement() {
    let mut gfx = CommandRecorder::new();
    let mut session = session_with(AppConfig::default(), &mut gfx);
    assert_eq!(session.transform().object_scale, 1.0);
    assert_eq!(session.transform().object_x, 0.0);

    assert_eq!(session.on_key(Key::C, Duration::ZERO), KeyOutcome::StartAnimation);
    assert!(session.transform().locked);

    let ticks = run_until_idle(&mut session, &mut gfx, Duration::ZERO);
    assert_eq!(ticks, 21 + 60 + 6 + 21);

    let t = session.transform();
    assert_eq!(t.scene_distance, 1700.0);
    assert_eq!(t.rotation_x, 30.0);
    assert_eq!(t.rotation_y, 30.0);
    assert_eq!(t.object_x, 0.0);
    assert_eq!(t.object_z, 0.0);
    assert!(!t.locked);

    let rt = session.sequencer().runtime();
    assert_eq!(rt.tray_offset, 0.0);
    assert_eq!(rt.spin_speed, 0.0);
    assert_eq!(rt.disk_lift, 145.0);
}

#[test]
fn keys_are_ignored_while_the_tray_moves() {
    let mut gfx = CommandRecorder::new();
    let mut session = session_with(AppConfig::default(), &mut gfx);
    session.on_key(Key::C, Duration::ZERO);

    let mut now = Duration::ZERO;
    for _ in 0..40 {
        now += Duration::from_millis(50);
        session.pump_timers(now);
        let before = *session.transform();
        for key in [Key::W, Key::S, Key::Left, Key::PageUp, Key::Plus, Key::C] {
            assert_eq!(session.on_key(key, now), KeyOutcome::Rejected);
        }
        assert_eq!(*session.transform(), before);
    }
    assert_eq!(session.on_key(Key::F4, now), KeyOutcome::Terminate);
}

#[test]
fn larger_computer_stops_earlier_on_the_desk() {
    let furthest = |scale: f32| {
        let mut gfx = CommandRecorder::new();
        let config = AppConfig {
            initial: TransformState {
                object_scale: scale,
                ..TransformState::default()
            },
            ..AppConfig::default()
        };
        let mut session = session_with(config, &mut gfx);
        for _ in 0..60 {
            session.on_key(Key::Right, Duration::ZERO);
        }
        session.transform().object_x
    };

    let big = furthest(1.3);
    let small = furthest(0.3);
    assert!(big.abs() < small.abs(), "{big} vs {small}");
}

#[test]
fn resize_is_idempotent() {
    let mut gfx = CommandRecorder::new();
    let mut session = session_with(AppConfig::default(), &mut gfx);

    gfx.take_commands();
    session.on_resize(&mut gfx, 1024, 768);
    let once = (session.viewport(), session.projection());
    let first = gfx.take_commands();

    session.on_resize(&mut gfx, 1024, 768);
    let twice = (session.viewport(), session.projection());
    let second = gfx.take_commands();

    assert_eq!(once, twice);
    assert_eq!(first, second);
    assert!((once.1.aspect - 4.0 / 3.0).abs() < 1e-6);
}

#[test]
fn zero_height_resize_keeps_a_finite_aspect() {
    let mut gfx = CommandRecorder::new();
    let mut session = session_with(AppConfig::default(), &mut gfx);
    session.on_resize(&mut gfx, 640, 0);
    assert!(session.projection().aspect.is_finite());
    assert_eq!(session.viewport().height, 1);
}

#[test]
fn teardown_releases_every_resource() {
    let mut gfx = CommandRecorder::new();
    let importer = FakeImporter::default();
    let session = Session::initialize(
        AppConfig::default(),
        &importer,
        &FakeLoader::default(),
        &mut gfx,
        800,
        600,
    )
    .unwrap();
    assert_eq!(gfx.live_textures().len(), 10);

    session.teardown(&mut gfx);
    assert!(gfx.live_textures().is_empty());
    assert_eq!(*importer.released.borrow(), vec!["Computer.obj", "CD.obj"]);
}

#[test]
fn broken_texture_fails_initialisation_cleanly() {
    let mut gfx = CommandRecorder::new();
    let importer = FakeImporter::default();
    let err = Session::initialize(
        AppConfig::default(),
        &importer,
        &FakeLoader {
            broken: Some("wood.jpg"),
        },
        &mut gfx,
        800,
        600,
    )
    .unwrap_err();

    assert!(err.is_initialization_failure());
    assert!(gfx.live_textures().is_empty());
    assert_eq!(importer.released.borrow().len(), 2);
}

#[test]
fn spot_colour_change_reaches_the_next_frame() {
    let mut gfx = CommandRecorder::new();
    let mut session = session_with(AppConfig::default(), &mut gfx);
    session.on_frame(&mut gfx, Duration::ZERO);
    gfx.take_commands();

    session.set_spot_ambient([0.0, 0.4, 1.0]);
    session.on_frame(&mut gfx, FRAME);

    let spot = gfx.commands().iter().find_map(|command| match command {
        RenderCommand::ConfigureLight {
            id: LightId::Spot,
            light,
        } => Some(light.ambient),
        _ => None,
    });
    assert_eq!(spot, Some([0.0, 0.4, 1.0, 1.0]));
    assert_eq!(session.lighting().spot_ambient(), [0.0, 0.4, 1.0]);
}

#[test]
fn disk_spins_by_elapsed_time() {
    let mut gfx = CommandRecorder::new();
    let mut session = session_with(AppConfig::default(), &mut gfx);

    session.on_frame(&mut gfx, Duration::ZERO);
    assert_eq!(session.spin_angle(), 0.0);
    // 60 degrees per reference frame, 1/60 s later.
    session.on_frame(&mut gfx, Duration::from_secs_f32(1.0 / 60.0));
    assert!((session.spin_angle() - 60.0).abs() < 1e-2);
}

#[test]
fn invalid_configuration_is_rejected_before_any_graphics_call() {
    let locked = AppConfig {
        initial: TransformState {
            locked: true,
            ..TransformState::default()
        },
        ..AppConfig::default()
    };
    let mut stalled = AppConfig::default();
    stalled.animation.tray_step = 0.0;
    let mut tilted = AppConfig::default();
    tilted.initial.rotation_x = 135.0;

    for config in [locked, stalled, tilted] {
        let mut gfx = CommandRecorder::new();
        let importer = FakeImporter::default();
        let err = Session::initialize(
            config,
            &importer,
            &FakeLoader::default(),
            &mut gfx,
            800,
            600,
        )
        .unwrap_err();

        assert!(matches!(err, SceneError::InvalidSetting(_)), "{err}");
        assert!(gfx.commands().is_empty());
        assert!(importer.released.borrow().is_empty());
    }
}

#[test]
fn shortened_sequence_still_unlocks() {
    let mut config = AppConfig::default();
    config.animation.tray_step = 70.0;
    config.animation.spin_step = 30.0;
    let mut gfx = CommandRecorder::new();
    let mut session = session_with(config, &mut gfx);

    session.on_key(Key::C, Duration::ZERO);
    // 3 eject + 2 spin-down + 6 pop + 3 close.
    assert_eq!(run_until_idle(&mut session, &mut gfx, Duration::ZERO), 14);
    assert!(!session.transform().locked);
    assert_eq!(session.on_key(Key::Right, Duration::ZERO), KeyOutcome::Applied);
}

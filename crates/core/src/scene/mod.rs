//! Per-frame draw sequence.
//!
//! Nesting, outer to inner: camera, environment backdrop, the movable
//! computer (body, tray, disk), desk, floor. The overlay is drawn last in its
//! own corner viewport.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{
    animation::AnimationRuntime,
    assets::{TextureRegistry, TextureSlot},
    config::OverlayConfig,
    lighting::LightingRig,
    model::SceneModels,
    render::{Capability, DiskShape, GraphicsApi, OverlayText, Quad, Viewport},
    TransformState,
};

/// A textured box from the desk, placed in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeskPanel {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub color: [f32; 3],
}

/// Fixed geometry of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLayout {
    /// Vertical offset of the camera above the scene origin.
    pub camera_lift: f32,
    pub environment_half_size: f32,
    /// Nominal height of the computer body, used to keep it standing on the
    /// desk when scaled.
    pub body_height: f32,
    pub disk_x: f32,
    /// Depth of the disk while seated in the closed drive.
    pub disk_seat_z: f32,
    pub disk_scale: f32,
    pub disk: DiskShape,
    pub desk: [DeskPanel; 3],
    pub floor_depth: f32,
    pub floor_half_size: f32,
    /// How often the carpet texture repeats across the floor.
    pub floor_tiling: f32,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            camera_lift: 300.0,
            environment_half_size: 8000.0,
            body_height: 600.0,
            disk_x: -480.0,
            disk_seat_z: 480.0,
            disk_scale: 50.0,
            disk: DiskShape {
                inner_radius: 0.3,
                outer_radius: 1.5,
                slices: 50,
                loops: 120,
            },
            desk: [
                DeskPanel {
                    center: Vec3::new(0.0, -320.0, 300.0),
                    half_extents: Vec3::new(850.0, 30.0, 500.0),
                    color: [0.6, 0.3, 0.2],
                },
                DeskPanel {
                    center: Vec3::new(800.0, -600.0, 300.0),
                    half_extents: Vec3::new(30.0, 278.0, 450.0),
                    color: [0.8, 0.5, 0.3],
                },
                DeskPanel {
                    center: Vec3::new(-800.0, -598.0, 300.0),
                    half_extents: Vec3::new(30.0, 278.0, 450.0),
                    color: [0.8, 0.5, 0.3],
                },
            ],
            floor_depth: 880.0,
            floor_half_size: 2000.0,
            floor_tiling: 8.0,
        }
    }
}

/// Everything a frame reads. Nothing here is mutated while drawing.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub transform: &'a TransformState,
    pub runtime: &'a AnimationRuntime,
    /// Accumulated disk rotation in degrees.
    pub spin_angle: f32,
    pub textures: &'a TextureRegistry,
    pub models: &'a SceneModels,
    pub lighting: &'a LightingRig,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, Default)]
pub struct SceneComposer {
    layout: SceneLayout,
    overlay: OverlayConfig,
}

impl SceneComposer {
    pub fn new(layout: SceneLayout, overlay: OverlayConfig) -> Self {
        Self { layout, overlay }
    }

    /// Vertical offset that keeps the bottom of the scaled body on the desk.
    pub fn body_lift(&self, scale: f32) -> f32 {
        let height = self.layout.body_height;
        height * scale / 2.0 - height / 2.0
    }

    pub fn compose(&self, gfx: &mut dyn GraphicsApi, frame: &FrameContext<'_>) {
        let t = frame.transform;

        gfx.clear();
        gfx.push_matrix();
        gfx.translate(Vec3::new(0.0, self.layout.camera_lift, -t.scene_distance));
        gfx.rotate(t.rotation_x, Vec3::X);
        gfx.rotate(t.rotation_y, Vec3::Y);
        frame.lighting.position_point(gfx);

        self.draw_environment(gfx, frame.textures);
        self.draw_movable_object(gfx, frame);
        self.draw_desk(gfx, frame.textures);
        self.draw_floor(gfx, frame.textures);
        gfx.pop_matrix();

        self.draw_overlay(gfx, frame.viewport);
        gfx.flush();
    }

    /// Inward-facing faces of the unit environment cube.
    pub fn environment_faces() -> [(TextureSlot, Quad); 6] {
        [
            (
                TextureSlot::EnvironmentFront,
                quad(Vec3::NEG_Z, Vec3::X, Vec3::Y, 1.0),
            ),
            (
                TextureSlot::EnvironmentBack,
                quad(Vec3::Z, Vec3::NEG_X, Vec3::Y, 1.0),
            ),
            (
                TextureSlot::EnvironmentLeft,
                quad(Vec3::NEG_X, Vec3::NEG_Z, Vec3::Y, 1.0),
            ),
            (
                TextureSlot::EnvironmentRight,
                quad(Vec3::X, Vec3::Z, Vec3::Y, 1.0),
            ),
            (
                TextureSlot::EnvironmentTop,
                quad(Vec3::Y, Vec3::X, Vec3::Z, 1.0),
            ),
            (
                TextureSlot::EnvironmentBottom,
                quad(Vec3::NEG_Y, Vec3::X, Vec3::NEG_Z, 1.0),
            ),
        ]
    }

    /// Upward-facing unit floor quad with the carpet tiling applied.
    pub fn floor_quad(&self) -> Quad {
        quad(Vec3::ZERO, Vec3::X, Vec3::NEG_Z, self.layout.floor_tiling)
    }

    fn draw_environment(&self, gfx: &mut dyn GraphicsApi, textures: &TextureRegistry) {
        gfx.push_matrix();
        gfx.set_capability(Capability::Lighting, false);
        gfx.scale(Vec3::splat(self.layout.environment_half_size));
        gfx.set_color([1.0, 1.0, 1.0]);
        for (slot, face) in Self::environment_faces() {
            gfx.bind_texture(Some(textures.handle(slot)));
            gfx.draw_quad(&face);
        }
        gfx.bind_texture(None);
        gfx.set_capability(Capability::Lighting, true);
        gfx.pop_matrix();
    }

    fn draw_movable_object(&self, gfx: &mut dyn GraphicsApi, frame: &FrameContext<'_>) {
        let t = frame.transform;

        gfx.push_matrix();
        gfx.translate(Vec3::new(t.object_x, self.body_lift(t.object_scale), t.object_z));
        gfx.scale(Vec3::splat(t.object_scale));
        frame.lighting.position_spot(gfx);

        gfx.bind_texture(None);
        frame.models.computer.draw(gfx);

        gfx.push_matrix();
        gfx.translate(Vec3::new(0.0, 0.0, frame.runtime.tray_offset));
        frame.models.cd_tray.draw(gfx);
        gfx.pop_matrix();

        self.draw_disk(gfx, frame);
        gfx.pop_matrix();
    }

    fn draw_disk(&self, gfx: &mut dyn GraphicsApi, frame: &FrameContext<'_>) {
        let rt = frame.runtime;
        let layout = &self.layout;

        gfx.push_matrix();
        gfx.translate(Vec3::new(
            layout.disk_x,
            rt.disk_lift,
            layout.disk_seat_z + rt.disk_travel,
        ));
        gfx.rotate(frame.spin_angle, Vec3::Y);
        gfx.scale(Vec3::splat(layout.disk_scale));
        gfx.set_color([1.0, 1.0, 1.0]);

        // The disk primitive faces +Z; tip it so the label side faces up.
        gfx.rotate(-90.0, Vec3::X);
        gfx.bind_texture(Some(frame.textures.handle(TextureSlot::CdFront)));
        gfx.draw_disk(&layout.disk);
        gfx.rotate(180.0, Vec3::X);
        gfx.bind_texture(Some(frame.textures.handle(TextureSlot::CdBack)));
        gfx.draw_disk(&layout.disk);
        gfx.bind_texture(None);
        gfx.pop_matrix();
    }

    fn draw_desk(&self, gfx: &mut dyn GraphicsApi, textures: &TextureRegistry) {
        gfx.bind_texture(Some(textures.handle(TextureSlot::DeskWood)));
        for panel in &self.layout.desk {
            gfx.push_matrix();
            gfx.translate(panel.center);
            gfx.scale(panel.half_extents);
            gfx.set_color(panel.color);
            gfx.draw_box();
            gfx.pop_matrix();
        }
        gfx.bind_texture(None);
    }

    fn draw_floor(&self, gfx: &mut dyn GraphicsApi, textures: &TextureRegistry) {
        let half = self.layout.floor_half_size;

        gfx.push_matrix();
        gfx.translate(Vec3::new(0.0, -self.layout.floor_depth, 0.0));
        gfx.scale(Vec3::new(half, 1.0, half));
        gfx.set_color([1.0, 1.0, 1.0]);
        gfx.bind_texture(Some(textures.handle(TextureSlot::Carpet)));
        gfx.draw_quad(&self.floor_quad());
        gfx.bind_texture(None);
        gfx.pop_matrix();
    }

    fn draw_overlay(&self, gfx: &mut dyn GraphicsApi, viewport: Viewport) {
        let overlay = &self.overlay;
        let width = overlay.width.min(viewport.width);
        gfx.set_viewport(Viewport {
            x: viewport.x + (viewport.width - width) as i32,
            y: viewport.y,
            width,
            height: viewport.height,
        });

        for (index, line) in overlay.lines.iter().enumerate() {
            gfx.draw_text(&OverlayText {
                x: 0.0,
                y: overlay.top - index as f32 * overlay.line_spacing,
                color: overlay.color,
                font: overlay.font.clone(),
                size: overlay.font_size,
                text: line.clone(),
            });
        }

        gfx.set_viewport(viewport);
    }
}

/// Quad centred on `center` spanning `±u` and `±v`, facing `u × v`.
fn quad(center: Vec3, u: Vec3, v: Vec3, tiling: f32) -> Quad {
    Quad {
        positions: [
            center - u - v,
            center + u - v,
            center + u + v,
            center - u + v,
        ],
        tex_coords: [[0.0, 0.0], [tiling, 0.0], [tiling, tiling], [0.0, tiling]],
        normal: u.cross(v),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use glam::Mat4;

    use super::*;
    use crate::{
        config::AnimationConfig,
        lighting::{LightId, LightingConfig},
        model::SceneModel,
        render::{CommandRecorder, Mesh, RenderCommand, TextureHandle},
        Result,
    };

    #[derive(Debug)]
    struct MeshModel(Mesh);

    impl SceneModel for MeshModel {
        fn initialize(&mut self, _gfx: &mut dyn GraphicsApi) -> Result<()> {
            Ok(())
        }

        fn draw(&self, gfx: &mut dyn GraphicsApi) {
            gfx.draw_mesh(&self.0);
        }

        fn release(&mut self, _gfx: &mut dyn GraphicsApi) {}
    }

    fn models() -> SceneModels {
        let mesh = |name: &str| Mesh {
            name: name.to_string(),
            ..Mesh::default()
        };
        SceneModels {
            computer: Box::new(MeshModel(mesh("computer"))),
            cd_tray: Box::new(MeshModel(mesh("tray"))),
        }
    }

    fn textures() -> TextureRegistry {
        let handles: BTreeMap<_, _> = TextureSlot::ALL
            .into_iter()
            .enumerate()
            .map(|(index, slot)| (slot, TextureHandle(index as u32 + 1)))
            .collect();
        TextureRegistry::from_handles(handles).unwrap()
    }

    struct Fixture {
        models: SceneModels,
        textures: TextureRegistry,
        lighting: LightingRig,
        runtime: AnimationRuntime,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                models: models(),
                textures: textures(),
                lighting: LightingRig::new(LightingConfig::default()),
                runtime: AnimationRuntime::initial(&AnimationConfig::default()),
            }
        }

        fn render(&self, transform: &TransformState) -> CommandRecorder {
            let mut gfx = CommandRecorder::new();
            let frame = FrameContext {
                transform,
                runtime: &self.runtime,
                spin_angle: 0.0,
                textures: &self.textures,
                models: &self.models,
                lighting: &self.lighting,
                viewport: Viewport {
                    x: 0,
                    y: 0,
                    width: 800,
                    height: 600,
                },
            };
            SceneComposer::default().compose(&mut gfx, &frame);
            gfx
        }
    }

    fn mesh_model(gfx: &CommandRecorder, wanted: &str) -> Mat4 {
        gfx.commands()
            .iter()
            .find_map(|command| match command {
                RenderCommand::DrawMesh { name, model, .. } if name == wanted => Some(*model),
                _ => None,
            })
            .expect("mesh drawn")
    }

    fn quad_models(gfx: &CommandRecorder) -> Vec<Mat4> {
        gfx.commands()
            .iter()
            .filter_map(|command| match command {
                RenderCommand::DrawQuad { model, .. } => Some(*model),
                _ => None,
            })
            .collect()
    }

    fn box_models(gfx: &CommandRecorder) -> Vec<Mat4> {
        gfx.commands()
            .iter()
            .filter_map(|command| match command {
                RenderCommand::DrawBox { model } => Some(*model),
                _ => None,
            })
            .collect()
    }

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(a.abs_diff_eq(b, 1e-2), "{a} != {b}");
    }

    #[test]
    fn frame_leaves_matrix_stack_balanced() {
        let fixture = Fixture::new();
        let gfx = fixture.render(&TransformState::default());
        assert!(gfx.is_balanced());
    }

    #[test]
    fn draws_branches_in_fixed_order() {
        let fixture = Fixture::new();
        let gfx = fixture.render(&TransformState::default());

        let order: Vec<&str> = gfx
            .commands()
            .iter()
            .filter_map(|command| match command {
                RenderCommand::DrawQuad { .. } => Some("quad"),
                RenderCommand::DrawMesh { .. } => Some("mesh"),
                RenderCommand::DrawDisk { .. } => Some("disk"),
                RenderCommand::DrawBox { .. } => Some("box"),
                RenderCommand::DrawText { .. } => Some("text"),
                _ => None,
            })
            .collect();

        let mut expected = vec!["quad"; 6];
        expected.extend(["mesh", "mesh", "disk", "disk", "box", "box", "box", "quad"]);
        expected.extend(["text"; 5]);
        assert_eq!(order, expected);
        assert_eq!(gfx.commands().first(), Some(&RenderCommand::Clear));
        assert_eq!(gfx.commands().last(), Some(&RenderCommand::Flush));
    }

    #[test]
    fn object_translation_moves_only_the_movable_branch() {
        let fixture = Fixture::new();
        let still = fixture.render(&TransformState::default());
        let moved = fixture.render(&TransformState {
            object_x: 200.0,
            object_z: -40.0,
            ..TransformState::default()
        });

        assert_eq!(quad_models(&still), quad_models(&moved));
        assert_eq!(box_models(&still), box_models(&moved));

        let before = mesh_model(&still, "computer").transform_point3(Vec3::ZERO);
        let after = mesh_model(&moved, "computer").transform_point3(Vec3::ZERO);
        assert_close(after - before, Vec3::new(200.0, 0.0, -40.0));
    }

    #[test]
    fn tray_and_disk_follow_the_runtime() {
        let mut fixture = Fixture::new();
        fixture.runtime.tray_offset = 210.0;
        fixture.runtime.disk_travel = 210.0;
        fixture.runtime.disk_lift = 145.0;
        let gfx = fixture.render(&TransformState {
            scene_distance: 0.0,
            ..TransformState::default()
        });

        let camera = Mat4::from_translation(Vec3::new(0.0, 300.0, 0.0));
        let tray = camera.inverse() * mesh_model(&gfx, "tray");
        assert_close(tray.transform_point3(Vec3::ZERO), Vec3::new(0.0, 0.0, 210.0));

        let disk = gfx
            .commands()
            .iter()
            .find_map(|command| match command {
                RenderCommand::DrawDisk { model, .. } => Some(camera.inverse() * *model),
                _ => None,
            })
            .unwrap();
        assert_close(
            disk.transform_point3(Vec3::ZERO),
            Vec3::new(-480.0, 145.0, 690.0),
        );
    }

    #[test]
    fn spotlight_is_placed_inside_the_object_branch() {
        let fixture = Fixture::new();
        let gfx = fixture.render(&TransformState {
            object_x: 100.0,
            ..TransformState::default()
        });

        let mut placed = gfx.commands().iter().filter_map(|command| match command {
            RenderCommand::SetLightPosition { id, model, .. } => Some((*id, *model)),
            _ => None,
        });
        let (first, point_model) = placed.next().unwrap();
        let (second, spot_model) = placed.next().unwrap();
        assert_eq!(first, LightId::Point);
        assert_eq!(second, LightId::Spot);

        let offset = spot_model.transform_point3(Vec3::ZERO) - point_model.transform_point3(Vec3::ZERO);
        assert_close(offset, Vec3::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn overlay_viewport_is_restored() {
        let fixture = Fixture::new();
        let gfx = fixture.render(&TransformState::default());

        let viewports: Vec<Viewport> = gfx
            .commands()
            .iter()
            .filter_map(|command| match command {
                RenderCommand::SetViewport { viewport } => Some(*viewport),
                _ => None,
            })
            .collect();
        assert_eq!(viewports.len(), 2);
        assert_eq!(viewports[0].x, 620);
        assert_eq!(viewports[0].width, 180);
        assert_eq!(
            viewports[1],
            Viewport {
                x: 0,
                y: 0,
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn authored_quads_face_the_viewer() {
        for (slot, face) in SceneComposer::environment_faces() {
            assert!(face.is_front_facing(), "{slot:?} is culled");
            // Faces point into the cube.
            let center = face.positions.iter().copied().sum::<Vec3>() / 4.0;
            assert!(face.normal.dot(center) < 0.0, "{slot:?} faces outward");
        }

        let floor = SceneComposer::default().floor_quad();
        assert!(floor.is_front_facing());
        assert_eq!(floor.normal, Vec3::Y);
    }

    #[test]
    fn body_lift_keeps_the_base_on_the_desk() {
        let composer = SceneComposer::default();
        assert_eq!(composer.body_lift(1.0), 0.0);
        for scale in [0.3_f32, 0.8, 1.25] {
            let base = composer.body_lift(scale) - 300.0 * scale;
            assert!((base + 300.0).abs() < 1e-3);
        }
    }
}

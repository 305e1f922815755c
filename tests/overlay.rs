use camera_debugger::{
    frustum_edges, BufferKind, Camera, FrameControl, FrustumAspect, FrustumDebugOverlay,
    GraphicsError, OrbitInput, OverlayConfig, PerspectiveCamera, PixelRect, RasterState,
    RecordingContext, Renderable, TargetCamera, Topology, UniformValue, WireBox,
    FRUSTUM_INDEX_COUNT,
};
use glam::{Mat4, Vec2, Vec3};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn target_camera() -> PerspectiveCamera {
    let mut camera = PerspectiveCamera::new(WIDTH as f32, HEIGHT as f32, 60.0, 500.0, 2000.0);
    camera.set_position(Vec3::new(0.0, 600.0, 800.0));
    camera.look_at(Vec3::ZERO);
    camera
}

fn overlay(
    ctx: &mut RecordingContext,
    target: &PerspectiveCamera,
) -> FrustumDebugOverlay<RecordingContext> {
    FrustumDebugOverlay::new(ctx, target, WIDTH, HEIGHT, Vec3::new(1.0, 1.0, 0.0))
        .expect("overlay builds")
}

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-3
}

struct FailingObject;

impl Renderable<RecordingContext> for FailingObject {
    fn render(
        &mut self,
        _ctx: &mut RecordingContext,
        _camera: &dyn Camera,
    ) -> Result<(), GraphicsError> {
        Err(GraphicsError::Backend("object exploded".into()))
    }
}

#[test]
fn construction_creates_every_program_and_buffer_up_front() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let _overlay = overlay(&mut ctx, &target);

    assert_eq!(ctx.programs(), ["frustum", "axis", "plane", "grid"]);
    assert_eq!(
        ctx.buffers(),
        [
            BufferKind::Vertex,
            BufferKind::Index,
            BufferKind::Vertex,
            BufferKind::Vertex,
            BufferKind::Vertex,
        ]
    );
    assert!(ctx.draws().is_empty());
}

#[test]
fn render_draws_frustum_grid_axes_then_objects() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let mut overlay = overlay(&mut ctx, &target);
    let mut cube = WireBox::new(&mut ctx, Vec3::splat(200.0), Vec3::Y * 100.0, Vec3::ONE).unwrap();

    overlay.render(&mut ctx, &target, &mut [&mut cube]).unwrap();

    let programs: Vec<&str> = ctx.draws().iter().map(|d| d.program.as_str()).collect();
    assert_eq!(
        programs,
        ["frustum", "grid", "axis", "axis", "axis", "axis", "axis", "axis", "wire-box"]
    );
    assert!(ctx.draws().iter().all(|d| d.raster == RasterState::OPAQUE));
    assert!(ctx.draws().iter().all(|d| d.topology == Topology::Lines));

    // Objects are seen through the debug camera, not the target camera.
    let debug_view = overlay.debug_camera().view_matrix();
    let last = ctx.draws().last().unwrap();
    assert_eq!(last.uniform("view_matrix"), Some(UniformValue::Mat4(debug_view)));
}

#[test]
fn empty_object_list_still_draws_the_overlay() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let mut overlay = overlay(&mut ctx, &target);

    overlay.render(&mut ctx, &target, &mut []).unwrap();
    assert_eq!(ctx.draws().len(), 8);
}

#[test]
fn frustum_draw_uses_indices_and_target_pose() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let mut overlay = overlay(&mut ctx, &target);
    overlay.render(&mut ctx, &target, &mut []).unwrap();

    let frustum = &ctx.draws()[0];
    assert_eq!(frustum.count, FRUSTUM_INDEX_COUNT as u32);
    assert!(frustum.index_buffer.is_some());
    assert_eq!(
        frustum.uniform("color"),
        Some(UniformValue::Vec3(Vec3::new(1.0, 1.0, 0.0)))
    );

    let Some(UniformValue::Mat4(model)) = frustum.uniform("model_matrix") else {
        panic!("frustum model matrix missing");
    };
    assert!(approx(model.transform_point3(Vec3::ZERO), target.position()));
    assert!(approx(
        model.transform_vector3(Vec3::NEG_Z).normalize(),
        (Vec3::ZERO - target.position()).normalize()
    ));
    assert_eq!(model, overlay.frustum_transform());
}

#[test]
fn axes_are_colored_by_direction_at_both_grid_corners() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let mut overlay = overlay(&mut ctx, &target);
    overlay.render(&mut ctx, &target, &mut []).unwrap();

    let axes = &ctx.draws()[2..8];
    let anchors = [Vec3::new(-1000.0, 2.0, -1000.0), Vec3::new(1000.0, 2.0, 1000.0)];
    for (index, draw) in axes.iter().enumerate() {
        let direction = [Vec3::X, Vec3::Y, Vec3::Z][index % 3];
        assert_eq!(draw.count, 2);
        assert_eq!(draw.index_buffer, None);
        assert_eq!(draw.uniform("dir"), Some(UniformValue::Vec3(direction)));
        assert_eq!(draw.uniform("color"), Some(UniformValue::Vec3(direction)));
        assert_eq!(draw.uniform("length"), Some(UniformValue::Float(150.0)));
        assert_eq!(
            draw.uniform("start_position"),
            Some(UniformValue::Vec3(anchors[index / 3]))
        );
        assert_eq!(draw.uniform("model_matrix"), Some(UniformValue::Mat4(Mat4::IDENTITY)));
    }
}

#[test]
fn resize_rebuilds_vertices_in_place_and_keeps_indices() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let mut overlay = overlay(&mut ctx, &target);
    let (vertices, indices) = overlay.frustum_buffers();
    let original_vertices = vertices.data().to_vec();
    let original_indices = indices.data().to_vec();

    overlay.resize(&target, 800, 600).unwrap();
    overlay.resize(&target, WIDTH, HEIGHT).unwrap();

    let (vertices, indices) = overlay.frustum_buffers();
    assert_eq!(vertices.data(), original_vertices.as_slice());
    assert_eq!(vertices.uploads(), 2);
    assert_eq!(indices.data(), original_indices.as_slice());
    assert_eq!(indices.to_u16(), frustum_edges().to_vec());
    assert_eq!(indices.uploads(), 0);
    assert_eq!(overlay.size(), (WIDTH, HEIGHT));
    assert_eq!(ctx.buffers().len(), 5);
}

#[test]
fn zero_sized_resize_is_ignored() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let mut overlay = overlay(&mut ctx, &target);

    overlay.resize(&target, 0, 600).unwrap();
    assert_eq!(overlay.size(), (WIDTH, HEIGHT));
    assert_eq!(overlay.frustum_buffers().0.uploads(), 0);
}

#[test]
fn target_aspect_policy_ignores_overlay_size() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let mut overlay = overlay(&mut ctx, &target);
    let before = overlay.frustum_mesh().clone();

    overlay.resize(&target, 400, 800).unwrap();
    assert_eq!(overlay.frustum_mesh(), &before);
}

#[test]
fn viewport_aspect_policy_follows_overlay_size() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let config = OverlayConfig {
        frustum_aspect: FrustumAspect::Viewport,
        ..OverlayConfig::default()
    };
    let mut overlay = FrustumDebugOverlay::with_config(&mut ctx, &target, WIDTH, HEIGHT, config)
        .unwrap();

    overlay.resize(&target, 1000, 1000).unwrap();
    let near_corner = overlay.frustum_mesh().vertices[1];
    assert!((near_corner.x - near_corner.y).abs() < 1e-3);
    // The target camera's own lens is left alone.
    assert_eq!(target.width(), WIDTH as f32);
}

#[test]
fn update_buffer_picks_up_lens_changes() {
    let mut ctx = RecordingContext::new();
    let mut target = target_camera();
    let mut overlay = overlay(&mut ctx, &target);

    target.set_fov(90.0);
    target.set_clip_planes(1.0, 10.0);
    overlay.update_buffer(&target).unwrap();

    let far_corner = overlay.frustum_mesh().vertices[5];
    assert!((far_corner.y - 10.0).abs() < 1e-3);
    assert!((far_corner.z + 10.0).abs() < 1e-3);
    let floats = overlay.frustum_buffers().0.to_f32();
    assert_eq!(&floats[15..18], &far_corner.to_array());
}

#[test]
fn draw_plane_sends_clip_rect_without_touching_geometry() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let mut overlay = overlay(&mut ctx, &target);
    let window = Vec2::new(WIDTH as f32, HEIGHT as f32);

    overlay
        .draw_plane(&mut ctx, PixelRect::new(640.0, 360.0, 1280.0, 720.0), window, Vec3::ONE)
        .unwrap();

    let plane = &ctx.draws()[0];
    assert_eq!(plane.program, "plane");
    assert_eq!(plane.topology, Topology::Triangles);
    assert_eq!(plane.count, 6);
    assert_eq!(plane.uniform("center"), Some(UniformValue::Vec2(Vec2::ZERO)));
    assert_eq!(plane.uniform("half_size"), Some(UniformValue::Vec2(Vec2::ONE)));
    assert_eq!(plane.uniform("color"), Some(UniformValue::Vec3(Vec3::ONE)));
    assert_eq!(overlay.frustum_buffers().0.uploads(), 0);
}

#[test]
fn successive_planes_share_one_quad() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let mut overlay = overlay(&mut ctx, &target);
    let window = Vec2::new(WIDTH as f32, HEIGHT as f32);
    let quad = overlay.plane_buffer().data().to_vec();

    overlay
        .draw_plane(&mut ctx, PixelRect::new(640.0, 360.0, 1280.0, 720.0), window, Vec3::ONE)
        .unwrap();
    overlay
        .draw_plane(&mut ctx, PixelRect::new(320.0, 180.0, 320.0, 180.0), window, Vec3::ZERO)
        .unwrap();

    let [first, second] = ctx.draws() else {
        panic!("expected two plane draws");
    };
    assert_eq!(first.vertex_buffer, second.vertex_buffer);
    assert_eq!(first.vertex_buffer, overlay.plane_buffer().id());
    assert_eq!(second.uniform("center"), Some(UniformValue::Vec2(Vec2::new(-0.5, 0.5))));
    assert_eq!(second.uniform("half_size"), Some(UniformValue::Vec2(Vec2::new(0.25, 0.25))));
    assert_ne!(first.uniform("center"), second.uniform("center"));
    assert_ne!(first.uniform("half_size"), second.uniform("half_size"));
    assert_ne!(first.uniform("color"), second.uniform("color"));
    assert_eq!(overlay.plane_buffer().uploads(), 0);
    assert_eq!(overlay.plane_buffer().data(), quad.as_slice());
}

#[test]
fn failing_object_aborts_the_frame() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let mut overlay = overlay(&mut ctx, &target);
    let mut cube = WireBox::new(&mut ctx, Vec3::splat(200.0), Vec3::ZERO, Vec3::ONE).unwrap();
    let mut failing = FailingObject;

    let result = overlay.render(&mut ctx, &target, &mut [&mut failing, &mut cube]);
    assert_eq!(result, Err(GraphicsError::Backend("object exploded".into())));
    assert_eq!(ctx.draws().len(), 8);
}

#[test]
fn orbit_input_zooms_within_distance_range() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let mut overlay = overlay(&mut ctx, &target);

    overlay.handle_orbit_input(&OrbitInput {
        drag: Vec2::ZERO,
        wheel: 500.0,
    });
    assert!((overlay.debug_camera().position().length() - 300.0).abs() < 1e-2);

    overlay.handle_orbit_input(&OrbitInput {
        drag: Vec2::new(120.0, -40.0),
        wheel: -500.0,
    });
    assert!((overlay.debug_camera().position().length() - 10_000.0).abs() < 1.0);
    assert_eq!(overlay.orbit().distance_range(), (300.0, 10_000.0));
}

#[test]
fn overlay_planes_follow_depth_clears() {
    let mut ctx = RecordingContext::new();
    let target = target_camera();
    let mut overlay = overlay(&mut ctx, &target);
    let window = Vec2::new(WIDTH as f32, HEIGHT as f32);

    overlay.render(&mut ctx, &target, &mut []).unwrap();
    ctx.clear_depth();
    overlay
        .draw_plane(&mut ctx, PixelRect::new(100.0, 100.0, 50.0, 50.0), window, Vec3::ZERO)
        .unwrap();

    assert_eq!(ctx.draws().len(), 9);
    assert_eq!(ctx.events().len(), 1);
    assert_eq!(ctx.events()[0].0, 8);
}

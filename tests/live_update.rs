use door_configurator::error::TextureError;
use door_configurator::geometry::GeometryId;
use door_configurator::render_loop::{handle_resize, Frame};
use door_configurator::texture::{Completions, TextureId, TextureSlot};
use door_configurator::{
    AppContext, ConfiguratorConfig, Dimension, DoorError, FrameSink, RenderError, RenderLoop,
    TextureProvider, TextureSource, TickOutcome, Viewport,
};

/// Fails every load on the spot, as a missing image file would.
struct MissingImages;

impl TextureSource for MissingImages {
    fn start(&self, id: TextureId, path: &str, completions: Completions) {
        completions.push(
            id,
            Err(TextureError::Fetch {
                path: path.to_string(),
                reason: "HTTP 404".to_string(),
            }),
        );
    }
}

#[derive(Default)]
struct CountingSink {
    captures: usize,
    draws: usize,
    surface: Option<(u32, u32)>,
    released: Vec<GeometryId>,
}

impl FrameSink for CountingSink {
    fn capture_reflection(&mut self, _frame: &Frame<'_>) -> Result<(), RenderError> {
        self.captures += 1;
        Ok(())
    }

    fn draw(&mut self, _frame: &Frame<'_>) -> Result<(), RenderError> {
        self.draws += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.surface = Some((width, height));
    }

    fn release(&mut self, geometries: &[GeometryId]) {
        self.released.extend_from_slice(geometries);
    }
}

fn start(width: u32, height: u32) -> AppContext {
    AppContext::new(
        ConfiguratorConfig::default(),
        TextureProvider::new(Box::new(MissingImages)),
        Viewport::new(width, height),
    )
    .expect("default door is valid")
}

#[test]
fn width_change_replaces_the_door() {
    let mut ctx = start(1280, 720);
    let outcome = ctx.apply_input(Dimension::Width, 3.0).expect("valid width");
    assert_eq!(outcome.label, "3");
    assert_eq!((outcome.width, outcome.height), (3.0, 4.0));

    let door = ctx.scene.door().expect("door attached");
    let panel = door.panel_extents();
    assert!((panel.x - 2.8).abs() < 1e-5);
    assert!((panel.y - 3.8).abs() < 1e-5);
    assert_eq!(ctx.controller.label(Dimension::Width), "3");
}

#[test]
fn rejected_value_keeps_the_previous_door() {
    let mut ctx = start(1280, 720);
    let before = ctx.scene.door().expect("door attached").geometry_ids();

    let err = ctx.apply_input(Dimension::Height, 0.1).unwrap_err();
    assert!(matches!(
        err,
        DoorError::InvalidDimension {
            dimension: Dimension::Height,
            ..
        }
    ));
    let door = ctx.scene.door().expect("door still attached");
    assert_eq!(door.geometry_ids(), before);
    assert_eq!(door.spec().height, 4.0);
}

#[test]
fn frames_keep_running_when_every_texture_fails() {
    let mut ctx = start(1280, 720);
    let mut sink = CountingSink::default();
    let mut render_loop = RenderLoop::new();

    for _ in 0..2 {
        assert_eq!(
            render_loop.tick(&mut ctx, &mut sink).expect("frame"),
            TickOutcome::Continue
        );
    }
    assert_eq!(ctx.textures.pending_count(), 0);
    let wood = ctx.scene.textures().wood;
    assert!(matches!(ctx.textures.slot(wood), Some(TextureSlot::Failed(_))));
    assert_eq!((sink.captures, sink.draws), (2, 2));
}

#[test]
fn old_door_geometry_is_released_on_the_next_frame() {
    let mut ctx = start(1280, 720);
    let old = ctx.scene.door().expect("door attached").geometry_ids();
    ctx.apply_input(Dimension::Width, 3.0).expect("valid width");
    ctx.apply_input(Dimension::Height, 5.0).expect("valid height");
    let replaced = ctx.scene.door().expect("door attached").geometry_ids();

    let mut sink = CountingSink::default();
    RenderLoop::new()
        .tick(&mut ctx, &mut sink)
        .expect("frame");
    assert_eq!(sink.released.len(), old.len() * 2);
    assert!(old.iter().all(|id| sink.released.contains(id)));
    assert!(replaced.iter().all(|id| !sink.released.contains(id)));
}

#[test]
fn resize_updates_camera_and_surface_only() {
    let mut ctx = start(1920, 1080);
    let door = ctx.scene.door().expect("door attached").geometry_ids();
    let nodes = ctx.scene.nodes().len();
    let mut sink = CountingSink::default();

    assert!(handle_resize(&mut ctx, &mut sink, 800, 600));
    assert_eq!(sink.surface, Some((800, 600)));
    assert!((ctx.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    assert_eq!(ctx.scene.door().expect("door attached").geometry_ids(), door);
    assert_eq!(ctx.scene.nodes().len(), nodes);

    sink.surface = None;
    assert!(!handle_resize(&mut ctx, &mut sink, 800, 600));
    assert_eq!(sink.surface, None);
}

#[test]
fn stopped_loop_draws_nothing() {
    let mut ctx = start(640, 480);
    let mut sink = CountingSink::default();
    let mut render_loop = RenderLoop::new();
    let stop = render_loop.stop_handle();

    render_loop.tick(&mut ctx, &mut sink).expect("frame");
    stop.stop();
    assert!(!stop.is_running());
    assert_eq!(
        render_loop.tick(&mut ctx, &mut sink).expect("stopped"),
        TickOutcome::Stopped
    );
    assert_eq!(sink.draws, 1);
    assert_eq!(render_loop.frames(), 1);
}

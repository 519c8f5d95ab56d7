//! Per-frame sequencing shared by the native and browser shells.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, trace};

use crate::app::AppContext;
use crate::camera::PerspectiveCamera;
use crate::error::RenderError;
use crate::geometry::GeometryId;
use crate::scene::{Scene, REFLECTIVE_PROP};
use crate::texture::TextureProvider;

/// Read-only view of everything a frame draws.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    pub scene: &'a Scene,
    pub camera: &'a PerspectiveCamera,
    pub textures: &'a TextureProvider,
}

/// Backend that turns frames into pixels.
pub trait FrameSink {
    /// Renders the six faces of the reflection probe.
    fn capture_reflection(&mut self, frame: &Frame<'_>) -> Result<(), RenderError>;
    /// Renders the frame from the viewing camera and presents it.
    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), RenderError>;
    fn resize(&mut self, width: u32, height: u32);
    /// Frees GPU buffers of geometries no longer in the scene.
    fn release(&mut self, geometries: &[GeometryId]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stopped,
}

/// Cloneable handle that ends the loop before its next frame.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives one frame per display refresh until stopped.
#[derive(Debug)]
pub struct RenderLoop {
    running: Arc<AtomicBool>,
    frames: u64,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            frames: 0,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.running))
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one frame: settle textures, free detached geometry, capture the
    /// reflection with the reflective prop hidden, advance the orbit camera,
    /// then draw.
    pub fn tick(
        &mut self,
        ctx: &mut AppContext,
        sink: &mut dyn FrameSink,
    ) -> Result<TickOutcome, RenderError> {
        if !self.running.load(Ordering::SeqCst) {
            return Ok(TickOutcome::Stopped);
        }

        let settled = ctx.textures.poll();
        if !settled.is_empty() {
            debug!("{} texture(s) settled", settled.len());
        }

        let released = ctx.releases.drain();
        if !released.is_empty() {
            trace!("releasing {} geometries", released.len());
            sink.release(&released);
        }

        ctx.scene.set_visible(REFLECTIVE_PROP, false);
        let captured = sink.capture_reflection(&Frame {
            scene: &ctx.scene,
            camera: &ctx.camera,
            textures: &ctx.textures,
        });
        ctx.scene.set_visible(REFLECTIVE_PROP, true);
        captured?;

        ctx.controls.update(&mut ctx.camera);

        sink.draw(&Frame {
            scene: &ctx.scene,
            camera: &ctx.camera,
            textures: &ctx.textures,
        })?;
        self.frames += 1;
        Ok(TickOutcome::Continue)
    }
}

/// Applies a new drawable size to the camera and the backend.
pub fn handle_resize(
    ctx: &mut AppContext,
    sink: &mut dyn FrameSink,
    width: u32,
    height: u32,
) -> bool {
    if !ctx.resize(width, height) {
        return false;
    }
    debug!("viewport resized to {width}x{height}");
    sink.resize(width, height);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Viewport;
    use crate::config::ConfiguratorConfig;
    use crate::error::Dimension;
    use crate::texture::{Completions, TextureId, TextureSource};

    struct NoopSource;

    impl TextureSource for NoopSource {
        fn start(&self, _id: TextureId, _path: &str, _completions: Completions) {}
    }

    #[derive(Debug, Default)]
    struct RecordingSink {
        events: Vec<String>,
        prop_visible_during_capture: Vec<bool>,
        draws_with_prop: usize,
        fail_capture: bool,
        released: Vec<GeometryId>,
    }

    impl FrameSink for RecordingSink {
        fn capture_reflection(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
            self.events.push("capture".into());
            let visible = frame
                .scene
                .node(REFLECTIVE_PROP)
                .map_or(true, |node| node.visible);
            self.prop_visible_during_capture.push(visible);
            if self.fail_capture {
                return Err(RenderError::OutOfMemory);
            }
            Ok(())
        }

        fn draw(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
            self.events.push("draw".into());
            if frame
                .scene
                .draw_list()
                .iter()
                .any(|item| item.name == REFLECTIVE_PROP)
            {
                self.draws_with_prop += 1;
            }
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.events.push(format!("resize {width}x{height}"));
        }

        fn release(&mut self, geometries: &[GeometryId]) {
            self.events.push("release".into());
            self.released.extend_from_slice(geometries);
        }
    }

    fn context(width: u32, height: u32) -> AppContext {
        AppContext::new(
            ConfiguratorConfig::default(),
            TextureProvider::new(Box::new(NoopSource)),
            Viewport::new(width, height),
        )
        .unwrap()
    }

    #[test]
    fn prop_is_hidden_only_while_capturing() {
        let mut ctx = context(640, 480);
        let mut sink = RecordingSink::default();
        let mut render_loop = RenderLoop::new();
        for _ in 0..3 {
            assert_eq!(
                render_loop.tick(&mut ctx, &mut sink).unwrap(),
                TickOutcome::Continue
            );
        }
        assert_eq!(sink.prop_visible_during_capture, vec![false; 3]);
        assert_eq!(sink.draws_with_prop, 3);
        assert_eq!(
            sink.events,
            vec!["capture", "draw", "capture", "draw", "capture", "draw"]
        );
        assert_eq!(render_loop.frames(), 3);
    }

    #[test]
    fn failed_capture_restores_visibility() {
        let mut ctx = context(640, 480);
        let mut sink = RecordingSink {
            fail_capture: true,
            ..RecordingSink::default()
        };
        let mut render_loop = RenderLoop::new();
        assert!(render_loop.tick(&mut ctx, &mut sink).is_err());
        assert!(ctx.scene.node(REFLECTIVE_PROP).unwrap().visible);
        assert_eq!(render_loop.frames(), 0);
    }

    #[test]
    fn replaced_door_geometry_is_released_before_drawing() {
        let mut ctx = context(640, 480);
        let old_ids = ctx.scene.door().unwrap().geometry_ids();
        ctx.apply_input(Dimension::Width, 3.0).unwrap();

        let mut sink = RecordingSink::default();
        let mut render_loop = RenderLoop::new();
        render_loop.tick(&mut ctx, &mut sink).unwrap();
        assert_eq!(sink.events[0], "release");
        assert_eq!(sink.released, old_ids);

        render_loop.tick(&mut ctx, &mut sink).unwrap();
        assert_eq!(sink.events.iter().filter(|e| *e == "release").count(), 1);
    }

    #[test]
    fn stop_handle_ends_the_loop() {
        let mut ctx = context(640, 480);
        let mut sink = RecordingSink::default();
        let mut render_loop = RenderLoop::new();
        let handle = render_loop.stop_handle();
        render_loop.tick(&mut ctx, &mut sink).unwrap();
        handle.stop();
        assert!(!handle.is_running());
        assert_eq!(
            render_loop.tick(&mut ctx, &mut sink).unwrap(),
            TickOutcome::Stopped
        );
        assert_eq!(sink.events.len(), 2);
    }

    #[test]
    fn resize_reaches_camera_and_backend() {
        let mut ctx = context(1920, 1080);
        let mut sink = RecordingSink::default();
        assert!(handle_resize(&mut ctx, &mut sink, 800, 600));
        assert!((ctx.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(sink.events, vec!["resize 800x600"]);

        assert!(!handle_resize(&mut ctx, &mut sink, 0, 0));
        assert_eq!(sink.events.len(), 1);
    }
}

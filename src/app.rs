use std::fmt::Write as _;

use log::info;

use crate::camera::{OrbitControls, PerspectiveCamera};
use crate::config::ConfiguratorConfig;
use crate::controller::{LiveUpdateController, UpdateOutcome};
use crate::door::DoorAssembly;
use crate::error::{Dimension, DoorError};
use crate::geometry::Primitive;
use crate::scene::{EnvironmentTextures, ReleaseQueue, Scene};
use crate::texture::TextureProvider;

/// Drawable area in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Everything the render loop and the input handlers share.
pub struct AppContext {
    pub config: ConfiguratorConfig,
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub viewport: Viewport,
    pub textures: TextureProvider,
    pub controller: LiveUpdateController,
    pub releases: ReleaseQueue,
}

impl AppContext {
    /// Starts texture loads, composes the room and attaches the initial door.
    pub fn new(
        config: ConfiguratorConfig,
        mut textures: TextureProvider,
        viewport: Viewport,
    ) -> Result<Self, DoorError> {
        let handles = EnvironmentTextures::request(&mut textures, &config);
        let mut scene = Scene::compose(handles, &config);
        let mut releases = ReleaseQueue::new();
        let mut controller = LiveUpdateController::new(config.controls);
        controller.attach_initial(&mut scene, &mut releases)?;
        info!(
            "scene ready with a {}x{} door",
            config.controls.width.value, config.controls.height.value
        );
        Ok(Self {
            camera: PerspectiveCamera::new(viewport.aspect()),
            controls: OrbitControls::new(),
            config,
            scene,
            viewport,
            textures,
            controller,
            releases,
        })
    }

    pub fn apply_input(
        &mut self,
        dimension: Dimension,
        value: f32,
    ) -> Result<UpdateOutcome, DoorError> {
        self.controller
            .apply(dimension, value, &mut self.scene, &mut self.releases)
    }

    pub fn step_input(
        &mut self,
        dimension: Dimension,
        steps: i32,
    ) -> Result<UpdateOutcome, DoorError> {
        self.controller
            .step(dimension, steps, &mut self.scene, &mut self.releases)
    }

    /// Records a new drawable size. Zero sized viewports, as reported while a
    /// window is minimized, are ignored. Returns true when the size changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
        true
    }
}

/// Text description of a door, one part per line.
pub fn door_summary(door: &DoorAssembly) -> String {
    let spec = door.spec();
    let panel = door.panel_extents();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Door {} x {} (panel {:.2} x {:.2})",
        spec.width, spec.height, panel.x, panel.y
    );
    for part in door.parts() {
        let position = part.transform.translation;
        let shape = match *part.primitive() {
            Primitive::Box {
                width,
                height,
                depth,
            } => format!("box {width:.2} x {height:.2} x {depth:.2}"),
            Primitive::Cylinder {
                radius_top, height, ..
            } => format!("cylinder r={radius_top:.2} l={height:.2}"),
            Primitive::Cone { radius, height, .. } => format!("cone r={radius:.2} h={height:.2}"),
            Primitive::Plane { width, height } => format!("plane {width:.2} x {height:.2}"),
        };
        let _ = writeln!(
            out,
            " - {} {} at ({:.2}, {:.2}, {:.2})",
            part.kind.name(),
            shape,
            position.x,
            position.y,
            position.z
        );
    }
    let _ = write!(out, "floor contact y={:.2}", door.world_bounds().min.y);
    out
}

pub fn print_door_summary(door: &DoorAssembly) {
    println!("{}", door_summary(door));
}

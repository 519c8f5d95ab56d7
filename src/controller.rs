//! Turns range input events into door swaps.

use log::{debug, warn};

use crate::config::DoorControls;
use crate::door::{generate, DoorAssembly};
use crate::error::{Dimension, DoorError};
use crate::scene::{ReleaseQueue, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    /// A new door is being generated and swapped in.
    Swapping,
}

/// Result of a successfully applied input event.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub dimension: Dimension,
    pub label: String,
    pub width: f32,
    pub height: f32,
}

/// Holds the last value of each input and rebuilds the door on every change.
#[derive(Debug, Clone)]
pub struct LiveUpdateController {
    controls: DoorControls,
    width: f32,
    height: f32,
    width_label: String,
    height_label: String,
    state: ControllerState,
}

impl LiveUpdateController {
    pub fn new(controls: DoorControls) -> Self {
        let width = controls.width.value;
        let height = controls.height.value;
        Self {
            controls,
            width,
            height,
            width_label: format_value(width),
            height_label: format_value(height),
            state: ControllerState::Idle,
        }
    }

    /// Builds the door for the current input values and attaches it.
    pub fn attach_initial(
        &mut self,
        scene: &mut Scene,
        releases: &mut ReleaseQueue,
    ) -> Result<(), DoorError> {
        let door = generate(self.width, self.height)?;
        swap(scene, releases, door);
        Ok(())
    }

    /// Applies one input event.
    ///
    /// The value is recorded and shown in the label even when it is rejected;
    /// a rejected value leaves the previous door in the scene.
    pub fn apply(
        &mut self,
        dimension: Dimension,
        value: f32,
        scene: &mut Scene,
        releases: &mut ReleaseQueue,
    ) -> Result<UpdateOutcome, DoorError> {
        match dimension {
            Dimension::Width => {
                self.width = value;
                self.width_label = format_value(value);
            }
            Dimension::Height => {
                self.height = value;
                self.height_label = format_value(value);
            }
        }

        self.state = ControllerState::Swapping;
        let result = generate(self.width, self.height);
        self.state = ControllerState::Idle;

        let door = result.map_err(|err| {
            warn!("{err}; keeping the current door");
            err
        })?;
        debug!("door resized to {}x{}", self.width, self.height);
        swap(scene, releases, door);
        Ok(UpdateOutcome {
            dimension,
            label: self.label(dimension).to_string(),
            width: self.width,
            height: self.height,
        })
    }

    pub fn set_width(
        &mut self,
        value: f32,
        scene: &mut Scene,
        releases: &mut ReleaseQueue,
    ) -> Result<UpdateOutcome, DoorError> {
        self.apply(Dimension::Width, value, scene, releases)
    }

    pub fn set_height(
        &mut self,
        value: f32,
        scene: &mut Scene,
        releases: &mut ReleaseQueue,
    ) -> Result<UpdateOutcome, DoorError> {
        self.apply(Dimension::Height, value, scene, releases)
    }

    /// Moves an input by whole steps within its range, as keyboard focus on a
    /// range input would.
    pub fn step(
        &mut self,
        dimension: Dimension,
        steps: i32,
        scene: &mut Scene,
        releases: &mut ReleaseQueue,
    ) -> Result<UpdateOutcome, DoorError> {
        let value = self.controls.get(dimension).stepped(self.value(dimension), steps);
        self.apply(dimension, value, scene, releases)
    }

    pub fn value(&self, dimension: Dimension) -> f32 {
        match dimension {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
        }
    }

    /// Current `(width, height)` input values.
    pub fn inputs(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn label(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Width => &self.width_label,
            Dimension::Height => &self.height_label,
        }
    }

    pub fn controls(&self) -> &DoorControls {
        &self.controls
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }
}

fn swap(scene: &mut Scene, releases: &mut ReleaseQueue, door: DoorAssembly) {
    if let Some(old) = scene.replace_door(door) {
        releases.push_door(&old);
    }
}

/// Shortest decimal form of an input value, e.g. `3` rather than `3.0`.
pub fn format_value(value: f32) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfiguratorConfig;
    use crate::scene::EnvironmentTextures;
    use crate::texture::{Completions, TextureId, TextureProvider, TextureSource};

    struct NoopSource;

    impl TextureSource for NoopSource {
        fn start(&self, _id: TextureId, _path: &str, _completions: Completions) {}
    }

    fn setup() -> (LiveUpdateController, Scene, ReleaseQueue) {
        let config = ConfiguratorConfig::default();
        let mut provider = TextureProvider::new(Box::new(NoopSource));
        let textures = EnvironmentTextures::request(&mut provider, &config);
        let mut scene = Scene::compose(textures, &config);
        let mut releases = ReleaseQueue::new();
        let mut controller = LiveUpdateController::new(config.controls);
        controller.attach_initial(&mut scene, &mut releases).unwrap();
        (controller, scene, releases)
    }

    #[test]
    fn initial_door_uses_input_values() {
        let (controller, scene, releases) = setup();
        assert_eq!(scene.door().unwrap().spec().width, 2.0);
        assert_eq!(controller.label(Dimension::Height), "4");
        assert!(releases.is_empty());
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[test]
    fn width_change_rebuilds_with_current_height() {
        let (mut controller, mut scene, mut releases) = setup();
        let outcome = controller
            .set_width(3.0, &mut scene, &mut releases)
            .unwrap();
        assert_eq!(outcome.label, "3");
        assert_eq!((outcome.width, outcome.height), (3.0, 4.0));
        let door = scene.door().unwrap();
        assert!((door.panel_extents().x - 2.8).abs() < 1e-5);
        assert!((door.panel_extents().y - 3.8).abs() < 1e-5);
        assert_eq!(releases.len(), 4);
    }

    #[test]
    fn fractional_values_keep_their_decimals() {
        let (mut controller, mut scene, mut releases) = setup();
        controller
            .set_height(2.5, &mut scene, &mut releases)
            .unwrap();
        assert_eq!(controller.label(Dimension::Height), "2.5");
    }

    #[test]
    fn rejected_value_keeps_previous_door() {
        let (mut controller, mut scene, mut releases) = setup();
        let err = controller
            .set_width(0.1, &mut scene, &mut releases)
            .unwrap_err();
        assert!(matches!(
            err,
            DoorError::InvalidDimension {
                dimension: Dimension::Width,
                ..
            }
        ));
        assert_eq!(scene.door().unwrap().spec().width, 2.0);
        assert_eq!(controller.label(Dimension::Width), "0.1");
        assert!(releases.is_empty());
        assert_eq!(controller.state(), ControllerState::Idle);

        // recovers once a valid width comes back
        controller
            .set_width(2.0, &mut scene, &mut releases)
            .unwrap();
        controller
            .set_height(5.0, &mut scene, &mut releases)
            .unwrap();
        assert_eq!(scene.door().unwrap().spec().height, 5.0);
    }

    #[test]
    fn stepping_stays_inside_range() {
        let (mut controller, mut scene, mut releases) = setup();
        for _ in 0..40 {
            controller
                .step(Dimension::Width, 1, &mut scene, &mut releases)
                .unwrap();
        }
        assert_eq!(controller.value(Dimension::Width), 4.0);
        let outcome = controller
            .step(Dimension::Width, -1, &mut scene, &mut releases)
            .unwrap();
        assert!((outcome.width - 3.9).abs() < 1e-5);
    }

    /// Label a range input shows after `k` steps of 0.1.
    fn grid_label(start_tenths: i32, k: i32) -> String {
        let tenths = start_tenths + k;
        if tenths % 10 == 0 {
            format!("{}", tenths / 10)
        } else {
            format!("{}.{}", tenths / 10, tenths % 10)
        }
    }

    #[test]
    fn keyboard_steps_land_on_the_decimal_grid() {
        let (mut controller, mut scene, mut releases) = setup();
        let sweeps = [
            // width 2.0 up to 4.0, then down to 1.0
            (Dimension::Width, 20, 1, 20),
            (Dimension::Width, 40, -1, 30),
            // height 4.0 up to 6.0, then down to 2.0
            (Dimension::Height, 40, 1, 20),
            (Dimension::Height, 60, -1, 40),
        ];
        for (dimension, start_tenths, direction, count) in sweeps {
            for k in 1..=count {
                let outcome = controller
                    .step(dimension, direction, &mut scene, &mut releases)
                    .unwrap();
                let expected = grid_label(start_tenths, direction * k);
                assert_eq!(outcome.label, expected);
                assert_eq!(controller.value(dimension), expected.parse::<f32>().unwrap());
            }
        }
        assert_eq!(controller.label(Dimension::Width), "1");
        assert_eq!(controller.label(Dimension::Height), "2");
        let door = scene.door().unwrap();
        assert_eq!((door.spec().width, door.spec().height), (1.0, 2.0));
    }
}

//! Interactive 3D door configurator.
//!
//! A parametric generator turns a width and a height into a framed door
//! assembly. The live update controller swaps that assembly inside a composed
//! room whenever an input changes, and the render loop draws the room with a
//! shadow casting sun and a reflective prop. The same core drives a native
//! winit window and a browser canvas; everything above the [`render`] module
//! runs without a GPU so it can be exercised headless.

pub mod app;
pub mod camera;
pub mod config;
pub mod controller;
pub mod door;
pub mod error;
pub mod geometry;
pub mod input;
pub mod markup;
pub mod material;
pub mod render;
pub mod render_loop;
pub mod scene;
pub mod texture;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{AppContext, Viewport};
pub use config::{ConfiguratorConfig, ControlRange, DoorControls};
pub use controller::{LiveUpdateController, UpdateOutcome};
pub use door::{generate, DoorAssembly, DoorPart, DoorSpec, PartKind};
pub use error::{Dimension, DoorError, RenderError, TextureError};
pub use render::Renderer;
pub use render_loop::{FrameSink, RenderLoop, StopHandle, TickOutcome};
pub use scene::{ReleaseQueue, Scene};
pub use texture::{TextureProvider, TextureSource};

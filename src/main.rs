#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = native::run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

/// Windowed shell and headless summary mode. The browser build starts from
/// `door_configurator::web` instead.
#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::any::Any;
    use std::env;
    use std::fs;
    use std::panic::{self, AssertUnwindSafe};
    use std::path::Path;
    use std::sync::Arc;

    use anyhow::{anyhow, Context, Result};
    use glam::Vec2;
    use log::{info, warn};
    use pollster::block_on;
    use winit::dpi::LogicalSize;
    use winit::event::{ElementState, Event, MouseScrollDelta, WindowEvent};
    use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
    use winit::keyboard::{KeyCode, PhysicalKey};
    use winit::window::{Window, WindowBuilder};

    use door_configurator::app::{print_door_summary, AppContext, Viewport};
    use door_configurator::config::ConfiguratorConfig;
    use door_configurator::input::{key_action, Action, MouseButton, NamedKey, PointerState};
    use door_configurator::markup::parse_controls;
    use door_configurator::render_loop::{handle_resize, RenderLoop, TickOutcome};
    use door_configurator::texture::{FileSource, TextureProvider};
    use door_configurator::{generate, RenderError, Renderer};

    /// Pixels of touchpad scrolling that count as one wheel notch.
    const PIXELS_PER_NOTCH: f64 = 100.0;

    pub fn run() -> Result<()> {
        let options = CliOptions::parse()?;
        let config = options.config()?;

        if options.summary_only {
            let door = generate(config.controls.width.value, config.controls.height.value)?;
            print_door_summary(&door);
            return Ok(());
        }
        run_interactive(config)
    }

    fn run_interactive(config: ConfiguratorConfig) -> Result<()> {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
        panic::set_hook(default_hook);
        let event_loop = event_loop
            .map_err(|panic| RenderError::unavailable("event loop", panic_message(panic)))?
            .map_err(|err| RenderError::unavailable("event loop", err))?;

        let window = Arc::new(
            WindowBuilder::new()
                .with_title(config.window.title.as_str())
                .with_inner_size(LogicalSize::new(config.window.width, config.window.height))
                .build(&event_loop)
                .map_err(|err| RenderError::unavailable("window", err))?,
        );
        let renderer = block_on(Renderer::for_window(Arc::clone(&window), &config.render))?;

        let size = window.inner_size();
        let textures = TextureProvider::new(Box::new(FileSource::new(config.assets.root.clone())));
        let ctx = AppContext::new(config, textures, Viewport::new(size.width, size.height))
            .context("failed to build the initial door")?;
        if let Some(door) = ctx.scene.door() {
            print_door_summary(door);
        }

        let mut app = NativeApp {
            window,
            ctx,
            renderer,
            render_loop: RenderLoop::new(),
            pointer: PointerState::new(),
            cursor: Vec2::ZERO,
            last_error: None,
        };

        event_loop.run(|event, target| {
            target.set_control_flow(ControlFlow::Poll);
            if let Err(err) = app.process_event(event, target) {
                app.last_error = Some(err);
                target.exit();
            }
        })?;

        info!("rendered {} frame(s)", app.render_loop.frames());
        match app.last_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    struct NativeApp {
        window: Arc<Window>,
        ctx: AppContext,
        renderer: Renderer,
        render_loop: RenderLoop,
        pointer: PointerState,
        cursor: Vec2,
        last_error: Option<anyhow::Error>,
    }

    impl NativeApp {
        fn process_event(
            &mut self,
            event: Event<()>,
            target: &EventLoopWindowTarget<()>,
        ) -> Result<()> {
            match event {
                Event::WindowEvent { event, window_id } if window_id == self.window.id() => {
                    self.process_window_event(event, target)?;
                }
                Event::AboutToWait => {
                    self.window.request_redraw();
                }
                _ => {}
            }
            Ok(())
        }

        fn process_window_event(
            &mut self,
            event: WindowEvent,
            target: &EventLoopWindowTarget<()>,
        ) -> Result<()> {
            match event {
                WindowEvent::CloseRequested => target.exit(),
                WindowEvent::Resized(size) => {
                    handle_resize(&mut self.ctx, &mut self.renderer, size.width, size.height);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.state != ElementState::Pressed {
                        return Ok(());
                    }
                    if let Some(key) = named_key(event.physical_key) {
                        self.apply(key_action(key));
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    let button = mouse_button(button);
                    match state {
                        ElementState::Pressed => self.pointer.press(button, self.cursor),
                        ElementState::Released => self.pointer.release(button),
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    self.cursor = Vec2::new(position.x as f32, position.y as f32);
                    let height = self.ctx.viewport.height;
                    if let Some(action) = self.pointer.move_to(self.cursor, height) {
                        self.apply(action);
                    }
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    // winit uses the opposite sign to DOM wheel events
                    let delta_y = match delta {
                        MouseScrollDelta::LineDelta(_, y) => -y,
                        MouseScrollDelta::PixelDelta(position) => {
                            (-position.y / PIXELS_PER_NOTCH) as f32
                        }
                    };
                    if let Some(action) = self.pointer.wheel(delta_y) {
                        self.apply(action);
                    }
                }
                WindowEvent::RedrawRequested => {
                    match self.render_loop.tick(&mut self.ctx, &mut self.renderer) {
                        Ok(TickOutcome::Continue) => {}
                        Ok(TickOutcome::Stopped) => target.exit(),
                        Err(err) => return Err(err.into()),
                    }
                }
                _ => {}
            }
            Ok(())
        }

        fn apply(&mut self, action: Action) {
            if let Action::Step { dimension, steps } = action {
                match self.ctx.step_input(dimension, steps) {
                    Ok(outcome) => info!(
                        "door {} x {} ({dimension} = {})",
                        outcome.width, outcome.height, outcome.label
                    ),
                    Err(err) => warn!("{err}"),
                }
            } else {
                action.apply_to(&mut self.ctx.controls);
            }
        }
    }

    fn named_key(key: PhysicalKey) -> Option<NamedKey> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        Some(match code {
            KeyCode::ArrowLeft => NamedKey::Left,
            KeyCode::ArrowRight => NamedKey::Right,
            KeyCode::ArrowUp => NamedKey::Up,
            KeyCode::ArrowDown => NamedKey::Down,
            _ => return None,
        })
    }

    fn mouse_button(button: winit::event::MouseButton) -> MouseButton {
        use winit::event::MouseButton as Winit;
        let index = match button {
            Winit::Left => 0,
            Winit::Right => 1,
            Winit::Middle => 2,
            Winit::Back => 3,
            Winit::Forward => 4,
            Winit::Other(value) => value.min(u16::from(u8::MAX)) as u8,
        };
        MouseButton::new(index)
    }

    fn panic_message(panic: Box<dyn Any + Send>) -> String {
        match panic.downcast::<String>() {
            Ok(msg) => *msg,
            Err(panic) => match panic.downcast::<&'static str>() {
                Ok(msg) => (*msg).to_string(),
                Err(_) => "unknown panic".into(),
            },
        }
    }

    const USAGE: &str = "Usage: door-configurator [--config FILE] [--assets DIR] \
    [--markup FILE] [--width W] [--height H] [--summary-only]";

    #[derive(Debug, Default)]
    struct CliOptions {
        config: Option<String>,
        assets: Option<String>,
        markup: Option<String>,
        width: Option<f32>,
        height: Option<f32>,
        summary_only: bool,
    }

    impl CliOptions {
        fn parse() -> Result<Self> {
            let mut options = Self::default();
            let mut args = env::args().skip(1);
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--summary-only" => options.summary_only = true,
                    "--config" => options.config = Some(value_for(&arg, args.next())?),
                    "--assets" => options.assets = Some(value_for(&arg, args.next())?),
                    "--markup" => options.markup = Some(value_for(&arg, args.next())?),
                    "--width" => options.width = Some(number_for(&arg, args.next())?),
                    "--height" => options.height = Some(number_for(&arg, args.next())?),
                    "-h" | "--help" => return Err(anyhow!(USAGE)),
                    other => return Err(anyhow!("Unknown argument: {other}. {USAGE}")),
                }
            }
            Ok(options)
        }

        /// Defaults or the config file, then the page markup, then explicit dimensions.
        fn config(&self) -> Result<ConfiguratorConfig> {
            let mut config = match &self.config {
                Some(path) => ConfiguratorConfig::load(Path::new(path))?,
                None => ConfiguratorConfig::default(),
            };
            if let Some(root) = &self.assets {
                config.assets.root = root.clone();
            }
            if let Some(path) = &self.markup {
                let markup =
                    fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
                config.controls = parse_controls(&markup, &config.controls)
                    .with_context(|| format!("failed to parse {path}"))?;
            }
            if let Some(width) = self.width {
                config.controls.width.value = width;
            }
            if let Some(height) = self.height {
                config.controls.height.value = height;
            }
            Ok(config)
        }
    }

    fn value_for(flag: &str, value: Option<String>) -> Result<String> {
        value.ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))
    }

    fn number_for(flag: &str, value: Option<String>) -> Result<f32> {
        let value = value_for(flag, value)?;
        value
            .trim()
            .parse()
            .with_context(|| format!("{flag} expects a number, got {value:?}"))
    }
}

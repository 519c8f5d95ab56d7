#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use gloo_events::{EventListener, EventListenerOptions};
use log::{error, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, MouseEvent, WheelEvent};

use crate::app::{AppContext, Viewport};
use crate::config::{AssetConfig, ConfiguratorConfig, ControlRange, DoorControls};
use crate::error::{Dimension, RenderError};
use crate::input::{Action, MouseButton, PointerState};
use crate::render::Renderer;
use crate::render_loop::{handle_resize, RenderLoop, StopHandle, TickOutcome};
use crate::texture::{FetchSource, TextureProvider};

const MESSAGE_ID: &str = "configurator-message";
const MESSAGE_STYLE: &str =
    "position:absolute;top:40%;width:100%;text-align:center;color:#fff;font:16px sans-serif";

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Handle returned to the page. Dropping it detaches the DOM listeners.
#[wasm_bindgen]
pub struct WebConfigurator {
    state: Rc<RefCell<WebState>>,
    stop: StopHandle,
    _listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl WebConfigurator {
    /// Ends the animation loop after the current frame.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> f64 {
        self.state.borrow().render_loop.frames() as f64
    }
}

/// Starts the configurator on `canvas_id`, loading images relative to `asset_root`.
#[wasm_bindgen]
pub async fn start(canvas_id: String, asset_root: String) -> Result<WebConfigurator, JsValue> {
    match launch(&canvas_id, asset_root).await {
        Ok(app) => Ok(app),
        Err(err) => {
            let message = format!("{err:#}");
            error!("{message}");
            show_message(&message);
            Err(JsValue::from_str(&message))
        }
    }
}

struct WebState {
    ctx: AppContext,
    renderer: Renderer,
    render_loop: RenderLoop,
    pointer: PointerState,
}

impl WebState {
    fn apply(&mut self, action: Action) {
        if let Action::Step { dimension, steps } = action {
            if let Err(err) = self.ctx.step_input(dimension, steps) {
                warn!("{err}");
            }
        } else {
            action.apply_to(&mut self.ctx.controls);
        }
    }
}

async fn launch(canvas_id: &str, asset_root: String) -> Result<WebConfigurator> {
    let window = web_sys::window().ok_or_else(|| anyhow!("window not available"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow!("document not available"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| anyhow!("canvas element #{canvas_id} not found"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| anyhow!("#{canvas_id} is not a canvas"))?;

    let (width, height) = window_size(&window);
    canvas.set_width(width);
    canvas.set_height(height);

    let defaults = DoorControls::default();
    let controls = DoorControls {
        width: read_range(&document, Dimension::Width, &defaults.width),
        height: read_range(&document, Dimension::Height, &defaults.height),
    };
    let config = ConfiguratorConfig {
        assets: AssetConfig {
            root: asset_root,
            ..AssetConfig::default()
        },
        controls,
        ..ConfiguratorConfig::default()
    };

    let renderer = Renderer::for_canvas(canvas.clone(), &config.render)
        .await
        .map_err(|err| match err {
            RenderError::EnvironmentUnavailable(_) => {
                anyhow!(err).context("this browser cannot display the 3D preview")
            }
            other => anyhow!(other),
        })?;

    let textures = TextureProvider::new(Box::new(FetchSource::new(config.assets.root.clone())));
    let ctx = AppContext::new(config, textures, Viewport::new(width, height))
        .context("failed to build the initial door")?;
    for dimension in [Dimension::Width, Dimension::Height] {
        set_label(&document, dimension, ctx.controller.label(dimension));
    }

    let render_loop = RenderLoop::new();
    let stop = render_loop.stop_handle();
    let state = Rc::new(RefCell::new(WebState {
        ctx,
        renderer,
        render_loop,
        pointer: PointerState::new(),
    }));

    let listeners = attach_listeners(&window, &document, &canvas, &state)?;
    schedule_frames(Rc::clone(&state))?;
    info!("configurator running on #{canvas_id}");

    Ok(WebConfigurator {
        state,
        stop,
        _listeners: listeners,
    })
}

fn attach_listeners(
    window: &web_sys::Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    state: &Rc<RefCell<WebState>>,
) -> Result<Vec<EventListener>> {
    let mut listeners = Vec::new();

    for dimension in [Dimension::Width, Dimension::Height] {
        let input = find_input(document, dimension)
            .ok_or_else(|| anyhow!("<input id=\"{}\"> not found", dimension.input_id()))?;
        let state = Rc::clone(state);
        let document = document.clone();
        let target = input.clone();
        listeners.push(EventListener::new(&input, "input", move |_event| {
            let value = target.value().trim().parse::<f32>().unwrap_or(f32::NAN);
            let mut state = state.borrow_mut();
            // a rejected value keeps the previous door and only logs
            let _ = state.ctx.apply_input(dimension, value);
            set_label(&document, dimension, state.ctx.controller.label(dimension));
        }));
    }

    {
        let state = Rc::clone(state);
        let canvas = canvas.clone();
        listeners.push(EventListener::new(window, "resize", move |_event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = window_size(&window);
            canvas.set_width(width);
            canvas.set_height(height);
            let mut guard = state.borrow_mut();
            let WebState { ctx, renderer, .. } = &mut *guard;
            handle_resize(ctx, renderer, width, height);
        }));
    }

    {
        let state = Rc::clone(state);
        listeners.push(EventListener::new(canvas, "mousedown", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            state
                .borrow_mut()
                .pointer
                .press(MouseButton::new(event.button() as u8), offset(event));
        }));
    }

    {
        let state = Rc::clone(state);
        listeners.push(EventListener::new(window, "mouseup", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            state
                .borrow_mut()
                .pointer
                .release(MouseButton::new(event.button() as u8));
        }));
    }

    {
        let state = Rc::clone(state);
        listeners.push(EventListener::new(canvas, "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let mut state = state.borrow_mut();
            let height = state.ctx.viewport.height;
            if let Some(action) = state.pointer.move_to(offset(event), height) {
                state.apply(action);
            }
        }));
    }

    {
        let state = Rc::clone(state);
        let options = EventListenerOptions::enable_prevent_default();
        listeners.push(EventListener::new_with_options(
            canvas,
            "wheel",
            options,
            move |event| {
                let Some(event) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                event.prevent_default();
                let mut state = state.borrow_mut();
                if let Some(action) = state.pointer.wheel(event.delta_y() as f32) {
                    state.apply(action);
                }
            },
        ));
    }

    Ok(listeners)
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn schedule_frames(state: Rc<RefCell<WebState>>) -> Result<()> {
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let next = Rc::clone(&callback);

    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let outcome = {
            let mut guard = state.borrow_mut();
            let WebState {
                ctx,
                renderer,
                render_loop,
                ..
            } = &mut *guard;
            render_loop.tick(ctx, renderer)
        };
        match outcome {
            Ok(TickOutcome::Continue) => {
                if let Err(err) = request_frame(&next) {
                    error!("{err:#}");
                }
            }
            Ok(TickOutcome::Stopped) => {
                info!("render loop stopped");
                next.borrow_mut().take();
            }
            Err(err) => {
                error!("render loop halted: {err}");
                show_message(&err.to_string());
                next.borrow_mut().take();
            }
        }
    }) as Box<dyn FnMut()>));

    request_frame(&callback)
}

fn request_frame(callback: &FrameCallback) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("window not available"))?;
    let callback = callback.borrow();
    let closure = callback
        .as_ref()
        .ok_or_else(|| anyhow!("frame callback already released"))?;
    window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("requestAnimationFrame failed: {err:?}"))?;
    Ok(())
}

fn window_size(window: &web_sys::Window) -> (u32, u32) {
    let read = |value: Result<JsValue, JsValue>| {
        value
            .ok()
            .and_then(|value| value.as_f64())
            .map_or(1, |value| value.max(1.0) as u32)
    };
    (read(window.inner_width()), read(window.inner_height()))
}

fn offset(event: &MouseEvent) -> Vec2 {
    Vec2::new(event.offset_x() as f32, event.offset_y() as f32)
}

fn find_input(document: &Document, dimension: Dimension) -> Option<HtmlInputElement> {
    document
        .get_element_by_id(dimension.input_id())?
        .dyn_into::<HtmlInputElement>()
        .ok()
}

/// Range limits declared on the page, falling back to `defaults` attribute by attribute.
fn read_range(document: &Document, dimension: Dimension, defaults: &ControlRange) -> ControlRange {
    let Some(input) = find_input(document, dimension) else {
        warn!("<input id=\"{}\"> not found, using defaults", dimension.input_id());
        return *defaults;
    };
    let parse = |text: String, default: f32| text.trim().parse::<f32>().unwrap_or(default);
    let min = parse(input.min(), defaults.min);
    let max = parse(input.max(), defaults.max).max(min);
    ControlRange {
        min,
        max,
        step: parse(input.step(), defaults.step),
        value: parse(input.value(), defaults.value).clamp(min, max),
    }
}

fn set_label(document: &Document, dimension: Dimension, text: &str) {
    if let Some(label) = document.get_element_by_id(dimension.label_id()) {
        label.set_text_content(Some(text));
    }
}

/// Replaces the page content under the canvas with a visible error.
fn show_message(message: &str) {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };
    let element = match document.get_element_by_id(MESSAGE_ID) {
        Some(element) => element,
        None => {
            let Ok(element) = document.create_element("div") else {
                return;
            };
            element.set_id(MESSAGE_ID);
            let _ = element.set_attribute("style", MESSAGE_STYLE);
            if let Some(body) = document.body() {
                let _ = body.append_child(&element);
            }
            element
        }
    };
    element.set_text_content(Some(message));
}

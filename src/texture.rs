//! Asynchronous texture loading.
//!
//! A request returns a [`TextureId`] immediately with the slot in
//! [`TextureSlot::Pending`]. The platform [`TextureSource`] reads and decodes
//! the image off the main flow of control and pushes the outcome onto a shared
//! [`Completions`] queue; [`TextureProvider::poll`] drains it on the main
//! thread at the start of a frame. Until then, and forever if loading fails,
//! materials using the texture render untextured.

use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::TextureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u32);

impl TextureId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapMode {
    ClampToEdge,
    Repeat,
}

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum TextureSlot {
    Pending,
    Ready(Arc<DecodedImage>),
    Failed(String),
}

impl TextureSlot {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

type Completion = (TextureId, Result<DecodedImage, TextureError>);

/// Queue shared between the provider and in-flight loads.
#[derive(Debug, Clone, Default)]
pub struct Completions {
    inner: Arc<Mutex<Vec<Completion>>>,
}

impl Completions {
    pub fn push(&self, id: TextureId, result: Result<DecodedImage, TextureError>) {
        self.inner.lock().push((id, result));
    }

    fn take(&self) -> Vec<Completion> {
        std::mem::take(&mut *self.inner.lock())
    }
}

/// Platform hook that starts loading `path` and eventually reports through `completions`.
pub trait TextureSource {
    fn start(&self, id: TextureId, path: &str, completions: Completions);
}

#[derive(Debug)]
struct TextureEntry {
    path: String,
    wrap: WrapMode,
    slot: TextureSlot,
}

pub struct TextureProvider {
    source: Box<dyn TextureSource>,
    completions: Completions,
    entries: Vec<TextureEntry>,
}

impl TextureProvider {
    pub fn new(source: Box<dyn TextureSource>) -> Self {
        Self {
            source,
            completions: Completions::default(),
            entries: Vec::new(),
        }
    }

    /// Starts loading `path` and returns its handle without waiting.
    pub fn request(&mut self, path: &str, wrap: WrapMode) -> TextureId {
        let id = TextureId(self.entries.len() as u32);
        self.entries.push(TextureEntry {
            path: path.to_string(),
            wrap,
            slot: TextureSlot::Pending,
        });
        self.source.start(id, path, self.completions.clone());
        id
    }

    /// Applies finished loads. Returns the ids whose slot changed.
    pub fn poll(&mut self) -> Vec<TextureId> {
        let mut settled = Vec::new();
        for (id, result) in self.completions.take() {
            let Some(entry) = self.entries.get_mut(id.index()) else {
                continue;
            };
            entry.slot = match result {
                Ok(image) => {
                    info!(
                        "loaded texture {} ({}x{})",
                        entry.path, image.width, image.height
                    );
                    TextureSlot::Ready(Arc::new(image))
                }
                Err(err) => {
                    warn!("{err}; rendering without texture");
                    TextureSlot::Failed(err.to_string())
                }
            };
            settled.push(id);
        }
        settled
    }

    pub fn slot(&self, id: TextureId) -> Option<&TextureSlot> {
        self.entries.get(id.index()).map(|entry| &entry.slot)
    }

    pub fn image(&self, id: TextureId) -> Option<&Arc<DecodedImage>> {
        match self.slot(id)? {
            TextureSlot::Ready(image) => Some(image),
            _ => None,
        }
    }

    /// Sampler wrap mode; the repeat factor lives on each material.
    pub fn wrap(&self, id: TextureId) -> Option<WrapMode> {
        self.entries.get(id.index()).map(|entry| entry.wrap)
    }

    pub fn path(&self, id: TextureId) -> Option<&str> {
        self.entries.get(id.index()).map(|entry| entry.path.as_str())
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.slot.is_pending()).count()
    }
}

/// Decodes any PNG or JPEG payload into RGBA8.
pub fn decode_image(path: &str, bytes: &[u8]) -> Result<DecodedImage, TextureError> {
    let image = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
        path: path.to_string(),
        source,
    })?;
    let rgba = image.to_rgba8();
    Ok(DecodedImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Reads images from disk on a background thread per request.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileSource {
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileSource {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TextureSource for FileSource {
    fn start(&self, id: TextureId, path: &str, completions: Completions) {
        let full_path = self.root.join(path);
        let label = path.to_string();
        std::thread::spawn(move || {
            let result = std::fs::read(&full_path)
                .map_err(|source| TextureError::Io {
                    path: full_path.display().to_string(),
                    source,
                })
                .and_then(|bytes| decode_image(&label, &bytes));
            completions.push(id, result);
        });
    }
}

/// Fetches images relative to the page with `window.fetch`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct FetchSource {
    root: String,
}

#[cfg(target_arch = "wasm32")]
impl FetchSource {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(target_arch = "wasm32")]
impl TextureSource for FetchSource {
    fn start(&self, id: TextureId, path: &str, completions: Completions) {
        let url = if self.root.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", self.root.trim_end_matches('/'), path)
        };
        wasm_bindgen_futures::spawn_local(async move {
            let result = fetch_bytes(&url)
                .await
                .and_then(|bytes| decode_image(&url, &bytes));
            completions.push(id, result);
        });
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_bytes(url: &str) -> Result<Vec<u8>, TextureError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fail = |reason: String| TextureError::Fetch {
        path: url.to_string(),
        reason,
    };
    let window = web_sys::window().ok_or_else(|| fail("window not available".into()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|err| fail(format!("{err:?}")))?
        .dyn_into::<web_sys::Response>()
        .map_err(|_| fail("fetch did not return a Response".into()))?;
    if !response.ok() {
        return Err(fail(format!("HTTP {}", response.status())));
    }
    let buffer = response
        .array_buffer()
        .map_err(|err| fail(format!("{err:?}")))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|err| fail(format!("{err:?}")))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Default)]
    struct ManualSource {
        started: Rc<RefCell<Vec<(TextureId, String, Completions)>>>,
    }

    impl TextureSource for ManualSource {
        fn start(&self, id: TextureId, path: &str, completions: Completions) {
            self.started
                .borrow_mut()
                .push((id, path.to_string(), completions));
        }
    }

    fn tiny_png() -> Vec<u8> {
        let mut bytes = Vec::new();
        let image = image::RgbaImage::from_pixel(2, 1, image::Rgba([200, 100, 50, 255]));
        image
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
        bytes
    }

    #[test]
    fn requests_stay_pending_until_polled() {
        let source = ManualSource::default();
        let mut provider = TextureProvider::new(Box::new(source.clone()));
        let wood = provider.request("wood.jpg", WrapMode::Repeat);
        assert!(provider.slot(wood).unwrap().is_pending());
        assert_eq!(source.started.borrow()[0].1, "wood.jpg");

        let (id, _, completions) = source.started.borrow()[0].clone();
        completions.push(id, decode_image("wood.jpg", &tiny_png()));
        assert!(provider.slot(wood).unwrap().is_pending());

        assert_eq!(provider.poll(), vec![wood]);
        let image = provider.image(wood).unwrap();
        assert_eq!((image.width, image.height), (2, 1));
        assert_eq!(&image.rgba[..4], &[200, 100, 50, 255]);
        assert!(provider.poll().is_empty());
    }

    #[test]
    fn failures_fall_back_to_untextured() {
        let source = ManualSource::default();
        let mut provider = TextureProvider::new(Box::new(source.clone()));
        let wall = provider.request("wall.jpg", WrapMode::ClampToEdge);
        let tile = provider.request("tile.jpg", WrapMode::Repeat);
        let (id, _, completions) = source.started.borrow()[0].clone();
        completions.push(id, decode_image("wall.jpg", b"not an image"));

        provider.poll();
        assert!(matches!(provider.slot(wall), Some(TextureSlot::Failed(_))));
        assert!(provider.image(wall).is_none());
        assert_eq!(provider.pending_count(), 1);
        assert_eq!(provider.wrap(tile), Some(WrapMode::Repeat));
        assert_eq!(provider.wrap(wall), Some(WrapMode::ClampToEdge));
    }

    #[test]
    fn completions_resolve_in_any_order() {
        let source = ManualSource::default();
        let mut provider = TextureProvider::new(Box::new(source.clone()));
        let first = provider.request("a.png", WrapMode::ClampToEdge);
        let second = provider.request("b.png", WrapMode::ClampToEdge);
        let started = source.started.borrow().clone();
        started[1].2.push(second, decode_image("b.png", &tiny_png()));
        assert_eq!(provider.poll(), vec![second]);
        started[0].2.push(first, decode_image("a.png", &tiny_png()));
        assert_eq!(provider.poll(), vec![first]);
        assert_eq!(provider.pending_count(), 0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn file_source_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut provider = TextureProvider::new(Box::new(FileSource::new(dir.path())));
        let id = provider.request("missing.jpg", WrapMode::ClampToEdge);
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while provider.poll().is_empty() {
            assert!(std::time::Instant::now() < deadline, "load never completed");
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(matches!(provider.slot(id), Some(TextureSlot::Failed(_))));
    }
}

//! Asynchronous background-image fetching.
//!
//! At most one fetch is logically current at a time. Requesting a new
//! URL aborts the in-flight task and bumps a generation counter; a task
//! that slips past the abort still refuses to publish once its
//! generation is stale, so the published image is always the latest
//! request's result (last-request-wins). The generation lives under a
//! mutex that also covers every publish, so a task cannot pass the
//! staleness check and then lose the race to a newer request. Fetch and
//! decode failures are absorbed into a `Failed` state, never surfaced
//! as errors.

use std::sync::{Arc, Mutex, PoisonError};

use image::RgbaImage;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

/// A decoded background image.
#[derive(Debug, Clone)]
pub struct BackgroundImage {
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// RGBA pixel data, shared with subscribers.
    pub pixels: Arc<RgbaImage>,
}

impl BackgroundImage {
    /// Natural size as a [`kurbo::Size`], for zoom-to-fit.
    pub fn natural_size(&self) -> kurbo::Size {
        kurbo::Size::new(self.width as f64, self.height as f64)
    }
}

/// Published loading state.
#[derive(Debug, Clone, Default)]
pub enum BackgroundState {
    /// No background URL is set.
    #[default]
    Idle,
    /// A fetch for this URL is in flight.
    Fetching { url: Url },
    /// The latest fetch produced an image.
    Loaded(BackgroundImage),
    /// The latest fetch failed or its payload did not decode.
    Failed { url: Url },
}

impl BackgroundState {
    /// The loaded image, if any.
    pub fn image(&self) -> Option<&BackgroundImage> {
        match self {
            BackgroundState::Loaded(image) => Some(image),
            _ => None,
        }
    }

    /// Whether a fetch is currently in flight.
    pub fn is_fetching(&self) -> bool {
        matches!(self, BackgroundState::Fetching { .. })
    }
}

#[derive(Debug, Error)]
enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("payload is not a decodable image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Owns the current fetch task and publishes state snapshots.
///
/// Spawns onto the ambient tokio runtime; construct and drive it from
/// within one. [`BackgroundLoader::request`] with `None` never spawns
/// and is safe anywhere.
pub struct BackgroundLoader {
    http: Client,
    tx: watch::Sender<BackgroundState>,
    /// Current request generation. Held while publishing, so a stale
    /// task's staleness check and write happen atomically.
    generation: Arc<Mutex<u64>>,
    task: Option<JoinHandle<()>>,
}

impl Default for BackgroundLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundLoader {
    /// Create an idle loader.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(BackgroundState::Idle);
        Self {
            http: Client::new(),
            tx,
            generation: Arc::new(Mutex::new(0)),
            task: None,
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<BackgroundState> {
        self.tx.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> BackgroundState {
        self.tx.borrow().clone()
    }

    /// Make `url` the current request, superseding any in-flight fetch.
    ///
    /// The previous task is aborted and the displayed image cleared
    /// immediately, so callers can show a loading indicator. `None`
    /// cancels without starting a new fetch.
    pub fn request(&mut self, url: Option<Url>) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        // Bump and publish under the generation lock so a stale task
        // that already finished fetching cannot interleave its publish
        // with ours.
        let generation = {
            let mut current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
            *current += 1;
            let state = match &url {
                Some(url) => BackgroundState::Fetching { url: url.clone() },
                None => BackgroundState::Idle,
            };
            self.tx.send_replace(state);
            *current
        };

        let Some(url) = url else {
            return;
        };

        log::debug!("fetching background image from {url}");
        let http = self.http.clone();
        let tx = self.tx.clone();
        let current = Arc::clone(&self.generation);
        self.task = Some(tokio::spawn(async move {
            let fetched = fetch_image(&http, &url).await;
            let state = match fetched {
                Ok(image) => {
                    log::debug!("loaded {}x{} background from {url}", image.width, image.height);
                    BackgroundState::Loaded(image)
                }
                Err(err) => {
                    log::warn!("background fetch for {url} failed: {err}");
                    BackgroundState::Failed { url }
                }
            };
            publish_if_current(&tx, &current, generation, state);
        }));
    }
}

/// Publish `state` only while `generation` is still the current one.
///
/// Checks and publishes under the generation lock, so a superseded
/// request can never overwrite a newer request's state. Returns whether
/// the state was published.
fn publish_if_current(
    tx: &watch::Sender<BackgroundState>,
    current: &Mutex<u64>,
    generation: u64,
    state: BackgroundState,
) -> bool {
    let current = current.lock().unwrap_or_else(PoisonError::into_inner);
    if *current != generation {
        log::debug!("discarding superseded fetch result");
        return false;
    }
    tx.send_replace(state);
    true
}

impl Drop for BackgroundLoader {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn fetch_image(http: &Client, url: &Url) -> Result<BackgroundImage, FetchError> {
    let response = http.get(url.clone()).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    let decoded = image::load_from_memory(&bytes)?;
    let rgba = decoded.to_rgba8();
    Ok(BackgroundImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: Arc::new(rgba),
    })
}

/// Resolve known image-host share links to a direct image URL.
///
/// Search-result share links embed the real image location in an
/// `imgurl` query parameter; everything else passes through unchanged.
pub fn direct_image_url(url: &Url) -> Url {
    for (key, value) in url.query_pairs() {
        if key == "imgurl" {
            if let Ok(direct) = Url::parse(&value) {
                return direct;
            }
        }
    }
    url.clone()
}

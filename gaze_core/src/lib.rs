// gaze_core: reading-strategy classification engine (Rust/WASM).
// All classification logic lives here; the JS host only captures gaze and renders zoom.

mod aoi;
mod classifier;
mod config;
mod engine;
mod error;
mod features;
mod recommendation;
mod types;
mod window;
mod zoom;

use serde::Deserialize;
use wasm_bindgen::prelude::*;

pub use aoi::resolve;
pub use classifier::{classify, Debouncer, Thresholds};
pub use config::*;
pub use engine::{dominant_zone, ClassificationEngine};
pub use error::EngineError;
pub use features::{entropy, extract, median};
pub use recommendation::recommend;
pub use types::*;
pub use window::{ClosedWindow, Window, WindowAggregator};
pub use zoom::{ChangeHook, StateHook, ZoomController, DEFAULT_ZOOM_SCALE};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

impl From<EngineError> for JsValue {
    fn from(err: EngineError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Sample as sent by the capture bridge in a batch, timestamp included.
#[derive(Debug, Clone, Deserialize)]
struct TimedSample {
    x: f64,
    y: f64,
    #[serde(default)]
    aoi: Option<Zone>,
    duration: f64,
    timestamp: f64,
}

fn to_timestamp(ms: f64) -> Timestamp {
    if ms.is_finite() && ms > 0.0 {
        Timestamp::from_millis(ms.round() as u64)
    } else {
        Timestamp::default()
    }
}

/// Wrap a JS function as a zoom hook. A thrown exception becomes an observer error.
fn js_hook(callback: &js_sys::Function, payload: String) -> Result<(), EngineError> {
    callback
        .call1(&JsValue::NULL, &JsValue::from_str(&payload))
        .map(|_| ())
        .map_err(|e| EngineError::Observer(format!("{:?}", e)))
}

/// Main engine interface exposed to JavaScript. JSON in, JSON out.
#[wasm_bindgen]
pub struct Engine {
    inner: ClassificationEngine,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Engine, JsValue> {
        let config = EngineConfig::from_json(config_json)?;
        Ok(Engine {
            inner: ClassificationEngine::new(config)?,
        })
    }

    /// Feed one gaze sample. Returns a JSON classification when the sample
    /// closes a window, otherwise `undefined`.
    pub fn ingest(&mut self, sample_json: &str, timestamp_ms: f64) -> Result<Option<String>, JsValue> {
        let sample: GazeSample = serde_json::from_str(sample_json).map_err(EngineError::from)?;
        let result = self.inner.ingest(sample, to_timestamp(timestamp_ms))?;
        match result {
            Some(result) => Ok(Some(serde_json::to_string(&result).map_err(EngineError::from)?)),
            None => Ok(None),
        }
    }

    /// Feed a JSON array of timestamped samples in order.
    /// Returns `{"results": [...], "error": null | "..."}`. An invalid sample
    /// rejects the whole batch before anything is ingested; a failing zoom
    /// observer stops the batch and is reported in `error`.
    pub fn ingest_batch(&mut self, samples_json: &str) -> Result<String, JsValue> {
        let samples: Vec<TimedSample> =
            serde_json::from_str(samples_json).map_err(EngineError::from)?;

        let samples = samples
            .into_iter()
            .map(|timed| {
                let sample = GazeSample {
                    x: timed.x,
                    y: timed.y,
                    aoi: timed.aoi,
                    duration: timed.duration,
                    timestamp: Timestamp::default(),
                };
                (sample, to_timestamp(timed.timestamp))
            })
            .collect();

        let outcome = self.inner.ingest_batch(samples)?;
        Ok(serde_json::to_string(&outcome).map_err(EngineError::from)?)
    }

    /// Zoom a task zone (`a`, `b`, `c` or `f`). Returns the zoom state as JSON.
    pub fn set_zoom(&mut self, zone: &str, scale: Option<f64>, timestamp_ms: f64) -> Result<String, JsValue> {
        let state = self.inner.zoom_mut().set_zoom_by_id(
            zone,
            scale.unwrap_or(DEFAULT_ZOOM_SCALE),
            to_timestamp(timestamp_ms),
        )?;
        Ok(serde_json::to_string(&state).map_err(EngineError::from)?)
    }

    pub fn reset_zoom(&mut self) -> Result<String, JsValue> {
        let state = self.inner.zoom_mut().reset()?;
        Ok(serde_json::to_string(&state).map_err(EngineError::from)?)
    }

    pub fn zoom_state(&self) -> Result<String, JsValue> {
        Ok(serde_json::to_string(&self.inner.zoom().zoom_state()).map_err(EngineError::from)?)
    }

    /// Zone id for a screen coordinate under the configured layout.
    pub fn resolve_aoi(&self, x: f64, y: f64) -> String {
        resolve(x, y, &self.inner.config().screen_layout).to_string()
    }

    pub fn last_classification(&self) -> Result<Option<String>, JsValue> {
        match self.inner.last_classification() {
            Some(last) => Ok(Some(serde_json::to_string(last).map_err(EngineError::from)?)),
            None => Ok(None),
        }
    }

    pub fn reset_window(&mut self) {
        self.inner.reset_window();
    }

    /// Register `callback(zoomChangeJson)`.
    pub fn on_zoom_change(&mut self, callback: js_sys::Function) {
        self.inner
            .on_zoom_change(Box::new(move |change: &ZoomChange| -> Result<(), EngineError> {
                js_hook(&callback, serde_json::to_string(change)?)
            }));
    }

    /// Register `callback(zoomStateJson)` for resets.
    pub fn on_zoom_reset(&mut self, callback: js_sys::Function) {
        self.inner
            .on_zoom_reset(Box::new(move |state: &ZoomState| -> Result<(), EngineError> {
                js_hook(&callback, serde_json::to_string(state)?)
            }));
    }

    /// Register the host's generic update function, used for any zoom event
    /// without a dedicated observer.
    pub fn set_update_hook(&mut self, callback: js_sys::Function) {
        self.inner
            .set_update_hook(Box::new(move |state: &ZoomState| -> Result<(), EngineError> {
                js_hook(&callback, serde_json::to_string(state)?)
            }));
    }
}

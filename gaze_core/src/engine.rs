// Native pipeline: sample -> window -> features -> class -> {recommendation, zoom}.
// Single-threaded and synchronous; callers serialize access.

use log::{info, warn};

use crate::classifier::{self, Debouncer, Thresholds};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::features;
use crate::recommendation;
use crate::types::*;
use crate::window::{ClosedWindow, Window, WindowAggregator};
use crate::zoom::{ChangeHook, StateHook, ZoomController};

/// Task zone with the largest accumulated duration. Ties keep the earliest
/// of a, b, c, f. `None` when no task zone has positive duration.
pub fn dominant_zone(tallies: &PerZone<ZoneTally>) -> Option<Zone> {
    let mut best: Option<(Zone, f64)> = None;
    for zone in Zone::TASK {
        let duration = tallies.get(zone).duration;
        if duration <= 0.0 {
            continue;
        }
        match best {
            Some((_, top)) if duration <= top => {}
            _ => best = Some((zone, duration)),
        }
    }
    best.map(|(zone, _)| zone)
}

/// Classification engine owning the live window and the zoom state.
pub struct ClassificationEngine {
    config: EngineConfig,
    thresholds: Thresholds,
    aggregator: WindowAggregator,
    debouncer: Debouncer,
    zoom: ZoomController,
    last: Option<LastClassification>,
}

impl ClassificationEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(ClassificationEngine {
            thresholds: Thresholds::from_config(&config),
            aggregator: WindowAggregator::new(
                config.screen_layout,
                config.window_size_ms,
                config.saccade_lookback_ms,
                config.windowing,
            ),
            debouncer: Debouncer::new(config.confirmation_windows),
            zoom: ZoomController::new(),
            last: None,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn current_window(&self) -> &Window {
        self.aggregator.current()
    }

    pub fn zoom(&self) -> &ZoomController {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomController {
        &mut self.zoom
    }

    pub fn on_zoom_change(&mut self, hook: ChangeHook) {
        self.zoom.on_change(hook);
    }

    pub fn on_zoom_reset(&mut self, hook: StateHook) {
        self.zoom.on_reset(hook);
    }

    pub fn set_update_hook(&mut self, hook: StateHook) {
        self.zoom.set_update_hook(hook);
    }

    /// Most recent confirmed classification, if any.
    pub fn last_classification(&self) -> Option<&LastClassification> {
        self.last.as_ref()
    }

    /// Discard the live window without classifying it.
    pub fn reset_window(&mut self) {
        self.aggregator.reset();
    }

    /// Feed one sample. Returns a result when the sample closes a window.
    ///
    /// A failing zoom observer aborts the call with its error; the window is
    /// closed regardless and the next sample starts a fresh one.
    pub fn ingest(
        &mut self,
        sample: GazeSample,
        timestamp: Timestamp,
    ) -> Result<Option<ClassificationResult>, EngineError> {
        sample.validate()?;

        match self.step(sample, timestamp) {
            Some((result, applied)) => {
                applied?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    /// Feed samples in order.
    ///
    /// Every sample is validated first, so an invalid batch leaves the engine
    /// untouched. A failing zoom observer stops the batch; the results closed
    /// so far, the failing window's included, come back with the error.
    pub fn ingest_batch(
        &mut self,
        samples: Vec<(GazeSample, Timestamp)>,
    ) -> Result<BatchOutcome, EngineError> {
        for (index, (sample, _)) in samples.iter().enumerate() {
            sample.validate().map_err(|err| match err {
                EngineError::InvalidSample(reason) => {
                    EngineError::InvalidSample(format!("batch index {}: {}", index, reason))
                }
                other => other,
            })?;
        }

        let mut outcome = BatchOutcome::default();
        for (sample, timestamp) in samples {
            if let Some((result, applied)) = self.step(sample, timestamp) {
                outcome.results.push(result);
                if let Err(err) = applied {
                    warn!("batch stopped at {}ms: {}", timestamp.as_millis(), err);
                    outcome.error = Some(err.to_string());
                    break;
                }
            }
        }
        Ok(outcome)
    }

    /// Window one validated sample; on closure, evaluate and apply zoom.
    fn step(
        &mut self,
        sample: GazeSample,
        timestamp: Timestamp,
    ) -> Option<(ClassificationResult, Result<(), EngineError>)> {
        let closed = self.aggregator.ingest(sample, timestamp)?;
        let result = self.evaluate(&closed);
        let applied = self.apply_zoom(&result);
        Some((result, applied))
    }

    /// Decide a closed window: stats, class, recommendation and the zone the
    /// zoom policy targets. Advances the debouncer and records the last
    /// confirmed class; zoom is left to `apply_zoom`.
    fn evaluate(&mut self, closed: &ClosedWindow) -> ClassificationResult {
        let stats = features::extract(closed, &self.config.screen_layout);
        let user_type = classifier::classify(&stats, &self.thresholds);
        let confirmed_type = self.debouncer.observe(user_type);
        let zoomed_area = dominant_zone(&closed.window.tallies);

        info!(
            "window classified as {} (confirmed: {:?}), entropy={:.3} coverage={} saccade={:.1}px gaze={}ms",
            user_type,
            confirmed_type,
            stats.entropy,
            stats.coverage,
            stats.median_saccade,
            stats.median_gaze_duration
        );

        let diagnostics = Diagnostics {
            c_proportion: stats.aoi_proportions.c.count_proportion,
            c_duration: closed.window.tallies.c.duration,
            total_duration: features::total_duration(&closed.window.tallies),
        };

        if let Some(confirmed) = confirmed_type {
            self.last = Some(LastClassification {
                user_type: confirmed,
                timestamp: closed.closed_at,
                stats: stats.clone(),
            });
        }

        ClassificationResult {
            user_type,
            confirmed_type,
            zoomed_area,
            ui_recommendation: recommendation::recommend(confirmed_type.unwrap_or_default()),
            stats,
            timestamp: closed.closed_at,
            diagnostics,
        }
    }

    fn apply_zoom(&mut self, result: &ClassificationResult) -> Result<(), EngineError> {
        match result.zoomed_area {
            Some(zone) => {
                self.zoom
                    .set_zoom(zone, self.config.zoom_scale, result.timestamp)?;
            }
            None => {
                warn!("no dominant zone in window, resetting zoom");
                self.zoom.reset()?;
            }
        }
        Ok(())
    }
}

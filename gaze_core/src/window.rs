// Fixed-duration window aggregation over gaze samples.
// Closure is sample-driven: a window closes only when a sample arrives at or past its end.

use log::debug;

use crate::aoi;
use crate::config::{ScreenLayout, WindowPolicy};
use crate::types::*;

/// Accumulated state of one window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Window {
    /// Set by the first sample after a reset, fixed until the window closes.
    pub start_time: Option<Timestamp>,
    pub samples: Vec<GazeSample>,
    pub tallies: PerZone<ZoneTally>,
    pub saccade_amplitudes: Vec<f64>,
}

impl Window {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Record a sample whose `aoi` and `timestamp` are already set.
    fn push(&mut self, sample: GazeSample, lookback_ms: u64) {
        let zone = sample.aoi.unwrap_or(Zone::G);
        let tally = self.tallies.get_mut(zone);
        tally.count += 1;
        tally.duration += sample.duration;

        // Most recent earlier sample still within the lookback.
        let origin = self
            .samples
            .iter()
            .rev()
            .find(|prev| sample.timestamp.millis_since(prev.timestamp) < lookback_ms);
        if let Some(origin) = origin {
            self.saccade_amplitudes.push(origin.distance_to(&sample));
        }

        self.samples.push(sample);
    }
}

/// A window handed over for feature extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedWindow {
    pub window: Window,
    pub start_time: Timestamp,
    /// Timestamp of the sample that closed the window.
    pub closed_at: Timestamp,
}

impl ClosedWindow {
    pub fn duration_ms(&self) -> u64 {
        self.closed_at.millis_since(self.start_time)
    }
}

/// Owns the single live window.
pub struct WindowAggregator {
    layout: ScreenLayout,
    window_size_ms: u64,
    lookback_ms: u64,
    policy: WindowPolicy,
    current: Window,
}

impl WindowAggregator {
    pub fn new(
        layout: ScreenLayout,
        window_size_ms: u64,
        lookback_ms: u64,
        policy: WindowPolicy,
    ) -> Self {
        WindowAggregator {
            layout,
            window_size_ms,
            lookback_ms,
            policy,
            current: Window::default(),
        }
    }

    pub fn current(&self) -> &Window {
        &self.current
    }

    /// Add a sample. Returns the closed window once `timestamp - start >= window size`.
    pub fn ingest(&mut self, mut sample: GazeSample, timestamp: Timestamp) -> Option<ClosedWindow> {
        sample.timestamp = timestamp;
        if sample.aoi.is_none() {
            sample.aoi = Some(aoi::resolve(sample.x, sample.y, &self.layout));
        }

        let start_time = *self.current.start_time.get_or_insert(timestamp);
        self.current.push(sample, self.lookback_ms);

        let elapsed = timestamp.millis_since(start_time);
        if elapsed < self.window_size_ms {
            debug!(
                "window filling: {}ms/{}ms, {} samples",
                elapsed,
                self.window_size_ms,
                self.current.samples.len()
            );
            return None;
        }

        debug!(
            "window full after {}ms with {} samples",
            elapsed,
            self.current.samples.len()
        );
        let window = std::mem::take(&mut self.current);
        self.open_next(&window, timestamp);

        Some(ClosedWindow {
            window,
            start_time,
            closed_at: timestamp,
        })
    }

    /// Drop the live window without classifying it.
    pub fn reset(&mut self) {
        self.current = Window::default();
    }

    fn open_next(&mut self, closed: &Window, closed_at: Timestamp) {
        match self.policy {
            WindowPolicy::Tumbling => {
                self.current.start_time = Some(closed_at);
            }
            WindowPolicy::CarryOver => {
                let window_size_ms = self.window_size_ms;
                let retained = closed
                    .samples
                    .iter()
                    .filter(|s| closed_at.millis_since(s.timestamp) < window_size_ms);
                for sample in retained {
                    self.current.start_time.get_or_insert(sample.timestamp);
                    self.current.push(sample.clone(), self.lookback_ms);
                }
                self.current.start_time.get_or_insert(closed_at);
                debug!("carried {} samples into next window", self.current.samples.len());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregator(policy: WindowPolicy) -> WindowAggregator {
        WindowAggregator::new(ScreenLayout::default(), 5_000, 2_000, policy)
    }

    fn at(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn first_sample_opens_window() {
        let mut agg = aggregator(WindowPolicy::Tumbling);
        assert!(agg.ingest(GazeSample::new(960.0, 540.0, 200.0), at(1_000)).is_none());
        assert_eq!(agg.current().start_time, Some(at(1_000)));
        assert_eq!(agg.current().tallies.c.count, 1);
        assert_eq!(agg.current().tallies.c.duration, 200.0);
        assert!(agg.current().saccade_amplitudes.is_empty());
    }

    #[test]
    fn pretagged_zone_is_kept() {
        let mut agg = aggregator(WindowPolicy::Tumbling);
        agg.ingest(GazeSample::new(960.0, 540.0, 50.0).with_aoi(Zone::G), at(0));
        assert_eq!(agg.current().tallies.g.count, 1);
        assert_eq!(agg.current().tallies.c.count, 0);
    }

    #[test]
    fn saccade_uses_most_recent_sample_in_lookback() {
        let mut agg = aggregator(WindowPolicy::Tumbling);
        agg.ingest(GazeSample::new(0.0, 0.0, 100.0), at(0));
        agg.ingest(GazeSample::new(300.0, 400.0, 100.0), at(500));
        assert_eq!(agg.current().saccade_amplitudes, vec![500.0]);
    }

    #[test]
    fn saccade_skipped_after_long_gap() {
        let mut agg = aggregator(WindowPolicy::Tumbling);
        agg.ingest(GazeSample::new(0.0, 0.0, 100.0), at(0));
        agg.ingest(GazeSample::new(300.0, 400.0, 100.0), at(2_000));
        assert!(agg.current().saccade_amplitudes.is_empty());
        assert_eq!(agg.current().samples.len(), 2);
    }

    #[test]
    fn closes_at_window_size_and_restarts_at_trigger() {
        let mut agg = aggregator(WindowPolicy::Tumbling);
        for ms in (0..5_000).step_by(250) {
            assert!(agg.ingest(GazeSample::new(960.0, 540.0, 300.0), at(ms)).is_none());
        }
        let closed = agg
            .ingest(GazeSample::new(960.0, 540.0, 300.0), at(5_000))
            .expect("window should close at 5000ms");
        assert_eq!(closed.start_time, at(0));
        assert_eq!(closed.closed_at, at(5_000));
        assert_eq!(closed.duration_ms(), 5_000);
        assert_eq!(closed.window.samples.len(), 21);

        let next = agg.current();
        assert_eq!(next.start_time, Some(at(5_000)));
        assert!(next.is_empty());
        assert_eq!(next.tallies, PerZone::default());
    }

    #[test]
    fn idle_window_never_closes_on_its_own() {
        let mut agg = aggregator(WindowPolicy::Tumbling);
        assert!(agg.ingest(GazeSample::new(1.0, 1.0, 10.0), at(0)).is_none());
        // Nothing else arrives: the window stays open.
        assert_eq!(agg.current().samples.len(), 1);
    }

    #[test]
    fn carry_over_replays_young_samples() {
        let mut agg = aggregator(WindowPolicy::CarryOver);
        agg.ingest(GazeSample::new(100.0, 100.0, 100.0), at(0));
        agg.ingest(GazeSample::new(960.0, 540.0, 100.0), at(4_000));
        let closed = agg.ingest(GazeSample::new(1700.0, 100.0, 100.0), at(5_500));
        assert!(closed.is_some());

        let next = agg.current();
        assert_eq!(next.start_time, Some(at(4_000)));
        assert_eq!(next.samples.len(), 2);
        assert_eq!(next.tallies.c.count, 1);
        assert_eq!(next.tallies.b.count, 1);
        assert_eq!(next.tallies.a.count, 0);
        assert_eq!(next.saccade_amplitudes.len(), 1);
    }

    #[test]
    fn reset_discards_live_window() {
        let mut agg = aggregator(WindowPolicy::Tumbling);
        agg.ingest(GazeSample::new(1.0, 1.0, 10.0), at(0));
        agg.reset();
        assert!(agg.current().is_empty());
        assert_eq!(agg.current().start_time, None);
    }
}

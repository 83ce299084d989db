// Ordered threshold rules over window features. First match wins.
// Pure: no zoom or logging side effects beyond diagnostics.

use log::debug;

use crate::config::EngineConfig;
use crate::types::{UserType, WindowStats};

const DIRECT_MIN_C_PROPORTION: f64 = 0.20;
const DIRECT_MIN_C_DENSITY: f64 = 0.30;

const REFERENTIAL_MIN_CB_PROPORTION: f64 = 0.50;
const REFERENTIAL_MAX_DENSITY_GAP: f64 = 0.80;
const REFERENTIAL_MIN_GAZE_MS: f64 = 150.0;

const EXPLORATORY_MIN_G_PROPORTION: f64 = 0.10;
const EXPLORATORY_MAX_C_DENSITY: f64 = 1.5;
const EXPLORATORY_MAX_GAZE_MS: f64 = 1_000.0;

/// Threshold subset the rules read from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub short_gaze_ms: f64,
    pub large_saccade_px: f64,
    pub high_entropy_bits: f64,
    pub exploratory_min_coverage: usize,
    pub referential_min_gaze_ms: f64,
}

impl Thresholds {
    pub fn from_config(config: &EngineConfig) -> Self {
        Thresholds {
            short_gaze_ms: config.gaze_duration_thresholds.short,
            large_saccade_px: config.saccade_thresholds.large,
            high_entropy_bits: config.entropy_thresholds.high,
            exploratory_min_coverage: config.coverage_thresholds.exploratory_min,
            referential_min_gaze_ms: REFERENTIAL_MIN_GAZE_MS,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds::from_config(&EngineConfig::default())
    }
}

pub fn is_direct(stats: &WindowStats, t: &Thresholds) -> bool {
    stats.aoi_proportions.c.count_proportion >= DIRECT_MIN_C_PROPORTION
        && stats.density_metrics.c > DIRECT_MIN_C_DENSITY
        && stats.median_gaze_duration >= t.short_gaze_ms
}

pub fn is_referential(stats: &WindowStats, t: &Thresholds) -> bool {
    let p = &stats.aoi_proportions;
    let d = &stats.density_metrics;
    p.c.count_proportion + p.b.count_proportion >= REFERENTIAL_MIN_CB_PROPORTION
        && (d.c - d.b).abs() < REFERENTIAL_MAX_DENSITY_GAP
        && stats.median_gaze_duration >= t.referential_min_gaze_ms
}

pub fn is_exploratory(stats: &WindowStats, t: &Thresholds) -> bool {
    stats.median_saccade >= t.large_saccade_px
        && stats.entropy >= t.high_entropy_bits
        && stats.coverage >= t.exploratory_min_coverage
        && stats.aoi_proportions.g.count_proportion > EXPLORATORY_MIN_G_PROPORTION
        && stats.density_metrics.c < EXPLORATORY_MAX_C_DENSITY
        && stats.median_gaze_duration < EXPLORATORY_MAX_GAZE_MS
}

/// Classify one window. Identical stats always give the identical class.
pub fn classify(stats: &WindowStats, thresholds: &Thresholds) -> UserType {
    if is_direct(stats, thresholds) {
        UserType::Direct
    } else if is_referential(stats, thresholds) {
        UserType::Referential
    } else if is_exploratory(stats, thresholds) {
        UserType::Exploratory
    } else {
        debug!(
            "unclassified window: c={:.3} b={:.3} c_density={:.3} b_density={:.3} gaze={}ms \
             direct_met={} referential_met={}",
            stats.aoi_proportions.c.count_proportion,
            stats.aoi_proportions.b.count_proportion,
            stats.density_metrics.c,
            stats.density_metrics.b,
            stats.median_gaze_duration,
            is_direct(stats, thresholds),
            is_referential(stats, thresholds),
        );
        UserType::Unknown
    }
}

/// Confirms a class only after it repeats for `required` consecutive windows.
#[derive(Debug, Clone)]
pub struct Debouncer {
    required: u32,
    candidate: Option<UserType>,
    streak: u32,
}

impl Debouncer {
    pub fn new(required: u32) -> Self {
        Debouncer {
            required: required.max(1),
            candidate: None,
            streak: 0,
        }
    }

    /// Feed one window's class. Returns the class once confirmed.
    /// `Unknown` never confirms and clears the streak.
    pub fn observe(&mut self, user_type: UserType) -> Option<UserType> {
        if user_type == UserType::Unknown {
            self.candidate = None;
            self.streak = 0;
            return None;
        }

        if self.candidate == Some(user_type) {
            self.streak += 1;
        } else {
            self.candidate = Some(user_type);
            self.streak = 1;
        }

        if self.streak >= self.required {
            Some(user_type)
        } else {
            debug!(
                "{} pending confirmation: {}/{} windows",
                user_type, self.streak, self.required
            );
            None
        }
    }
}

// Engine configuration passed from the host as JSON. Every field has a default.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::zoom::validate_scale;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Window length in milliseconds.
    #[serde(default = "default_window_size")]
    pub window_size_ms: u64,
    /// How far back a previous sample may be to count as a saccade origin.
    #[serde(default = "default_saccade_lookback")]
    pub saccade_lookback_ms: u64,
    #[serde(default)]
    pub entropy_thresholds: EntropyThresholds,
    #[serde(default)]
    pub coverage_thresholds: CoverageThresholds,
    #[serde(default)]
    pub gaze_duration_thresholds: GazeDurationThresholds,
    #[serde(default)]
    pub saccade_thresholds: SaccadeThresholds,
    #[serde(default)]
    pub screen_layout: ScreenLayout,
    /// Scale applied to the zoomed zone.
    #[serde(default = "default_zoom_scale")]
    pub zoom_scale: f64,
    #[serde(default)]
    pub windowing: WindowPolicy,
    /// Consecutive identical windows needed to confirm a class. 1 confirms immediately.
    #[serde(default = "default_confirmation_windows")]
    pub confirmation_windows: u32,
}

fn default_window_size() -> u64 {
    5_000
}

fn default_saccade_lookback() -> u64 {
    2_000
}

fn default_zoom_scale() -> f64 {
    1.5
}

fn default_confirmation_windows() -> u32 {
    1
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            window_size_ms: default_window_size(),
            saccade_lookback_ms: default_saccade_lookback(),
            entropy_thresholds: EntropyThresholds::default(),
            coverage_thresholds: CoverageThresholds::default(),
            gaze_duration_thresholds: GazeDurationThresholds::default(),
            saccade_thresholds: SaccadeThresholds::default(),
            screen_layout: ScreenLayout::default(),
            zoom_scale: default_zoom_scale(),
            windowing: WindowPolicy::default(),
            confirmation_windows: default_confirmation_windows(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.window_size_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "window_size_ms must be positive".to_string(),
            ));
        }
        if validate_scale(self.zoom_scale).is_err() {
            return Err(EngineError::InvalidConfig(format!(
                "zoom_scale must be finite, positive and not 1.0, got {}",
                self.zoom_scale
            )));
        }
        if self.confirmation_windows == 0 {
            return Err(EngineError::InvalidConfig(
                "confirmation_windows must be at least 1".to_string(),
            ));
        }
        self.screen_layout.validate()
    }
}

/// Entropy thresholds in bits. Only `high` gates a rule; `low` is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntropyThresholds {
    #[serde(default = "default_entropy_low")]
    pub low: f64,
    #[serde(default = "default_entropy_high")]
    pub high: f64,
}

fn default_entropy_low() -> f64 {
    1.2
}

fn default_entropy_high() -> f64 {
    1.8
}

impl Default for EntropyThresholds {
    fn default() -> Self {
        EntropyThresholds {
            low: default_entropy_low(),
            high: default_entropy_high(),
        }
    }
}

/// Zone-coverage thresholds. Only `exploratory_min` gates a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageThresholds {
    #[serde(default = "default_direct_max")]
    pub direct_max: usize,
    #[serde(default = "default_referential_min")]
    pub referential_min: usize,
    #[serde(default = "default_referential_max")]
    pub referential_max: usize,
    #[serde(default = "default_exploratory_min")]
    pub exploratory_min: usize,
}

fn default_direct_max() -> usize {
    2
}

fn default_referential_min() -> usize {
    2
}

fn default_referential_max() -> usize {
    3
}

fn default_exploratory_min() -> usize {
    3
}

impl Default for CoverageThresholds {
    fn default() -> Self {
        CoverageThresholds {
            direct_max: default_direct_max(),
            referential_min: default_referential_min(),
            referential_max: default_referential_max(),
            exploratory_min: default_exploratory_min(),
        }
    }
}

/// Fixation duration thresholds (ms). Only `short` gates a rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeDurationThresholds {
    #[serde(default = "default_gaze_short")]
    pub short: f64,
    #[serde(default = "default_gaze_long")]
    pub long: f64,
}

fn default_gaze_short() -> f64 {
    200.0
}

fn default_gaze_long() -> f64 {
    500.0
}

impl Default for GazeDurationThresholds {
    fn default() -> Self {
        GazeDurationThresholds {
            short: default_gaze_short(),
            long: default_gaze_long(),
        }
    }
}

/// Saccade amplitude thresholds in pixels, tuned for a 24" 1080p screen.
/// Only `large` (~3 inches) gates a rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaccadeThresholds {
    #[serde(default = "default_saccade_small")]
    pub small: f64,
    #[serde(default = "default_saccade_medium")]
    pub medium: f64,
    #[serde(default = "default_saccade_large")]
    pub large: f64,
}

fn default_saccade_small() -> f64 {
    50.0
}

fn default_saccade_medium() -> f64 {
    150.0
}

fn default_saccade_large() -> f64 {
    300.0
}

impl Default for SaccadeThresholds {
    fn default() -> Self {
        SaccadeThresholds {
            small: default_saccade_small(),
            medium: default_saccade_medium(),
            large: default_saccade_large(),
        }
    }
}

/// Windowing discipline applied when a window closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// Non-overlapping windows; everything is cleared on close.
    #[default]
    Tumbling,
    /// Samples younger than the window size are replayed into the next window.
    CarryOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: f64,
    pub height: f64,
}

/// Screen-area share of each zone. `bf` is the right column, split evenly
/// between `b` (top) and `f` (bottom). `g` is excluded from normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AoiRatios {
    #[serde(default = "default_ratio_a")]
    pub a: f64,
    #[serde(default = "default_ratio_c")]
    pub c: f64,
    #[serde(default = "default_ratio_bf")]
    pub bf: f64,
    #[serde(default)]
    pub g: f64,
}

fn default_ratio_a() -> f64 {
    0.2
}

fn default_ratio_c() -> f64 {
    0.6
}

fn default_ratio_bf() -> f64 {
    0.2
}

impl Default for AoiRatios {
    fn default() -> Self {
        AoiRatios {
            a: default_ratio_a(),
            c: default_ratio_c(),
            bf: default_ratio_bf(),
            g: 0.0,
        }
    }
}

/// Static screen geometry used for AOI resolution and density normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenLayout {
    #[serde(default = "default_diagonal")]
    pub diagonal_inches: f64,
    #[serde(default = "default_ppi")]
    pub ppi: f64,
    #[serde(default = "default_resolution")]
    pub resolution: Resolution,
    #[serde(default)]
    pub aoi_ratios: AoiRatios,
}

fn default_diagonal() -> f64 {
    24.0
}

fn default_ppi() -> f64 {
    92.0
}

fn default_resolution() -> Resolution {
    Resolution {
        width: 1920.0,
        height: 1080.0,
    }
}

impl Default for ScreenLayout {
    fn default() -> Self {
        ScreenLayout {
            diagonal_inches: default_diagonal(),
            ppi: default_ppi(),
            resolution: default_resolution(),
            aoi_ratios: AoiRatios::default(),
        }
    }
}

impl ScreenLayout {
    pub fn validate(&self) -> Result<(), EngineError> {
        let Resolution { width, height } = self.resolution;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "resolution must be positive, got {}x{}",
                width, height
            )));
        }

        let r = &self.aoi_ratios;
        for (name, ratio) in [("a", r.a), ("c", r.c), ("bf", r.bf)] {
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "aoi ratio {} must be positive, got {}",
                    name, ratio
                )));
            }
        }
        if !r.g.is_finite() || r.g < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "aoi ratio g must be non-negative, got {}",
                r.g
            )));
        }
        // Small tolerance for ratios like 0.2 + 0.6 + 0.2.
        if r.a + r.c + r.bf > 1.0 + 1e-9 {
            return Err(EngineError::InvalidConfig(format!(
                "aoi ratios a + c + bf exceed 1.0 ({})",
                r.a + r.c + r.bf
            )));
        }
        Ok(())
    }
}

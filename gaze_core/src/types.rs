// Strong typing over strings. Newtypes for timestamps, closed enums for zones and classes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Timestamp in milliseconds. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_millis(ms: u64) -> Self {
        Timestamp(ms)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn millis_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Screen zone (area of interest). Serialized as a lowercase id; parsed
/// the same way as `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Zone {
    /// Left task panel.
    A,
    /// Right column, top half (hints).
    B,
    /// Center code editor.
    C,
    /// Right column, bottom half (history).
    F,
    /// Non-task area. Never resolved from coordinates, never zoomed.
    G,
}

impl Zone {
    pub const ALL: [Zone; 5] = [Zone::A, Zone::B, Zone::C, Zone::F, Zone::G];

    /// Zones that can be zoomed, in tie-break order.
    pub const TASK: [Zone; 4] = [Zone::A, Zone::B, Zone::C, Zone::F];

    pub fn is_task(&self) -> bool {
        !matches!(self, Zone::G)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::A => "a",
            Zone::B => "b",
            Zone::C => "c",
            Zone::F => "f",
            Zone::G => "g",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(Zone::A),
            "b" => Ok(Zone::B),
            "c" => Ok(Zone::C),
            "f" => Ok(Zone::F),
            "g" => Ok(Zone::G),
            _ => Err(EngineError::InvalidZone(s.to_string())),
        }
    }
}

impl TryFrom<String> for Zone {
    type Error = EngineError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        id.parse()
    }
}

/// One value per zone. Missing zones in JSON input fall back to `T::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PerZone<T> {
    pub a: T,
    pub b: T,
    pub c: T,
    pub f: T,
    pub g: T,
}

impl<T> PerZone<T> {
    pub fn from_fn(mut f: impl FnMut(Zone) -> T) -> Self {
        PerZone {
            a: f(Zone::A),
            b: f(Zone::B),
            c: f(Zone::C),
            f: f(Zone::F),
            g: f(Zone::G),
        }
    }

    pub fn get(&self, zone: Zone) -> &T {
        match zone {
            Zone::A => &self.a,
            Zone::B => &self.b,
            Zone::C => &self.c,
            Zone::F => &self.f,
            Zone::G => &self.g,
        }
    }

    pub fn get_mut(&mut self, zone: Zone) -> &mut T {
        match zone {
            Zone::A => &mut self.a,
            Zone::B => &mut self.b,
            Zone::C => &mut self.c,
            Zone::F => &mut self.f,
            Zone::G => &mut self.g,
        }
    }

    /// Iterate in a, b, c, f, g order.
    pub fn iter(&self) -> impl Iterator<Item = (Zone, &T)> {
        Zone::ALL.into_iter().map(move |zone| (zone, self.get(zone)))
    }
}

/// A single gaze observation from the capture bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    /// Screen x coordinate in pixels.
    pub x: f64,
    /// Screen y coordinate in pixels.
    pub y: f64,
    /// Pre-tagged zone. Resolved from coordinates when absent.
    #[serde(default)]
    pub aoi: Option<Zone>,
    /// Fixation duration in milliseconds.
    pub duration: f64,
    /// Overwritten by the timestamp passed to `ingest`.
    #[serde(default)]
    pub timestamp: Timestamp,
}

impl GazeSample {
    pub fn new(x: f64, y: f64, duration: f64) -> Self {
        GazeSample {
            x,
            y,
            aoi: None,
            duration,
            timestamp: Timestamp::default(),
        }
    }

    pub fn with_aoi(mut self, zone: Zone) -> Self {
        self.aoi = Some(zone);
        self
    }

    pub fn distance_to(&self, other: &GazeSample) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(EngineError::InvalidSample(format!(
                "non-finite coordinates ({}, {})",
                self.x, self.y
            )));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(EngineError::InvalidSample(format!(
                "duration must be a non-negative number, got {}",
                self.duration
            )));
        }
        Ok(())
    }
}

/// Per-zone accumulator inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ZoneTally {
    pub count: u32,
    pub duration: f64,
}

/// Reading-strategy class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Stays on the code area with long fixations.
    Direct,
    /// Alternates between code and the hint panel.
    Referential,
    /// Wide, fast scanning across zones including off-task areas.
    Exploratory,
    #[default]
    Unknown,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Direct => "direct",
            UserType::Referential => "referential",
            UserType::Exploratory => "exploratory",
            UserType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scale factor per zone, 1.0 = not zoomed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoomState(PerZone<f64>);

impl ZoomState {
    pub fn scale_of(&self, zone: Zone) -> f64 {
        *self.0.get(zone)
    }

    /// The zoomed task zone, if any.
    pub fn zoomed_zone(&self) -> Option<Zone> {
        Zone::TASK
            .into_iter()
            .find(|zone| self.scale_of(*zone) != 1.0)
    }

    pub(crate) fn clear(&mut self) {
        self.0 = PerZone::from_fn(|_| 1.0);
    }

    pub(crate) fn set(&mut self, zone: Zone, scale: f64) {
        *self.0.get_mut(zone) = scale;
    }
}

impl Default for ZoomState {
    fn default() -> Self {
        ZoomState(PerZone::from_fn(|_| 1.0))
    }
}

/// Payload delivered to the zoom-change observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomChange {
    pub zoomed_area: Zone,
    pub zoom_state: ZoomState,
    pub timestamp: Timestamp,
}

/// Visit and dwell shares of one zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AoiProportion {
    pub count_proportion: f64,
    pub duration_proportion: f64,
    pub raw_count: u32,
    pub raw_duration: f64,
}

/// Gaze share normalized by screen-area share. `g` has no area and no density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DensityMetrics {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub f: f64,
}

/// Features extracted from one closed window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WindowStats {
    pub median_saccade: f64,
    pub entropy: f64,
    pub coverage: usize,
    pub median_gaze_duration: f64,
    pub aoi_proportions: PerZone<AoiProportion>,
    pub density_metrics: DensityMetrics,
    pub gaze_count: u32,
    pub window_duration_ms: u64,
}

/// Panel hint for the hosting UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PanelHint {
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    Vertical,
    Horizontal,
}

/// Layout names the UI knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutName {
    Focus,
    Balanced,
    Guided,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PanelHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_panel: Option<PanelHint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_panel: Option<PanelHint>,
    /// Offer documentation and contextual links.
    #[serde(default)]
    pub contextual_links: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiRecommendation {
    pub layout: LayoutName,
    pub description: String,
    pub components: PanelHints,
}

/// Values surfaced for debugging a classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Diagnostics {
    pub c_proportion: f64,
    pub c_duration: f64,
    pub total_duration: f64,
}

/// Result of one completed window. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Raw class of this window.
    pub user_type: UserType,
    /// Class after confirmation debouncing, if one is confirmed.
    pub confirmed_type: Option<UserType>,
    pub zoomed_area: Option<Zone>,
    pub stats: WindowStats,
    pub ui_recommendation: UiRecommendation,
    /// Timestamp of the sample that closed the window.
    pub timestamp: Timestamp,
    pub diagnostics: Diagnostics,
}

/// Results of a batch. `error` holds the zoom observer failure that stopped
/// the batch, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BatchOutcome {
    pub results: Vec<ClassificationResult>,
    pub error: Option<String>,
}

/// Summary of the last confirmed classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastClassification {
    pub user_type: UserType,
    pub timestamp: Timestamp,
    pub stats: WindowStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_conversions() {
        let ts = Timestamp::from_millis(1_500);
        assert_eq!(ts.as_millis(), 1_500);
        assert_eq!(ts.millis_since(Timestamp::from_millis(2_000)), 0);
    }

    #[test]
    fn zone_parses_case_insensitive() {
        assert_eq!("C".parse::<Zone>().unwrap(), Zone::C);
        assert_eq!(" f ".parse::<Zone>().unwrap(), Zone::F);
        assert!(matches!("x".parse::<Zone>(), Err(EngineError::InvalidZone(_))));
    }

    #[test]
    fn sample_json_without_aoi() {
        let sample: GazeSample = serde_json::from_str(r#"{"x":10,"y":20,"duration":150}"#).unwrap();
        assert_eq!(sample.aoi, None);
        assert_eq!(sample.timestamp, Timestamp::default());

        let tagged: GazeSample =
            serde_json::from_str(r#"{"x":10,"y":20,"aoi":"g","duration":150}"#).unwrap();
        assert_eq!(tagged.aoi, Some(Zone::G));

        let upper: GazeSample =
            serde_json::from_str(r#"{"x":10,"y":20,"aoi":"C","duration":150}"#).unwrap();
        assert_eq!(upper.aoi, Some(Zone::C));
        assert!(serde_json::from_str::<GazeSample>(r#"{"x":1,"y":2,"aoi":"z","duration":1}"#).is_err());
    }

    #[test]
    fn sample_validation() {
        assert!(GazeSample::new(1.0, 2.0, 0.0).validate().is_ok());
        assert!(GazeSample::new(f64::NAN, 2.0, 10.0).validate().is_err());
        assert!(GazeSample::new(1.0, 2.0, -1.0).validate().is_err());
    }

    #[test]
    fn zoom_state_serializes_as_zone_map() {
        let mut state = ZoomState::default();
        state.set(Zone::C, 1.5);
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["c"], 1.5);
        assert_eq!(json["g"], 1.0);
        assert_eq!(state.zoomed_zone(), Some(Zone::C));
    }

    #[test]
    fn per_zone_missing_entries_default() {
        let tallies: PerZone<ZoneTally> = serde_json::from_str(r#"{"c":{"count":3,"duration":90}}"#).unwrap();
        assert_eq!(tallies.c.count, 3);
        assert_eq!(tallies.a, ZoneTally::default());
    }
}

// Feature extraction over a closed window: proportions, Shannon entropy,
// coverage, area-normalized density, and median saccade / fixation statistics.

use crate::config::ScreenLayout;
use crate::types::*;
use crate::window::ClosedWindow;

/// Zones above this visit share count toward coverage.
const COVERAGE_MIN_PROPORTION: f64 = 0.05;

/// Median with the even-count midpoint rule; 0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let middle = sorted.len() / 2;

    if sorted.len() % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2.0
    } else {
        sorted[middle]
    }
}

/// Shannon entropy in bits. Zero proportions contribute nothing.
pub fn entropy(proportions: &[f64]) -> f64 {
    -proportions
        .iter()
        .filter(|p| **p > 0.0)
        .map(|p| p * p.log2())
        .sum::<f64>()
}

/// Compute all window statistics.
pub fn extract(closed: &ClosedWindow, layout: &ScreenLayout) -> WindowStats {
    let tallies = &closed.window.tallies;

    let total_count = tallies.iter().map(|(_, t)| t.count).sum::<u32>().max(1);
    let total_duration = total_duration(tallies);

    let aoi_proportions = PerZone::from_fn(|zone| {
        let tally = tallies.get(zone);
        AoiProportion {
            count_proportion: tally.count as f64 / total_count as f64,
            duration_proportion: tally.duration / total_duration,
            raw_count: tally.count,
            raw_duration: tally.duration,
        }
    });

    let count_proportions: Vec<f64> = aoi_proportions
        .iter()
        .map(|(_, p)| p.count_proportion)
        .collect();

    let coverage = count_proportions
        .iter()
        .filter(|p| **p > COVERAGE_MIN_PROPORTION)
        .count();

    let durations: Vec<f64> = closed.window.samples.iter().map(|s| s.duration).collect();

    WindowStats {
        median_saccade: median(&closed.window.saccade_amplitudes),
        entropy: entropy(&count_proportions),
        coverage,
        median_gaze_duration: median(&durations),
        aoi_proportions,
        density_metrics: density(&aoi_proportions, layout),
        gaze_count: total_count,
        window_duration_ms: closed.duration_ms(),
    }
}

/// Sum of durations across zones, floored at 1 like the count total.
pub fn total_duration(tallies: &PerZone<ZoneTally>) -> f64 {
    floor_at_one(tallies.iter().map(|(_, t)| t.duration).sum())
}

fn floor_at_one(total: f64) -> f64 {
    if total > 0.0 {
        total
    } else {
        1.0
    }
}

fn density(proportions: &PerZone<AoiProportion>, layout: &ScreenLayout) -> DensityMetrics {
    let ratios = &layout.aoi_ratios;
    let half_column = ratios.bf / 2.0;

    DensityMetrics {
        a: proportions.a.count_proportion / ratios.a,
        b: proportions.b.count_proportion / half_column,
        c: proportions.c.count_proportion / ratios.c,
        f: proportions.f.count_proportion / half_column,
    }
}

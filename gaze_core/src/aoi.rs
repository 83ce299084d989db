// AOI resolution: screen coordinates to zone.
// Columns are a | c | b/f from left to right; the right column splits at half height.

use crate::config::ScreenLayout;
use crate::types::Zone;

/// Map a screen coordinate to a task zone. Never returns `Zone::G`;
/// off-task samples must be tagged by the caller.
pub fn resolve(x: f64, y: f64, layout: &ScreenLayout) -> Zone {
    let width = layout.resolution.width;
    let a_width = width * layout.aoi_ratios.a;
    let c_width = width * layout.aoi_ratios.c;

    if x < a_width {
        Zone::A
    } else if x < a_width + c_width {
        Zone::C
    } else if y < layout.resolution.height / 2.0 {
        Zone::B
    } else {
        Zone::F
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_layout_boundaries() {
        let layout = ScreenLayout::default();
        assert_eq!(resolve(0.0, 0.0, &layout), Zone::A);
        assert_eq!(resolve(383.0, 0.0, &layout), Zone::A);
        assert_eq!(resolve(384.0, 0.0, &layout), Zone::C);
        assert_eq!(resolve(1000.0, 100.0, &layout), Zone::C);
        assert_eq!(resolve(1600.0, 100.0, &layout), Zone::B);
        assert_eq!(resolve(1600.0, 800.0, &layout), Zone::F);
    }

    #[test]
    fn right_column_split_is_at_half_height() {
        let layout = ScreenLayout::default();
        assert_eq!(resolve(1800.0, 539.9, &layout), Zone::B);
        assert_eq!(resolve(1800.0, 540.0, &layout), Zone::F);
    }

    #[test]
    fn off_screen_coordinates_still_resolve() {
        let layout = ScreenLayout::default();
        assert_eq!(resolve(-50.0, 0.0, &layout), Zone::A);
        assert_eq!(resolve(5000.0, -10.0, &layout), Zone::B);
    }

    proptest! {
        #[test]
        fn never_resolves_non_task_zone(x in -4000.0f64..4000.0, y in -4000.0f64..4000.0) {
            let zone = resolve(x, y, &ScreenLayout::default());
            prop_assert!(zone.is_task());
        }
    }
}

use glam::DVec2;
use std::collections::HashMap;
use std::sync::Arc;

use crate::map::HitTest;

/// Country identifier -> life expectancy in years
pub type ValueTable = HashMap<String, f64>;

/// Lower end of the life expectancy ramp (years)
pub const RAMP_MIN: f64 = 40.0;
/// Upper end of the life expectancy ramp (years)
pub const RAMP_MAX: f64 = 90.0;
const LEVEL_MIN: f64 = 10.0;
const LEVEL_MAX: f64 = 255.0;

/// An 8-bit RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Color for countries without data, and for everything outside the selection
    pub const GRAY: Rgb = Rgb(150, 150, 150);
}

/// Affine interpolation of `v` from [in_lo, in_hi] onto [out_lo, out_hi].
/// Does not clamp: inputs outside the source range extrapolate.
#[inline(always)]
pub fn linear_map(v: f64, in_lo: f64, in_hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    out_lo + (v - in_lo) * (out_hi - out_lo) / (in_hi - in_lo)
}

/// Color level for a life expectancy value.
/// The mapped value is truncated toward zero, then clamped into a channel.
#[inline(always)]
pub fn level_for(value: f64) -> u8 {
    let level = linear_map(value, RAMP_MIN, RAMP_MAX, LEVEL_MIN, LEVEL_MAX).trunc();
    level.clamp(0.0, 255.0) as u8
}

/// Red-orange near 40 years, blue near 90
#[inline(always)]
pub fn color_for(value: f64) -> Rgb {
    let level = level_for(value);
    Rgb(255 - level, 100, level)
}

/// One country's drawable shape
#[derive(Clone, Debug)]
pub struct Marker<G> {
    pub id: String,
    /// Only the engine assigns colors
    pub(crate) color: Rgb,
    pub geometry: Arc<G>,
}

impl<G> Marker<G> {
    pub fn new(id: impl Into<String>, geometry: Arc<G>) -> Self {
        Self {
            id: id.into(),
            color: Rgb::GRAY,
            geometry,
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }
}

/// Joins markers with the value table and owns the click selection.
///
/// Every marker color is derived from `(values, selected)` alone, so any
/// operation may recompute all colors from scratch.
pub struct ShadingEngine<G> {
    markers: Vec<Marker<G>>,
    values: Arc<ValueTable>,
    /// Index into `markers`
    selected: Option<usize>,
}

impl<G: HitTest> ShadingEngine<G> {
    /// Store markers and values, then shade every marker
    pub fn new(markers: Vec<Marker<G>>, values: Arc<ValueTable>) -> Self {
        let mut engine = Self {
            markers,
            values,
            selected: None,
        };
        engine.shade_all();
        engine
    }

    /// Reset every marker to its unselected color
    pub fn shade_all(&mut self) {
        for marker in &mut self.markers {
            marker.color = match self.values.get(&marker.id) {
                Some(&value) => color_for(value),
                None => Rgb::GRAY,
            };
        }
    }

    /// Recompute the selection from a click at a geographic point.
    ///
    /// Every marker containing the point is processed in order, so with
    /// overlapping shapes the last match ends up selected and colored.
    pub fn handle_click(&mut self, point: DVec2) {
        self.selected = None;
        self.shade_all();

        for idx in 0..self.markers.len() {
            if !self.markers[idx].geometry.contains(point) {
                continue;
            }
            self.selected = Some(idx);

            for marker in &mut self.markers {
                marker.color = Rgb::GRAY;
            }

            if let Some(&value) = self.values.get(&self.markers[idx].id) {
                self.markers[idx].color = color_for(value);
            }
        }

        match self.selected() {
            Some(marker) => tracing::debug!(id = %marker.id, "country selected"),
            None => tracing::debug!(lon = point.x, lat = point.y, "click hit no country"),
        }
    }

    /// Drop the selection and restore normal shading
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.shade_all();
    }

    /// Text for the info box, `None` without a selection
    pub fn describe_selection(&self) -> Option<String> {
        let marker = self.selected()?;
        Some(match self.values.get(&marker.id) {
            Some(value) => format!("{}: {}", marker.id, value),
            None => format!("{}: N/A", marker.id),
        })
    }

    pub fn selected(&self) -> Option<&Marker<G>> {
        self.selected.and_then(|idx| self.markers.get(idx))
    }

    pub fn markers(&self) -> &[Marker<G>] {
        &self.markers
    }

    pub fn value_of(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied()
    }

    /// Current color of the first marker with this id
    pub fn color_of(&self, id: &str) -> Option<Rgb> {
        self.markers.iter().find(|m| m.id == id).map(Marker::color)
    }

    /// Number of markers that have a value in the table
    pub fn matched_count(&self) -> usize {
        self.markers
            .iter()
            .filter(|m| self.values.contains_key(&m.id))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Axis-aligned box standing in for a country outline
    #[derive(Debug)]
    struct Rect {
        min: DVec2,
        max: DVec2,
    }

    impl HitTest for Rect {
        fn contains(&self, p: DVec2) -> bool {
            p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
        }
    }

    fn rect_marker(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Marker<Rect> {
        Marker::new(
            id,
            Arc::new(Rect {
                min: DVec2::new(x0, y0),
                max: DVec2::new(x1, y1),
            }),
        )
    }

    fn north_america() -> ShadingEngine<Rect> {
        let values: ValueTable = [("USA".to_string(), 80.0), ("CAN".to_string(), 60.0)]
            .into_iter()
            .collect();
        let markers = vec![
            rect_marker("USA", -125.0, 25.0, -67.0, 49.0),
            rect_marker("CAN", -140.0, 50.0, -55.0, 70.0),
            rect_marker("MEX", -117.0, 15.0, -87.0, 24.0),
        ];
        ShadingEngine::new(markers, Arc::new(values))
    }

    fn colors(engine: &ShadingEngine<Rect>) -> Vec<Rgb> {
        engine.markers().iter().map(Marker::color).collect()
    }

    #[test]
    fn test_linear_map_endpoints() {
        assert_eq!(linear_map(40.0, 40.0, 90.0, 10.0, 255.0), 10.0);
        assert_eq!(linear_map(90.0, 40.0, 90.0, 10.0, 255.0), 255.0);
        assert_eq!(linear_map(65.0, 40.0, 90.0, 10.0, 255.0), 132.5);
    }

    #[test]
    fn test_level_truncates() {
        assert_eq!(level_for(65.0), 132);
        assert_eq!(color_for(65.0), Rgb(123, 100, 132));
    }

    #[test]
    fn test_out_of_range_values_saturate() {
        // 30 years maps to -39, 100 years to 304
        assert_eq!(color_for(30.0), Rgb(255, 100, 0));
        assert_eq!(color_for(100.0), Rgb(0, 100, 255));
    }

    #[test]
    fn test_new_marker_starts_gray() {
        let marker = rect_marker("XXX", 0.0, 0.0, 1.0, 1.0);
        assert_eq!(marker.color(), Rgb::GRAY);
    }

    #[test]
    fn test_shade_all_example() {
        let engine = north_america();
        assert_eq!(engine.color_of("USA"), Some(Rgb(49, 100, 206)));
        assert_eq!(engine.color_of("CAN"), Some(Rgb(147, 100, 108)));
        assert_eq!(engine.color_of("MEX"), Some(Rgb::GRAY));
        assert_eq!(engine.matched_count(), 2);
        assert!(engine.describe_selection().is_none());
    }

    #[test]
    fn test_click_selects_country() {
        let mut engine = north_america();
        engine.handle_click(DVec2::new(-100.0, 60.0));

        assert_eq!(engine.selected().map(|m| m.id.as_str()), Some("CAN"));
        assert_eq!(engine.color_of("USA"), Some(Rgb::GRAY));
        assert_eq!(engine.color_of("MEX"), Some(Rgb::GRAY));
        assert_eq!(engine.color_of("CAN"), Some(Rgb(147, 100, 108)));
        assert_eq!(engine.describe_selection().as_deref(), Some("CAN: 60"));
    }

    #[test]
    fn test_click_country_without_value() {
        let mut engine = north_america();
        engine.handle_click(DVec2::new(-100.0, 20.0));

        assert_eq!(engine.selected().map(|m| m.id.as_str()), Some("MEX"));
        assert!(colors(&engine).iter().all(|&c| c == Rgb::GRAY));
        assert_eq!(engine.describe_selection().as_deref(), Some("MEX: N/A"));
    }

    #[test]
    fn test_click_on_ocean_restores_shading() {
        let mut engine = north_america();
        let baseline = colors(&engine);

        engine.handle_click(DVec2::new(-100.0, 60.0));
        engine.handle_click(DVec2::new(-30.0, 0.0));

        assert!(engine.selected().is_none());
        assert_eq!(colors(&engine), baseline);
        assert!(engine.describe_selection().is_none());
    }

    #[test]
    fn test_overlap_last_match_wins() {
        let values: ValueTable = [("A".to_string(), 50.0), ("B".to_string(), 85.0)]
            .into_iter()
            .collect();
        let markers = vec![
            rect_marker("A", 0.0, 0.0, 10.0, 10.0),
            rect_marker("B", 5.0, 5.0, 15.0, 15.0),
        ];
        let mut engine = ShadingEngine::new(markers, Arc::new(values));

        engine.handle_click(DVec2::new(7.0, 7.0));

        assert_eq!(engine.selected().map(|m| m.id.as_str()), Some("B"));
        assert_eq!(engine.color_of("A"), Some(Rgb::GRAY));
        assert_eq!(engine.color_of("B"), Some(color_for(85.0)));
    }

    #[test]
    fn test_clear_selection() {
        let mut engine = north_america();
        let baseline = colors(&engine);
        engine.handle_click(DVec2::new(-100.0, 30.0));
        assert!(engine.selected().is_some());

        engine.clear_selection();
        assert!(engine.selected().is_none());
        assert_eq!(colors(&engine), baseline);
    }

    #[test]
    fn test_fractional_value_description() {
        let values: ValueTable = [("JPN".to_string(), 83.5)].into_iter().collect();
        let mut engine =
            ShadingEngine::new(vec![rect_marker("JPN", 129.0, 30.0, 146.0, 46.0)], Arc::new(values));
        engine.handle_click(DVec2::new(139.7, 35.7));
        assert_eq!(engine.describe_selection().as_deref(), Some("JPN: 83.5"));
    }

    proptest! {
        #[test]
        fn prop_shade_all_idempotent(a in 0.0f64..120.0, b in 0.0f64..120.0) {
            let values: ValueTable = [("A".to_string(), a), ("B".to_string(), b)]
                .into_iter()
                .collect();
            let markers = vec![
                rect_marker("A", 0.0, 0.0, 1.0, 1.0),
                rect_marker("B", 2.0, 0.0, 3.0, 1.0),
                rect_marker("C", 4.0, 0.0, 5.0, 1.0),
            ];
            let mut engine = ShadingEngine::new(markers, Arc::new(values));
            let first = colors(&engine);
            engine.shade_all();
            prop_assert_eq!(colors(&engine), first);
        }

        #[test]
        fn prop_in_range_colors_follow_ramp(value in 40.0f64..=90.0) {
            let Rgb(r, g, b) = color_for(value);
            prop_assert_eq!(g, 100);
            prop_assert_eq!(r as u16 + b as u16, 255);
            prop_assert!((10..=255).contains(&b));
        }

        #[test]
        fn prop_ramp_is_monotonic(a in 0.0f64..150.0, b in 0.0f64..150.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(level_for(lo) <= level_for(hi));
        }
    }
}

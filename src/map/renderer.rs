use rayon::prelude::*;

use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_line, HitTest, Ring, Shape};
use crate::map::projection::Viewport;
use crate::map::spatial::FeatureGrid;
use crate::shading::{Marker, Rgb};

/// Grid cell size in degrees for the country index
const GRID_CELL_DEG: f64 = 10.0;

/// Display settings for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_fills: bool,
    pub show_borders: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_fills: true,
            show_borders: true,
        }
    }
}

/// One frame's worth of map output, in terminal cells
pub struct MapLayers {
    /// Country color per cell, row-major; `None` is open water
    pub fills: Vec<Option<Rgb>>,
    /// Country outlines
    pub borders: BrailleCanvas,
    pub width: usize,
    pub height: usize,
}

impl MapLayers {
    pub fn fill_at(&self, col: usize, row: usize) -> Option<Rgb> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.fills[row * self.width + col]
    }
}

/// Draws country markers as filled cells plus braille outlines
pub struct MapRenderer {
    grid: FeatureGrid,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    /// Index the marker shapes. Marker order must match later `render` calls.
    pub fn new(markers: &[Marker<Shape>]) -> Self {
        let grid = FeatureGrid::build(markers.iter().map(|m| m.geometry.bbox()), GRID_CELL_DEG);
        Self {
            grid,
            settings: DisplaySettings::default(),
        }
    }

    /// Render all layers for a `width` x `height` cell area
    pub fn render(&self, markers: &[Marker<Shape>], width: usize, height: usize, viewport: &Viewport) -> MapLayers {
        let mut fills = vec![None; width * height];
        if self.settings.show_fills && width > 0 {
            fills
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(row, line)| self.fill_row(markers, row, line, viewport));
        }

        let mut borders = BrailleCanvas::new(width, height);
        if self.settings.show_borders {
            let (min_lon, min_lat, max_lon, max_lat) = viewport.visible_bounds();
            let mut visible = Vec::new();
            self.grid.query_into(min_lon, min_lat, max_lon, max_lat, &mut visible);
            visible.sort_unstable();
            visible.dedup();

            for idx in visible {
                if let Some(marker) = markers.get(idx) {
                    for ring in marker.geometry.rings() {
                        draw_ring(&mut borders, ring, viewport);
                    }
                }
            }
        }

        MapLayers {
            fills,
            borders,
            width,
            height,
        }
    }

    /// Color each cell of one row by the marker under its center.
    /// Later markers paint over earlier ones, matching click order.
    fn fill_row(&self, markers: &[Marker<Shape>], row: usize, line: &mut [Option<Rgb>], viewport: &Viewport) {
        let py = (row * 4) as f64 + 2.0;
        for (col, cell) in line.iter_mut().enumerate() {
            let px = (col * 2) as f64 + 1.0;
            let point = viewport.unproject_f(px, py);
            *cell = self
                .grid
                .query_point(point.x, point.y)
                .iter()
                .rev()
                .filter_map(|&idx| markers.get(idx))
                .find(|m| m.geometry.contains(point))
                .map(Marker::color);
        }
    }

    pub fn toggle_borders(&mut self) {
        self.settings.show_borders = !self.settings.show_borders;
    }

    pub fn toggle_fills(&mut self) {
        self.settings.show_fills = !self.settings.show_fills;
    }
}

/// Draw a closed ring with viewport culling
fn draw_ring(canvas: &mut BrailleCanvas, ring: &Ring, viewport: &Viewport) {
    if ring.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;
    for v in ring {
        let (px, py) = viewport.project(v.x, v.y);

        if let Some((prev_x, prev_y)) = prev {
            // Skip segments that jump across the antimeridian
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }

        prev = Some((px, py));
    }
}

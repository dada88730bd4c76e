use std::sync::Arc;

use crate::map::{MapRenderer, Shape, Viewport};
use crate::shading::{Marker, ShadingEngine, ValueTable};

/// Info box offset from the map's inner top-left corner, in cells
pub const INFO_BOX_OFFSET: (u16, u16) = (1, 1);
pub const INFO_BOX_SIZE: (u16, u16) = (26, 3);

/// Terminal cell to braille pixel coordinates, accounting for the 1-cell border
#[inline(always)]
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    let px = (col.saturating_sub(1) as i32) * 2;
    let py = (row.saturating_sub(1) as i32) * 4;
    (px, py)
}

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub engine: ShadingEngine<Shape>,
    pub map_renderer: MapRenderer,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Whether the held button has moved since it went down
    drag_moved: bool,
    /// Frames drawn so far
    pub frame: u64,
}

impl App {
    pub fn new(width: usize, height: usize, markers: Vec<Marker<Shape>>, values: Arc<ValueTable>) -> Self {
        // Braille gives 2x4 resolution per character
        // 2 border columns, 2 border rows plus the status bar
        let pixel_width = width.saturating_sub(2) * 2;
        let pixel_height = height.saturating_sub(3) * 4;

        let map_renderer = MapRenderer::new(&markers);
        Self {
            viewport: Viewport::world(pixel_width, pixel_height),
            engine: ShadingEngine::new(markers, values),
            map_renderer,
            should_quit: false,
            last_mouse: None,
            drag_moved: false,
            frame: 0,
        }
    }

    /// Called once per loop iteration before drawing
    pub fn on_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    /// Inner map cell under a terminal cell, `None` over the border, the
    /// status bar or the info box
    fn map_cell(&self, col: u16, row: u16) -> Option<(u16, u16)> {
        let cols = (self.viewport.width / 2) as u16;
        let rows = (self.viewport.height / 4) as u16;
        if !(1..=cols).contains(&col) || !(1..=rows).contains(&row) {
            return None;
        }
        let (x, y) = (col - 1, row - 1);
        let in_info_box = (INFO_BOX_OFFSET.0..INFO_BOX_OFFSET.0 + INFO_BOX_SIZE.0).contains(&x)
            && (INFO_BOX_OFFSET.1..INFO_BOX_OFFSET.1 + INFO_BOX_SIZE.1).contains(&y);
        (!in_info_box).then_some((x, y))
    }

    /// A left click that did not drag: select whatever country is under the cell.
    /// Clicks outside the map leave the selection alone.
    pub fn on_click(&mut self, col: u16, row: u16) {
        if self.map_cell(col, row).is_none() {
            return;
        }
        let (px, py) = cell_to_pixel(col, row);
        // Hit-test the cell center rather than its corner
        let point = self.viewport.unproject_f(px as f64 + 1.0, py as f64 + 2.0);
        self.engine.handle_click(point);
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        self.viewport.width = width.saturating_sub(2) * 2;
        self.viewport.height = height.saturating_sub(3) * 4;
    }

    /// Reset pan and zoom, keeping the selection
    pub fn reset_view(&mut self) {
        self.viewport = Viewport::world(self.viewport.width, self.viewport.height);
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Left button pressed
    pub fn begin_press(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.drag_moved = false;
    }

    /// Pan by the mouse movement since the last drag event
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - col as i32;
            let dy = last_y as i32 - row as i32;
            if dx != 0 || dy != 0 {
                self.drag_moved = true;
            }
            // Less sensitive when zoomed out
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            self.pan(dx * scale, dy * scale);
        }
        self.last_mouse = Some((col, row));
    }

    /// Left button released: a press without movement counts as a click
    pub fn end_press(&mut self, col: u16, row: u16) {
        let was_click = self.last_mouse.is_some() && !self.drag_moved;
        self.last_mouse = None;
        self.drag_moved = false;
        if was_click {
            self.on_click(col, row);
        }
    }

    pub fn clear_selection(&mut self) {
        self.engine.clear_selection();
    }
}

use crate::braille::BrailleCanvas;
use glam::DVec2;

/// Anything that can answer "is this geographic point inside me"
pub trait HitTest {
    fn contains(&self, point: DVec2) -> bool;
}

/// Closed ring of (lon, lat) vertices; the closing vertex may be repeated
pub type Ring = Vec<DVec2>;

/// A polygon: exterior ring followed by zero or more holes
#[derive(Clone, Debug, Default)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self { exterior, holes }
    }

    fn contains(&self, p: DVec2) -> bool {
        ring_contains(&self.exterior, p) && !self.holes.iter().any(|h| ring_contains(h, p))
    }
}

/// A country outline (one or more polygons) with a cached bounding box
#[derive(Clone, Debug)]
pub struct Shape {
    pub polygons: Vec<Polygon>,
    min: DVec2,
    max: DVec2,
}

impl Shape {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for v in polygons.iter().flat_map(|p| p.exterior.iter()) {
            min = min.min(*v);
            max = max.max(*v);
        }
        Self { polygons, min, max }
    }

    /// Axis-aligned box from a (min_lon, min_lat, max_lon, max_lat) pair of corners
    pub fn rect(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        let ring = vec![
            DVec2::new(min_lon, min_lat),
            DVec2::new(max_lon, min_lat),
            DVec2::new(max_lon, max_lat),
            DVec2::new(min_lon, max_lat),
            DVec2::new(min_lon, min_lat),
        ];
        Self::new(vec![Polygon::new(ring, Vec::new())])
    }

    /// (min_lon, min_lat, max_lon, max_lat); inverted for an empty shape
    pub fn bbox(&self) -> (f64, f64, f64, f64) {
        (self.min.x, self.min.y, self.max.x, self.max.y)
    }

    /// Every ring (exteriors and holes) for outline drawing
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.polygons
            .iter()
            .flat_map(|p| std::iter::once(&p.exterior).chain(p.holes.iter()))
    }
}

impl HitTest for Shape {
    fn contains(&self, p: DVec2) -> bool {
        if p.x < self.min.x || p.x > self.max.x || p.y < self.min.y || p.y > self.max.y {
            return false;
        }
        self.polygons.iter().any(|poly| poly.contains(p))
    }
}

/// Even-odd ray casting. The ring is implicitly closed.
fn ring_contains(ring: &[DVec2], p: DVec2) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        // Does the ray going right from p cross edge (a, b)?
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

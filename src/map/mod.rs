mod geometry;
mod projection;
mod renderer;
mod spatial;

pub use geometry::{HitTest, Polygon, Ring, Shape};
pub use projection::Viewport;
pub use renderer::{MapLayers, MapRenderer};

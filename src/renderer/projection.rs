//! Linear WGS84 to pixel projection

use crate::geometry::{BoundingBox, Point};

/// Maps a bounding box onto a `max_x` by `max_y` pixel canvas
///
/// The y axis is flipped so north is up. Results are truncated toward zero.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    max_x: u32,
    max_y: u32,
    bbox: BoundingBox,
}

impl Projection {
    pub fn new(max_x: u32, max_y: u32, bbox: BoundingBox) -> Self {
        Self { max_x, max_y, bbox }
    }

    pub fn project(&self, lon: f64, lat: f64) -> Point {
        let x = f64::from(self.max_x) * (lon - self.bbox.min_lon) / self.bbox.width();
        let y = f64::from(self.max_y) * (lat - self.bbox.min_lat) / self.bbox.height();
        Point::new(x as i32, (f64::from(self.max_y) - y) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection() -> Projection {
        Projection::new(200, 100, BoundingBox::new(4.0, 50.0, 6.0, 51.0))
    }

    #[test]
    fn test_corners() {
        let p = projection();
        assert_eq!(p.project(4.0, 50.0), Point::new(0, 100));
        assert_eq!(p.project(6.0, 51.0), Point::new(200, 0));
        assert_eq!(p.project(4.0, 51.0), Point::new(0, 0));
    }

    #[test]
    fn test_truncates() {
        let p = projection();
        // x = 200 * 0.999 / 2 = 99.9, y = 100 - 100 * 0.5 = 50
        assert_eq!(p.project(4.999, 50.5), Point::new(99, 50));
    }
}

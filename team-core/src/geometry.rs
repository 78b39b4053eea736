use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Point in percent of the canvas box (0..100 on each axis when inside it).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point { x: v.0, y: v.1 }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

pub const TRAINER_DEFAULT_POSITION: Point = Point::new(50.0, 70.0);
pub const NAME_DEFAULT_POSITION: Point = Point::new(50.0, 12.0);

/// Fanned-out row used until a roster sprite is dragged.
pub fn default_roster_position(index: usize) -> Point {
    Point::new(20.0 + index as f64 * 12.0, 70.0)
}

/// Client-space bounding box of the party canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    /// Convert client coordinates into canvas percentages.
    pub fn to_percent(&self, client_x: f64, client_y: f64) -> Point {
        Point {
            x: (client_x - self.left) / self.width.max(1.0) * 100.0,
            y: (client_y - self.top) / self.height.max(1.0) * 100.0,
        }
    }
}

/// Distance between two touch points in client pixels.
pub fn touch_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Rotation folded into `[0, 360)` for display; stored values stay unbounded.
pub fn normalize_degrees(deg: i32) -> i32 {
    deg.rem_euclid(360)
}

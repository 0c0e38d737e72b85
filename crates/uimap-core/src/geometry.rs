//! Geometry types for on-screen control placement.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Point on screen, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    /// Horizontal coordinate
    pub x: i32,
    /// Vertical coordinate
    pub y: i32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Snapshot of a control's bounding rectangle.
///
/// Only used for spatial grouping during a scan; never persisted with an
/// element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct BoundingRectangle {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl BoundingRectangle {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Parse the driver's `"x,y,w,h"` (or whitespace separated) rendering.
    pub fn parse(text: &str) -> Option<Self> {
        let parts: Vec<i32> = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .map(|p| p.trim().parse::<f64>().map(|v| v.round() as i32))
            .collect::<Result<_, _>>()
            .ok()?;
        match parts.as_slice() {
            [x, y, w, h] => Some(Self::new(*x, *y, *w, *h)),
            _ => None,
        }
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Height divided by width (0.0 for a zero-width rectangle).
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 {
            return 0.0;
        }
        self.height as f64 / self.width as f64
    }

    /// Taller than wide.
    pub fn is_vertical(&self) -> bool {
        self.height > self.width
    }

    /// Zero or negative area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a point lies inside the rectangle.
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    /// Check if two rectangles overlap.
    pub fn intersects(&self, other: &BoundingRectangle) -> bool {
        !(self.x + self.width <= other.x
            || other.x + other.width <= self.x
            || self.y + self.height <= other.y
            || other.y + other.height <= self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comma_separated() {
        let rect = BoundingRectangle::parse("10,20,300,25").unwrap();
        assert_eq!(rect, BoundingRectangle::new(10, 20, 300, 25));
    }

    #[test]
    fn test_parse_rounds_fractional_pixels() {
        let rect = BoundingRectangle::parse("10.4 20.6 99.5 25").unwrap();
        assert_eq!(rect, BoundingRectangle::new(10, 21, 100, 25));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(BoundingRectangle::parse("").is_none());
        assert!(BoundingRectangle::parse("1,2,3").is_none());
        assert!(BoundingRectangle::parse("a,b,c,d").is_none());
    }

    #[test]
    fn test_vertical_scrollbar_shape() {
        let vertical = BoundingRectangle::new(480, 0, 17, 400);
        let horizontal = BoundingRectangle::new(0, 383, 480, 17);
        assert!(vertical.is_vertical());
        assert!(!horizontal.is_vertical());
        assert!(vertical.aspect_ratio() > 1.0);
        assert!(horizontal.aspect_ratio() < 1.0);
    }

    #[test]
    fn test_contains_and_intersects() {
        let a = BoundingRectangle::new(0, 0, 100, 20);
        let b = BoundingRectangle::new(50, 10, 100, 20);
        let c = BoundingRectangle::new(0, 40, 10, 10);

        assert!(a.contains(&Point::new(0, 0)));
        assert!(!a.contains(&Point::new(100, 0)));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.center(), Point::new(50, 10));
    }
}

//! Viewport-coordinate geometry.

use serde::{Deserialize, Serialize};

/// Bounding box in viewport coordinates (logical pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// A zero-area box: the element is likely not visible or detached.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Current viewport dimensions (logical pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_and_right() {
        let b = BoundingBox::new(10.0, 20.0, 300.0, 40.0);
        assert_eq!(b.bottom(), 60.0);
        assert_eq!(b.right(), 310.0);
    }

    #[test]
    fn test_degenerate() {
        assert!(BoundingBox::new(0.0, 0.0, 0.0, 40.0).is_degenerate());
        assert!(BoundingBox::new(0.0, 0.0, 300.0, 0.0).is_degenerate());
        assert!(!BoundingBox::new(0.0, 0.0, 300.0, 40.0).is_degenerate());
    }
}

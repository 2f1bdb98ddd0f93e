//! Camera-space to screen-space mapping.
//!
//! The webcam feed renders mirrored, so x flips here. This is the one
//! place the mirror lives; everything downstream works in screen pixels.

use serde::{Deserialize, Serialize};

use super::hand::CamPoint;

/// A point in game screen pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub width: f64,
    pub height: f64,
}

impl Screen {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Map a normalized camera point onto the mirrored game screen.
    pub fn from_camera(&self, p: CamPoint) -> ScreenPoint {
        ScreenPoint {
            x: self.width - p.x * self.width,
            y: p.y * self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_horizontally() {
        let screen = Screen::new(1280.0, 720.0);
        let p = screen.from_camera(CamPoint { x: 0.0, y: 0.0 });
        assert_eq!((p.x, p.y), (1280.0, 0.0));
        let p = screen.from_camera(CamPoint { x: 1.0, y: 1.0 });
        assert_eq!((p.x, p.y), (0.0, 720.0));
        let p = screen.from_camera(CamPoint { x: 0.25, y: 0.5 });
        assert_eq!((p.x, p.y), (960.0, 360.0));
    }
}

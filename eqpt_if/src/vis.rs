//! # Visual Detection Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::cam::CamImage;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An axis-aligned detection rectangle in the pixel space of the frame it was
/// detected in. `(x, y)` is the top-left corner, `y` increasing downwards.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub struct Detection {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// An object detector operating on single camera images.
///
/// An empty vector means nothing was found, which is a normal outcome and not
/// an error. Detection requires `&mut self` as detector backends keep
/// internal scratch state.
pub trait Detector {
    /// Detect objects in the given image, returning their bounding
    /// rectangles in the image's own pixel space.
    fn detect(&mut self, image: &CamImage) -> Vec<Detection>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Detection {
    /// Get the centre of this rectangle, truncated to whole pixels.
    pub fn centre(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_centre_truncates() {
        let det = Detection {
            x: 10,
            y: 20,
            width: 5,
            height: 7,
        };

        // 5/2 and 7/2 truncate
        assert_eq!(det.centre(), (12, 23));

        let det = Detection {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
        assert_eq!(det.centre(), (0, 0));
    }
}

//! # Camera Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use image::DynamicImage;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An individual image acquired from a camera
#[derive(Clone)]
pub struct CamImage {
    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    /// The image itself
    pub image: DynamicImage,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors which can occur while acquiring a frame.
///
/// A failed acquisition is always surfaced as an error, never as an empty or
/// partial image.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Camera device error: {0}")]
    DeviceError(String),

    #[error("Could not decode the captured frame: {0}")]
    DecodeError(image::ImageError),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of camera frames.
///
/// Implemented by camera device wrappers and by synthetic sources used in
/// tests. Capturing requires `&mut self` since real devices dequeue buffers.
pub trait FrameSource {
    /// Return the (width, height) of frames produced by this source in
    /// pixels.
    fn resolution(&self) -> (u32, u32);

    /// Acquire a single frame from the source.
    fn capture_frame(&mut self) -> Result<CamImage, CaptureError>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CamImage {
    /// Get the (width, height) of this image in pixels.
    pub fn resolution(&self) -> (u32, u32) {
        use image::GenericImageView;

        self.image.dimensions()
    }
}

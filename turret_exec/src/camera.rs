//! # USB camera frame source
//!
//! Thin wrapper over a V4L2 USB camera which produces [`CamImage`]s for the targeting system.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::Utc;
use rscam::{Camera, Config};

// Internal
use crate::params::TurretExecParams;
use eqpt_if::cam::{CamImage, CaptureError, FrameSource};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A started V4L2 camera stream.
pub struct UsbCamera {
    camera: Camera,

    resolution_px: (u32, u32),
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CameraInitError {
    #[error("Could not open the video device {0}: {1}")]
    OpenError(String, std::io::Error),

    #[error("Could not start the camera stream: {0}")]
    StartError(rscam::Error),

    #[error("Could not capture the warm up frame: {0}")]
    WarmUpError(#[from] CaptureError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl UsbCamera {
    /// Open and start the camera described by the exec parameters.
    ///
    /// One warm up frame is captured and discarded so that the first real capture does not
    /// return a stale buffer.
    pub fn init(params: &TurretExecParams) -> Result<Self, CameraInitError> {
        let mut camera = Camera::new(&params.video_device)
            .map_err(|e| CameraInitError::OpenError(params.video_device.clone(), e))?;

        camera
            .start(&Config {
                interval: (
                    params.camera_frame_interval[0],
                    params.camera_frame_interval[1],
                ),
                resolution: (
                    params.camera_resolution_px[0],
                    params.camera_resolution_px[1],
                ),
                format: b"MJPG",
                ..Default::default()
            })
            .map_err(CameraInitError::StartError)?;

        let mut usb_camera = Self {
            camera,
            resolution_px: (
                params.camera_resolution_px[0],
                params.camera_resolution_px[1],
            ),
        };

        usb_camera.capture_frame()?;

        Ok(usb_camera)
    }
}

impl FrameSource for UsbCamera {
    fn resolution(&self) -> (u32, u32) {
        self.resolution_px
    }

    fn capture_frame(&mut self) -> Result<CamImage, CaptureError> {
        let raw_frame = self
            .camera
            .capture()
            .map_err(|e| CaptureError::DeviceError(e.to_string()))?;

        let timestamp = Utc::now();

        // Frames arrive MJPG encoded
        let image = image::load_from_memory_with_format(&raw_frame, image::ImageFormat::Jpeg)
            .map_err(CaptureError::DecodeError)?;

        Ok(CamImage { timestamp, image })
    }
}

//! # Face detector
//!
//! Wraps the SeetaFace frontal face detector behind the [`Detector`] trait. The detector works
//! on greyscale frames and reports one rectangle per face like region.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use rustface::ImageData;

// Internal
use crate::params::TurretExecParams;
use eqpt_if::cam::CamImage;
use eqpt_if::vis::{Detection, Detector};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A configured face detector.
pub struct FaceDetector {
    detector: Box<dyn rustface::Detector>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DetectorInitError {
    #[error("Could not open the detector model file {0}: {1}")]
    ModelFileError(String, std::io::Error),

    #[error("Could not read the detector model: {0}")]
    ModelReadError(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FaceDetector {
    /// Load the detection model and configure the detector from the exec parameters.
    pub fn init(params: &TurretExecParams) -> Result<Self, DetectorInitError> {
        let file = std::fs::File::open(&params.detector_model_path).map_err(|e| {
            DetectorInitError::ModelFileError(params.detector_model_path.clone(), e)
        })?;

        let model = rustface::read_model(std::io::BufReader::new(file))
            .map_err(|e| DetectorInitError::ModelReadError(e.to_string()))?;

        let mut detector = rustface::create_detector_with_model(model);

        detector.set_min_face_size(params.detector_min_face_size_px);
        detector.set_score_thresh(params.detector_score_thresh);
        detector.set_pyramid_scale_factor(params.detector_pyramid_scale_factor);
        detector.set_slide_window_step(
            params.detector_slide_window_step_px[0],
            params.detector_slide_window_step_px[1],
        );

        Ok(Self { detector })
    }
}

impl Detector for FaceDetector {
    fn detect(&mut self, image: &CamImage) -> Vec<Detection> {
        let gray = image.image.to_luma8();
        let (width, height) = gray.dimensions();

        let mut image_data = ImageData::new(&gray, width, height);

        self.detector
            .detect(&mut image_data)
            .iter()
            .map(|face| {
                let bbox = face.bbox();

                Detection {
                    // Faces partially out of frame have negative corner coordinates, clip them
                    // to the frame edge
                    x: bbox.x().max(0) as u32,
                    y: bbox.y().max(0) as u32,
                    width: bbox.width(),
                    height: bbox.height(),
                }
            })
            .collect()
    }
}

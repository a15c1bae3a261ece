pub mod annotate;
pub mod contours;
pub mod lines;
pub mod objects;
pub mod preprocessing;
pub mod steps;

use crate::error::{BlueprintError, Result};
use crate::pipeline::Detector;
use image::{DynamicImage, ImageReader};
use objects::ModelArtifacts;
use std::path::Path;
use std::sync::Arc;
use steps::{LinePass, ObjectPass, ShapePass};

/// Contour pass parameters
#[derive(Debug, Clone)]
pub struct ShapeParams {
    pub blur_sigma: f32,
    /// Neighbourhood size of the adaptive threshold (odd)
    pub block_size: u32,
    pub threshold_offset: i16,
    /// Square closing kernel of side `2 * close_radius + 1`
    pub close_radius: u8,
    /// Polygon tolerance as a fraction of the contour perimeter
    pub epsilon_ratio: f64,
    pub min_vertices: usize,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            blur_sigma: preprocessing::sigma_for_kernel(5),
            block_size: 11,
            threshold_offset: 2,
            close_radius: 2,
            epsilon_ratio: 0.02,
            min_vertices: 4,
        }
    }
}

/// Line pass parameters
#[derive(Debug, Clone)]
pub struct LineParams {
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    pub vote_threshold: u32,
    pub suppression_radius: u32,
    pub min_line_length: f32,
    pub max_line_gap: u32,
}

impl Default for LineParams {
    fn default() -> Self {
        Self {
            blur_sigma: preprocessing::sigma_for_kernel(5),
            canny_low: 50.0,
            canny_high: 150.0,
            vote_threshold: 100,
            suppression_radius: 8,
            min_line_length: 30.0,
            max_line_gap: 10,
        }
    }
}

impl LineParams {
    pub fn segment_options(&self) -> lines::SegmentOptions {
        lines::SegmentOptions {
            vote_threshold: self.vote_threshold,
            suppression_radius: self.suppression_radius,
            min_line_length: self.min_line_length,
            max_line_gap: self.max_line_gap,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub shapes: ShapeParams,
    pub lines: LineParams,
    pub object_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            shapes: ShapeParams::default(),
            lines: LineParams::default(),
            object_confidence: 0.3,
        }
    }
}

/// Load the source image; a missing file is reported before decoding
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(BlueprintError::not_found("source image", path));
    }
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

/// Build the standard three-pass detector.
///
/// The object pass is included only when model artifacts are given; they are
/// loaded here so a missing artifact fails before any image is processed.
pub fn build_standard_detector(config: &DetectorConfig, artifacts: Option<&ModelArtifacts>) -> Result<Detector> {
    let mut detector = Detector::new()
        .add_pass(Arc::new(ShapePass {
            params: config.shapes.clone(),
        }))
        .add_pass(Arc::new(LinePass {
            params: config.lines.clone(),
        }));

    if let Some(artifacts) = artifacts {
        detector = detector.add_pass(Arc::new(ObjectPass::load(artifacts, config.object_confidence)?));
    }

    Ok(detector)
}

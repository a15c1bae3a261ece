use crate::detection::objects::{self, InferenceBackend, ModelArtifacts, ModelConfig, RtenBackend};
use crate::detection::{contours, lines, preprocessing, LineParams, ShapeParams};
use crate::error::Result;
use crate::models::DetectionRecord;
use crate::pipeline::{DetectionPass, PassContext};
use image::{DynamicImage, GenericImageView};
use tracing::debug;

/// Closed contours approximated to polygons with at least `min_vertices` corners
pub struct ShapePass {
    pub params: ShapeParams,
}

impl DetectionPass for ShapePass {
    fn detect(&self, image: &DynamicImage, context: &PassContext) -> Result<Vec<DetectionRecord>> {
        let p = &self.params;
        let gray = preprocessing::to_grayscale(image);
        let blurred = preprocessing::apply_blur(&gray, p.blur_sigma);
        let thresh = preprocessing::adaptive_threshold_inv(&blurred, p.block_size, p.threshold_offset);
        let closed = preprocessing::close_gaps(&thresh, p.close_radius);

        context.save_debug_image("01_grayscale", &DynamicImage::ImageLuma8(gray))?;
        context.save_debug_image("02_blurred", &DynamicImage::ImageLuma8(blurred))?;
        context.save_debug_image("03_threshold", &DynamicImage::ImageLuma8(thresh))?;

        let polygons = contours::find_polygons(&closed, p.epsilon_ratio);
        context.save_debug_image("04_closed", &DynamicImage::ImageLuma8(closed))?;

        let total = polygons.len();
        let records: Vec<DetectionRecord> = polygons
            .iter()
            .filter(|poly| poly.vertex_count() >= p.min_vertices)
            .filter_map(|poly| poly.bounding_rect())
            .map(DetectionRecord::shape)
            .collect();

        debug!("Accepted {} of {} contours", records.len(), total);
        Ok(records)
    }

    fn name(&self) -> &str {
        "Shape Detection"
    }
}

/// Straight segments found by Canny edges and Hough voting
pub struct LinePass {
    pub params: LineParams,
}

impl DetectionPass for LinePass {
    fn detect(&self, image: &DynamicImage, context: &PassContext) -> Result<Vec<DetectionRecord>> {
        let p = &self.params;
        let gray = preprocessing::to_grayscale(image);
        let blurred = preprocessing::apply_blur(&gray, p.blur_sigma);
        let edges = preprocessing::detect_edges(&blurred, p.canny_low, p.canny_high);

        let segments = lines::find_segments(&edges, &p.segment_options());
        context.save_debug_image("01_edges", &DynamicImage::ImageLuma8(edges))?;

        Ok(segments.into_iter().map(DetectionRecord::line).collect())
    }

    fn name(&self) -> &str {
        "Line Detection"
    }
}

/// Pretrained object detector
pub struct ObjectPass {
    backend: Box<dyn InferenceBackend>,
    labels: Vec<String>,
    config: ModelConfig,
    pub confidence_threshold: f32,
}

impl ObjectPass {
    /// Load weights, config and labels; every artifact must exist
    pub fn load(artifacts: &ModelArtifacts, confidence_threshold: f32) -> Result<Self> {
        artifacts.ensure_present()?;
        let config = ModelConfig::load(&artifacts.config)?;
        let labels = objects::load_labels(&artifacts.labels)?;
        let backend = RtenBackend::load(&artifacts.weights)?;

        debug!("Loaded {} class labels", labels.len());
        Ok(Self::with_backend(Box::new(backend), labels, config, confidence_threshold))
    }

    pub fn with_backend(
        backend: Box<dyn InferenceBackend>,
        labels: Vec<String>,
        config: ModelConfig,
        confidence_threshold: f32,
    ) -> Self {
        Self {
            backend,
            labels,
            config,
            confidence_threshold,
        }
    }
}

impl DetectionPass for ObjectPass {
    fn detect(&self, image: &DynamicImage, _context: &PassContext) -> Result<Vec<DetectionRecord>> {
        let input = objects::image_to_tensor(image, &self.config);
        let outputs = self.backend.forward(input)?;
        debug!("Model returned {} output layers", outputs.len());

        objects::decode_predictions(
            &outputs,
            &self.labels,
            self.config.class_offset,
            image.dimensions(),
            self.confidence_threshold,
        )
    }

    fn name(&self) -> &str {
        "Object Detection"
    }
}

use crate::error::{BlueprintError, Result};
use crate::models::{DetectionRecord, RectangleBox};
use image::DynamicImage;
use image::imageops::FilterType;
use rten::Model;
use rten_tensor::prelude::*;
use rten_tensor::{NdTensor, Tensor};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Files of a pretrained detector
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub weights: PathBuf,
    pub config: PathBuf,
    pub labels: PathBuf,
}

impl ModelArtifacts {
    pub fn new(weights: impl Into<PathBuf>, config: impl Into<PathBuf>, labels: impl Into<PathBuf>) -> Self {
        Self {
            weights: weights.into(),
            config: config.into(),
            labels: labels.into(),
        }
    }

    /// Fail on the first artifact that does not exist
    pub fn ensure_present(&self) -> Result<()> {
        for (what, path) in [
            ("model weights", &self.weights),
            ("model config", &self.config),
            ("class labels", &self.labels),
        ] {
            if !path.exists() {
                return Err(BlueprintError::not_found(what, path));
            }
        }
        Ok(())
    }
}

/// Input geometry and output layout of the detector network
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub input_width: u32,
    pub input_height: u32,
    /// Feed channels in BGR order instead of RGB
    pub bgr_input: bool,
    /// Index of the first class score in each prediction row
    pub class_offset: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            input_width: 416,
            input_height: 416,
            bgr_input: false,
            class_offset: 5,
        }
    }
}

impl ModelConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ModelConfig = serde_json::from_str(&text).map_err(|e| {
            BlueprintError::MalformedInput(format!("model config {}: {}", path.display(), e))
        })?;
        if config.input_width == 0 || config.input_height == 0 {
            return Err(BlueprintError::MalformedInput(format!(
                "model config {}: input size must be non-zero",
                path.display()
            )));
        }
        Ok(config)
    }
}

/// One class name per line; surrounding whitespace and blank lines are dropped
pub fn parse_labels(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn load_labels(path: &Path) -> Result<Vec<String>> {
    let labels = parse_labels(&std::fs::read_to_string(path)?);
    if labels.is_empty() {
        warn!("Label file {} contains no class names", path.display());
    }
    Ok(labels)
}

/// One output layer flattened into fixed-length prediction rows
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub row_len: usize,
    pub data: Vec<f32>,
}

impl RawOutput {
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.row_len.max(1))
    }
}

/// Forward inference over a `[1, 3, H, W]` tensor
pub trait InferenceBackend: Send + Sync {
    fn forward(&self, input: NdTensor<f32, 4>) -> Result<Vec<RawOutput>>;
}

/// Runs an `.rten` model
pub struct RtenBackend {
    model: Model,
}

impl RtenBackend {
    pub fn load(path: &Path) -> Result<Self> {
        let model = Model::load_file(path)
            .map_err(|e| BlueprintError::Model(format!("Failed to load {}: {}", path.display(), e)))?;
        info!("Detector model loaded from {}", path.display());
        Ok(Self { model })
    }
}

impl InferenceBackend for RtenBackend {
    fn forward(&self, input: NdTensor<f32, 4>) -> Result<Vec<RawOutput>> {
        let input_id = *self
            .model
            .input_ids()
            .first()
            .ok_or_else(|| BlueprintError::Model("model has no inputs".to_string()))?;
        let output_ids = self.model.output_ids();

        let outputs = self
            .model
            .run(vec![(input_id, input.view().into())], output_ids, None)
            .map_err(|e| BlueprintError::Model(format!("Inference failed: {}", e)))?;

        let mut raw = Vec::with_capacity(outputs.len());
        for output in outputs {
            let tensor: Tensor<f32> = output
                .try_into()
                .map_err(|e| BlueprintError::Model(format!("Unexpected output type: {:?}", e)))?;
            let row_len = tensor.shape().last().copied().unwrap_or(0);
            debug!("Output shape: {:?}", tensor.shape());
            raw.push(RawOutput {
                row_len,
                data: tensor.to_vec(),
            });
        }
        Ok(raw)
    }
}

/// Resize, scale to [0, 1] and lay out as NCHW
pub fn image_to_tensor(img: &DynamicImage, config: &ModelConfig) -> NdTensor<f32, 4> {
    let (w, h) = (config.input_width, config.input_height);
    let resized = image::imageops::resize(&img.to_rgb8(), w, h, FilterType::Triangle);
    let plane = (w * h) as usize;
    let mut data = vec![0.0f32; 3 * plane];

    for (x, y, pixel) in resized.enumerate_pixels() {
        let offset = (y * w + x) as usize;
        for c in 0..3 {
            let channel = if config.bgr_input { 2 - c } else { c };
            data[c * plane + offset] = pixel[channel] as f32 / 255.0;
        }
    }

    NdTensor::from_data([1, 3, h as usize, w as usize], data)
}

/// Turn raw prediction rows into object records.
///
/// Each row is `[cx, cy, w, h, objectness, class scores...]` in coordinates
/// normalized to the source image. The best class score must exceed
/// `threshold`; no suppression of overlapping boxes is applied.
pub fn decode_predictions(
    outputs: &[RawOutput],
    labels: &[String],
    class_offset: usize,
    image_size: (u32, u32),
    threshold: f32,
) -> Result<Vec<DetectionRecord>> {
    let (width, height) = (image_size.0 as f32, image_size.1 as f32);
    let mut records = Vec::new();

    for output in outputs {
        if output.row_len <= class_offset {
            debug!("Skipping output with row length {}", output.row_len);
            continue;
        }

        for row in output.rows() {
            let scores = &row[class_offset..];
            let (class_id, confidence) = scores
                .iter()
                .copied()
                .enumerate()
                .fold((0usize, f32::NEG_INFINITY), |best, (i, s)| if s > best.1 { (i, s) } else { best });

            if !(confidence > threshold) {
                continue;
            }

            let label = labels.get(class_id).ok_or_else(|| {
                BlueprintError::Model(format!(
                    "class index {} outside label list of {} names",
                    class_id,
                    labels.len()
                ))
            })?;

            let center_x = (row[0] * width) as i32;
            let center_y = (row[1] * height) as i32;
            let w = (row[2] * width) as i32;
            let h = (row[3] * height) as i32;
            let x = (center_x as f32 - w as f32 / 2.0) as i32;
            let y = (center_y as f32 - h as f32 / 2.0) as i32;

            records.push(DetectionRecord::object(
                label.clone(),
                RectangleBox::new(x, y, w, h),
                confidence.min(1.0),
            ));
        }
    }

    Ok(records)
}

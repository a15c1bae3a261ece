use crate::error::{BlueprintError, Result};
use crate::models::DetectionRecord;
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Debug configuration for detector execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context handed to a pass while it runs
#[derive(Clone, Debug, Default)]
pub struct PassContext {
    /// Directory for this pass's intermediate images, when debug mode is on
    pub debug_dir: Option<PathBuf>,
}

impl PassContext {
    /// Save an intermediate image as `<stage>.png` in this pass's debug directory
    pub fn save_debug_image(&self, stage: &str, image: &DynamicImage) -> Result<()> {
        if let Some(dir) = &self.debug_dir {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(format!("{}.png", stage));
            image.save(&path)?;
            debug!("Debug: saved {}", path.display());
        }
        Ok(())
    }
}

/// One independent detection strategy. Passes never see each other's output.
pub trait DetectionPass: Send + Sync {
    fn detect(&self, image: &DynamicImage, context: &PassContext) -> Result<Vec<DetectionRecord>>;

    /// Human-readable name for this pass (used in logs and debug directories)
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassCount {
    pub name: String,
    pub count: usize,
}

/// Records of every pass, concatenated in pass order
#[derive(Debug, Clone, Default)]
pub struct DetectionOutput {
    pub records: Vec<DetectionRecord>,
    pub pass_counts: Vec<PassCount>,
}

impl DetectionOutput {
    pub fn count_for(&self, pass_name: &str) -> Option<usize> {
        self.pass_counts
            .iter()
            .find(|p| p.name == pass_name)
            .map(|p| p.count)
    }
}

/// Composable detector: an ordered list of passes whose results are unioned
pub struct Detector {
    passes: Vec<Arc<dyn DetectionPass>>,
    debug: Option<DebugConfig>,
}

impl Detector {
    /// Create a detector with no passes
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            debug: None,
        }
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(BlueprintError::DebugDirNotEmpty(output_dir));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.debug = Some(DebugConfig { output_dir });

        Ok(self)
    }

    pub fn add_pass(mut self, pass: Arc<dyn DetectionPass>) -> Self {
        self.passes.push(pass);
        self
    }

    /// Helper method to add a pass from a Box (for convenience)
    pub fn add_pass_boxed(mut self, pass: Box<dyn DetectionPass>) -> Self {
        self.passes.push(Arc::from(pass));
        self
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    fn debug_dir(&self, index: Option<usize>, name: &str) -> Option<PathBuf> {
        let config = self.debug.as_ref()?;
        let dir_name = match index {
            Some(idx) => format!("{:02}_{}", idx + 1, name.to_lowercase().replace(' ', "_")),
            None => "00_input".to_string(),
        };
        Some(config.output_dir.join(dir_name))
    }

    /// Run every pass over the image and concatenate their records
    pub fn run(&self, image: &DynamicImage) -> Result<DetectionOutput> {
        if let Some(dir) = self.debug_dir(None, "input") {
            PassContext { debug_dir: Some(dir) }.save_debug_image("01", image)?;
        }

        let mut output = DetectionOutput::default();

        for (idx, pass) in self.passes.iter().enumerate() {
            let context = PassContext {
                debug_dir: self.debug_dir(Some(idx), pass.name()),
            };

            debug!("Running pass: {}", pass.name());
            let records = pass.detect(image, &context)?;
            info!("{}: {} records", pass.name(), records.len());

            output.pass_counts.push(PassCount {
                name: pass.name().to_string(),
                count: records.len(),
            });
            output.records.extend(records);
        }

        Ok(output)
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

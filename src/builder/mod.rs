pub mod obj;
pub mod scene;
pub mod wireframe;

use crate::error::Result;
use crate::intermediate;
use crate::models::{BoxGeometry, DetectionRecord};
use scene::{Scene, SceneObject};
use std::path::Path;
use tracing::{debug, info};
use wireframe::WireframeBox;

/// Height of every extruded box, in scene units
pub const DEFAULT_EXTRUSION_HEIGHT: f32 = 10.0;

#[derive(Debug, Clone)]
pub struct BuilderConfig {
    pub extrusion_height: f32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            extrusion_height: DEFAULT_EXTRUSION_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Mesh objects removed before building
    pub cleared: usize,
    pub created: usize,
    pub skipped_lines: usize,
}

/// Reconstructs wireframe boxes from detection records
pub struct Builder {
    pub config: BuilderConfig,
}

impl Builder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// Wireframe for one record; line records have none
    pub fn wireframe_for(&self, record: &DetectionRecord) -> Option<WireframeBox> {
        match &record.geometry {
            BoxGeometry::Segment(_) => None,
            BoxGeometry::Rectangle(rect) => Some(WireframeBox::from_rectangle(
                record.class.clone(),
                rect,
                self.config.extrusion_height,
            )),
        }
    }

    /// Clear the scene's meshes, then insert one box per non-line record
    pub fn build<S: Scene + ?Sized>(&self, records: &[DetectionRecord], scene: &mut S) -> BuildReport {
        let mut report = BuildReport {
            cleared: scene.clear_meshes(),
            ..Default::default()
        };
        debug!("Cleared {} mesh objects", report.cleared);

        for record in records {
            match self.wireframe_for(record) {
                Some(wireframe) => {
                    let name = scene.link(SceneObject::mesh(wireframe));
                    debug!("Linked {}", name);
                    report.created += 1;
                }
                None => report.skipped_lines += 1,
            }
        }

        info!(
            "Built {} boxes ({} line records skipped)",
            report.created, report.skipped_lines
        );
        report
    }

    /// Read the whole intermediate file before touching the scene
    pub fn build_from_file<S: Scene + ?Sized, P: AsRef<Path>>(&self, path: P, scene: &mut S) -> Result<BuildReport> {
        let records = intermediate::read_records(path)?;
        Ok(self.build(&records, scene))
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}

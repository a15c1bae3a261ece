pub mod builder;
pub mod detection;
pub mod error;
pub mod intermediate;
pub mod models;
pub mod pipeline;

pub use builder::scene::{MemoryScene, ObjectData, Scene, SceneObject};
pub use builder::wireframe::WireframeBox;
pub use builder::{BuildReport, Builder, BuilderConfig};
pub use detection::{build_standard_detector, DetectorConfig};
pub use error::{BlueprintError, Result};
pub use models::{BoxGeometry, DetectionRecord, RectangleBox, SegmentBox, LINE_CLASS, SHAPE_CLASS};
pub use pipeline::{DebugConfig, DetectionOutput, DetectionPass, Detector, PassContext, PassCount};

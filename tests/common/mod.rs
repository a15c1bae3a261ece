#![allow(dead_code, unused_imports)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from blueprint3d for tests
pub use blueprint3d::{
    BlueprintError, BoxGeometry, Builder, BuilderConfig, DetectionRecord, MemoryScene, RectangleBox,
    Scene, SegmentBox, LINE_CLASS, SHAPE_CLASS,
};

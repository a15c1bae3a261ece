mod common;

use blueprint3d::detection::objects::{InferenceBackend, ModelArtifacts, ModelConfig, RawOutput};
use blueprint3d::detection::steps::{LinePass, ObjectPass, ShapePass};
use blueprint3d::detection::{self, DetectorConfig, LineParams, ShapeParams};
use blueprint3d::{intermediate, DetectionPass, Detector, PassContext};
use common::*;
use image::DynamicImage;
use rten_tensor::prelude::*;
use rten_tensor::NdTensor;
use std::sync::Arc;

fn shape_pass() -> ShapePass {
    ShapePass {
        params: ShapeParams::default(),
    }
}

fn line_pass() -> LinePass {
    LinePass {
        params: LineParams::default(),
    }
}

/// Returns the same prediction rows for every image
struct FixedBackend {
    rows: Vec<Vec<f32>>,
}

impl InferenceBackend for FixedBackend {
    fn forward(&self, input: NdTensor<f32, 4>) -> blueprint3d::Result<Vec<RawOutput>> {
        assert_eq!(input.shape(), [1, 3, 416, 416]);
        let row_len = self.rows.first().map_or(0, |r| r.len());
        Ok(vec![RawOutput {
            row_len,
            data: self.rows.concat(),
        }])
    }
}

fn object_pass(rows: Vec<Vec<f32>>) -> ObjectPass {
    ObjectPass::with_backend(
        Box::new(FixedBackend { rows }),
        vec!["door".to_string(), "window".to_string()],
        ModelConfig::default(),
        0.3,
    )
}

#[test]
fn test_blank_image_has_no_shapes_or_lines() -> anyhow::Result<()> {
    let img = blank_image(160, 120);
    let ctx = PassContext::default();

    assert!(shape_pass().detect(&img, &ctx)?.is_empty());
    assert!(line_pass().detect(&img, &ctx)?.is_empty());
    Ok(())
}

#[test]
fn test_rectangle_outline_is_a_shape() -> anyhow::Result<()> {
    let img = rectangle_image(40, 50, 100, 80);
    let records = shape_pass().detect(&img, &PassContext::default())?;

    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r.class == SHAPE_CLASS && r.confidence.is_none()));

    let outer = records.iter().filter_map(|r| r.rectangle()).find(|b| {
        (b.x - 40).abs() <= 4 && (b.y - 50).abs() <= 4 && (b.width - 100).abs() <= 8 && (b.height - 80).abs() <= 8
    });
    assert!(outer.is_some(), "no shape matched the drawn outline: {:?}", records);
    Ok(())
}

#[test]
fn test_horizontal_stroke_is_a_line() -> anyhow::Result<()> {
    let img = horizontal_line_image(20, 100, 160);
    let records = line_pass().detect(&img, &PassContext::default())?;

    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r.is_line()));

    let long_flat = records
        .iter()
        .filter_map(|r| r.segment())
        .any(|s| s.dx.abs() >= 100 && s.dy.abs() <= 3 && (s.y1 - 100).abs() <= 4);
    assert!(long_flat, "no horizontal segment found: {:?}", records);
    Ok(())
}

#[test]
fn test_object_pass_decodes_in_source_pixels() -> anyhow::Result<()> {
    let img = blank_image(100, 200);
    let pass = object_pass(vec![
        vec![0.5, 0.5, 0.2, 0.4, 0.9, 0.1, 0.8],
        vec![0.5, 0.5, 0.2, 0.4, 0.9, 0.1, 0.2],
        vec![0.5, 0.5, 0.2, 0.4, 0.9, 0.1, 0.8],
    ]);
    let records = pass.detect(&img, &PassContext::default())?;

    // Overlapping duplicates are kept
    assert_eq!(records.len(), 2);
    for r in &records {
        assert_eq!(r.class, "window");
        assert_eq!(r.confidence, Some(0.8));
        assert_eq!(r.rectangle(), Some(&RectangleBox::new(40, 60, 20, 80)));
    }
    Ok(())
}

#[test]
fn test_output_is_concatenated_in_pass_order() -> anyhow::Result<()> {
    let detector = Detector::new()
        .add_pass(Arc::new(shape_pass()))
        .add_pass(Arc::new(line_pass()))
        .add_pass_boxed(Box::new(object_pass(vec![vec![0.5, 0.5, 0.1, 0.1, 1.0, 0.9, 0.0]])));

    let img = plan_image();
    let output = detector.run(&img)?;

    let total: usize = output.pass_counts.iter().map(|p| p.count).sum();
    assert_eq!(output.records.len(), total);
    assert_eq!(detector.pass_names(), vec!["Shape Detection", "Line Detection", "Object Detection"]);

    let shapes = output.count_for("Shape Detection").unwrap();
    let lines = output.count_for("Line Detection").unwrap();
    assert!(shapes >= 1, "no shapes found: {:?}", output.pass_counts);
    assert!(lines >= 2, "expected both strokes as lines: {:?}", output.pass_counts);
    assert_eq!(output.count_for("Object Detection"), Some(1));

    assert!(output.records[..shapes].iter().all(|r| r.class == SHAPE_CLASS));
    let line_records = &output.records[shapes..shapes + lines];
    assert!(line_records.iter().all(|r| r.is_line()));
    assert!(line_records.iter().filter_map(|r| r.segment()).any(|s| s.dx >= 200 && s.dy.abs() <= 3));
    assert!(line_records.iter().filter_map(|r| r.segment()).any(|s| s.dy.abs() >= 150 && s.dx.abs() <= 3));
    assert_eq!(output.records.last().map(|r| r.class.as_str()), Some("door"));
    Ok(())
}

#[test]
fn test_vertical_stroke_is_a_line() -> anyhow::Result<()> {
    let records = line_pass().detect(&plan_image(), &PassContext::default())?;

    let upright = records
        .iter()
        .filter_map(|r| r.segment())
        .any(|s| s.dy >= 150 && s.dx.abs() <= 3 && (s.x1 - 250).abs() <= 4);
    assert!(upright, "no vertical segment found: {:?}", records);
    Ok(())
}

#[test]
fn test_standard_detector_without_objects() -> anyhow::Result<()> {
    let detector = detection::build_standard_detector(&DetectorConfig::default(), None)?;
    assert_eq!(detector.pass_names(), vec!["Shape Detection", "Line Detection"]);

    let output = detector.run(&blank_image(64, 64))?;
    assert!(output.records.is_empty());
    assert_eq!(intermediate::to_json(&output.records)?, "[]");
    Ok(())
}

#[test]
fn test_missing_artifacts_fail_before_running() {
    let dir = tempfile::TempDir::new().unwrap();
    let labels = temp_file_with("door\nwindow\n", ".names");
    let config = temp_file_with("{}", ".json");

    let artifacts = ModelArtifacts::new(dir.path().join("missing.rten"), config.path(), labels.path());
    match detection::build_standard_detector(&DetectorConfig::default(), Some(&artifacts)) {
        Err(BlueprintError::ResourceNotFound { what, .. }) => assert_eq!(what, "model weights"),
        Err(other) => panic!("Expected ResourceNotFound, got {:?}", other),
        Ok(_) => panic!("Expected ResourceNotFound, got a detector"),
    }

    let artifacts = ModelArtifacts::new(config.path(), config.path(), dir.path().join("coco.names"));
    assert!(matches!(
        artifacts.ensure_present(),
        Err(BlueprintError::ResourceNotFound { what: "class labels", .. })
    ));
}

#[test]
fn test_missing_image_is_resource_not_found() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = detection::load_image(dir.path().join("0001.jpg")).unwrap_err();
    assert!(matches!(err, BlueprintError::ResourceNotFound { what: "source image", .. }));
}

#[test]
fn test_corrupt_image_fails() {
    let file = temp_file_with("definitely not a png", ".png");
    assert!(detection::load_image(file.path()).is_err());
}

#[test]
fn test_load_image_from_disk() -> anyhow::Result<()> {
    let file = save_temp_image(&blank_image(30, 20));
    let img: DynamicImage = detection::load_image(file.path())?;
    assert_eq!((img.width(), img.height()), (30, 20));
    Ok(())
}

#[test]
fn test_debug_mode_writes_stage_images() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("debug");
    let detector = Detector::new()
        .add_pass(Arc::new(shape_pass()))
        .add_pass(Arc::new(line_pass()))
        .with_debug(debug_dir.clone())?;

    detector.run(&blank_image(32, 32))?;

    assert!(debug_dir.join("00_input/01.png").exists());
    assert!(debug_dir.join("01_shape_detection/03_threshold.png").exists());
    assert!(debug_dir.join("02_line_detection/01_edges.png").exists());
    Ok(())
}

#[test]
fn test_debug_dir_must_be_empty() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("leftover.txt"), "x").unwrap();
    match Detector::new().with_debug(dir.path().to_path_buf()) {
        Err(BlueprintError::DebugDirNotEmpty(path)) => assert_eq!(path, dir.path()),
        Err(other) => panic!("Expected DebugDirNotEmpty, got {:?}", other),
        Ok(_) => panic!("Expected DebugDirNotEmpty, got a detector"),
    }
}

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blueprint3d::builder::obj;
use blueprint3d::detection::annotate::Annotator;
use blueprint3d::detection::objects::ModelArtifacts;
use blueprint3d::detection::{self, DetectorConfig};
use blueprint3d::{intermediate, Builder, BuilderConfig, MemoryScene, Scene};

#[derive(Parser)]
#[command(name = "blueprint3d")]
#[command(about = "Detect shapes, lines and objects in blueprint images and rebuild them as 3D wireframes")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the detection passes over an image and write the detections file
    Detect(DetectArgs),

    /// Build wireframe boxes from a detections file
    Build(BuildArgs),
}

#[derive(Args)]
struct DetectArgs {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Detections file to write (overwritten)
    #[arg(short, long, default_value = "detected_objects.json")]
    output: PathBuf,

    /// Object detector weights (.rten)
    #[arg(long, default_value = "yolov3.rten")]
    weights: PathBuf,

    /// Object detector config (JSON)
    #[arg(long, default_value = "yolov3.json")]
    model_config: PathBuf,

    /// Class label list, one name per line
    #[arg(long, default_value = "coco.names")]
    labels: PathBuf,

    /// Skip the object detector (shape and line passes only)
    #[arg(long)]
    skip_objects: bool,

    /// Minimum class score for object detections
    #[arg(long, default_value_t = 0.3)]
    confidence: f32,

    /// Hough vote threshold for line detection
    #[arg(long, default_value_t = 100)]
    hough_threshold: u32,

    /// Minimum line segment length in pixels
    #[arg(long, default_value_t = 30.0)]
    min_line_length: f32,

    /// Maximum gap bridged inside a line segment, in pixels
    #[arg(long, default_value_t = 10)]
    max_line_gap: u32,

    /// Save the annotated image to this path
    #[arg(long, value_name = "PNG")]
    annotated: Option<PathBuf>,

    /// Font used to label object boxes in the annotated image
    #[arg(long, value_name = "TTF")]
    font: Option<PathBuf>,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

#[derive(Args)]
struct BuildArgs {
    /// Detections file to read
    #[arg(short, long, default_value = "detected_objects.json")]
    input: PathBuf,

    /// Wavefront OBJ file receiving the wireframes
    #[arg(short, long, default_value = "scene.obj")]
    output: PathBuf,

    /// Extrusion height of every box
    #[arg(long, default_value_t = blueprint3d::builder::DEFAULT_EXTRUSION_HEIGHT)]
    height: f32,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_detect(args: DetectArgs) -> anyhow::Result<()> {
    let mut config = DetectorConfig::default();
    config.object_confidence = args.confidence;
    config.lines.vote_threshold = args.hough_threshold;
    config.lines.min_line_length = args.min_line_length;
    config.lines.max_line_gap = args.max_line_gap;

    let artifacts = (!args.skip_objects).then(|| ModelArtifacts::new(&args.weights, &args.model_config, &args.labels));

    // Load everything fallible before any output is written
    let annotator = match &args.font {
        Some(font) => Annotator::new().with_font_file(font)?,
        None => Annotator::new(),
    };

    info!("Loading image: {}", args.image_path.display());
    let img = detection::load_image(&args.image_path)
        .with_context(|| format!("Failed to load image {}", args.image_path.display()))?;
    info!("Image loaded: {}x{}", img.width(), img.height());

    let mut detector = detection::build_standard_detector(&config, artifacts.as_ref())
        .context("Failed to set up detector")?;
    if let Some(dir) = args.debug_out {
        detector = detector.with_debug(dir)?;
    }

    let output = detector.run(&img)?;

    intermediate::write_records(&args.output, &output.records)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    if let Some(path) = &args.annotated {
        annotator
            .render(&img, &output.records)
            .save(path)
            .with_context(|| format!("Failed to save annotated image {}", path.display()))?;
    }

    println!("\n=== Results ===");
    for pass in &output.pass_counts {
        println!("  {}: {}", pass.name, pass.count);
    }
    println!("Total detections: {}", output.records.len());
    println!("Written to {}", args.output.display());

    Ok(())
}

fn run_build(args: BuildArgs) -> anyhow::Result<()> {
    let builder = Builder::new(BuilderConfig {
        extrusion_height: args.height,
    });

    let mut scene = MemoryScene::new();
    let report = builder
        .build_from_file(&args.input, &mut scene)
        .with_context(|| format!("Failed to build from {}", args.input.display()))?;

    obj::save_obj(&scene, &args.output).with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("\n=== Results ===");
    println!("Boxes created: {}", report.created);
    println!("Line records skipped: {}", report.skipped_lines);
    println!("Scene meshes: {}", scene.mesh_count());
    println!("Written to {}", args.output.display());

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Detect(args) => run_detect(args),
        Commands::Build(args) => run_build(args),
    }
}

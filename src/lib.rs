//! Emojicut: cut emoji sticker sheets into individual transparent images.
//!
//! A sheet is a raster with many emoji drawn on one flat background.
//! Emojicut finds each emoji (classically, by connected components, or via a
//! vision model), lets a user refine the regions as rectangles or polygons
//! with undo/redo, and extracts every region as its own PNG with the
//! background removed.
//!
//! # Modules
//!
//! - [`geometry`]: points, boxes, polygons and the predicates over them
//! - [`pixel`]: RGBA buffers, background detection, encode/decode
//! - [`segment`]: classic detection and the region data model
//! - [`selection`]: user-editable regions with history
//! - [`extract`]: cropping, masking and thumbnails
//! - [`background`]: border-connected background removal
//! - [`ai`]: vision-model prompt, transport seam and response parsing
//! - [`pipeline`]: AI-first segmentation with classic fallback
//! - [`config`], [`validation`], [`error`]

pub mod ai;
pub mod background;
pub mod config;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod pipeline;
pub mod pixel;
pub mod segment;
pub mod selection;
pub mod validation;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use walkdir::WalkDir;

pub use error::EmojiCutError;

use config::EngineConfig;
use segment::io_json::{self, RegionDocument};
use segment::SegmentationMethod;
use validation::{ValidateOptions, ValidationReport};

/// The emojicut CLI application.
#[derive(Parser)]
#[command(name = "emojicut")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect emoji regions on a flat-background sheet.
    Detect(DetectArgs),
    /// Cut regions out as transparent PNGs.
    Extract(ExtractArgs),
    /// Remove the border-connected background from one image.
    RemoveBg(RemoveBgArgs),
    /// Parse a saved vision-model answer into a region document.
    ParseAi(ParseAiArgs),
    /// Validate a region document (.json) or a config file (.yaml).
    Validate(ValidateArgs),
}

/// Overrides for the classic splitter, applied on top of the config file.
#[derive(clap::Args)]
struct SplitArgs {
    /// YAML config file.
    #[arg(long, env = "EMOJICUT_CONFIG")]
    config: Option<PathBuf>,

    /// Background color tolerance (0-255).
    #[arg(long)]
    tolerance: Option<f64>,

    /// Minimum region area in px².
    #[arg(long)]
    min_area: Option<f64>,

    /// Minimum length of a region's shorter side in px.
    #[arg(long)]
    min_size: Option<f64>,

    /// Merge gap as a percentage (0-10) of the image's shorter side.
    #[arg(long)]
    merge_distance: Option<f64>,
}

#[derive(clap::Args)]
struct DetectArgs {
    /// Sheet image (PNG or JPEG).
    image: PathBuf,

    #[command(flatten)]
    split: SplitArgs,

    /// Write the region document here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ExtractArgs {
    /// A sheet image, or a directory of them.
    input: PathBuf,

    /// Directory for the cut PNGs (created if missing).
    #[arg(long)]
    out_dir: PathBuf,

    /// Use these regions instead of detecting them (single image only).
    #[arg(long)]
    regions: Option<PathBuf>,

    #[command(flatten)]
    split: SplitArgs,

    /// Extra pixels around each region.
    #[arg(long)]
    padding: Option<u32>,

    /// Keep the background instead of making it transparent.
    #[arg(long)]
    keep_background: bool,
}

#[derive(clap::Args)]
struct RemoveBgArgs {
    image: PathBuf,

    /// Output PNG path.
    #[arg(short, long)]
    output: PathBuf,

    #[arg(long, default_value_t = 30.0)]
    tolerance: f64,

    /// Skip the anti-aliasing feather pass.
    #[arg(long)]
    no_feather: bool,
}

#[derive(clap::Args)]
struct ParseAiArgs {
    /// Text file holding the raw model answer.
    response: PathBuf,

    /// Width of the image the answer refers to.
    #[arg(long)]
    width: u32,

    /// Height of the image the answer refers to.
    #[arg(long)]
    height: u32,

    /// Coordinates are percentages (0-100) rather than pixels.
    #[arg(long)]
    percent: bool,

    /// Write the region document here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// Region document (.json) or config (.yaml / .yml).
    input: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the emojicut CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), EmojiCutError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Detect(args)) => run_detect(args),
        Some(Commands::Extract(args)) => run_extract(args),
        Some(Commands::RemoveBg(args)) => run_remove_bg(args),
        Some(Commands::ParseAi(args)) => run_parse_ai(args),
        Some(Commands::Validate(args)) => run_validate(args),
        None => {
            println!("emojicut {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Cut emoji sticker sheets into transparent PNGs.");
            println!();
            println!("Run 'emojicut --help' for usage information.");
            Ok(())
        }
    }
}

/// Loads the config file (if any), applies flag overrides and refuses
/// invalid values.
fn load_config(split: &SplitArgs) -> Result<EngineConfig, EmojiCutError> {
    let mut config = match &split.config {
        Some(path) => EngineConfig::from_yaml_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(tolerance) = split.tolerance {
        config.split.tolerance = tolerance;
        config.extract.tolerance = tolerance;
    }
    if let Some(min_area) = split.min_area {
        config.split.min_area = min_area;
    }
    if let Some(min_size) = split.min_size {
        config.split.min_size = min_size;
    }
    if let Some(merge) = split.merge_distance {
        config.split.merge_distance_percent = merge;
    }

    let report = validation::validate_config(&config);
    if !report.is_ok() {
        eprint!("{}", report);
        return Err(validation_failed(report));
    }
    Ok(config)
}

fn validation_failed(report: ValidationReport) -> EmojiCutError {
    EmojiCutError::ValidationFailed {
        error_count: report.error_count(),
        warning_count: report.warning_count(),
        report,
    }
}

fn emit_document(document: &RegionDocument, output: Option<&Path>) -> Result<(), EmojiCutError> {
    match output {
        Some(path) => {
            io_json::write_regions_json(path, document)?;
            eprintln!(
                "Wrote {} region(s) to {}",
                document.regions.len(),
                path.display()
            );
        }
        None => {
            let json = io_json::to_regions_string(document).map_err(|source| {
                EmojiCutError::RegionsJsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn run_detect(args: DetectArgs) -> Result<(), EmojiCutError> {
    let config = load_config(&args.split)?;
    let pixels = pixel::codec::read_image(&args.image)?;
    let regions = segment::detect_emojis(&pixels, &config.split);
    if regions.is_empty() {
        eprintln!("No regions found; check that the background is uniform or adjust --tolerance");
    }
    let document = RegionDocument::new(pixels.width(), pixels.height(), regions)
        .with_method(SegmentationMethod::Fallback);
    emit_document(&document, args.output.as_deref())
}

fn is_sheet_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
        .unwrap_or(false)
}

fn run_extract(args: ExtractArgs) -> Result<(), EmojiCutError> {
    let mut config = load_config(&args.split)?;
    if let Some(padding) = args.padding {
        config.extract.padding = padding;
    }
    if args.keep_background {
        config.extract.remove_background = false;
    }

    let inputs: Vec<PathBuf> = if args.input.is_dir() {
        if args.regions.is_some() {
            return Err(EmojiCutError::UnsupportedFormat(
                "--regions applies to a single image, not a directory".to_string(),
            ));
        }
        WalkDir::new(&args.input)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_sheet_image(entry.path()))
            .map(|entry| entry.into_path())
            .collect()
    } else {
        vec![args.input.clone()]
    };

    let provided = match &args.regions {
        Some(path) => Some(io_json::read_regions_json(path)?),
        None => None,
    };

    fs::create_dir_all(&args.out_dir)?;
    let root = args.input.is_dir().then_some(args.input.as_path());
    let mut written = 0usize;
    let mut read = 0usize;
    let mut last_error = None;
    for input in &inputs {
        let pixels = match pixel::codec::read_image(input) {
            Ok(pixels) => pixels,
            Err(err) => {
                log::warn!("skipping {}: {}", input.display(), err);
                last_error = Some(err);
                continue;
            }
        };
        read += 1;

        let regions = match &provided {
            Some(document) => {
                let expected = (document.image.width, document.image.height);
                if expected != (pixels.width(), pixels.height()) {
                    log::warn!(
                        "region document is for {}x{} but {} is {}x{}",
                        expected.0,
                        expected.1,
                        input.display(),
                        pixels.width(),
                        pixels.height()
                    );
                }
                document.regions.clone()
            }
            None => segment::detect_emojis(&pixels, &config.split),
        };

        let target_dir = cutout_dir(&args.out_dir, input, root);
        fs::create_dir_all(&target_dir)?;
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("sheet");
        for emoji in extract::extract_segmentation_regions(&pixels, &regions, &config.extract) {
            let path = target_dir.join(format!("{}_{:03}.png", stem, emoji.id.as_u64()));
            fs::write(&path, &emoji.blob)?;
            written += 1;
        }
        log::info!("{}: {} region(s)", input.display(), regions.len());
    }

    if read == 0 {
        if let Some(err) = last_error {
            return Err(err);
        }
    }

    let skipped = inputs.len() - read;
    println!(
        "Extracted {} emoji from {} image(s) into {}",
        written,
        read,
        args.out_dir.display()
    );
    if skipped > 0 {
        eprintln!("Skipped {} unreadable image(s)", skipped);
    }
    Ok(())
}

/// Where the cutouts of `input` go: sheets found under a walked directory
/// keep their relative subdirectory so equal file names do not collide.
fn cutout_dir(out_dir: &Path, input: &Path, root: Option<&Path>) -> PathBuf {
    let relative = root
        .zip(input.parent())
        .and_then(|(root, parent)| parent.strip_prefix(root).ok());
    match relative {
        Some(relative) => out_dir.join(relative),
        None => out_dir.to_path_buf(),
    }
}

fn run_remove_bg(args: RemoveBgArgs) -> Result<(), EmojiCutError> {
    let pixels = pixel::codec::read_image(&args.image)?;
    let options = background::RemovalOptions {
        tolerance: args.tolerance,
        feather: !args.no_feather,
        ..background::RemovalOptions::default()
    };
    let cleaned = background::remove_background_simple(&pixels, &options)?;
    if !background::has_transparent_pixels(&cleaned) {
        eprintln!("No border-connected background found; image left opaque");
    }
    fs::write(&args.output, pixel::codec::encode_png(&cleaned)?)?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn run_parse_ai(args: ParseAiArgs) -> Result<(), EmojiCutError> {
    let text = fs::read_to_string(&args.response)?;
    let unit = if args.percent {
        ai::CoordinateUnit::Percent
    } else {
        ai::CoordinateUnit::Pixels
    };
    let regions = ai::parse_response_with(&text, args.width, args.height, unit)?;
    let document =
        RegionDocument::new(args.width, args.height, regions).with_method(SegmentationMethod::Ai);
    emit_document(&document, args.output.as_deref())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    error_count: usize,
    warning_count: usize,
    issues: &'a [validation::ValidationIssue],
}

fn run_validate(args: ValidateArgs) -> Result<(), EmojiCutError> {
    let is_yaml = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e, "yaml" | "yml"))
        .unwrap_or(false);

    let report = if is_yaml {
        validation::validate_config(&EngineConfig::from_yaml_file(&args.input)?)
    } else {
        let document = io_json::read_regions_json(&args.input)?;
        let opts = ValidateOptions {
            strict: args.strict,
        };
        validation::validate_regions(&document, &opts)
    };

    match args.output {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonReport {
                error_count: report.error_count(),
                warning_count: report.warning_count(),
                issues: &report.issues,
            })
            .map_err(|source| EmojiCutError::RegionsJsonWrite {
                path: PathBuf::from("<stdout>"),
                source,
            })?;
            println!("{}", json);
        }
        ReportFormat::Text => print!("{}", report),
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (args.strict && has_warnings) {
        Err(validation_failed(report))
    } else {
        Ok(())
    }
}

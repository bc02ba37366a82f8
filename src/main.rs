use clap::{Parser, Subcommand};
use imgcompress::batch::BatchItem;
use imgcompress::config::{self, AppConfig};
use imgcompress::error::ProcessingError;
use imgcompress::gateway::{DirectoryGateway, SaveGateway};
use imgcompress::imaging::{self, Codec, RustCodec, level_target};
use imgcompress::metadata::ImageMetadata;
use imgcompress::output::{self, CompressEvent, ImageInfo};
use imgcompress::pipeline::{OutputSettings, Pipeline};
use imgcompress::types::{
    CompressedImage, ConversionSummary, ImageFormat, ImageQuality, ImageSize,
};
use rayon::prelude::*;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "imgcompress")]
#[command(about = "Compress, resize and convert photos")]
#[command(long_about = "\
Compress, resize and convert photos

Quality tiers (strongest first): original, high, normal, low, minimum.
'original' keeps the source bytes when the size is unchanged.

Size levels for --level: 0 = original, 1 = 75%, 2 = 50%, 3 = 25%.

HEIC inputs are converted to JPEG or PNG with 'imgcompress convert'.
Settings are read from ./imgcompress.toml (or --config PATH).
Run 'imgcompress gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./imgcompress.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory (overrides output.directory)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Re-encode images at a quality tier and optional new size
    Compress(CompressArgs),
    /// Convert HEIC images to JPEG or PNG
    Convert(ConvertArgs),
    /// Remove EXIF, GPS and IPTC metadata without re-encoding
    Strip {
        input: PathBuf,
        /// Write here instead of the output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show container type, HEIC detection and pixel size
    Info {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock imgcompress.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct CompressArgs {
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Quality tier (default: output.quality)
    #[arg(long)]
    quality: Option<ImageQuality>,
    /// Size level 0-3
    #[arg(long, conflicts_with_all = ["width", "height"])]
    level: Option<i32>,
    /// Exact target width (aspect ratio is not preserved)
    #[arg(long, requires = "height")]
    width: Option<f64>,
    /// Exact target height
    #[arg(long, requires = "width")]
    height: Option<f64>,
    /// Output format (default: output.format)
    #[arg(long)]
    format: Option<ImageFormat>,
    /// Keep metadata when saving
    #[arg(long)]
    keep_metadata: bool,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Files or directories (directories are walked recursively)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Target format (default: conversion.format)
    #[arg(long)]
    to: Option<ImageFormat>,
    /// Quality tier (default: conversion.quality)
    #[arg(long)]
    quality: Option<ImageQuality>,
    /// Convert every decodable input, not only HEIC
    #[arg(long)]
    all: bool,
}

/// Requested resize for `compress`.
#[derive(Clone, Copy)]
enum Resize {
    Level(i32),
    Exact(ImageSize),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let app_config = config::load_config(cli.config.as_deref())?;
    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| app_config.output.directory.clone());

    match cli.command {
        Command::Compress(args) => run_compress(&app_config, output_dir, args)?,
        Command::Convert(args) => run_convert(&app_config, output_dir, args)?,
        Command::Strip { input, out } => run_strip(&app_config, output_dir, &input, out)?,
        Command::Info { inputs, json } => run_info(&inputs, json)?,
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays machine-readable for `info --json`.
fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Never exceeds the number of available cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn run_compress(
    app_config: &AppConfig,
    output_dir: PathBuf,
    args: CompressArgs,
) -> Result<(), Box<dyn Error>> {
    init_thread_pool(&app_config.processing);

    let mut settings = OutputSettings::from_config(&app_config.output);
    if let Some(format) = args.format {
        settings.format = format;
    }
    if args.keep_metadata {
        settings.strip_metadata = false;
    }
    let quality = args.quality.unwrap_or(settings.quality);
    let resize = match (args.level, args.width, args.height) {
        (Some(level), _, _) => Some(Resize::Level(level)),
        (None, Some(w), Some(h)) => Some(Resize::Exact(ImageSize::new(w, h))),
        _ => None,
    };

    let pipeline = Pipeline::new(RustCodec::new(), DirectoryGateway::new(&output_dir), settings);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_lines(&output::format_compress_event(&event));
        }
    });

    let failed: usize = args
        .inputs
        .par_iter()
        .enumerate()
        .map_with(tx, |tx, (i, path)| {
            let index = i + 1;
            let event = match compress_one(&pipeline, path, quality, resize) {
                Ok((native, image)) => CompressEvent::Saved {
                    index,
                    native,
                    image,
                },
                Err(e) => CompressEvent::Failed {
                    index,
                    name: file_name(path),
                    error: e.to_string(),
                },
            };
            let is_failure = matches!(event, CompressEvent::Failed { .. });
            let _ = tx.send(event);
            usize::from(is_failure)
        })
        .sum();
    printer
        .join()
        .map_err(|_| "output printer thread panicked")?;

    if failed > 0 {
        return Err(format!("{failed} of {} images failed", args.inputs.len()).into());
    }
    println!("Saved {} images → {}", args.inputs.len(), output_dir.display());
    Ok(())
}

fn compress_one(
    pipeline: &Pipeline<RustCodec, DirectoryGateway>,
    path: &Path,
    quality: ImageQuality,
    resize: Option<Resize>,
) -> Result<(ImageSize, CompressedImage), BoxError> {
    let data = fs::read(path)?;
    let image = pipeline.load(file_name(path), data, ImageMetadata::default())?;
    let native = image.size();

    let image = match resize {
        None => pipeline.adjust_quality(&image, quality)?,
        Some(resize) => {
            let target = match resize {
                Resize::Level(level) => level_target(native, level),
                Resize::Exact(size) => size,
            };
            // Select the tier first so the resize encodes at it.
            let staged = image.with_rendition(
                image.original_data().to_vec(),
                quality,
                native,
                image.format(),
            );
            pipeline.resize(&staged, target)?
        }
    };

    pipeline.save(&image)?;
    Ok((native, image))
}

/// Expand directories and keep the inputs this run should convert.
fn collect_conversion_inputs(
    inputs: &[PathBuf],
    codec: &impl Codec,
    all: bool,
) -> Result<Vec<BatchItem>, Box<dyn Error>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() {
                    paths.push(entry.into_path());
                }
            }
        } else {
            paths.push(input.clone());
        }
    }

    let mut items = Vec::new();
    for path in paths {
        let data = fs::read(&path)?;
        if all || imaging::is_heic(codec, &data) {
            items.push(BatchItem::new(file_name(&path), data));
        } else {
            info!(path = %path.display(), "skipping non-HEIC input");
        }
    }
    Ok(items)
}

fn run_convert(
    app_config: &AppConfig,
    output_dir: PathBuf,
    args: ConvertArgs,
) -> Result<(), Box<dyn Error>> {
    init_thread_pool(&app_config.processing);

    let to = args.to.unwrap_or(app_config.conversion.format);
    let quality = args.quality.unwrap_or(app_config.conversion.quality);
    let pipeline = Pipeline::new(
        RustCodec::new(),
        DirectoryGateway::new(&output_dir),
        OutputSettings::from_config(&app_config.output),
    );

    let items = collect_conversion_inputs(&args.inputs, pipeline.codec(), args.all)?;
    if items.is_empty() {
        return Err("no HEIC inputs found (use --all to convert other formats)".into());
    }
    let max_items = app_config.conversion.max_items;
    if items.len() > max_items {
        return Err(format!(
            "{} inputs exceed conversion.max_items ({max_items})",
            items.len()
        )
        .into());
    }

    let results = pipeline
        .convert_batch(items, to, quality)
        .wait(|progress| println!("{}", output::format_progress(progress)))?;
    for (i, result) in results.iter().enumerate() {
        output::print_lines(&output::format_conversion_result(i + 1, result));
    }

    let saved = pipeline.save_converted_images(&results)?;
    println!("{}", output::format_summary(&ConversionSummary::from_results(&results)));
    println!("Saved {saved} of {} → {}", results.len(), output_dir.display());
    Ok(())
}

fn run_strip(
    app_config: &AppConfig,
    output_dir: PathBuf,
    input: &Path,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let gateway = DirectoryGateway::new(output_dir);
    let pipeline = Pipeline::new(
        RustCodec::new(),
        gateway.clone(),
        OutputSettings::from_config(&app_config.output),
    );

    let data = fs::read(input)?;
    let stripped = pipeline
        .remove_metadata(&data)
        .ok_or(ProcessingError::MetadataRemovalFailed)?;

    let written = match out {
        Some(path) => {
            fs::write(&path, &stripped)?;
            path
        }
        None => {
            gateway.save(&stripped)?;
            gateway.path_for(&stripped)
        }
    };
    println!(
        "{} → {} ({} → {} bytes)",
        input.display(),
        written.display(),
        data.len(),
        stripped.len()
    );
    Ok(())
}

fn run_info(inputs: &[PathBuf], json: bool) -> Result<(), Box<dyn Error>> {
    let codec = RustCodec::new();
    let mut infos = Vec::with_capacity(inputs.len());
    for path in inputs {
        let data = fs::read(path)?;
        infos.push(ImageInfo {
            name: file_name(path),
            container: codec.container_type(&data).map(|c| c.identifier()),
            heic: imaging::is_heic(&codec, &data),
            size: imaging::get_image_size(&codec, &data),
            bytes: data.len(),
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
    } else {
        for (i, info) in infos.iter().enumerate() {
            output::print_lines(&output::format_info(i + 1, info));
        }
    }
    Ok(())
}

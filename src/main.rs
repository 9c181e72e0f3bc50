use clap::{Parser, Subcommand};
use pixelpress::{resolve, Pipeline, PipelineConfig, TransformRequest};
use rayon::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pixelpress")]
#[command(about = "Resize images through a content-addressed cache")]
#[command(long_about = "\
Resize images through a content-addressed cache

Each source is resized once and the result cached under a name derived
from the source's bytes, the target dimensions, and the output format.
Repeated invocations with unchanged inputs return the cached file
without decoding anything.

Cache entries:

  cache/
  ├── beach-800-600-9f3a...c2.jpg     # <stem>-<w>-<h>-<sha256>.<ext>
  └── logo-120-80-77d1...0b.png

Editing a source file changes its hash and therefore its cache entry;
stale entries are never served. 'pixelpress clear-cache' removes all
entries (subdirectories are left alone).")]
#[command(version)]
struct Cli {
    /// Cache directory for transformed images
    #[arg(long, default_value = "cache", global = true)]
    cache_dir: PathBuf,

    /// Optional config.toml with defaults for format, quality, and watermarking
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize one or more images, printing the cached path for each
    Resize(ResizeArgs),
    /// Remove every entry from the cache directory
    ClearCache,
}

#[derive(clap::Args)]
struct ResizeArgs {
    /// Source image files (jpg, png, gif, webp)
    #[arg(required = true)]
    sources: Vec<PathBuf>,

    /// Target width in pixels
    #[arg(long)]
    width: u32,

    /// Target height in pixels; derived from the aspect ratio if omitted
    #[arg(long)]
    height: Option<u32>,

    /// Output format: auto | jpg | png | webp | gif
    #[arg(long)]
    format: Option<String>,

    /// Jpeg/webp quality (1-100)
    #[arg(long)]
    quality: Option<i32>,

    /// Png compression level (0-9)
    #[arg(long)]
    compression: Option<i32>,

    /// Watermark image to composite onto each output
    #[arg(long)]
    watermark: Option<PathBuf>,

    /// Watermark opacity percentage (0-100); only png watermarks blend
    #[arg(long)]
    watermark_opacity: Option<i32>,

    /// Watermark anchor: top-left, middle-center, bottom-right, ...
    #[arg(long)]
    watermark_position: Option<String>,

    /// Worker threads; defaults to the number of CPU cores
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match PipelineConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("error: cannot load {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => PipelineConfig::default(),
    };

    match cli.command {
        Command::Resize(args) => run_resize(&cli.cache_dir, config, args),
        Command::ClearCache => match pixelpress::cache::clear_cache(&cli.cache_dir) {
            Ok(()) => {
                println!("Cache cleared: {}", cli.cache_dir.display());
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_resize(cache_dir: &std::path::Path, config: PipelineConfig, args: ResizeArgs) -> ExitCode {
    init_thread_pool(args.threads);

    // CLI overrides go through the setters so they get the same
    // validation as the library surface.
    let mut pipeline = Pipeline::with_config(cache_dir, config);
    if let Some(format) = &args.format {
        pipeline.set_output_format(format);
    }
    if let Some(quality) = args.quality {
        pipeline.set_quality(quality);
    }
    if let Some(compression) = args.compression {
        pipeline.set_compression(compression);
    }
    if let Some(watermark) = &args.watermark {
        pipeline.set_watermark(watermark);
    }
    if let Some(opacity) = args.watermark_opacity {
        pipeline.set_watermark_opacity(opacity);
    }
    if let Some(position) = &args.watermark_position {
        pipeline.set_watermark_position(position);
    }
    for message in pipeline.errors() {
        eprintln!("error: {message}");
    }
    if !pipeline.errors().is_empty() {
        return ExitCode::FAILURE;
    }

    // One immutable snapshot shared across workers; resolve itself is
    // stateless, so sources can be processed in parallel.
    let config = pipeline.config();
    let results: Vec<_> = args
        .sources
        .par_iter()
        .map(|source| {
            let request = TransformRequest::new(source.clone(), args.width, args.height);
            (source, resolve(config, cache_dir, &request))
        })
        .collect();

    let mut failed = false;
    for (source, result) in results {
        match result {
            Ok(resolved) => {
                for warning in &resolved.warnings {
                    eprintln!("warning: {}: {warning}", source.display());
                }
                println!("{}", resolved.path.display());
            }
            Err(err) => {
                eprintln!("error: {}: {err}", source.display());
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Initialize the rayon thread pool.
///
/// Caps at the number of available CPU cores — the flag can constrain
/// down, not up.
fn init_thread_pool(threads: Option<usize>) {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let threads = threads.unwrap_or(available).clamp(1, available);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

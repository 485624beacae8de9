use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tri_fractal::{
    DecoderOptions, DivideType, EdgeDetector, EncoderOptions, ErrorMetric, FractalImage,
    ImageType, Raster, SamplingType, SubdivisionMethod,
};
use trifrac::imaging::{load_png, save_png};
use trifrac::models::{parse_option, AppConfig};
use trifrac::progress::LogProgress;

#[derive(Parser)]
#[command(name = "trifrac", version)]
#[command(about = "Triangle-based fractal image compression")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a PNG image into a fractal file
    Encode {
        /// Input PNG file
        input: PathBuf,

        /// Output fractal file
        #[arg(short, long, default_value = "fractal.frac")]
        output: PathBuf,

        /// Error cutoff below which a fit is accepted
        #[arg(short = 'c', long)]
        cutoff: Option<f64>,

        /// Encode red, green and blue channels
        #[arg(long, conflicts_with = "grey")]
        color: bool,

        /// Encode a single luminance channel
        #[arg(long)]
        grey: bool,

        /// YAML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Sample pairing: subsample, supersample or both
        #[arg(long, value_parser = parse_option::<SamplingType>)]
        sampling: Option<SamplingType>,

        /// Split placement: middle, high-entropy or low-entropy
        #[arg(long, value_parser = parse_option::<DivideType>)]
        divide: Option<DivideType>,

        /// Fit error metric: rms or supremum
        #[arg(long, value_parser = parse_option::<ErrorMetric>)]
        metric: Option<ErrorMetric>,

        /// Edge map for entropy splits: sobel or laplacian
        #[arg(long, value_parser = parse_option::<EdgeDetector>)]
        edge_detector: Option<EdgeDetector>,

        /// Subdivision shape: edge-ratios or barycentric
        #[arg(long, value_parser = parse_option::<SubdivisionMethod>)]
        subdivision: Option<SubdivisionMethod>,
    },
    /// Decode a fractal file into a PNG image
    Decode {
        /// Input fractal file
        input: PathBuf,

        /// Output PNG file
        #[arg(short, long, default_value = "decoded.png")]
        output: PathBuf,

        /// Output width (defaults to the encoded width)
        #[arg(short, long)]
        width: Option<u32>,

        /// Output height (defaults to the encoded height)
        #[arg(short = 'H', long)]
        height: Option<u32>,

        /// Number of decode iterations
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Sample pairing: subsample, supersample or both
        #[arg(long, value_parser = parse_option::<SamplingType>)]
        sampling: Option<SamplingType>,

        /// Fill pixels no sample reached from their neighbours
        #[arg(long)]
        fix_errors: bool,

        /// Start from this PNG (resized to the output size) instead of flat grey
        #[arg(short, long)]
        seed: Option<PathBuf>,

        /// YAML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show header and tree statistics of a fractal file
    Info {
        /// Input fractal file
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Encode {
            input,
            output,
            cutoff,
            color,
            grey,
            config,
            sampling,
            divide,
            metric,
            edge_detector,
            subdivision,
        } => {
            let config = AppConfig::load_optional(config.as_deref())?;
            let mode = if color {
                Some(ImageType::Color)
            } else if grey {
                Some(ImageType::Greyscale)
            } else {
                config.mode
            };
            let mut options = config.encoder;
            if let Some(cutoff) = cutoff {
                options = options.error_cutoff(cutoff);
            }
            if let Some(sampling) = sampling {
                options = options.sampling(sampling);
            }
            if let Some(divide) = divide {
                options = options.divide(divide);
            }
            if let Some(metric) = metric {
                options = options.metric(metric);
            }
            if let Some(detector) = edge_detector {
                options = options.edge_detector(detector);
            }
            if let Some(method) = subdivision {
                options = options.subdivision(method);
            }
            run_encode_command(&input, &output, mode, options)
        }
        Commands::Decode {
            input,
            output,
            width,
            height,
            iterations,
            sampling,
            fix_errors,
            seed,
            config,
        } => {
            let mut options = AppConfig::load_optional(config.as_deref())?.decoder;
            if width.is_some() {
                options.width = width;
            }
            if height.is_some() {
                options.height = height;
            }
            if let Some(iterations) = iterations {
                options = options.iterations(iterations);
            }
            if let Some(sampling) = sampling {
                options = options.sampling(sampling);
            }
            if fix_errors {
                options = options.fix_errors(true);
            }
            run_decode_command(&input, &output, seed.as_deref(), &options)
        }
        Commands::Info { input } => run_info_command(&input),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_filter = match (quiet, verbose) {
        (true, _) => "trifrac=warn,tri_fractal=error",
        (false, 0) => "trifrac=info,tri_fractal=warn",
        (false, 1) => "trifrac=debug,tri_fractal=debug",
        (false, _) => "trifrac=trace,tri_fractal=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Greyscale inputs encode one channel, RGB inputs three.
fn detect_mode(raster: &Raster) -> ImageType {
    if raster.is_color() {
        ImageType::Color
    } else {
        ImageType::Greyscale
    }
}

fn run_encode_command(
    input: &Path,
    output: &Path,
    mode: Option<ImageType>,
    options: EncoderOptions,
) -> anyhow::Result<()> {
    let raster =
        load_png(input).with_context(|| format!("Failed to load {}", input.display()))?;
    let mode = mode.unwrap_or_else(|| detect_mode(&raster));
    tracing::info!(
        input = %input.display(),
        width = raster.width(),
        height = raster.height(),
        ?mode,
        cutoff = options.error_cutoff,
        "Encoding image"
    );

    let mut fractal = FractalImage::new(raster, mode, options, &input.to_string_lossy());
    fractal.encode(&mut LogProgress::default());

    let file = std::fs::File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    fractal.serialize(&mut writer)?;
    writer.flush()?;

    let size = std::fs::metadata(output)?.len();
    println!(
        "Encoded {} -> {} ({} triangles, {} bytes)",
        input.display(),
        output.display(),
        fractal.triangle_count(),
        size
    );
    Ok(())
}

fn run_decode_command(
    input: &Path,
    output: &Path,
    seed: Option<&Path>,
    options: &DecoderOptions,
) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let mut fractal = FractalImage::unserialize(&bytes)
        .with_context(|| format!("Failed to parse {}", input.display()))?;

    tracing::info!(
        iterations = options.iterations,
        fix_errors = options.fix_errors,
        "Decoding fractal"
    );
    let raster = match seed {
        Some(path) => {
            let seed = load_png(path)
                .with_context(|| format!("Failed to load seed {}", path.display()))?;
            fractal.decode_from(&seed, options)?
        }
        None => fractal.decode(options)?,
    };
    save_png(&raster, output).with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Decoded {} -> {} ({}x{})",
        input.display(),
        output.display(),
        raster.width(),
        raster.height()
    );
    Ok(())
}

fn run_info_command(input: &Path) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let fractal = FractalImage::unserialize(&bytes)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    let metadata = fractal.metadata();

    println!("File:       {}", input.display());
    println!("Source:     {}", metadata.source_filename);
    println!("Size:       {}x{}", metadata.width, metadata.height);
    println!("Mode:       {:?}", fractal.image_type());
    println!("Triangles:  {}", fractal.triangle_count());
    println!("Bytes:      {}", bytes.len());
    println!();
    for (channel, stats) in fractal.stats() {
        println!("  {channel:?}: {stats}");
    }
    Ok(())
}

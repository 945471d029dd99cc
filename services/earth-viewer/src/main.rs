//! Earth viewer.
//!
//! Loads a grib2json layer, interpolates a particle field for the chosen
//! projection, and writes the overlay plus animation frames as PNG files.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use earth_common::Product;
use earth_viewer::{
    write_overlay, LayerRequest, Orchestrator, PngFrameSink, PointInfo, ViewerConfig,
};
use projection::{Orientation, ProjectionKind};

#[derive(Parser, Debug)]
#[command(name = "earth-viewer")]
#[command(about = "Animate wind or ocean current particles over a projected globe")]
struct Args {
    /// grib2json file with the animated layer
    #[arg(short, long, env = "EARTH_GRID")]
    grid: PathBuf,

    /// Product to build from the grid file (wind, currents)
    #[arg(short, long, default_value = "wind")]
    product: Product,

    /// grib2json file with a separate overlay layer
    #[arg(long, requires = "overlay_product")]
    overlay: Option<PathBuf>,

    /// Product to build from the overlay file (temp, relative_humidity, ...)
    #[arg(long)]
    overlay_product: Option<Product>,

    /// Projection (orthographic, equirectangular, stereographic)
    #[arg(long)]
    projection: Option<ProjectionKind>,

    /// View center as "lon,lat" or "lon,lat,scale"
    #[arg(long, allow_hyphen_values = true)]
    center: Option<Orientation>,

    /// Output width in pixels
    #[arg(long)]
    width: Option<usize>,

    /// Output height in pixels
    #[arg(long)]
    height: Option<usize>,

    /// Frames to animate (0 runs until interrupted)
    #[arg(long)]
    frames: Option<u64>,

    /// Write every n-th frame
    #[arg(long)]
    frame_every: Option<u64>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fewer particles for slow machines
    #[arg(long)]
    low_power: bool,

    /// RNG seed for reproducible frames
    #[arg(long)]
    seed: Option<u64>,

    /// Report values at pixel "x,y" (repeatable)
    #[arg(long)]
    inspect: Vec<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder().with_max_level(level).with_target(true);
    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    // Field slices and animation frames interleave cooperatively on one thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    runtime.block_on(run(args))
}

fn build_config(args: &Args) -> Result<ViewerConfig> {
    let mut config = ViewerConfig::from_env();

    if let Some(kind) = args.projection {
        config.projection = kind;
    }
    if let Some(center) = args.center {
        config.orientation = center;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(frames) = args.frames {
        config.frames = frames;
    }
    if let Some(every) = args.frame_every {
        config.frame_every = every;
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if args.low_power {
        config.animation.low_power = true;
    }
    if args.seed.is_some() {
        config.animation.seed = args.seed;
    }

    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {}", e))?;
    Ok(config)
}

fn parse_pixel(s: &str) -> Result<(f64, f64)> {
    let (x, y) = s
        .split_once(',')
        .with_context(|| format!("expected x,y but got '{}'", s))?;
    Ok((x.trim().parse()?, y.trim().parse()?))
}

fn bail_on_status(orchestrator: &Orchestrator) -> Result<()> {
    let status = orchestrator.status().snapshot();
    if orchestrator.status().is_error() {
        bail!(
            "{} failed: {}",
            status.source.unwrap_or_default(),
            status.message
        );
    }
    Ok(())
}

fn log_point(x: f64, y: f64, point: Option<PointInfo>) {
    match point {
        Some(point) => {
            let primary = point.primary.map(|r| r.text).unwrap_or_else(|| "-".to_string());
            let overlay = point.overlay.map(|r| r.text).unwrap_or_else(|| "-".to_string());
            info!(
                x,
                y,
                lon = point.lon,
                lat = point.lat,
                primary = %primary,
                overlay = %overlay,
                "Inspect"
            );
        }
        None => info!(x, y, "Inspect: off the globe"),
    }
}

async fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;
    info!(
        projection = %config.projection,
        width = config.width,
        height = config.height,
        output = %config.output_dir.display(),
        "Starting earth viewer"
    );

    let overlay = match (&args.overlay, args.overlay_product) {
        (Some(path), Some(product)) => Some(LayerRequest::new(path, product)),
        (None, Some(_)) => bail!("--overlay-product needs --overlay"),
        _ => None,
    };

    let orchestrator = Arc::new(Orchestrator::new(config.clone())?);
    orchestrator.set_view(config.projection, config.orientation)?;

    // Handle Ctrl+C
    let shutdown = orchestrator.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            shutdown.cancel_all();
        }
    });

    orchestrator.load_layers(LayerRequest::new(&args.grid, args.product), overlay);
    orchestrator.settle().await;
    bail_on_status(&orchestrator)?;
    let layer = orchestrator
        .primary()
        .value()
        .context("primary layer was not loaded")?;
    info!(layer = %layer.describe(), source = %layer.source.display(), "Layers ready");

    for pixel in &args.inspect {
        let (x, y) = parse_pixel(pixel)?;
        log_point(x, y, orchestrator.inspect(x, y));
    }

    orchestrator.rebuild_field()?;
    orchestrator.settle().await;
    bail_on_status(&orchestrator)?;
    let field = orchestrator
        .field()
        .value()
        .context("field interpolation was cancelled")?;
    write_overlay(&config.output_dir, &field)?;

    let sink = PngFrameSink::new(
        &config.output_dir,
        field.overlay().rgba().to_vec(),
        config.frame_every,
        config.frames,
    );
    drop(field);

    orchestrator.start_animation(sink)?;
    orchestrator.settle().await;
    bail_on_status(&orchestrator)?;

    match orchestrator.animation().value() {
        Some(run) => info!(frames = run.frames, "Animation complete"),
        None => warn!("Animation cancelled"),
    }
    Ok(())
}

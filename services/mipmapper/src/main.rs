//! Tile pyramid builder.
//!
//! Composes one tile at zoom level `z` from up to four tiles at level `z + 1`.
//! Drivers run it once per parent tile, walking the pyramid from the finest
//! level upward.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use mipmap::{ChildTiles, Compositor, MipmapConfig, PixelFormat, TileCompression};

#[derive(Parser, Debug)]
#[command(name = "mipmapper")]
#[command(about = "Compose four sibling map tiles into their parent tile")]
struct Args {
    /// Output tile path (replaced atomically)
    output: PathBuf,

    /// North-west child tile
    #[arg(long)]
    nw: Option<PathBuf>,

    /// North-east child tile
    #[arg(long)]
    ne: Option<PathBuf>,

    /// South-west child tile
    #[arg(long)]
    sw: Option<PathBuf>,

    /// South-east child tile
    #[arg(long)]
    se: Option<PathBuf>,

    /// Edge length of square tiles (overrides MIPMAP_TILE_SIZE)
    #[arg(long)]
    tile_size: Option<usize>,

    /// Tile width, for non-square tiles
    #[arg(long, requires = "height")]
    width: Option<usize>,

    /// Tile height, for non-square tiles
    #[arg(long, requires = "width")]
    height: Option<usize>,

    /// Tiles are RGBA instead of gray+alpha
    #[arg(long)]
    colored: bool,

    /// Process children one at a time instead of on the thread pool
    #[arg(long)]
    sequential: bool,

    /// Compression effort: fast, default or best (overrides MIPMAP_COMPRESSION)
    #[arg(long)]
    compression: Option<TileCompression>,

    /// Log level
    #[arg(long, default_value = "info", env = "MIPMAP_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    /// Apply command line overrides on top of the environment configuration.
    fn apply(&self, config: &mut MipmapConfig) {
        if let Some(size) = self.tile_size {
            config.tile_size = size;
        }
        if let Some(level) = self.compression {
            config.compression = level;
        }
        if self.sequential {
            config.parallel = false;
        }
    }

    fn dimensions(&self, config: &MipmapConfig) -> (usize, usize) {
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            _ => (config.tile_size, config.tile_size),
        }
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let mut config = MipmapConfig::from_env();
    args.apply(&mut config);
    if let Err(e) = config.validate() {
        bail!("invalid configuration: {}", e);
    }

    let (width, height) = args.dimensions(&config);
    let format = PixelFormat::from_colored(args.colored);
    let children = ChildTiles::new(
        args.nw.as_deref(),
        args.ne.as_deref(),
        args.sw.as_deref(),
        args.se.as_deref(),
    );

    info!(
        output = %args.output.display(),
        children = children.count(),
        width,
        height,
        %format,
        compression = %config.compression,
        parallel = config.parallel,
        "Composing tile"
    );

    Compositor::new(config)
        .compose(&args.output, width, height, format, &children)
        .with_context(|| format!("failed to compose {}", args.output.display()))?;

    Ok(())
}

//! `ocean-scene`: offline bathymetry downsampling and one-shot scene
//! composition.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use scene_tool::{compose_scene, downsample_file, ComposeOptions};

#[derive(Parser, Debug)]
#[command(name = "ocean-scene")]
#[command(about = "Bathymetry preparation and 3D ocean scene composition")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decimate a bathymetry grid to a point budget
    Downsample {
        /// Full-resolution grid ({lon, lat, z})
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the decimated grid
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value = "500")]
        target_lon: usize,

        #[arg(long, default_value = "350")]
        target_lat: usize,
    },

    /// Load bathymetry and layers, and write the composed scene as JSON
    Compose {
        /// Directory containing the bathymetry sources
        #[arg(long, env = "BATHY_DATA_DIR", default_value = ".")]
        data_dir: PathBuf,

        /// Compositor configuration (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Scalar overlay painted onto the seabed ({lon, lat, z})
        #[arg(long)]
        overlay: Option<PathBuf>,

        /// Vector field for particle advection ({lon, lat, u, v})
        #[arg(long)]
        wind: Option<PathBuf>,

        /// Simulated frames to run before snapshotting particles
        #[arg(long, default_value = "60")]
        frames: usize,

        /// Particle pool size
        #[arg(long)]
        particles: Option<usize>,

        #[arg(long, default_value = "0")]
        seed: u64,

        /// Upper-focus warp: depth in metres above which the axis stays linear
        #[arg(long)]
        warp_focus: Option<f64>,

        /// Upper-focus warp: scale applied to depth below the focus (0.05..1)
        #[arg(long)]
        warp_ratio: Option<f64>,

        /// Stored camera record to carry into the output
        #[arg(long)]
        camera: Option<PathBuf>,

        /// Output file; stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(&args);

    match args.command {
        Command::Downsample {
            input,
            output,
            target_lon,
            target_lat,
        } => {
            let summary = downsample_file(&input, &output, target_lon, target_lat)?;
            info!(from = ?summary.from, to = ?summary.to, "Done");
        }
        Command::Compose {
            data_dir,
            config,
            overlay,
            wind,
            frames,
            particles,
            seed,
            warp_focus,
            warp_ratio,
            camera,
            output,
        } => {
            let options = ComposeOptions {
                data_dir,
                config,
                overlay,
                wind,
                frames,
                particles,
                seed,
                warp_focus,
                warp_ratio,
                camera,
            };
            let document = compose_scene(&options).await?;
            let json = serde_json::to_string(&document)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("Failed to write: {}", path.display()))?;
                    info!(output = %path.display(), "Wrote scene");
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

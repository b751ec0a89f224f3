//! ReelForge CLI — assemble short-form vertical video ads.
//!
//! Usage:
//!   reelforge compose <BACKGROUND> <OVERLAY> <AUDIO>   Run the ad pipeline
//!   reelforge scenes <MANIFEST>                        Render a scene list
//!   reelforge probe <PATH>                             Show stream metadata
//!   reelforge verify <PATHS>...                        Concat compatibility check
//!   reelforge concat <PATHS>...                        Stream-copy concatenation
//!   reelforge check                                    Check engine availability

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "reelforge",
    about = "Assemble short-form vertical video ads from clips and audio",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a background, an overlay, and a replacement audio track
    Compose {
        /// Background clip
        background: PathBuf,

        /// Overlay clip
        overlay: PathBuf,

        /// Replacement audio track
        audio: PathBuf,

        /// Output resolution (WIDTHxHEIGHT)
        #[arg(long, default_value = "1080x1920")]
        resolution: String,

        /// Overlay window start on the background timeline (seconds)
        #[arg(long, default_value = "10.0")]
        window_start: f64,

        /// Overlay window duration (seconds)
        #[arg(long, default_value = "20.0")]
        window_duration: f64,

        /// Skip the teaser lead-in before the full overlay
        #[arg(long)]
        no_lead_in: bool,

        /// Teaser duration in seconds (defaults from config)
        #[arg(long)]
        lead_in_secs: Option<f64>,

        /// Output file path
        #[arg(short, long, default_value = "output.mp4")]
        output: PathBuf,
    },

    /// Render a JSON scene list to one clip
    Scenes {
        /// Path to the scene manifest (JSON array of scenes)
        manifest: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output resolution (WIDTHxHEIGHT)
        #[arg(long, default_value = "1080x1920")]
        resolution: String,

        /// Per-scene duration in seconds (defaults from config)
        #[arg(long)]
        scene_duration: Option<f64>,

        /// Scaling mode: stretch|pad
        #[arg(long, default_value = "stretch")]
        scale_mode: String,

        /// Keep each scene's own audio instead of muxing a new track
        #[arg(long)]
        preserve_audio: bool,

        /// Replacement audio track to mux onto the reel
        #[arg(long)]
        audio: Option<PathBuf>,
    },

    /// Show stream metadata for a media file
    Probe {
        /// Path to the media file
        path: PathBuf,
    },

    /// Check whether clips can be stream-copy concatenated
    Verify {
        /// Clip paths, in concat order
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Stream-copy concatenate compatible clips
    Concat {
        /// Clip paths, in concat order
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    reelforge_common::logging::init_logging(&reelforge_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Compose {
            background,
            overlay,
            audio,
            resolution,
            window_start,
            window_duration,
            no_lead_in,
            lead_in_secs,
            output,
        } => {
            commands::compose::run(
                background,
                overlay,
                audio,
                resolution,
                window_start,
                window_duration,
                !no_lead_in,
                lead_in_secs,
                output,
            )
            .await
        }
        Commands::Scenes {
            manifest,
            output,
            resolution,
            scene_duration,
            scale_mode,
            preserve_audio,
            audio,
        } => {
            commands::scenes::run(
                manifest,
                output,
                resolution,
                scene_duration,
                scale_mode,
                preserve_audio,
                audio,
            )
            .await
        }
        Commands::Probe { path } => commands::probe::run(path),
        Commands::Verify { paths } => commands::verify::run(paths).await,
        Commands::Concat { paths, output } => commands::concat::run(paths, output).await,
        Commands::Check => commands::check::run(),
    }
}

//! Veriframe - Deepfake analysis CLI
//!
//! Samples videos into frames, scores each frame, and reports the time
//! ranges that look manipulated.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use veriframe_core::colored_logger::{init_component_logger, Component};
use veriframe_core::config::{Config, ExpertKind};
use veriframe_core::pipeline::{build_frame_source, build_orchestrator};
use veriframe_model::{ModelDownloader, DEFAULT_MODEL_URL, ORT_LIBRARY_NAME};

#[derive(Parser)]
#[command(name = "veriframe")]
#[command(about = "Frame-level deepfake detection for videos and images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Named profile from the configuration file
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP analysis API
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Scoring expert
        #[arg(long, value_enum)]
        expert: Option<ExpertKind>,
    },

    /// Analyze a local video or image and print the JSON result
    Analyze {
        /// Media file to analyze
        path: PathBuf,

        /// Treat the input as a single image
        #[arg(long)]
        image: bool,

        /// Frames sampled per second of video
        #[arg(long)]
        fps: Option<f64>,

        /// Score a frame must exceed to join a manipulated segment
        #[arg(long)]
        segment_threshold: Option<f64>,

        /// Overall confidence above which the input is reported fake
        #[arg(long)]
        decision_threshold: Option<f64>,

        /// Scoring expert
        #[arg(long, value_enum)]
        expert: Option<ExpertKind>,
    },

    /// Check dependencies (FFmpeg, model files)
    Check,

    /// Download the ONNX classifier
    DownloadModel {
        /// Re-download files that already exist
        #[arg(long)]
        force: bool,

        /// Repository to download from
        #[arg(long)]
        url: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let component = match cli.command {
        Commands::Serve { .. } => Component::Server,
        Commands::Analyze { .. } => Component::Analyze,
        Commands::DownloadModel { .. } => Component::Models,
        Commands::Check => Component::Main,
    };
    init_component_logger(component, cli.verbose)?;

    let config = Config::load(cli.config.as_deref(), cli.profile.as_deref())?;
    debug!("configuration: {:?}", config);

    match cli.command {
        Commands::Serve { host, port, expert } => {
            cmd_serve(config, host, port, expert)?;
        }
        Commands::Analyze {
            path,
            image,
            fps,
            segment_threshold,
            decision_threshold,
            expert,
        } => {
            let mut config = config;
            if let Some(fps) = fps {
                config.analysis.sampling_rate = fps;
            }
            if let Some(threshold) = segment_threshold {
                config.analysis.segment_threshold = threshold;
            }
            if let Some(threshold) = decision_threshold {
                config.analysis.decision_threshold = threshold;
            }
            if let Some(expert) = expert {
                config.scoring.expert = expert;
            }
            cmd_analyze(&config, &path, image)?;
        }
        Commands::Check => {
            cmd_check(&config)?;
        }
        Commands::DownloadModel { force, url } => {
            cmd_download_model(&config, force, url)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn cmd_serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    expert: Option<ExpertKind>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(expert) = expert {
        config.scoring.expert = expert;
    }

    if !build_frame_source(&config.frames).is_available() {
        warn!(
            "{} not found - video uploads will fail until FFmpeg is installed",
            config.frames.ffmpeg_path
        );
    }

    let orchestrator = build_orchestrator(&config)?;
    info!("starting veriframe server with the {} expert", orchestrator.expert_name());

    veriframe_web::serve(orchestrator, &config.server).await
}

fn cmd_analyze(config: &Config, path: &Path, image: bool) -> Result<()> {
    if !path.is_file() {
        error!("input not found: {:?}", path);
        return Err(anyhow::anyhow!("input not found: {}", path.display()));
    }

    let orchestrator = build_orchestrator(config)?;

    let result = if image {
        info!("analyzing image {:?}", path);
        orchestrator.process_image(path)
    } else {
        info!("analyzing video {:?}", path);
        if veriframe_frames::check_ffprobe() {
            match veriframe_frames::probe_duration(path) {
                Ok(duration) => info!(
                    "duration {:.1}s, about {} frames at {} fps",
                    duration,
                    (duration * config.analysis.sampling_rate).ceil() as u64,
                    config.analysis.sampling_rate
                ),
                Err(e) => warn!("could not probe duration: {}", e),
            }
        }
        orchestrator.process_video(path)?
    };

    info!(
        "fake: {}, confidence {:.3}, {} segment(s)",
        result.is_fake,
        result.overall_confidence,
        result.segments.len()
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn cmd_check(config: &Config) -> Result<()> {
    println!("checking dependencies...\n");

    let ffmpeg_ok = build_frame_source(&config.frames).is_available();
    println!(
        "  ffmpeg:  {}",
        if ffmpeg_ok { "OK" } else { "NOT FOUND" }
    );

    let ffprobe_ok = veriframe_frames::check_ffprobe();
    println!(
        "  ffprobe: {}",
        if ffprobe_ok { "OK" } else { "not found (duration probing disabled)" }
    );

    let model_dir = config.scoring.resolve_model_dir();
    let downloader = ModelDownloader::new(model_dir.clone());
    let missing = downloader.missing_files();
    println!("  model:   {:?}", model_dir);
    if missing.is_empty() {
        println!("           all files present");
    } else {
        println!("           missing: {}", missing.join(", "));
    }

    let bundled_runtime = model_dir.join(ORT_LIBRARY_NAME).is_file();
    println!(
        "  runtime: {}",
        if bundled_runtime { "bundled" } else { "system library" }
    );

    let expert = match config.scoring.expert {
        ExpertKind::Synthetic => "synthetic (placeholder scores)",
        ExpertKind::Onnx => "onnx",
    };
    println!("  expert:  {}", expert);
    println!();

    let mut ok = true;
    if !ffmpeg_ok {
        ok = false;
        println!("WARNING: FFmpeg is required for video analysis.");
        println!("Please install FFmpeg and ensure it's in your PATH.");
        println!("Download: https://ffmpeg.org/download.html");
    }
    if config.scoring.expert == ExpertKind::Onnx && !missing.is_empty() {
        ok = false;
        println!("WARNING: the onnx expert needs the model files.");
        println!("Run 'veriframe download-model' to fetch them.");
    }
    if ok {
        println!("all checks passed!");
    }

    Ok(())
}

#[tokio::main]
async fn cmd_download_model(config: &Config, force: bool, url: Option<String>) -> Result<()> {
    let model_dir = config.scoring.resolve_model_dir();
    let base_url = url
        .or_else(|| config.scoring.model_url.clone())
        .unwrap_or_else(|| DEFAULT_MODEL_URL.to_string());

    info!("source: {}", base_url);
    let downloader = ModelDownloader::with_base_url(model_dir, base_url);

    if downloader.is_complete() && !force {
        info!("model already present at {:?} (use --force to re-download)", downloader.model_dir());
        return Ok(());
    }

    downloader.download_all(force).await
}

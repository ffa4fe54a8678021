use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "poseplay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record the annotated clip once through and write it to a directory
    /// (requires `ffmpeg`/`ffprobe` on PATH).
    Export(ExportArgs),
    /// Render the annotated canvas at one time position as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct SourceArgs {
    /// Clip path; repeat for alternate formats of the same clip, the first that opens is used.
    #[arg(long = "clip", required = true)]
    clips: Vec<String>,

    /// Recorded pose track JSON (PoseNet result shape).
    #[arg(long)]
    poses: Option<PathBuf>,

    /// Player config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hide the video layer.
    #[arg(long)]
    no_video: bool,

    /// Hide the pose layer.
    #[arg(long)]
    no_pose: bool,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Directory the exported file is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Override the configured container.
    #[arg(long, value_enum)]
    container: Option<ContainerChoice>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Clip time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ContainerChoice {
    Webm,
    Mp4,
}

impl From<ContainerChoice> for poseplay::ContainerFormat {
    fn from(c: ContainerChoice) -> Self {
        match c {
            ContainerChoice::Webm => Self::Webm,
            ContainerChoice::Mp4 => Self::Mp4,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<poseplay::PlayerConfig> {
    let cfg = match path {
        Some(p) => poseplay::PlayerConfig::from_json_file(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => poseplay::PlayerConfig::default(),
    };
    Ok(cfg)
}

fn open_session(
    cfg: &poseplay::PlayerConfig,
    source: &SourceArgs,
    downloads: Box<dyn poseplay::DownloadSink>,
) -> anyhow::Result<poseplay::PlayerSession> {
    let video = poseplay::FfmpegVideoSource::open(
        &source.clips,
        cfg.canvas,
        cfg.tick_fps()?,
        cfg.frame_cache_capacity,
    )?;
    let surface = poseplay::CpuSurface::new(cfg.canvas)?;
    let capture = poseplay::FfmpegCaptureHost {
        bg_rgba: cfg.background.0,
    };

    let mut session = poseplay::PlayerSession::new(
        cfg,
        Box::new(video),
        Box::new(surface),
        Box::new(capture),
        downloads,
    )?;

    if let Some(path) = &source.poses {
        let track = poseplay::PoseTrack::from_json_file(path, cfg.estimator.min_confidence)
            .with_context(|| format!("load pose track '{}'", path.display()))?;
        session = session.with_estimator(Box::new(poseplay::TrackEstimator::new(track)))?;
    }
    if source.no_video {
        session.control(poseplay::Control::ToggleVideo)?;
    }
    if source.no_pose {
        session.control(poseplay::Control::TogglePose)?;
    }
    Ok(session)
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.source.config.as_deref())?;
    if let Some(container) = args.container {
        cfg.recorder.container = container.into();
    }

    let downloads = poseplay::DirectoryDownload::new(&args.out_dir);
    let mut session = open_session(&cfg, &args.source, Box::new(downloads))?;
    let report = session.run_export()?;

    eprintln!(
        "wrote {} ({} bytes, {} chunks)",
        report.path.display(),
        report.bytes,
        report.chunks
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.source.config.as_deref())?;
    let mut session = open_session(
        &cfg,
        &args.source,
        Box::new(poseplay::InMemoryDownloads::new()),
    )?;

    session.render_still(args.time, Duration::from_secs(10))?;
    session.save_frame_png(&args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

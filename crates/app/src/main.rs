use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use desk_scene_core::{
    AppConfig, CommandRecorder, FrameHandler, Key, SceneImporter, Session, TextureLoader,
};
use tracing_subscriber::EnvFilter;

mod host;
mod images;
mod obj;
mod placeholder;

use host::{parse_keys, parse_rgb, HeadlessHost};

fn main() -> desk_scene_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scene,
            fps,
            max_frames,
        } => run_session(&scene, fps, max_frames),
        Commands::Trace { scene, output } => run_trace(&scene, output.as_deref()),
        Commands::Config => print_default_config(),
    }
}

fn run_session(args: &SceneArgs, fps: u32, max_frames: u64) -> desk_scene_core::Result<()> {
    let keys = args.keys()?;
    tracing::info!(keys = keys.len(), fps, "starting headless session");

    let mut gfx = CommandRecorder::new();
    let mut session = open_session(args, &mut gfx)?;
    let mut host = HeadlessHost::new(fps, max_frames);
    let report = host.run(&mut session, &mut gfx, &keys);
    session.teardown(&mut gfx);
    let report = report?;

    tracing::info!(
        frames = report.frames,
        timer_ticks = report.timer_ticks,
        rejected = report.rejected_keys,
        elapsed_ms = host.now().as_millis() as u64,
        "session finished"
    );
    let summary = serde_json::json!({
        "frames": report.frames,
        "timer_ticks": report.timer_ticks,
        "rejected_keys": report.rejected_keys,
        "terminated": report.terminated,
        "elapsed_ms": report.elapsed.as_millis() as u64,
        "transform": report.final_state,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_trace(args: &SceneArgs, output: Option<&Path>) -> desk_scene_core::Result<()> {
    let keys = args.keys()?;
    let mut gfx = CommandRecorder::new();
    let mut session = open_session(args, &mut gfx)?;

    let now = std::time::Duration::ZERO;
    for key in keys {
        session.on_key(key, now);
    }
    gfx.take_commands();
    session.on_frame(&mut gfx, now);
    let trace = gfx.to_json();
    session.teardown(&mut gfx);
    let trace = trace?;

    match output {
        Some(path) => {
            std::fs::write(path, trace)?;
            tracing::info!(path = %path.display(), "frame trace written");
        }
        None => println!("{trace}"),
    }
    Ok(())
}

fn print_default_config() -> desk_scene_core::Result<()> {
    println!("{}", AppConfig::default().to_json_pretty()?);
    Ok(())
}

fn open_session(args: &SceneArgs, gfx: &mut CommandRecorder) -> desk_scene_core::Result<Session> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path).inspect_err(|err| {
            tracing::error!(%err, path = %path.display(), "configuration rejected");
        })?,
        None => AppConfig::default(),
    };
    if let Some(dir) = &args.assets {
        config.assets.directory = dir.clone();
    }

    let (importer, loader): (Box<dyn SceneImporter>, Box<dyn TextureLoader>) =
        if args.placeholder_assets {
            (
                Box::new(placeholder::PlaceholderImporter),
                Box::new(placeholder::CheckerboardLoader),
            )
        } else {
            (Box::new(obj::ObjImporter), Box::new(images::ImageLoader))
        };

    let mut session = Session::initialize(
        config,
        importer.as_ref(),
        loader.as_ref(),
        gfx,
        args.width,
        args.height,
    )
    .inspect_err(|err| {
        if err.is_initialization_failure() {
            tracing::error!(%err, "scene assets could not be loaded");
        } else {
            tracing::error!(%err, "scene could not be initialised");
        }
    })?;

    if let Some(rgb) = args.spot_ambient {
        tracing::info!(?rgb, "spotlight colour override");
        session.set_spot_ambient(rgb);
    }
    Ok(session)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Desk scene with an ejectable CD tray", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive a session headlessly and print the final placement.
    Run {
        #[command(flatten)]
        scene: SceneArgs,
        /// Frames per second of the virtual host.
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Stop after this many frames even if the sequence is still running.
        #[arg(long, default_value_t = 36_000)]
        max_frames: u64,
    },
    /// Record the command stream of a single frame as JSON.
    Trace {
        #[command(flatten)]
        scene: SceneArgs,
        /// Write the trace here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the default configuration.
    Config,
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory holding the model and texture files.
    #[arg(short, long)]
    assets: Option<PathBuf>,
    /// Use built-in boxes and checkerboards instead of asset files.
    #[arg(long)]
    placeholder_assets: bool,
    /// Comma separated keys to replay, one per frame (e.g. "right,right,c").
    #[arg(short, long)]
    keys: Option<String>,
    /// Spotlight ambient colour as r,g,b in [0, 1], applied from the first frame.
    #[arg(long, value_parser = parse_rgb)]
    spot_ambient: Option<[f32; 3]>,
    #[arg(long, default_value_t = 800)]
    width: u32,
    #[arg(long, default_value_t = 600)]
    height: u32,
}

impl SceneArgs {
    fn keys(&self) -> desk_scene_core::Result<Vec<Key>> {
        self.keys.as_deref().map(parse_keys).unwrap_or(Ok(Vec::new()))
    }
}

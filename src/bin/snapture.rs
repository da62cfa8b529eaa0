use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use snapture::{
    BoothConfig, DirectorySink, FILTERS, FRAME_COLORS, FilterId, FrameColor, LAYOUT_PRESETS,
    Photo, SessionController, Stage, StillsCamera, Tick, TimerDuration, TracingNotifier,
};

#[derive(Parser, Debug)]
#[command(name = "snapture", version)]
struct Cli {
    /// Booth configuration JSON. `SNAPTURE_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite photos into a strip PNG.
    Compose(ComposeArgs),
    /// Run a whole booth session against a stills camera and export the strip.
    Booth(BoothArgs),
    /// List the available filters.
    Filters,
    /// List the frame color palette.
    Frames,
    /// List the layout presets.
    Layouts,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Input photos, top to bottom.
    #[arg(long = "photo", required = true)]
    photos: Vec<PathBuf>,

    #[arg(long, default_value = "none")]
    filter: FilterId,

    /// Palette name, `#RRGGBB` or `linear-gradient(...)`.
    #[arg(long, default_value = "White")]
    frame: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Export scale factor (overrides the config).
    #[arg(long)]
    scale: Option<f64>,
}

#[derive(Parser, Debug)]
struct BoothArgs {
    /// Layout preset id or name.
    #[arg(long, default_value = "strip-3-vertical")]
    layout: String,

    /// Frames served by the camera, in capture order.
    #[arg(long = "stills")]
    stills: Vec<PathBuf>,

    /// Photos uploaded before the camera is used.
    #[arg(long = "upload")]
    uploads: Vec<PathBuf>,

    /// Countdown length in seconds (3, 5 or 10).
    #[arg(long)]
    timer: Option<TimerDuration>,

    #[arg(long, default_value = "none")]
    filter: FilterId,

    #[arg(long, default_value = "White")]
    frame: String,

    /// Directory the strip is written to (overrides the config).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Tick the countdown without sleeping.
    #[arg(long)]
    no_wait: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(cli.config.as_deref(), args),
        Command::Booth(args) => cmd_booth(cli.config.as_deref(), args),
        Command::Filters => {
            cmd_filters();
            Ok(())
        }
        Command::Frames => {
            cmd_frames();
            Ok(())
        }
        Command::Layouts => {
            cmd_layouts();
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BoothConfig> {
    let base = match path {
        Some(p) => BoothConfig::load(p)?,
        None => BoothConfig::default(),
    };
    Ok(base.with_env_overrides(|key| std::env::var(key).ok())?)
}

fn read_photos(paths: &[PathBuf]) -> anyhow::Result<Vec<Photo>> {
    paths
        .iter()
        .map(|p| Photo::read(p).map_err(anyhow::Error::from))
        .collect()
}

fn cmd_compose(config: Option<&Path>, args: ComposeArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(config)?;
    if let Some(scale) = args.scale {
        cfg.export_scale = scale;
        cfg.validate()?;
    }
    let frame = FrameColor::parse(&args.frame)?;
    let photos = read_photos(&args.photos)?;

    let compositor = cfg.compositor()?;
    let strip = compositor.composite(&photos, args.filter, &frame, &snapture::SystemClock)?;
    let png = strip.encode_png()?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png).with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_booth(config: Option<&Path>, args: BoothArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(config)?;
    if let Some(dir) = args.out_dir {
        cfg.out_dir = dir;
    }
    if let Some(timer) = args.timer {
        cfg.timer = timer;
    }
    let frame = FrameColor::parse(&args.frame)?;
    let stills = read_photos(&args.stills)?;
    let uploads = read_photos(&args.uploads)?;

    let mut booth =
        SessionController::from_config(&cfg, StillsCamera::new(stills), TracingNotifier)?;
    booth.select_layout_preset(&args.layout)?;
    booth.select_filter(args.filter)?;
    if !uploads.is_empty() {
        booth.upload_photos(uploads)?;
    }

    if booth.stage() == Stage::Capture {
        booth.start_camera()?;
        while !booth.poll_camera()? {
            pause(args.no_wait);
        }
        while booth.stage() == Stage::Capture {
            if !booth.start_countdown() {
                anyhow::bail!("countdown could not start");
            }
            loop {
                pause(args.no_wait);
                if booth.tick()? == Tick::Fire {
                    break;
                }
            }
        }
    }

    booth.select_frame_color(frame)?;
    let mut sink = DirectorySink::new(cfg.out_dir.clone());
    let path = booth.export(&mut sink)?;
    booth.reset();

    eprintln!("wrote {}", path.display());
    Ok(())
}

fn pause(no_wait: bool) {
    if !no_wait {
        std::thread::sleep(std::time::Duration::from_secs(1));
    }
}

fn cmd_filters() {
    for f in FILTERS {
        println!("{:<12} {:<10} {}", f.key, f.display_name, f.id.css());
    }
}

fn cmd_frames() {
    for f in FRAME_COLORS {
        let category = format!("{:?}", f.category);
        println!("{:<12} {:<9} {}", f.name, category, f.css());
    }
}

fn cmd_layouts() {
    for l in LAYOUT_PRESETS {
        println!(
            "{:<20} {:<9} {} photos  {}",
            l.id, l.name, l.photo_count, l.description
        );
    }
}

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lamina", version)]
struct Cli {
    /// Log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a scene and write the frame as a PNG.
    Frame(FrameArgs),
    /// Composite a scene repeatedly and print per-frame damage and cache statistics.
    Stats(StatsArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Compositor options JSON (defaults when omitted; `LAMINA_*` env vars override).
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Background color, `#rrggbb` or `#rrggbbaa`.
    #[arg(long)]
    clear: Option<String>,
}

#[derive(Parser, Debug)]
struct StatsArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Number of frames to composite with the tree retained between frames.
    #[arg(long, default_value_t = 3)]
    frames: u64,

    /// Compositor options JSON (defaults when omitted; `LAMINA_*` env vars override).
    #[arg(long)]
    opts: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_opts(path: Option<&Path>) -> anyhow::Result<lamina::CompositorOpts> {
    let opts = match path {
        Some(p) => lamina::CompositorOpts::from_path(p)?,
        None => lamina::CompositorOpts::default(),
    };
    Ok(opts.with_env_overrides()?)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = lamina::Scene::from_path(&args.in_path)?;
    let mut opts = load_opts(args.opts.as_deref())?;
    if let Some(clear) = &args.clear {
        opts = opts.with_clear(lamina::Color::from_hex(clear)?);
    }

    let mut compositor = lamina::Compositor::new(opts)?;
    let mut producer = lamina::CpuSurfaceProducer::new(opts.pool);
    let report = compositor.draw_frame(scene.build()?, &mut producer)?;
    let mut frame = producer
        .front()
        .context("compositor did not present a frame")?;
    frame.unpremultiply();
    tracing::debug!(layers_painted = report.layers_painted, "frame ready");

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_stats(args: StatsArgs) -> anyhow::Result<()> {
    if args.frames == 0 {
        anyhow::bail!("--frames must be > 0");
    }
    let scene = lamina::Scene::from_path(&args.in_path)?;
    let opts = load_opts(args.opts.as_deref())?;
    let mut compositor = lamina::Compositor::new(opts)?;
    let mut producer = lamina::CpuSurfaceProducer::new(opts.pool);
    let tree = scene.build()?;

    println!("frame  damage_rects  frame_damage                 painted  cache_hits  cache_entries");
    for _ in 0..args.frames {
        let r = compositor.draw_frame(tree.clone(), &mut producer)?;
        let d = r.damage.frame_damage();
        println!(
            "{:>5}  {:>12}  {:<27}  {:>7}  {:>10}  {:>13}",
            r.frame.0,
            r.damage.rects().len(),
            format!("({}, {}, {}, {})", d.x0, d.y0, d.x1, d.y1),
            r.layers_painted,
            r.raster_cache.hits,
            r.raster_cache.entries,
        );
    }
    Ok(())
}

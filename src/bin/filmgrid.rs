use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use filmgrid::assets::decode::decode_image;
use filmgrid::{
    BannerText, BurstRecord, FilmConfig, FilmStock, FramePayload, JobStatus, Pipeline,
    PosterMeta, RandomSelector, RunContext, Typesetter, develop_frames,
    export_motion, render_poster, stitch_burst,
};

#[derive(Parser, Debug)]
#[command(name = "filmgrid", version)]
struct Cli {
    /// JSON configuration; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Font for banners and posters; falls back to `FILMGRID_FONT` and system fonts.
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    /// Log stage details.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stitch four frames into a proof sheet.
    Stitch(StitchArgs),
    /// Develop a proof sheet with a film stock.
    Develop(DevelopArgs),
    /// Typeset a developed composite onto a poster.
    Poster(PosterArgs),
    /// Replay developed frames over a poster (requires `ffmpeg` on PATH).
    Motion(MotionArgs),
    /// Stitch, develop and typeset a burst, writing a JSON manifest.
    Run(RunArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct MetaArgs {
    /// Location name.
    #[arg(long)]
    location: Option<String>,
    /// Coordinates label.
    #[arg(long)]
    coords: Option<String>,
    /// Date label.
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args, Debug)]
struct StitchArgs {
    /// The four frames in capture order.
    #[arg(num_args = 4, required = true)]
    frames: Vec<PathBuf>,
    /// Output JPEG.
    #[arg(long)]
    out: PathBuf,
    #[command(flatten)]
    meta: MetaArgs,
}

#[derive(Args, Debug)]
struct DevelopArgs {
    /// Proof sheet to develop.
    sheet: PathBuf,
    /// Film stock (`color400`, `color800`, `mono400`, `mono_high`).
    #[arg(long, default_value_t = FilmStock::Color400)]
    stock: FilmStock,
    /// Seed for the blurred-quadrant choice.
    #[arg(long)]
    seed: Option<u64>,
    /// Directory for the composite and frames.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct PosterArgs {
    /// Developed composite.
    composite: PathBuf,
    /// Output JPEG.
    #[arg(long)]
    out: PathBuf,
    /// Stock whose label goes in the footer.
    #[arg(long)]
    stock: Option<FilmStock>,
    #[command(flatten)]
    meta: MetaArgs,
}

#[derive(Args, Debug)]
struct MotionArgs {
    /// Poster image.
    poster: PathBuf,
    /// The four developed frames in capture order.
    #[arg(long, num_args = 4, required = true)]
    frames: Vec<PathBuf>,
    /// Output clip.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// The four frames in capture order.
    #[arg(num_args = 4, required = true)]
    frames: Vec<PathBuf>,
    /// Record id; also names the manifest.
    #[arg(long, default_value = "burst")]
    id: String,
    /// Film stock.
    #[arg(long, default_value_t = FilmStock::Color400)]
    stock: FilmStock,
    /// Seed for the blurred-quadrant choice.
    #[arg(long)]
    seed: Option<u64>,
    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,
    #[command(flatten)]
    meta: MetaArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("filmgrid=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => FilmConfig::from_path(path)?,
        None => FilmConfig::default(),
    };
    config.validate()?;

    match cli.cmd {
        Command::Stitch(args) => cmd_stitch(&config, cli.font.as_deref(), args),
        Command::Develop(args) => cmd_develop(&config, args),
        Command::Poster(args) => cmd_poster(&config, cli.font.as_deref(), args),
        Command::Motion(args) => cmd_motion(&config, args),
        Command::Run(args) => cmd_run(config, cli.font.as_deref(), args),
    }
}

fn load_typesetter(font: Option<&Path>) -> anyhow::Result<Option<Typesetter>> {
    let ts = match font {
        Some(path) => Some(Typesetter::from_path(path)?),
        None => Typesetter::system()?,
    };
    if let Some(ts) = &ts {
        tracing::debug!(family = ts.family(), "font loaded");
    }
    Ok(ts)
}

fn selector(seed: Option<u64>) -> RandomSelector {
    match seed {
        Some(seed) => RandomSelector::seeded(seed),
        None => RandomSelector::from_entropy(),
    }
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read '{}'", path.display()))
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_stitch(config: &FilmConfig, font: Option<&Path>, args: StitchArgs) -> anyhow::Result<()> {
    let frames = args
        .frames
        .iter()
        .map(|p| read_file(p))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let mut typesetter = load_typesetter(font)?;
    let banner = BannerText {
        location: args.meta.location,
        coordinates: args.meta.coords,
        date: args.meta.date,
    };
    let banner = typesetter.is_some().then_some(&banner);
    let sheet = stitch_burst(&frames, &config.stitch_options(), banner, typesetter.as_mut())?;
    write_file(&args.out, &sheet.encoded.bytes)
}

fn cmd_develop(config: &FilmConfig, args: DevelopArgs) -> anyhow::Result<()> {
    let sheet = read_file(&args.sheet)?;
    let mut selector = selector(args.seed);
    let developed = develop_frames(&sheet, args.stock, &config.develop_options(), &mut selector)?;
    let composite = &developed.composite;
    write_file(
        &args.out_dir.join(format!("composite.{}", composite.format.extension())),
        &composite.bytes,
    )?;
    for (i, frame) in developed.frames.iter().enumerate() {
        write_file(
            &args.out_dir.join(format!("frame_{i}.{}", frame.format.extension())),
            &frame.bytes,
        )?;
    }
    eprintln!("blurred quadrants: {:?}", developed.blurred);
    Ok(())
}

fn cmd_poster(config: &FilmConfig, font: Option<&Path>, args: PosterArgs) -> anyhow::Result<()> {
    let composite = read_file(&args.composite)?;
    let mut typesetter =
        load_typesetter(font)?.context("no font found; pass --font or set FILMGRID_FONT")?;
    let meta = PosterMeta {
        location: args.meta.location,
        date: args.meta.date,
        stock_label: args.stock.map(|s| s.label().to_string()),
        coordinates: args.meta.coords,
    };
    let poster = render_poster(&composite, &meta, &mut typesetter, &config.poster)?;
    write_file(&args.out, &poster.encoded.bytes)
}

fn cmd_motion(config: &FilmConfig, args: MotionArgs) -> anyhow::Result<()> {
    let poster = decode_image(&read_file(&args.poster)?)?;
    let frames = args
        .frames
        .iter()
        .map(|p| Ok(decode_image(&read_file(p)?)?))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let clip = export_motion(&poster, &frames, &config.motion)?;
    eprintln!(
        "{} frames, {:.0} ms",
        clip.stats.frames_written, clip.stats.duration_ms
    );
    write_file(&args.out, &clip.bytes)
}

fn cmd_run(config: FilmConfig, font: Option<&Path>, args: RunArgs) -> anyhow::Result<()> {
    let frames = args
        .frames
        .iter()
        .map(|p| read_file(p).map(FramePayload::from))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let mut typesetter = load_typesetter(font)?;
    if typesetter.is_none() {
        tracing::warn!("no font found; banner and poster are skipped");
    }

    let mut record = BurstRecord::new(args.id, args.stock);
    record.location_name = args.meta.location;
    record.coordinates = args.meta.coords;
    record.date = args.meta.date;

    let pipeline = Pipeline::new(config)?;
    let mut selector = selector(args.seed);
    let mut observer = |r: &BurstRecord| tracing::info!(id = %r.id, status = ?r.status, "status");
    let report = pipeline.run(
        record,
        &frames,
        RunContext {
            selector: &mut selector,
            typesetter: typesetter.as_mut(),
            observer: &mut observer,
        },
    );

    let manifest = serde_json::to_vec_pretty(&report.record).context("serialize record")?;
    write_file(
        &args.out_dir.join(format!("{}.json", report.record.id)),
        &manifest,
    )?;
    if report.record.status != JobStatus::Completed {
        anyhow::bail!(
            "burst {} failed: {}",
            report.record.id,
            report.record.error.as_deref().unwrap_or("unknown error")
        );
    }

    let artifacts = report.into_result()?;
    if let Some(sheet) = &artifacts.sheet {
        write_file(&args.out_dir.join("sheet.jpg"), &sheet.encoded.bytes)?;
    }
    if let Some(developed) = &artifacts.developed {
        let composite = &developed.composite;
        write_file(
            &args.out_dir.join(format!("composite.{}", composite.format.extension())),
            &composite.bytes,
        )?;
        for (i, frame) in developed.frames.iter().enumerate() {
            write_file(
                &args.out_dir.join(format!("frame_{i}.{}", frame.format.extension())),
                &frame.bytes,
            )?;
        }
    }
    if let Some(poster) = &artifacts.poster {
        write_file(&args.out_dir.join("poster.jpg"), &poster.encoded.bytes)?;
    }
    Ok(())
}

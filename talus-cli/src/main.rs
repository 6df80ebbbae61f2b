use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rand::{SeedableRng, rngs::StdRng};
use talus::{
    AugmentConfig, CompositeConfig, DirStore, PlacementMode, SynthConfig, SynthStores,
    augment_folder, composite_batch, extract_cutouts, run_synthesis,
};

#[derive(Parser, Debug)]
#[command(name = "talus", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract alpha-matted cutouts from annotated image + mask pairs.
    Extract(ExtractArgs),
    /// Generate randomized geometric variants of image + mask pairs.
    Augment(AugmentArgs),
    /// Composite augmented cutouts onto background photos.
    Composite(CompositeArgs),
    /// Run the full extract -> augment -> composite chain.
    Synth(SynthArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Directory of annotated source photos.
    #[arg(long)]
    images: PathBuf,

    /// Directory of label masks (paired with images by stem).
    #[arg(long)]
    masks: PathBuf,

    /// Output directory for 4-channel cutouts.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct AugmentArgs {
    /// Directory of input images (typically extracted cutouts).
    #[arg(long)]
    images: PathBuf,

    /// Directory of label masks (paired with images by stem).
    #[arg(long)]
    masks: PathBuf,

    /// Output directory for augmented images.
    #[arg(long)]
    out_images: PathBuf,

    /// Output directory for augmented masks.
    #[arg(long)]
    out_masks: PathBuf,

    /// Variants generated per input pair.
    #[arg(long, default_value_t = 5)]
    count: u32,

    /// Rotation angles in degrees, drawn uniformly per variant.
    #[arg(long, value_delimiter = ',', default_values_t = [0.0, 90.0, 180.0, 270.0])]
    angles: Vec<f32>,

    /// Probability of a horizontal mirror.
    #[arg(long, default_value_t = 0.5)]
    flip_prob: f32,

    /// Lower bound of the uniform scale range.
    #[arg(long, default_value_t = 0.8)]
    scale_low: f32,

    /// Upper bound of the uniform scale range.
    #[arg(long, default_value_t = 1.2)]
    scale_high: f32,

    /// Fix the random seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct CompositeArgs {
    /// Directory of background photos.
    #[arg(long)]
    backgrounds: PathBuf,

    /// Directory of alpha-matted foreground assets.
    #[arg(long)]
    foregrounds: PathBuf,

    /// Directory of masks paired with the foregrounds by stem.
    #[arg(long)]
    masks: PathBuf,

    /// Output directory for composite images.
    #[arg(long)]
    out_images: PathBuf,

    /// Output directory for composite masks.
    #[arg(long)]
    out_masks: PathBuf,

    /// Foregrounds sampled per background (clamped to the pool size).
    #[arg(long, default_value_t = 70)]
    count: u32,

    /// Scatter foregrounds on the background instead of resizing the
    /// background to each foreground.
    #[arg(long, default_value_t = false)]
    scatter: bool,

    /// Fix the random seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct SynthArgs {
    /// Directory of annotated source photos.
    #[arg(long)]
    images: PathBuf,

    /// Directory of label masks.
    #[arg(long)]
    masks: PathBuf,

    /// Directory of background photos.
    #[arg(long)]
    backgrounds: PathBuf,

    /// Working directory for intermediate cutouts and variants.
    #[arg(long)]
    work: PathBuf,

    /// Output directory; composites land in images/ and masks/ below it.
    #[arg(long)]
    out: PathBuf,

    /// Optional JSON configuration file (missing fields take defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fix the random seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Extract(args) => cmd_extract(args),
        Command::Augment(args) => cmd_augment(args),
        Command::Composite(args) => cmd_composite(args),
        Command::Synth(args) => cmd_synth(args),
    }
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn cmd_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let images = DirStore::open(&args.images)?;
    let masks = DirStore::open(&args.masks)?;
    let mut out = DirStore::create(&args.out)?;

    let stats = extract_cutouts(&images, &masks, &mut out)?;
    eprintln!(
        "extracted {} cutouts into {} ({} skipped)",
        stats.written,
        out.root().display(),
        stats.skipped
    );
    Ok(())
}

fn cmd_augment(args: AugmentArgs) -> anyhow::Result<()> {
    let cfg = AugmentConfig {
        variant_count: args.count,
        rotation_angles: args.angles,
        flip_probability: args.flip_prob,
        scale_range: (args.scale_low, args.scale_high),
    };

    let images = DirStore::open(&args.images)?;
    let masks = DirStore::open(&args.masks)?;
    let mut out_images = DirStore::create(&args.out_images)?;
    let mut out_masks = DirStore::create(&args.out_masks)?;

    let mut rng = rng_for(args.seed);
    let stats = augment_folder(
        &images,
        &masks,
        &mut out_images,
        &mut out_masks,
        &cfg,
        &mut rng,
    )?;
    eprintln!(
        "wrote {} augmented pairs ({} inputs skipped)",
        stats.written, stats.skipped
    );
    Ok(())
}

fn cmd_composite(args: CompositeArgs) -> anyhow::Result<()> {
    let cfg = CompositeConfig {
        overlay_count: args.count,
        placement: if args.scatter {
            PlacementMode::ScatterOnBackground
        } else {
            PlacementMode::MatchForeground
        },
    };

    let backgrounds = DirStore::open(&args.backgrounds)?;
    let foregrounds = DirStore::open(&args.foregrounds)?;
    let masks = DirStore::open(&args.masks)?;
    let mut out_images = DirStore::create(&args.out_images)?;
    let mut out_masks = DirStore::create(&args.out_masks)?;

    let mut rng = rng_for(args.seed);
    let stats = composite_batch(
        &backgrounds,
        &foregrounds,
        &masks,
        &mut out_images,
        &mut out_masks,
        &cfg,
        &mut rng,
    )?;
    eprintln!(
        "wrote {} composites ({} iterations skipped)",
        stats.written, stats.skipped
    );
    Ok(())
}

fn cmd_synth(args: SynthArgs) -> anyhow::Result<()> {
    let cfg = match &args.config {
        Some(path) => SynthConfig::from_path(path)?,
        None => SynthConfig::default(),
    };

    let images = DirStore::open(&args.images)?;
    let masks = DirStore::open(&args.masks)?;
    let backgrounds = DirStore::open(&args.backgrounds)?;
    let mut cutouts = DirStore::create(args.work.join("cutouts"))?;
    let mut aug_images = DirStore::create(args.work.join("expanded").join("images"))?;
    let mut aug_masks = DirStore::create(args.work.join("expanded").join("masks"))?;
    let mut out_images = DirStore::create(args.out.join("images"))?;
    let mut out_masks = DirStore::create(args.out.join("masks"))?;

    let mut rng = rng_for(args.seed);
    let stats = run_synthesis(
        SynthStores {
            images: &images,
            masks: &masks,
            backgrounds: &backgrounds,
            cutouts: &mut cutouts,
            aug_images: &mut aug_images,
            aug_masks: &mut aug_masks,
            out_images: &mut out_images,
            out_masks: &mut out_masks,
        },
        &cfg,
        &mut rng,
    )?;

    eprintln!(
        "extract: {} written / {} skipped",
        stats.extract.written, stats.extract.skipped
    );
    eprintln!(
        "augment: {} written / {} skipped",
        stats.augment.written, stats.augment.skipped
    );
    eprintln!(
        "composite: {} written / {} skipped",
        stats.composite.written, stats.composite.skipped
    );
    Ok(())
}

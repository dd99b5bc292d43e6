use crate::charset::load_charset;
use crate::config::{CollisionPolicy, Config};
use crate::dataset::{GenerateOptions, build_layout, persist};
use crate::error::GenError;
use crate::fonts::load_fonts;
use crate::raster::{CellStyle, parse_hex_color};
use clap::Parser;
use indicatif::ProgressBar;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Render the labeled character dataset")]
pub struct GenerateArgs {
    /// Charset text file (whitespace-separated characters)
    #[arg(long, default_value = "charset.txt", value_name = "FILE")]
    pub charset: PathBuf,

    /// Directory tree to scan for .ttf/.otf files
    #[arg(long, default_value = "fonts", value_name = "DIR")]
    pub fonts: PathBuf,

    /// Output root directory
    #[arg(long, default_value = "dataset", value_name = "DIR")]
    pub output: PathBuf,

    /// Class tree directory name under the output root
    #[arg(long, default_value = "charset", value_name = "NAME")]
    pub dir_name: String,

    /// Cell size in pixels as WxH (defaults from glyphgen.toml)
    #[arg(long, value_name = "WxH")]
    pub cell: Option<String>,

    /// Replicas rendered per (font, character) pair
    #[arg(long)]
    pub replicas: Option<u32>,

    /// Pass replicas after the first through a random transform
    #[arg(long)]
    pub augment: bool,

    /// Disable the train/test split
    #[arg(long)]
    pub no_split: bool,

    /// Fraction of samples routed to the test partition
    #[arg(long)]
    pub split_ratio: Option<f64>,

    /// Create the output root if it does not exist
    #[arg(long)]
    pub create_root: bool,

    /// Disable random placement jitter
    #[arg(long)]
    pub no_jitter: bool,

    /// RNG seed for reproducible jitter and augmentation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Font name collision policy
    #[arg(long, value_enum)]
    pub on_name_collision: Option<CollisionPolicy>,
}

pub fn run(args: GenerateArgs) -> bool {
    match run_impl(args) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("[generate] ERROR: {e:#}");
            false
        }
    }
}

fn run_impl(args: GenerateArgs) -> anyhow::Result<()> {
    let config = Config::read()?;
    let defaults = &config.generator;

    let cell = match &args.cell {
        Some(s) => super::parse_size(s)?,
        None => (defaults.cell_width, defaults.cell_height),
    };
    let style = CellStyle {
        background: parse_hex_color(&defaults.background)?,
        foreground: parse_hex_color(&defaults.foreground)?,
    };
    let replicas = args.replicas.unwrap_or(defaults.replicas);
    let augment = args.augment || defaults.augment;
    let split = !args.no_split && defaults.split;
    let split_ratio = args.split_ratio.unwrap_or(defaults.split_ratio);
    let policy = args.on_name_collision.unwrap_or(defaults.on_name_collision);

    let charset = load_charset(&args.charset)?;
    if charset.is_empty() {
        return Err(GenError::MissingPrerequisite("charset").into());
    }
    println!(
        "[generate] Loaded {} characters from {}",
        charset.len(),
        args.charset.display()
    );

    let mut fonts = load_fonts(&args.fonts, defaults.seed_size, policy)?;
    for (path, reason) in fonts.skipped() {
        eprintln!("[generate] Skipped invalid font {}: {reason}", path.display());
    }
    if fonts.is_empty() {
        return Err(GenError::MissingPrerequisite("font collection").into());
    }
    println!(
        "[generate] Loaded {} font(s) from {}",
        fonts.len(),
        args.fonts.display()
    );

    let roots = build_layout(&charset, &args.output, &args.dir_name, split, args.create_root)?;

    let opts = GenerateOptions {
        cell,
        style,
        replicas,
        augment,
        jitter: !args.no_jitter,
        seed: args.seed,
    };

    let total = fonts.len() as u64 * charset.len() as u64 * replicas as u64;
    let bar = ProgressBar::new(total);
    let report = persist(&charset, &mut fonts, &opts, &roots, split_ratio, Some(&bar))?;
    bar.finish_and_clear();

    for font in &report.abandoned_fonts {
        eprintln!("[generate] Skipped unusable font '{font}'");
    }
    println!(
        "[generate] ✅ Wrote {} sample(s) under {} ({} usable font(s), {} skipped)",
        report.written,
        args.output.display(),
        fonts.len() - report.abandoned_fonts.len(),
        report.abandoned_fonts.len() + fonts.skipped().len()
    );

    Ok(())
}

use crate::augment::augment_directory;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Apply random transforms to images in an existing directory")]
pub struct AugmentArgs {
    /// Directory to look for images (does not recurse by default)
    #[arg(short = 'i', long, value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Output directory
    #[arg(short = 'o', long, default_value = "augmented_images", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Input image format to look for
    #[arg(short = 't', long, default_value = "png")]
    pub format: String,

    /// Number of augmented images to produce (one pass over the inputs by default)
    #[arg(short = 'n', long)]
    pub limit: Option<u64>,

    /// Recursively find images in the input directory
    #[arg(short, long)]
    pub recurse: bool,

    /// Do not keep class-label subdirectories in the output
    #[arg(long)]
    pub ignore_label: bool,

    /// RNG seed for reproducible transforms
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: AugmentArgs) -> bool {
    match run_impl(args) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("[augment] ERROR: {e:#}");
            false
        }
    }
}

fn run_impl(args: AugmentArgs) -> anyhow::Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let written = augment_directory(
        &args.input_dir,
        &args.output_dir,
        args.recurse,
        args.limit,
        args.ignore_label,
        &args.format,
        &mut rng,
    )?;

    println!(
        "[augment] ✅ Wrote {} augmented image(s) under {}",
        written,
        args.output_dir.display()
    );

    Ok(())
}

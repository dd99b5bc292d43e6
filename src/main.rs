mod augment;
mod charset;
mod commands;
mod config;
mod dataset;
mod error;
mod fonts;
mod raster;
mod sprite;

use clap::{Parser, Subcommand, builder::styling};

#[derive(Parser)]
#[command(name = "glyphgen")]
#[command(about = "Render labeled character-image datasets from TrueType fonts")]
#[command(version = env!("GLYPHGEN_VERSION"))]
#[command(long_version = env!("GLYPHGEN_VERSION"))]
#[command(
    styles = styling::Styles::styled()
        .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Cyan.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default())
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the labeled character dataset
    Generate(commands::generate::GenerateArgs),
    /// Build one preview sprite sheet per font
    Sprites(commands::sprites::SpritesArgs),
    /// Apply random transforms to images in an existing directory
    Augment(commands::augment::AugmentArgs),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Sprites(args) => commands::sprites::run(args),
        Commands::Augment(args) => commands::augment::run(args),
    };

    std::process::exit(if result { 0 } else { 1 });
}

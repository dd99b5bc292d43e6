use crate::charset::load_charset;
use crate::config::{CollisionPolicy, Config};
use crate::error::GenError;
use crate::fonts::{estimate_size, load_fonts};
use crate::raster::cell::blit_coverage;
use crate::raster::{Jitter, locate, parse_hex_color};
use crate::sprite::{Mode, blank_board, factor_near_square, pack_sequential};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Build one preview sprite sheet per font")]
pub struct SpritesArgs {
    /// Charset text file (whitespace-separated characters)
    #[arg(long, default_value = "charset.txt", value_name = "FILE")]
    pub charset: PathBuf,

    /// Directory tree to scan for .ttf/.otf files
    #[arg(long, default_value = "fonts", value_name = "DIR")]
    pub fonts: PathBuf,

    /// Output root; boards land in <OUTPUT>/sprites/
    #[arg(long, default_value = "dataset", value_name = "DIR")]
    pub output: PathBuf,

    /// Cell size in pixels as WxH (defaults from glyphgen.toml)
    #[arg(long, value_name = "WxH")]
    pub cell: Option<String>,

    /// Board orientation when the grid is not square
    #[arg(long, value_enum, default_value = "wide")]
    pub mode: Mode,

    /// Disable random placement jitter
    #[arg(long)]
    pub no_jitter: bool,

    /// RNG seed for reproducible jitter
    #[arg(long)]
    pub seed: Option<u64>,

    /// Font name collision policy
    #[arg(long, value_enum)]
    pub on_name_collision: Option<CollisionPolicy>,
}

pub fn run(args: SpritesArgs) -> bool {
    match run_impl(args) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("[sprites] ERROR: {e:#}");
            false
        }
    }
}

fn run_impl(args: SpritesArgs) -> anyhow::Result<()> {
    let config = Config::read()?;
    let defaults = &config.generator;

    let cell = match &args.cell {
        Some(s) => super::parse_size(s)?,
        None => (defaults.cell_width, defaults.cell_height),
    };
    let background = parse_hex_color(&defaults.background)?;
    let ink = parse_hex_color(&defaults.foreground)?;
    let policy = args.on_name_collision.unwrap_or(defaults.on_name_collision);

    let charset = load_charset(&args.charset)?;
    if charset.is_empty() {
        return Err(GenError::MissingPrerequisite("charset").into());
    }

    let mut fonts = load_fonts(&args.fonts, defaults.seed_size, policy)?;
    if fonts.is_empty() {
        return Err(GenError::MissingPrerequisite("font collection").into());
    }

    let sprites_dir = args.output.join("sprites");
    if sprites_dir.is_dir() && sprites_dir.read_dir()?.next().is_some() {
        return Err(GenError::TargetExists(sprites_dir).into());
    }
    std::fs::create_dir_all(&sprites_dir)?;

    let grid = factor_near_square(charset.len() as u32, args.mode);
    let board_size = (grid.0 * cell.0, grid.1 * cell.1);
    let template = blank_board(grid, cell, background);
    let positions = pack_sequential(charset.len() as u32, cell, board_size);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let eps = cell.0.max(cell.1) / 10;

    for entry in fonts.entries_mut() {
        let board_path = sprites_dir.join(format!("{}-board.png", entry.name()));
        if board_path.is_file() {
            println!("[sprites] Skipping existing {}", board_path.display());
            continue;
        }

        match estimate_size(entry, "H", cell, eps) {
            Ok(size) => entry.set_size(size),
            Err(err) => {
                eprintln!("[sprites] Skipping font '{}': {err}", entry.name());
                continue;
            }
        }

        println!("[sprites] Creating spritesheet {} ...", board_path.display());
        let mut board = template.clone();
        let mut usable = true;

        for (&ch, &(cx, cy)) in charset.iter().zip(&positions) {
            let glyph = match entry.rasterize(ch) {
                Ok(glyph) => glyph,
                Err(reason) => {
                    eprintln!("[sprites] Skipping font '{}': {reason}", entry.name());
                    usable = false;
                    break;
                }
            };

            let jitter = if args.no_jitter {
                Jitter::None
            } else {
                Jitter::Random(&mut rng)
            };
            let (x, y) = locate(
                cell,
                (glyph.width, glyph.height),
                (glyph.left_bearing, glyph.top_bearing),
                jitter,
            );

            blit_coverage(
                &mut board,
                cx as i32 + x + glyph.left_bearing,
                cy as i32 + y + glyph.top_bearing,
                &glyph,
                ink,
            );
        }

        if !usable {
            continue;
        }

        board
            .save(&board_path)
            .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", board_path.display()))?;
        println!("[sprites] ✅ Wrote {}", board_path.display());
    }

    Ok(())
}

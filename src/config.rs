use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FILE_NAME: &str = "glyphgen.toml";

/// Run configuration, read from `glyphgen.toml` when present.
///
/// This object replaces any process-wide state: everything a generation run
/// needs is carried explicitly from here into the generator.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// Generator options (the `[generator]` table)
    #[serde(default)]
    pub generator: GeneratorOptions,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeneratorOptions {
    /// Output cell width in pixels
    #[serde(default = "default_cell")]
    pub cell_width: u32,

    /// Output cell height in pixels
    #[serde(default = "default_cell")]
    pub cell_height: u32,

    /// Cell background color as #rrggbb
    #[serde(default = "default_background")]
    pub background: String,

    /// Glyph ink color as #rrggbb
    #[serde(default = "default_foreground")]
    pub foreground: String,

    /// Replicas rendered per (font, character) pair
    #[serde(default = "default_replicas")]
    pub replicas: u32,

    /// Pass replicas after the first through a random transform
    #[serde(default)]
    pub augment: bool,

    /// Duplicate the class tree into train/test partitions
    #[serde(default = "default_split")]
    pub split: bool,

    /// Target fraction of samples routed to the test partition
    #[serde(default = "default_split_ratio")]
    pub split_ratio: f64,

    /// Font size the estimator starts its search from
    #[serde(default = "default_seed_size")]
    pub seed_size: u32,

    /// What to do when two font files share a name stem
    #[serde(default)]
    pub on_name_collision: CollisionPolicy,
}

/// Policy for font files whose name stems collide across subdirectories.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Later entry silently replaces the earlier one
    Overwrite,
    /// Later entry replaces the earlier one, with a warning
    #[default]
    Warn,
    /// Collisions abort font loading
    Error,
}

fn default_cell() -> u32 {
    32
}

fn default_background() -> String {
    "#f6f6f6".to_string()
}

fn default_foreground() -> String {
    "#000000".to_string()
}

fn default_replicas() -> u32 {
    1
}

fn default_split() -> bool {
    true
}

fn default_split_ratio() -> f64 {
    0.2
}

fn default_seed_size() -> u32 {
    16
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        toml::from_str("").expect("empty table deserializes via serde defaults")
    }
}

impl Config {
    /// Read `glyphgen.toml` from the current directory; defaults when absent.
    pub fn read() -> Result<Self> {
        Self::read_from(Path::new(FILE_NAME))
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        Ok(config)
    }
}

use crate::augment::Transform;
use crate::error::GenError;
use crate::fonts::{FontCollection, FontEntry, estimate_size};
use crate::raster::{CellStyle, Jitter, render_cell};
use anyhow::{Context, Result};
use image::RgbImage;
use indicatif::ProgressBar;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::btree_map;
use std::path::PathBuf;

/// Everything one generation run needs, carried explicitly instead of living
/// in process-wide state.
pub struct GenerateOptions {
    pub cell: (u32, u32),
    pub style: CellStyle,
    pub replicas: u32,
    pub augment: bool,
    pub jitter: bool,
    /// RNG seed for jitter and transform choice; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl GenerateOptions {
    /// Fit tolerance for the size estimator: a tenth of the larger cell side.
    pub fn fit_tolerance(&self) -> u32 {
        self.cell.0.max(self.cell.1) / 10
    }
}

/// One rendered cell, alive only between production and persistence.
pub struct Sample {
    pub ch: char,
    pub font_name: String,
    pub replica: u32,
    pub image: RgbImage,
}

/// Pull-based lazy producer over the (font x character x replica) product
/// space. Each call renders exactly one cell, so peak memory stays at one
/// image regardless of run size.
///
/// A font that proves unusable is abandoned for its entire remaining charset
/// (a font that fails once is assumed broken) and recorded; generation
/// continues with the next font.
pub struct Samples<'a> {
    charset: &'a [char],
    fonts: btree_map::ValuesMut<'a, String, FontEntry>,
    current: Option<&'a mut FontEntry>,
    char_idx: usize,
    replica: u32,
    opts: &'a GenerateOptions,
    rng: StdRng,
    abandoned: Vec<String>,
}

impl<'a> Samples<'a> {
    pub fn new(charset: &'a [char], fonts: &'a mut FontCollection, opts: &'a GenerateOptions) -> Self {
        let rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            charset,
            fonts: fonts.entries_mut(),
            current: None,
            char_idx: 0,
            replica: 0,
            opts,
            rng,
            abandoned: Vec::new(),
        }
    }

    /// Names of fonts abandoned mid-run as unusable.
    pub fn abandoned(&self) -> &[String] {
        &self.abandoned
    }

    fn abandon_font(&mut self, err: &GenError) {
        if let Some(entry) = &self.current {
            if err.is_font_unusable() {
                log::warn!("skipping font '{}': {err}", entry.name());
            } else {
                log::error!("abandoning font '{}': {err}", entry.name());
            }
            self.abandoned.push(entry.name().to_string());
        }
        self.current = None;
    }
}

impl Iterator for Samples<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.opts.replicas == 0 {
            return None;
        }

        loop {
            if self.current.is_none() {
                self.current = self.fonts.next();
                self.current.as_ref()?;
                self.char_idx = 0;
                self.replica = 0;
            }

            if self.char_idx >= self.charset.len() {
                self.current = None;
                continue;
            }

            let ch = self.charset[self.char_idx];
            let entry = self.current.as_deref_mut().expect("current font set above");

            // Refit the size once per (font, character); the cache write-back
            // keeps the next character's search warm.
            if self.replica == 0 {
                match estimate_size(
                    entry,
                    &ch.to_string(),
                    self.opts.cell,
                    self.opts.fit_tolerance(),
                ) {
                    Ok(size) => entry.set_size(size),
                    Err(err) => {
                        self.abandon_font(&err);
                        continue;
                    }
                }
            }

            let jitter = if self.opts.jitter {
                Jitter::Random(&mut self.rng)
            } else {
                Jitter::None
            };
            let image = match render_cell(entry, ch, self.opts.cell, &self.opts.style, jitter) {
                Ok(image) => image,
                Err(err) => {
                    self.abandon_font(&err);
                    continue;
                }
            };

            // Replica 0 is always the clean baseline.
            let image = if self.opts.augment && self.replica > 0 {
                let transform = Transform::random(&mut self.rng);
                transform.apply(&image, self.opts.style.background, &mut self.rng)
            } else {
                image
            };

            let sample = Sample {
                ch,
                font_name: entry.name().to_string(),
                replica: self.replica,
                image,
            };

            self.replica += 1;
            if self.replica >= self.opts.replicas {
                self.replica = 0;
                self.char_idx += 1;
            }

            return Some(sample);
        }
    }
}

/// Train/test routing rule. The index is global across the whole run, not
/// per class, so small classes or early termination can skew per-class
/// ratios; that skew is deliberate and kept as-is.
pub struct SplitRouter {
    period: u64,
}

impl SplitRouter {
    pub fn new(ratio: f64) -> Result<Self> {
        if !(ratio > 0.0 && ratio <= 1.0) {
            anyhow::bail!("split ratio must be in (0, 1], got {ratio}");
        }
        Ok(Self {
            period: ((1.0 / ratio).round() as u64).max(1),
        })
    }

    /// Sample `index` lands in the test partition when it is a multiple of
    /// `round(1 / ratio)`.
    pub fn is_test(&self, index: u64) -> bool {
        index % self.period == 0
    }
}

/// Outcome of a persistence run.
#[derive(Debug)]
pub struct PersistReport {
    pub written: u64,
    pub abandoned_fonts: Vec<String>,
}

/// Drive the sample producer and write each image under its class directory,
/// routing between the train and test roots by the global sample index.
///
/// `roots` comes from `build_layout`: one root, or train-then-test. Files are
/// named `<font_name>_<replica>.png`, unique within their class directory.
/// Stopping early (error or consumer abort) leaves written files in place.
pub fn persist(
    charset: &[char],
    fonts: &mut FontCollection,
    opts: &GenerateOptions,
    roots: &[PathBuf],
    split_ratio: f64,
    progress: Option<&ProgressBar>,
) -> Result<PersistReport> {
    if charset.is_empty() {
        return Err(GenError::MissingPrerequisite("charset").into());
    }
    if fonts.is_empty() {
        return Err(GenError::MissingPrerequisite("font collection").into());
    }

    let router = match roots.len() {
        1 => None,
        2 => Some(SplitRouter::new(split_ratio)?),
        n => anyhow::bail!("expected 1 or 2 dataset roots, got {n}"),
    };

    let mut samples = Samples::new(charset, fonts, opts);
    let mut written = 0u64;

    for sample in &mut samples {
        let root = match &router {
            Some(router) if router.is_test(written) => &roots[1],
            _ => &roots[0],
        };

        let path = root
            .join((sample.ch as u32).to_string())
            .join(format!("{}_{}.png", sample.font_name, sample.replica));
        sample
            .image
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;

        written += 1;
        if let Some(bar) = progress {
            bar.inc(1);
        }
    }

    Ok(PersistReport {
        written,
        abandoned_fonts: samples.abandoned().to_vec(),
    })
}

use crate::config::CollisionPolicy;
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A rasterized glyph: ink box, bearings relative to the typographic origin,
/// and an alpha coverage bitmap of `width * height` bytes.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub width: u32,
    pub height: u32,
    /// Horizontal distance from the pen position to the first ink column.
    pub left_bearing: i32,
    /// Vertical distance from the top of the line box to the first ink row.
    pub top_bearing: i32,
    pub coverage: Vec<u8>,
}

/// Measuring and rasterizing surface of a loaded font.
///
/// Errors mean the font cannot be instantiated at the requested size; callers
/// translate them into a font-unusable condition and drop the whole font.
pub trait FontResource: Send + Sync {
    fn measure(&self, text: &str, size: u32) -> Result<(u32, u32), String>;
    fn rasterize(&self, ch: char, size: u32) -> Result<Glyph, String>;
}

struct TrueTypeResource {
    font: fontdue::Font,
}

impl FontResource for TrueTypeResource {
    fn measure(&self, text: &str, size: u32) -> Result<(u32, u32), String> {
        if size == 0 {
            return Err("font size must be positive".to_string());
        }
        let px = size as f32;

        let mut width = 0.0f32;
        let mut height = 0usize;
        for ch in text.chars() {
            let metrics = self.font.metrics(ch, px);
            width += metrics.advance_width;
            height = height.max(metrics.height);
        }

        Ok((width.ceil() as u32, height as u32))
    }

    fn rasterize(&self, ch: char, size: u32) -> Result<Glyph, String> {
        if size == 0 {
            return Err("font size must be positive".to_string());
        }
        let px = size as f32;

        let (metrics, coverage) = self.font.rasterize(ch, px);
        let ascent = self
            .font
            .horizontal_line_metrics(px)
            .map(|lm| lm.ascent)
            .unwrap_or(px);
        let top_bearing = (ascent - (metrics.ymin as f32 + metrics.height as f32)).round() as i32;

        Ok(Glyph {
            width: metrics.width as u32,
            height: metrics.height as u32,
            left_bearing: metrics.xmin,
            top_bearing,
            coverage,
        })
    }
}

/// A named, renderable font with a cached current size.
///
/// `size` is the only mutable shared state in the system: the orchestrator
/// writes the estimator's result back here so the next character's search
/// starts warm instead of from scratch.
pub struct FontEntry {
    name: String,
    size: u32,
    resource: Box<dyn FontResource>,
}

impl FontEntry {
    pub fn new(name: impl Into<String>, size: u32, resource: Box<dyn FontResource>) -> Self {
        Self {
            name: name.into(),
            size,
            resource,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    /// Pixel bounding box of `text` at an explicit size.
    pub fn measure(&self, text: &str, size: u32) -> Result<(u32, u32), String> {
        self.resource.measure(text, size)
    }

    /// Rasterize one character at the entry's current size.
    pub fn rasterize(&self, ch: char) -> Result<Glyph, String> {
        self.resource.rasterize(ch, self.size)
    }
}

/// All usable fonts of a run, keyed by name stem. BTreeMap keeps iteration
/// order deterministic across runs.
#[derive(Default)]
pub struct FontCollection {
    entries: BTreeMap<String, FontEntry>,
    skipped: Vec<(PathBuf, String)>,
}

impl FontCollection {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FontEntry> {
        self.entries.get(name)
    }

    pub fn entries_mut(&mut self) -> btree_map::ValuesMut<'_, String, FontEntry> {
        self.entries.values_mut()
    }

    /// Fonts that failed to load, with the reason each was dropped.
    pub fn skipped(&self) -> &[(PathBuf, String)] {
        &self.skipped
    }

    pub fn record_skip(&mut self, path: PathBuf, reason: String) {
        self.skipped.push((path, reason));
    }

    pub fn insert(&mut self, entry: FontEntry, policy: CollisionPolicy) -> Result<()> {
        if self.entries.contains_key(entry.name()) {
            match policy {
                CollisionPolicy::Overwrite => {}
                CollisionPolicy::Warn => {
                    log::warn!(
                        "font name '{}' appears more than once; keeping the later file",
                        entry.name()
                    );
                }
                CollisionPolicy::Error => {
                    anyhow::bail!("font name '{}' appears more than once", entry.name());
                }
            }
        }
        self.entries.insert(entry.name().to_string(), entry);
        Ok(())
    }
}

/// Walk `dir` for TrueType/OpenType files and load each into the collection.
///
/// Files that fail to parse are recorded skips, never fatal; name-stem
/// collisions follow `policy`.
pub fn load_fonts(dir: &Path, seed_size: u32, policy: CollisionPolicy) -> Result<FontCollection> {
    let candidate = Regex::new(r"(?i)\.(ttf|otf)$").expect("static pattern compiles");

    let mut fonts = FontCollection::default();
    for entry in WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if !candidate.is_match(file_name) {
            continue;
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("font file has no valid name stem: {}", path.display()))?
            .to_string();

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font file {}", path.display()))?;

        match fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()) {
            Ok(font) => {
                let resource = Box::new(TrueTypeResource { font });
                fonts.insert(FontEntry::new(name, seed_size, resource), policy)?;
            }
            Err(reason) => {
                log::warn!("invalid font '{}': {reason}", path.display());
                fonts.record_skip(path.to_path_buf(), reason.to_string());
            }
        }
    }

    Ok(fonts)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Fake font whose measured box is `(size, size)` and whose glyphs are
    /// fully-inked squares of half the size.
    pub struct SquareFake;

    impl FontResource for SquareFake {
        fn measure(&self, _text: &str, size: u32) -> Result<(u32, u32), String> {
            Ok((size, size))
        }

        fn rasterize(&self, _ch: char, size: u32) -> Result<Glyph, String> {
            let side = (size / 2).max(1);
            Ok(Glyph {
                width: side,
                height: side,
                left_bearing: 1,
                top_bearing: 2,
                coverage: vec![255; (side * side) as usize],
            })
        }
    }

    /// Fake font that refuses every request, as a corrupt file would.
    pub struct BrokenFake;

    impl FontResource for BrokenFake {
        fn measure(&self, _text: &str, _size: u32) -> Result<(u32, u32), String> {
            Err("cannot instantiate font".to_string())
        }

        fn rasterize(&self, _ch: char, _size: u32) -> Result<Glyph, String> {
            Err("cannot instantiate font".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::SquareFake;
    use super::*;

    fn entry(name: &str) -> FontEntry {
        FontEntry::new(name, 16, Box::new(SquareFake))
    }

    #[test]
    fn size_cache_is_mutable() {
        let mut e = entry("sans");
        assert_eq!(e.size(), 16);
        e.set_size(28);
        assert_eq!(e.size(), 28);
    }

    #[test]
    fn collision_policy_warn_overwrites() {
        let mut fonts = FontCollection::default();
        fonts.insert(entry("dup"), CollisionPolicy::Warn).unwrap();
        fonts.insert(entry("dup"), CollisionPolicy::Warn).unwrap();
        assert_eq!(fonts.len(), 1);
    }

    #[test]
    fn collision_policy_error_fails() {
        let mut fonts = FontCollection::default();
        fonts.insert(entry("dup"), CollisionPolicy::Error).unwrap();
        assert!(fonts.insert(entry("dup"), CollisionPolicy::Error).is_err());
    }

    #[test]
    fn skips_are_recorded_not_fatal() {
        let mut fonts = FontCollection::default();
        fonts.record_skip(PathBuf::from("bad.ttf"), "broken table".to_string());
        assert_eq!(fonts.skipped().len(), 1);
        assert!(fonts.is_empty());
    }

    #[test]
    fn load_fonts_ignores_non_font_files() {
        let dir = assert_fs::TempDir::new().unwrap();
        use assert_fs::prelude::*;
        dir.child("readme.txt").write_str("not a font").unwrap();
        dir.child("image.png").write_binary(&[0u8; 8]).unwrap();

        let fonts = load_fonts(dir.path(), 16, CollisionPolicy::Warn).unwrap();
        assert!(fonts.is_empty());
        assert!(fonts.skipped().is_empty());
    }

    #[test]
    fn load_fonts_records_corrupt_candidates() {
        let dir = assert_fs::TempDir::new().unwrap();
        use assert_fs::prelude::*;
        dir.child("corrupt.ttf").write_binary(&[0u8; 32]).unwrap();

        let fonts = load_fonts(dir.path(), 16, CollisionPolicy::Warn).unwrap();
        assert!(fonts.is_empty());
        assert_eq!(fonts.skipped().len(), 1);
    }
}

use anyhow::{Context, Result};
use std::path::Path;

/// Load the ordered character set from a whitespace-separated text file.
///
/// Order is preserved; uniqueness is not enforced. Tokens longer than one
/// character keep only their first character (with a warning), so a stray
/// multi-byte entry does not abort the run.
pub fn load_charset(path: &Path) -> Result<Vec<char>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read charset file {}", path.display()))?;

    let mut chars = Vec::new();
    for token in content.split_whitespace() {
        let mut it = token.chars();
        let ch = it.next().expect("split_whitespace yields non-empty tokens");
        if it.next().is_some() {
            log::warn!("charset token '{token}' has more than one character; using '{ch}'");
        }
        chars.push(ch);
    }

    Ok(chars)
}

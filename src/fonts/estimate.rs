use crate::error::GenError;
use crate::fonts::FontEntry;

/// Smallest and largest sizes the search is allowed to visit. Leaving this
/// range means the font cannot fit the target box at all (fixed-size bitmap
/// strikes, degenerate metrics) and the font is declared unusable.
pub const MIN_SIZE: u32 = 1;
pub const MAX_SIZE: u32 = 500;

/// Cap on search steps; fonts whose measured box oscillates around the
/// tolerance band would otherwise loop forever.
const MAX_ITERATIONS: u32 = 1_000;

/// Find the largest font size whose rendered `sample_text` fits `target`
/// within `eps` pixels.
///
/// Unit-step hill-climb seeded from the entry's current size: measure, compare
/// the larger rendered dimension against the larger target dimension, step the
/// size by one toward the target. Correct for fonts whose measured box grows
/// monotonically with size, which holds for scalable outlines.
///
/// Callers typically pass a single tall reference character; a size that fits
/// it is assumed to fit the rest of the font. The refined size is returned,
/// not cached -- writing it back onto the entry is the caller's decision.
pub fn estimate_size(
    entry: &FontEntry,
    sample_text: &str,
    target: (u32, u32),
    eps: u32,
) -> Result<u32, GenError> {
    if sample_text.is_empty() {
        return Err(GenError::MissingPrerequisite("non-empty sample text"));
    }

    let goal = target.0.max(target.1) as i64;
    let mut size = entry.size().clamp(MIN_SIZE, MAX_SIZE);

    for _ in 0..MAX_ITERATIONS {
        let (w, h) = entry
            .measure(sample_text, size)
            .map_err(|reason| GenError::FontUnusable {
                font: entry.name().to_string(),
                reason,
            })?;

        let error = goal - w.max(h) as i64;
        if error.unsigned_abs() <= eps as u64 {
            return Ok(size);
        }

        size = if error > 0 { size + 1 } else { size.saturating_sub(1) };
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(GenError::FontUnusable {
                font: entry.name().to_string(),
                reason: format!("size search left the {MIN_SIZE}..={MAX_SIZE} range"),
            });
        }
    }

    Err(GenError::FontUnusable {
        font: entry.name().to_string(),
        reason: format!("size search did not converge within {MAX_ITERATIONS} steps"),
    })
}

use rand::Rng;
use rand::rngs::StdRng;

/// Placement perturbation. `Random` pulls from a caller-owned seeded RNG so
/// runs (and tests) are reproducible.
pub enum Jitter<'a> {
    None,
    Random(&'a mut StdRng),
}

/// Offset at which to draw a glyph so its ink lands centered in the cell.
///
/// `glyph_box` is the rendered ink box and `bearing` the font's intrinsic
/// (left, top) offset for the character; the bearing is subtracted before
/// centering because ink does not start at the typographic origin. With
/// jitter enabled each axis of the bearing is perturbed by up to a tenth of
/// the smaller cell dimension.
///
/// The result may be negative or may push ink outside the cell for outlier
/// glyphs. That is accepted, not clamped.
pub fn locate(
    cell: (u32, u32),
    glyph_box: (u32, u32),
    bearing: (i32, i32),
    jitter: Jitter<'_>,
) -> (i32, i32) {
    let (mut off_x, mut off_y) = bearing;

    if let Jitter::Random(rng) = jitter {
        let magnitude = (cell.0.min(cell.1) / 10) as i32;
        if magnitude > 0 {
            off_x += rng.gen_range(-magnitude..=magnitude);
            off_y += rng.gen_range(-magnitude..=magnitude);
        }
    }

    let x = (cell.0 as i32 - glyph_box.0 as i32 - off_x).div_euclid(2);
    let y = (cell.1 as i32 - glyph_box.1 as i32 - off_y).div_euclid(2);
    (x, y)
}

use crate::error::GenError;
use crate::fonts::{FontEntry, Glyph};
use crate::raster::place::{Jitter, locate};
use anyhow::Result;
use image::{Rgb, RgbImage};

/// Cell colors. Defaults match the classic light-gray-on-black dataset look.
#[derive(Debug, Clone, Copy)]
pub struct CellStyle {
    pub background: Rgb<u8>,
    pub foreground: Rgb<u8>,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            background: Rgb([246, 246, 246]),
            foreground: Rgb([0, 0, 0]),
        }
    }
}

/// Parse a `#rrggbb` color.
pub fn parse_hex_color(s: &str) -> Result<Rgb<u8>> {
    let hex = s
        .strip_prefix('#')
        .ok_or_else(|| anyhow::anyhow!("invalid color (expected #rrggbb): {s}"))?;
    if hex.len() != 6 {
        anyhow::bail!("invalid color (expected #rrggbb): {s}");
    }

    let mut channels = [0u8; 3];
    for (i, channel) in channels.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| anyhow::anyhow!("invalid color component in {s}"))?;
    }
    Ok(Rgb(channels))
}

/// Render one character into a fresh cell at the entry's current size.
///
/// The glyph is centered by `locate` (optionally jittered) and its coverage
/// bitmap is alpha-blended fg-over-bg. Ink falling outside the cell is
/// dropped pixel-by-pixel rather than rejected.
pub fn render_cell(
    entry: &FontEntry,
    ch: char,
    cell: (u32, u32),
    style: &CellStyle,
    jitter: Jitter<'_>,
) -> Result<RgbImage, GenError> {
    let glyph = entry.rasterize(ch).map_err(|reason| GenError::FontUnusable {
        font: entry.name().to_string(),
        reason,
    })?;

    let (x, y) = locate(
        cell,
        (glyph.width, glyph.height),
        (glyph.left_bearing, glyph.top_bearing),
        jitter,
    );

    let mut image = RgbImage::from_pixel(cell.0, cell.1, style.background);
    // The draw position re-applies the bearing, mirroring how a text engine
    // offsets ink from the pen position.
    blit_coverage(
        &mut image,
        x + glyph.left_bearing,
        y + glyph.top_bearing,
        &glyph,
        style.foreground,
    );

    Ok(image)
}

/// Blend a coverage bitmap over `dst` at (possibly negative) `x0, y0`.
pub fn blit_coverage(dst: &mut RgbImage, x0: i32, y0: i32, glyph: &Glyph, ink: Rgb<u8>) {
    let (dst_w, dst_h) = (dst.width() as i32, dst.height() as i32);

    for gy in 0..glyph.height as i32 {
        for gx in 0..glyph.width as i32 {
            let alpha = glyph.coverage[(gy as u32 * glyph.width + gx as u32) as usize];
            if alpha == 0 {
                continue;
            }
            let dx = x0 + gx;
            let dy = y0 + gy;
            if dx < 0 || dy < 0 || dx >= dst_w || dy >= dst_h {
                continue;
            }

            let base = dst.get_pixel(dx as u32, dy as u32).0;
            let mut out = [0u8; 3];
            for c in 0..3 {
                let b = base[c] as u16;
                let f = ink.0[c] as u16;
                let a = alpha as u16;
                out[c] = ((b * (255 - a) + f * a) / 255) as u8;
            }
            dst.put_pixel(dx as u32, dy as u32, Rgb(out));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::collection::testing::{BrokenFake, SquareFake};

    fn square_entry() -> FontEntry {
        FontEntry::new("square", 16, Box::new(SquareFake))
    }

    #[test]
    fn parse_hex_color_ok() {
        assert_eq!(parse_hex_color("#f6f6f6").unwrap(), Rgb([246, 246, 246]));
        assert_eq!(parse_hex_color("#000000").unwrap(), Rgb([0, 0, 0]));
        assert_eq!(parse_hex_color("#FF8001").unwrap(), Rgb([255, 128, 1]));
    }

    #[test]
    fn parse_hex_color_err() {
        assert!(parse_hex_color("f6f6f6").is_err());
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#zzzzzz").is_err());
    }

    #[test]
    fn cell_has_ink_and_background() {
        let image = render_cell(
            &square_entry(),
            'A',
            (32, 32),
            &CellStyle::default(),
            Jitter::None,
        )
        .unwrap();

        assert_eq!(image.dimensions(), (32, 32));
        let ink: Vec<_> = image.pixels().filter(|p| p.0 == [0, 0, 0]).collect();
        // SquareFake inks an 8x8 square at size 16.
        assert_eq!(ink.len(), 64);
        assert_eq!(image.get_pixel(0, 0).0, [246, 246, 246]);
    }

    #[test]
    fn unusable_font_surfaces_as_such() {
        let entry = FontEntry::new("corrupt", 16, Box::new(BrokenFake));
        let err = render_cell(&entry, 'A', (32, 32), &CellStyle::default(), Jitter::None)
            .unwrap_err();
        assert!(err.is_font_unusable());
    }

    #[test]
    fn out_of_cell_ink_is_dropped_silently() {
        let glyph = Glyph {
            width: 4,
            height: 4,
            left_bearing: 0,
            top_bearing: 0,
            coverage: vec![255; 16],
        };
        let mut image = RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]));
        blit_coverage(&mut image, -2, 6, &glyph, Rgb([0, 0, 0]));

        // only the 2x2 in-bounds corner is painted
        let ink = image.pixels().filter(|p| p.0 == [0, 0, 0]).count();
        assert_eq!(ink, 4);
        assert_eq!(image.get_pixel(0, 5).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(0, 6).0, [0, 0, 0]);
    }

    #[test]
    fn partial_coverage_blends() {
        let glyph = Glyph {
            width: 1,
            height: 1,
            left_bearing: 0,
            top_bearing: 0,
            coverage: vec![128],
        };
        let mut image = RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));
        blit_coverage(&mut image, 0, 0, &glyph, Rgb([0, 0, 0]));

        let p = image.get_pixel(0, 0).0[0];
        assert!((p as i32 - 127).abs() <= 1, "expected mid-gray, got {p}");
    }
}

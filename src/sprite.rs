use image::{Rgb, RgbImage};

/// Orientation of the near-square factor pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// Columns >= rows
    #[default]
    Wide,
    /// Rows >= columns
    Tall,
}

/// Factor `n` into two integers whose product covers `n` and that are as
/// close to square as possible.
///
/// Grows a 2x2 shape one step at a time, always bumping the smaller side
/// (first side on ties), until the product reaches `n`. `n <= 2` short-
/// circuits to a single row.
pub fn factor_near_square(n: u32, mode: Mode) -> (u32, u32) {
    if n <= 2 {
        return (n, 1);
    }

    let mut shape = [2u32, 2u32];
    while shape[0] * shape[1] < n {
        let smaller = if shape[0] <= shape[1] { 0 } else { 1 };
        shape[smaller] += 1;
    }

    let (lo, hi) = (shape[0].min(shape[1]), shape[0].max(shape[1]));
    match mode {
        Mode::Wide => (hi, lo),
        Mode::Tall => (lo, hi),
    }
}

/// Row-major cell origins for `n` sequential placements on a board.
///
/// Walks left to right in `cell.0` steps; when the next step would reach or
/// pass the board width, wraps to the next row. The board is expected to be
/// an exact cell grid, so every origin lands in bounds.
pub fn pack_sequential(n: u32, cell: (u32, u32), board: (u32, u32)) -> Vec<(u32, u32)> {
    let mut positions = Vec::with_capacity(n as usize);
    let mut pos = (0u32, 0u32);

    for _ in 0..n {
        positions.push(pos);
        if pos.0 + cell.0 >= board.0 {
            pos = (0, pos.1 + cell.1);
        } else {
            pos.0 += cell.0;
        }
    }

    positions
}

/// Blank sprite board sized for a `grid` of cells.
pub fn blank_board(grid: (u32, u32), cell: (u32, u32), fill: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(grid.0 * cell.0, grid.1 * cell.1, fill)
}

pub mod cell;
pub mod place;

pub use cell::{CellStyle, parse_hex_color, render_cell};
pub use place::{Jitter, locate};

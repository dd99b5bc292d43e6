pub mod collection;
pub mod estimate;

pub use collection::{FontCollection, FontEntry, FontResource, Glyph, load_fonts};
pub use estimate::estimate_size;

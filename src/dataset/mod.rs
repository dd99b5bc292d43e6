pub mod generate;
pub mod layout;

pub use generate::{GenerateOptions, Sample, Samples, SplitRouter, persist};
pub use layout::build_layout;

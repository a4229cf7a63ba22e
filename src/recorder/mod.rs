pub mod history;
pub mod render;

pub use history::RequestHistory;
pub use render::{normalize, render, to_canonical_string, TokenNormalizer};

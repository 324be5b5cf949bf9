//! Reference rendering layer: line breaking and block geometry

mod engine;
pub mod font;
mod line_break;

pub use engine::{BlockBox, LayoutEngine, LayoutPass, LayoutSnapshot};
pub use font::FontMetrics;
pub use line_break::LineBreaker;

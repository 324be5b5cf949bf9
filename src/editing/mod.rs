//! Editing model: edit operations and position mapping

mod mapping;
mod operation;

pub use mapping::{Assoc, MapResult, Mapping, StepMap};
pub use operation::{EditOp, EditResult};

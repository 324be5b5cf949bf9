//! Pagination: break calculation and the pagination state

mod calculator;
mod state;

pub use calculator::{calculate_breaks, page_spans, BreakList, PageSpan};
pub use state::PaginationState;

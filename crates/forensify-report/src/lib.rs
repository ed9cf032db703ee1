//! Report composition
//!
//! Assembles every collected analysis result into one ordered block
//! document and renders it to a single output file. The report must
//! build from whatever subset of results exists.

mod block;
mod compose;
mod markdown;

pub use block::Block;
pub use compose::{build_blocks, compose, ReportInputs};

//! Report output.
//!
//! - [`table`] - fixed-width text tables for stdout
//! - [`terminal`] - field padding and stderr progress messages

mod table;
mod terminal;

pub use table::{render_columns, render_table};
pub use terminal::{pad_field, Progress};

//! CLI module
//!
//! Command-line interface for browsing Discogs listings.
//!
//! # Commands
//!
//! - `label` - Show label details
//! - `releases` - Page through a label's or artist's releases the way a
//!   scrolling list would

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, SortKey};
pub use runner::Runner;

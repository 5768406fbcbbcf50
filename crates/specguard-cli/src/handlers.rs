//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod validate;

pub use completions::handle_completions;
pub use validate::handle_validate;

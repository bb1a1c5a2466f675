//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the postforge binary.

mod commands;
mod generate;
mod state;

pub use commands::{Cli, Commands};
pub use generate::handle_generate;
pub use state::handle_state;

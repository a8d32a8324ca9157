//! Engine module for the CLI: argument parsing, handlers, progress display

pub mod arg_parser;
pub mod handlers;
pub mod progress;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use handlers::{build_opts, handle_run};

//! Line console for configuration and diagnostics
//!
//! Reads commands from stdin while the sink keys text on its own thread.
//! Parameters go through the same descriptor table as the attribute.

pub mod commands;
pub mod console;
pub mod error;
pub mod parser;

pub use commands::{command_names, execute, ConsoleContext, COMMANDS};
pub use console::{Console, VERSION};
pub use error::ConsoleError;
pub use parser::{parse_line, ParsedCommand};

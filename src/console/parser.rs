//! Command line parser
//!
//! Split on whitespace, command plus at most 2 arguments.

/// Parsed command with up to 2 arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    /// The command name (first token)
    pub command: &'a str,
    /// Up to 2 arguments
    pub args: [Option<&'a str>; 2],
}

impl<'a> ParsedCommand<'a> {
    /// Get argument by index (0-based)
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args.get(idx).copied().flatten()
    }

    /// True for a blank line
    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }
}

/// Parse a command line into command and arguments
pub fn parse_line(line: &str) -> ParsedCommand<'_> {
    let mut parts = line.split_whitespace();

    let command = parts.next().unwrap_or("");

    let mut args = [None, None];
    for (slot, arg) in args.iter_mut().zip(parts) {
        *slot = Some(arg);
    }

    ParsedCommand { command, args }
}

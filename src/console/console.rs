//! Main console struct integrating parser and command table

use std::io::{self, BufRead};

use super::{execute, parse_line, ConsoleContext};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

const PROMPT: &str = "> ";

/// Line console
///
/// One command per line. The terminal does its own editing, so there is no
/// byte-level state here.
pub struct Console<'a> {
    ctx: ConsoleContext<'a>,
}

impl<'a> Console<'a> {
    pub fn new(ctx: ConsoleContext<'a>) -> Self {
        Self { ctx }
    }

    /// Process one line, writing the command's output to `out`.
    ///
    /// Returns `true` when the line asked the console to stop.
    pub fn handle_line(&self, line: &str, out: &mut String) -> bool {
        let cmd = parse_line(line);
        if let Err(e) = execute(&cmd, &self.ctx, out) {
            out.push_str(&e.to_string());
            out.push('\n');
        }
        cmd.command == "quit"
    }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead, W: io::Write>(&self, input: R, mut output: W) -> io::Result<()> {
        writeln!(output, "{}", VERSION)?;
        writeln!(output, "Type 'help' for commands")?;
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let mut out = String::new();
        for line in input.lines() {
            let line = line?;
            out.clear();
            let quit = self.handle_line(&line, &mut out);
            output.write_all(out.as_bytes())?;
            if quit {
                output.flush()?;
                return Ok(());
            }
            write!(output, "{}", PROMPT)?;
            output.flush()?;
        }

        writeln!(output)?;
        Ok(())
    }
}

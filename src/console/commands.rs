//! Command handlers

use core::fmt::Write;

use super::parser::ParsedCommand;
use super::ConsoleError;
use crate::config::{find_param, find_params_matching, MorseConfig, ParamDescriptor, PARAMS};
use crate::control::{IntervalAttribute, INTERVAL_ATTRIBUTE};
use crate::stats::Stats;

/// What the handlers can see.
///
/// The time unit is read and written through the interval attribute, so a
/// published attribute file follows console changes.
pub struct ConsoleContext<'a> {
    pub interval: &'a IntervalAttribute<'a>,
    pub stats: &'a Stats,
}

impl ConsoleContext<'_> {
    pub fn config(&self) -> &MorseConfig {
        self.interval.config()
    }

    fn value_of(&self, p: &ParamDescriptor) -> String {
        if p.name == INTERVAL_ATTRIBUTE {
            self.interval.show().trim_end().to_string()
        } else {
            p.get(self.config()).to_string()
        }
    }
}

type Handler = fn(&ParsedCommand<'_>, &ConsoleContext<'_>, &mut dyn Write) -> Result<(), ConsoleError>;

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    pub brief: &'static str,
    pub handler: Handler,
}

/// All available commands
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "help", brief: "List commands", handler: cmd_help },
    CommandDescriptor { name: "set", brief: "Set parameter value", handler: cmd_set },
    CommandDescriptor { name: "show", brief: "Show parameters", handler: cmd_show },
    CommandDescriptor { name: "stats", brief: "Transmission statistics", handler: cmd_stats },
    CommandDescriptor { name: "version", brief: "Build version", handler: cmd_version },
    CommandDescriptor { name: "quit", brief: "Drive LED low and exit", handler: cmd_quit },
];

/// Execute a parsed command
pub fn execute(
    cmd: &ParsedCommand<'_>,
    ctx: &ConsoleContext<'_>,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    if cmd.is_empty() {
        return Ok(()); // Empty line, do nothing
    }

    let handler = COMMANDS
        .iter()
        .find(|c| c.name == cmd.command)
        .ok_or(ConsoleError::UnknownCommand)?;

    (handler.handler)(cmd, ctx, out)
}

/// Get all command names
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|c| c.name)
}

// --- Command Implementations ---

fn cmd_help(cmd: &ParsedCommand<'_>, _ctx: &ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    if let Some(name) = cmd.arg(0) {
        let c = COMMANDS
            .iter()
            .find(|c| c.name == name)
            .ok_or(ConsoleError::UnknownCommand)?;
        let _ = writeln!(out, "{}: {}", c.name, c.brief);
    } else {
        for c in COMMANDS {
            let _ = writeln!(out, "  {:<10} {}", c.name, c.brief);
        }
    }
    Ok(())
}

fn cmd_set(cmd: &ParsedCommand<'_>, ctx: &ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let name = cmd.arg(0).ok_or(ConsoleError::MissingArg)?;
    let value = cmd.arg(1).ok_or(ConsoleError::MissingArg)?;

    let param = find_param(name).ok_or(ConsoleError::UnknownParam)?;
    if param.name == INTERVAL_ATTRIBUTE {
        ctx.interval.store(value)?;
    } else {
        let applied = param.set_from_str(ctx.config(), value)?;
        tracing::info!(param = param.name, value = %applied, "parameter set");
    }

    let _ = writeln!(out, "{}={}", param.name, ctx.value_of(param));
    Ok(())
}

fn cmd_show(cmd: &ParsedCommand<'_>, ctx: &ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    match cmd.arg(0) {
        Some(pattern) if pattern.ends_with('*') => {
            for p in find_params_matching(pattern) {
                let _ = writeln!(out, "{}={}", p.name, ctx.value_of(p));
            }
        }
        Some(name) => {
            let p = find_param(name).ok_or(ConsoleError::UnknownParam)?;
            let _ = writeln!(out, "{}={}", p.name, ctx.value_of(p));
        }
        None => {
            for p in PARAMS {
                let _ = writeln!(out, "{}={}", p.name, ctx.value_of(p));
            }
        }
    }
    Ok(())
}

fn cmd_stats(cmd: &ParsedCommand<'_>, ctx: &ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    if cmd.arg(0).is_some() {
        return Err(ConsoleError::InvalidValue);
    }

    let s = ctx.stats.snapshot();
    let _ = writeln!(out, "writes:       {}", s.writes);
    let _ = writeln!(out, "bytes:        {}", s.bytes);
    let _ = writeln!(out, "characters:   {}", s.characters);
    let _ = writeln!(out, "words:        {}", s.words);
    let _ = writeln!(out, "short writes: {}", s.short_writes);
    Ok(())
}

fn cmd_version(_cmd: &ParsedCommand<'_>, _ctx: &ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let _ = writeln!(out, "{}", super::VERSION);
    Ok(())
}

fn cmd_quit(_cmd: &ParsedCommand<'_>, _ctx: &ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let _ = writeln!(out, "bye");
    Ok(())
}

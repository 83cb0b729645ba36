use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
};

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::cli::commands::config::{ACTIONS as CONFIG_ACTIONS, KEYS as CONFIG_KEYS};
use crate::cli::core::{CliError, CliMode, LoopControl, ShellContext};
use crate::cli::output;

/// Set to read commands from stdin, one per line, without a prompt.
pub const SCRIPT_ENV: &str = "FUELEU_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new(context.command_usages())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    output::info("FuelEU compliance shell. Type `help` for commands.");

    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line).ok();
                if !feed(context, line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Reads stdin line by line. Blank lines and `#` comments are skipped.
fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    colored::control::set_override(false);
    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !feed(context, line) {
            break;
        }
    }
    Ok(())
}

/// Runs one line; `false` once the shell should stop.
fn feed(context: &mut ShellContext, line: &str) -> bool {
    match context.process_line(line) {
        Ok(LoopControl::Continue) => context.running,
        Ok(LoopControl::Exit) => false,
        Err(err) => {
            context.report_error(err);
            true
        }
    }
}

/// Completes command names and `config` arguments, and hints at usage.
struct CommandHelper {
    commands: Vec<(&'static str, &'static str)>,
}

impl CommandHelper {
    fn new(commands: Vec<(&'static str, &'static str)>) -> Self {
        Self { commands }
    }

    fn candidates(&self, previous: &[&str]) -> Vec<&'static str> {
        match previous {
            [] => self.commands.iter().map(|(name, _)| *name).collect(),
            [command] if command.eq_ignore_ascii_case("config") => CONFIG_ACTIONS.to_vec(),
            [command, action]
                if command.eq_ignore_ascii_case("config") && action.eq_ignore_ascii_case("set") =>
            {
                CONFIG_KEYS.to_vec()
            }
            _ => Vec::new(),
        }
    }

    /// Arguments still to type once a known command and a space are entered.
    fn usage_tail(&self, line: &str) -> Option<&'static str> {
        let name = line.strip_suffix(' ')?;
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }
        let (command, usage) = *self
            .commands
            .iter()
            .find(|(command, _)| command.eq_ignore_ascii_case(name))?;
        let tail = usage.strip_prefix(command)?.trim_start();
        (!tail.is_empty()).then_some(tail)
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let previous: Vec<&str> = prefix[..start].split_whitespace().collect();
        let needle = prefix[start..].to_ascii_lowercase();

        let pairs = self
            .candidates(&previous)
            .into_iter()
            .filter(|candidate| candidate.starts_with(&needle))
            .map(|candidate| Pair {
                display: candidate.to_string(),
                replacement: candidate.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        self.usage_tail(line).map(str::to_string)
    }
}

impl Highlighter for CommandHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for CommandHelper {}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

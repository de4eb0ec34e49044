//! Line-oriented drill-down navigation.
//!
//! Reads commands from any `BufRead` and writes listings to any `Write`, so
//! the same loop serves the terminal (`--interactive`) and tests.
//!
//! # Commands
//! - `ls` - list the focused folder again
//! - `cd <name>[/<name>...]` - open child folders; `cd ..` goes up one level
//! - `up` - close the focused folder
//! - `top` - return to the root listing
//! - `export <file>` - write the root listing as CSV
//! - `help`, `quit`

use crate::explorer::{ExpandOutcome, Explorer, ScanObserver};
use crate::output::csv;
use crate::output::terminal::{ViewOptions, write_view};
use crate::session::ScanLauncher;
use anyhow::{Result, anyhow, bail};
use std::io::{BufRead, Write};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Upper bound on how long one command waits for its scans.
const COMMAND_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

const HELP: &str = "\
commands:
  ls                 list the current folder
  cd <name>[/...]    open a child folder (cd .. goes up)
  up                 close the current folder
  top                return to the root listing
  export <file>      write the root listing as CSV
  help               show this help
  quit               leave";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Open(PathBuf),
    Up,
    Top,
    Export(PathBuf),
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    ///
    /// # Errors
    /// Returns an error for unknown commands or missing arguments.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "ls" | "list" => Command::List,
            "up" => Command::Up,
            "top" | "root" => Command::Top,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "cd" | "open" => match rest {
                "" => bail!("usage: cd <folder>"),
                ".." => Command::Up,
                "/" => Command::Top,
                name => Command::Open(PathBuf::from(name)),
            },
            "export" => match rest {
                "" => bail!("usage: export <file.csv>"),
                file => Command::Export(PathBuf::from(file)),
            },
            other => bail!("unknown command '{}' (try 'help')", other),
        };
        Ok(Some(command))
    }
}

/// Opens each component of `relative` in turn, starting at the focused
/// folder, waiting for any scans that have to run.
///
/// # Errors
/// Fails if a component is not a folder of the current listing or its scan
/// ends with an error.
pub fn open_relative<L: ScanLauncher>(
    explorer: &mut Explorer<L>,
    observer: &mut dyn ScanObserver,
    relative: &Path,
) -> Result<()> {
    for component in relative.components() {
        let name = match component {
            Component::Normal(name) => name.to_string_lossy().into_owned(),
            Component::CurDir => continue,
            Component::ParentDir => {
                explorer.collapse_top()?;
                continue;
            }
            _ => bail!("'{}' must be relative to the current folder", relative.display()),
        };

        let key = explorer
            .child_key(&name)
            .ok_or_else(|| anyhow!("no folder named '{}' here", name))?;

        if explorer.expand_node(&key)? != ExpandOutcome::Cached {
            explorer.run_until_idle(observer, COMMAND_WAIT);
        }

        let focused = explorer.active_view().map(|view| &view.node);
        if focused != Some(&key) {
            bail!("could not open '{}'", name);
        }
    }
    Ok(())
}

/// Runs the command loop until `quit` or end of input.
pub fn run<L, R, W>(
    explorer: &mut Explorer<L>,
    observer: &mut dyn ScanObserver,
    input: R,
    out: &mut W,
    options: &ViewOptions,
) -> Result<()>
where
    L: ScanLauncher,
    R: BufRead,
    W: Write,
{
    writeln!(out, "type 'help' for commands")?;
    for line in input.lines() {
        let line = line?;
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(out, "{}", err)?;
                continue;
            }
        };

        let result = match command {
            Command::Quit => break,
            Command::Help => writeln!(out, "{}", HELP).map_err(Into::into),
            Command::List => show(explorer, out, options),
            Command::Up => explorer
                .collapse_top()
                .map_err(Into::into)
                .and_then(|_| show(explorer, out, options)),
            Command::Top => go_top(explorer).and_then(|_| show(explorer, out, options)),
            Command::Open(relative) => open_relative(explorer, observer, &relative)
                .and_then(|_| show(explorer, out, options)),
            Command::Export(file) => export_root(explorer, &file)
                .and_then(|_| writeln!(out, "exported to {}", file.display()).map_err(Into::into)),
        };

        if let Err(err) = result {
            writeln!(out, "error: {:#}", err)?;
        }
    }
    Ok(())
}

fn show<L: ScanLauncher, W: Write>(
    explorer: &Explorer<L>,
    out: &mut W,
    options: &ViewOptions,
) -> Result<()> {
    let view = explorer
        .active_view()
        .ok_or_else(|| anyhow!("nothing scanned yet"))?;
    write_view(out, view, options)
}

fn go_top<L: ScanLauncher>(explorer: &mut Explorer<L>) -> Result<()> {
    let root = explorer
        .stack()
        .map(|stack| stack.root().node.clone())
        .ok_or_else(|| anyhow!("nothing scanned yet"))?;
    explorer.expand_node(&root)?;
    Ok(())
}

fn export_root<L: ScanLauncher>(explorer: &Explorer<L>, file: &Path) -> Result<()> {
    let stack = explorer
        .stack()
        .ok_or_else(|| anyhow!("nothing scanned yet"))?;
    csv::export(&stack.root().items, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("ls").unwrap(), Some(Command::List));
        assert_eq!(
            Command::parse("cd src/bin").unwrap(),
            Some(Command::Open(PathBuf::from("src/bin")))
        );
        assert_eq!(
            Command::parse("cd My Documents").unwrap(),
            Some(Command::Open(PathBuf::from("My Documents")))
        );
        assert_eq!(Command::parse("cd ..").unwrap(), Some(Command::Up));
        assert_eq!(
            Command::parse("export out.csv").unwrap(),
            Some(Command::Export(PathBuf::from("out.csv")))
        );
        assert_eq!(Command::parse("  quit  ").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Command::parse("cd").is_err());
        assert!(Command::parse("export").is_err());
        assert!(Command::parse("rm -rf").is_err());
    }
}

use std::fmt;
use std::str::FromStr;

use crate::catalog::Region;

pub const HELP: &str = "\
Commands:
  all               load every country
  region <name>     filter by region (africa, americas, asia, europe, oceania, all)
  type [text]       edit the search box; the search runs once typing pauses
  search <text>     search immediately
  borders <CODE>    list the neighbors of a country in the current list
  show              print the current view
  help              print this help
  quit              exit";

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    All,
    Region(Region),
    /// Raw search box text; may be empty to clear the search.
    Type(String),
    Search(String),
    Borders(String),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError(pub String);

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (type `help` for commands)", self.0)
    }
}

impl std::error::Error for CommandError {}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        // Trailing spaces are part of what was typed into the search box.
        let line = line.trim_start();
        let (word, raw) = match line.split_once(char::is_whitespace) {
            Some((word, raw)) => (word, raw.trim_start()),
            None => (line, ""),
        };
        let rest = raw.trim_end();

        match word.to_ascii_lowercase().as_str() {
            "all" => Ok(Command::All),
            "region" => {
                if rest.is_empty() {
                    return Err(CommandError("region needs a name".into()));
                }
                rest.parse::<Region>()
                    .map(Command::Region)
                    .map_err(|e| CommandError(e.to_string()))
            }
            "type" => Ok(Command::Type(raw.to_string())),
            "search" if rest.is_empty() => Err(CommandError("search needs some text".into())),
            "search" => Ok(Command::Search(rest.to_string())),
            "borders" if rest.is_empty() => Err(CommandError("borders needs a country code".into())),
            "borders" => Ok(Command::Borders(rest.to_ascii_uppercase())),
            "show" | "ls" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError(format!("unknown command `{other}`"))),
        }
    }
}

//! Console command parsing for the interactive workbench.

use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    Search(String),
    Toggle(Vec<usize>),
    Show,
    Selected,
    Export,
    Reimport(PathBuf),
    Verify(PathBuf),
    Save(PathBuf),
    Clear,
    Reset,
    Help,
    Quit,
    Empty,
}

pub const HELP: &str = "\
Commands:
  search <text>     ask the autocoding service for codes (alias: s)
  toggle <n> [n..]  select/deselect suggestion rows by number (alias: t)
  show              show the current suggestions
  selected          list selected codes
  export            export the selection and save saarthi-bundle.json
  reimport <file>   send an exported artifact to the import service
  verify <file>     check a document file written by 'save'
  save <file>       write the current document JSON to a file
  clear             clear the suggestion view (keeps selections)
  reset             clear selections and suggestions
  help              show this help
  quit              leave the workbench";

impl ConsoleCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ConsoleCommand::Empty);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let path = |name: &str| {
            if rest.is_empty() {
                Err(format!("usage: {name} <file>"))
            } else {
                Ok(PathBuf::from(rest))
            }
        };

        match word {
            "search" | "s" => {
                if rest.is_empty() {
                    Err("usage: search <text>".into())
                } else {
                    Ok(ConsoleCommand::Search(rest.to_string()))
                }
            }
            "toggle" | "t" => {
                let indices = rest
                    .split_whitespace()
                    .map(|n| n.parse::<usize>().map_err(|_| format!("not a row number: {n}")))
                    .collect::<Result<Vec<_>, _>>()?;
                if indices.is_empty() {
                    return Err("usage: toggle <n> [n..]".into());
                }
                Ok(ConsoleCommand::Toggle(indices))
            }
            "show" => Ok(ConsoleCommand::Show),
            "selected" | "list" => Ok(ConsoleCommand::Selected),
            "export" => Ok(ConsoleCommand::Export),
            "reimport" => path("reimport").map(ConsoleCommand::Reimport),
            "verify" => path("verify").map(ConsoleCommand::Verify),
            "save" => path("save").map(ConsoleCommand::Save),
            "clear" => Ok(ConsoleCommand::Clear),
            "reset" => Ok(ConsoleCommand::Reset),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
            other => Err(format!("unknown command '{other}', try 'help'")),
        }
    }
}

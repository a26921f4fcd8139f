//! Line-oriented command language of the terminal front end. Each input line
//! becomes either a core message (via the command mapping in `app.rs`) or a
//! platform action such as export or quit.

use std::path::PathBuf;

use fundboard_core::{Column, Msg, SortMode};

/// One unit of work for the main loop: an engine event already mapped to a
/// core message, or a raw line the user typed.
pub(crate) enum Input {
    Msg(Msg),
    Line(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Quit,
    Help,
    /// Re-render the current page even when nothing changed.
    Show,
    Refresh,
    Search(String),
    Filter { column: Column, query: String },
    Eligibility(String),
    Sort(SortMode),
    Future,
    Nonprofits,
    MinFunding(String),
    Keyword(String),
    Down,
    Up,
    Enter,
    SearchFocus,
    Evidence,
    Expand(usize),
    Pin(usize),
    Add(String),
    Remove(String),
    ClearQueue,
    Submit,
    Rescrape(String),
    Single(String),
    JobClear,
    Export(PathBuf),
    ApiKey(String),
}

/// Parse one input line. `Err` carries the message to show the user.
pub(crate) fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "quit" | "q" | "exit" => Ok(Command::Quit),
        "help" | "?" => Ok(Command::Help),
        "show" => Ok(Command::Show),
        "refresh" => Ok(Command::Refresh),
        "search" => Ok(Command::Search(rest.to_string())),
        "/" => Ok(Command::SearchFocus),
        "filter" => parse_filter(rest),
        "elig" => {
            if rest.is_empty() {
                Err("usage: elig <label> (toggles one eligibility label)".into())
            } else {
                Ok(Command::Eligibility(rest.to_string()))
            }
        }
        "sort" => parse_sort(rest),
        "future" => Ok(Command::Future),
        "nonprofits" => Ok(Command::Nonprofits),
        "min" => Ok(Command::MinFunding(rest.to_string())),
        "kw" | "keyword" => Ok(Command::Keyword(rest.to_string())),
        "down" | "j" => Ok(Command::Down),
        "up" | "k" => Ok(Command::Up),
        "enter" | "" => Ok(Command::Enter),
        "e" | "evidence" => Ok(Command::Evidence),
        "open" | "expand" => parse_row_number(rest).map(Command::Expand),
        "pin" => parse_row_number(rest).map(Command::Pin),
        "add" => {
            if rest.is_empty() {
                Err("usage: add <text containing urls>".into())
            } else {
                Ok(Command::Add(rest.to_string()))
            }
        }
        "remove" | "rm" => {
            if rest.is_empty() {
                Err("usage: remove <staged url>".into())
            } else {
                Ok(Command::Remove(rest.to_string()))
            }
        }
        "clear" => Ok(Command::ClearQueue),
        "submit" => Ok(Command::Submit),
        "rescrape" => {
            if rest.is_empty() {
                Err("usage: rescrape <already-processed url>".into())
            } else {
                Ok(Command::Rescrape(rest.to_string()))
            }
        }
        "single" => {
            if rest.is_empty() {
                Err("usage: single <url>".into())
            } else {
                Ok(Command::Single(rest.to_string()))
            }
        }
        "job" => match rest {
            "clear" => Ok(Command::JobClear),
            _ => Err("usage: job clear".into()),
        },
        "export" => {
            if rest.is_empty() {
                Err("usage: export <path.csv>".into())
            } else {
                Ok(Command::Export(PathBuf::from(rest)))
            }
        }
        "key" => {
            if rest.is_empty() {
                Err("usage: key <api key>".into())
            } else {
                Ok(Command::ApiKey(rest.to_string()))
            }
        }
        other => Err(format!("unknown command: {other} (try help)")),
    }
}

fn parse_filter(rest: &str) -> Result<Command, String> {
    let (name, query) = match rest.split_once(char::is_whitespace) {
        Some((name, query)) => (name, query.trim()),
        None => (rest, ""),
    };
    match Column::parse(name) {
        Some(column) => Ok(Command::Filter {
            column,
            query: query.to_string(),
        }),
        None => Err(format!(
            "unknown column: {name} (columns: {})",
            Column::ALL
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

fn parse_sort(rest: &str) -> Result<Command, String> {
    match rest {
        "recent" => Ok(Command::Sort(SortMode::Recent)),
        "alpha" | "alphabetical" => Ok(Command::Sort(SortMode::Alphabetical)),
        "elig" | "eligibility" => Ok(Command::Sort(SortMode::Eligibility)),
        _ => Err("usage: sort recent|alpha|eligibility".into()),
    }
}

fn parse_row_number(rest: &str) -> Result<usize, String> {
    match rest.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err("expected a 1-based row number".into()),
    }
}

pub(crate) const HELP: &str = "\
Results:
  search <text> | /           free-text search / focus search entry
  filter <column> [text]      per-column filter (empty text clears it)
  elig <label>                toggle one eligibility label
  sort recent|alpha|eligibility
  future | nonprofits         toggle deadline / nonprofit filters
  min <amount>                minimum funding (50000, 50k, 1.5m)
  kw <text>                   funding keyword filter
  down up enter               move cursor, pin the selected row
  open <n> | pin <n>          expand / pin visible row n
  e                           toggle evidence visibility
  refresh                     re-fetch results (bypasses server cache)
  export <path.csv>           export the filtered view
Scraping:
  add <text with urls>        stage URLs (deduplicated, then classified)
  remove <url> | clear        unstage one URL / reset the queue
  rescrape <url>              re-queue an already-processed URL
  submit                      start the batch job (polled every 4s)
  single <url>                scrape one URL immediately
  job clear                   drop the finished job panel
Other:
  key <api key>               push the extraction API key
  show | help | quit";

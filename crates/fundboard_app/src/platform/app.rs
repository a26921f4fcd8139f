use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use board_logging::{board_info, board_warn};
use chrono::Utc;
use fundboard_core::{key_message, update, AppState, Focus, Key, KeyPress, Msg};
use fundboard_engine::{write_results_csv, ApiClient, CacheStore};
use serde_json::Value;

use super::commands::{self, Command, Input};
use super::effects::EffectRunner;
use super::{gate, logging, persistence, render};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_STATE_DIR: &str = "./.fundboard";

struct Config {
    api_url: String,
    state_dir: PathBuf,
    access_code: Option<String>,
}

impl Config {
    fn from_env() -> Self {
        Self {
            api_url: env_or("FUNDBOARD_API_URL", DEFAULT_API_URL),
            state_dir: PathBuf::from(env_or("FUNDBOARD_STATE_DIR", DEFAULT_STATE_DIR)),
            access_code: std::env::var("FUNDBOARD_ACCESS_CODE")
                .ok()
                .filter(|value| !value.trim().is_empty()),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub fn run() -> anyhow::Result<()> {
    logging::initialize(logging::LogDestination::Both);
    let config = Config::from_env();
    let cache = CacheStore::new(&config.state_dir);
    gate::ensure_unlocked(&cache, config.access_code.as_deref())?;

    let client = ApiClient::new(&config.api_url).context("API base URL")?;
    board_info!("fundboard starting against {}", client.base_url());

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let mut runner = EffectRunner::new(client, cache.clone(), input_tx.clone());
    spawn_stdin_reader(input_tx);

    // Instant paint from the cache, then a background fetch.
    let mut state = AppState::new();
    for msg in [
        Msg::Tick(Utc::now()),
        Msg::ViewRestored(persistence::load_view(&cache)),
        Msg::StagingRestored(persistence::load_staging(&cache)),
        Msg::ResultsRequested { force: false },
    ] {
        state = dispatch(state, msg, &mut runner);
    }
    if persistence::load_credential(&cache).is_some() {
        board_info!("cached API credential present; `key <value>` pushes it for this session");
    }
    if state.consume_dirty() {
        render::render(&state.view());
    }
    println!("fundboard ready — type `help` for commands.");

    loop {
        let input = match input_rx.recv_timeout(Duration::from_millis(250)) {
            Ok(input) => Some(input),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };

        state = dispatch(state, Msg::Tick(Utc::now()), &mut runner);

        match input {
            Some(Input::Msg(msg)) => {
                state = dispatch(state, msg, &mut runner);
            }
            Some(Input::Line(line)) => {
                let (next, quit) = handle_line(state, &line, &mut runner);
                state = next;
                if quit {
                    break;
                }
            }
            None => {}
        }

        // The results view watches the one-shot mailbox on its own cycle.
        if let Some(signal) = runner.peek_refresh_signal() {
            board_info!("job {} finished; forcing a results refresh", signal.job_id);
            state = dispatch(
                state,
                Msg::RefreshSignalSeen {
                    job_id: signal.job_id,
                },
                &mut runner,
            );
        }

        if state.consume_dirty() {
            render::render(&state.view());
        }
    }

    board_info!("fundboard shutting down");
    Ok(())
}

fn dispatch(state: AppState, msg: Msg, runner: &mut EffectRunner) -> AppState {
    let (state, effects) = update(state, msg);
    runner.run(effects);
    state
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if input_tx.send(Input::Line(line)).is_err() {
                break;
            }
        }
    });
}

fn handle_line(state: AppState, line: &str, runner: &mut EffectRunner) -> (AppState, bool) {
    // While the search entry has focus the whole line is search text, exactly
    // as typing into a focused input box.
    if state.view().results.focus == Focus::Search {
        let state = dispatch(state, Msg::SearchChanged(line.trim().to_string()), runner);
        let state = dispatch(state, Msg::FocusReturned, runner);
        return (state, false);
    }
    match commands::parse(line) {
        Ok(Command::Quit) => (state, true),
        Ok(command) => (apply_command(state, command, runner), false),
        Err(message) => {
            println!("{message}");
            (state, false)
        }
    }
}

fn apply_command(state: AppState, command: Command, runner: &mut EffectRunner) -> AppState {
    let msg = match command {
        Command::Quit => return state,
        Command::Help => {
            println!("{}", commands::HELP);
            return state;
        }
        Command::Show => {
            render::render(&state.view());
            return state;
        }
        Command::Export(path) => {
            export_filtered(&state, &path);
            return state;
        }
        Command::Refresh => Msg::ResultsRequested { force: true },
        Command::Search(text) => Msg::SearchChanged(text),
        Command::Filter { column, query } => Msg::ColumnFilterChanged { column, query },
        Command::Eligibility(label) => Msg::EligibilityToggled(label),
        Command::Sort(mode) => Msg::SortChanged(mode),
        Command::Future => Msg::FutureDeadlinesToggled,
        Command::Nonprofits => Msg::NonprofitsToggled,
        Command::MinFunding(text) => Msg::MinFundingChanged(text),
        Command::Keyword(text) => Msg::FundingKeywordChanged(text),
        Command::Down => match key_message(KeyPress::plain(Key::Down), false) {
            Some(msg) => msg,
            None => return state,
        },
        Command::Up => match key_message(KeyPress::plain(Key::Up), false) {
            Some(msg) => msg,
            None => return state,
        },
        Command::Enter => match key_message(KeyPress::plain(Key::Enter), false) {
            Some(msg) => msg,
            None => return state,
        },
        Command::SearchFocus => match key_message(KeyPress::plain(Key::Char('/')), false) {
            Some(msg) => msg,
            None => return state,
        },
        Command::Evidence => match key_message(KeyPress::plain(Key::Char('e')), false) {
            Some(msg) => msg,
            None => return state,
        },
        Command::Expand(number) => match visible_row_key(&state, number) {
            Some(key) => Msg::ExpandToggled(key),
            None => {
                println!("no visible row {number}");
                return state;
            }
        },
        Command::Pin(number) => match visible_row_key(&state, number) {
            Some(key) => Msg::PinToggled(key),
            None => {
                println!("no visible row {number}");
                return state;
            }
        },
        Command::Add(text) => Msg::UrlsPasted(text),
        Command::Remove(url) => Msg::QueueRemoved(url),
        Command::ClearQueue => Msg::QueueCleared,
        Command::Submit => Msg::SubmitRequested,
        Command::Rescrape(url) => Msg::RescrapeRequested(url),
        Command::Single(url) => Msg::SingleScrapeRequested(url),
        Command::JobClear => Msg::JobCleared,
        Command::ApiKey(key) => Msg::ApiKeyEntered(key),
    };
    dispatch(state, msg, runner)
}

fn visible_row_key(state: &AppState, number: usize) -> Option<fundboard_core::RowKey> {
    state
        .view()
        .results
        .rows
        .get(number - 1)
        .map(|row| row.key.clone())
}

/// Export the current filtered, sorted view. Failures print inline; they
/// never unwind the session.
fn export_filtered(state: &AppState, path: &Path) {
    let records: Vec<Value> = state
        .visible_records()
        .into_iter()
        .filter_map(|record| match serde_json::to_value(record) {
            Ok(value) => Some(value),
            Err(err) => {
                board_warn!("record skipped during export: {err}");
                None
            }
        })
        .collect();

    let dir = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => Path::new("."),
    };
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("fundboard_export.csv");

    match write_results_csv(dir, filename, &records) {
        Ok(summary) => println!(
            "exported {} rows to {}",
            summary.row_count,
            summary.output_path.display()
        ),
        Err(err) => println!("export failed: {err}"),
    }
}

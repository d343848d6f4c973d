//! `rowpad`: a small terminal text editor.
//!
//! ## Reading guide (high level architecture)
//! - **`main()` / `run()`**: sets up logging, config and the terminal, then runs the
//!   render → read key → dispatch loop.
//! - **`keys`**: decodes raw input bytes (including escape sequences) into logical keys.
//! - **`buffer::Buffer`**: the document as a list of rows, each with its raw bytes, its
//!   tab-expanded render text and per-byte highlight classes.
//! - **`syntax`**: the single-line highlighter and the language profiles.
//! - **`viewport::Viewport`**: which part of the document is on screen.
//! - **`editor::Editor`**: application state, key dispatch, prompts, search and rendering.
//! - **`terminal`**: raw mode, window size and the `Console` the editor reads keys from and
//!   writes frames to.

mod buffer;
mod config;
mod editor;
mod error;
mod keys;
mod syntax;
mod terminal;
mod types;
mod viewport;

use anyhow::{bail, Context, Result};
use config::Config;
use editor::{Editor, BAR_ROWS, HELP_MESSAGE};
use std::fs::File;
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};
use terminal::{Console, StdinBytes, TermConsole, TerminalGuard};

/// Environment variable naming the log file. Logging is off when it is unset.
const LOG_ENV: &str = "ROWPAD_LOG";

/// Program entry point.
///
/// Any error that reaches here is fatal: the terminal has already been restored by the time we
/// print it.
fn main() {
    if let Err(e) = run() {
        log::error!("fatal: {e:?}");
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

/// Log to the file named by `$ROWPAD_LOG`; the terminal itself belongs to the editor.
fn init_logging() -> Result<()> {
    let Some(path) = std::env::var_os(LOG_ENV) else {
        return Ok(());
    };
    let file = File::create(&path)
        .with_context(|| format!("Creating log file {}", PathBuf::from(&path).display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

/// One optional positional argument: the file to open.
fn parse_args() -> Result<Option<PathBuf>> {
    let mut args = std::env::args_os().skip(1);
    let path = args.next().map(PathBuf::from);
    if args.next().is_some() {
        bail!("usage: rowpad [FILE]");
    }
    Ok(path)
}

fn run() -> Result<()> {
    init_logging()?;
    let path = parse_args()?;
    let config = Config::load()?;

    let mut stdout = io::stdout();
    let guard = TerminalGuard::new(&mut stdout)?;
    let result = start(&config, path.as_deref(), stdout);

    // Leave a clean screen behind on every exit path.
    let mut out = io::stdout();
    let _ = out.write_all(editor::CLEAR_SCREEN);
    let _ = out.flush();
    drop(guard);

    result
}

/// Size the editor to the window, load the file and hand over to the main loop.
fn start(config: &Config, path: Option<&Path>, mut stdout: Stdout) -> Result<()> {
    let mut input = StdinBytes::new();
    let (rows, cols) = terminal::window_size(&mut stdout, &mut input, config.escape_timeout())?;
    log::info!("window {cols}x{rows}");

    let mut editor = Editor::new(config, rows.saturating_sub(BAR_ROWS), cols);
    if let Some(p) = path {
        editor.open(p)?;
    }
    editor.set_status(HELP_MESSAGE);

    let mut console = TermConsole::new(input, stdout, config.idle_timeout(), config.escape_timeout());
    editor_loop(&mut editor, &mut console)
}

/// Render → wait for a key → apply it, until the user quits.
fn editor_loop<C: Console>(editor: &mut Editor, console: &mut C) -> Result<()> {
    loop {
        editor.refresh_screen(console)?;
        let Some(key) = console.read_key()? else {
            continue;
        };
        if editor.process_key(key, console)? {
            log::info!("quit");
            return Ok(());
        }
    }
}

//! Entry point for the BookSwipe reader.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse the subcommand.
//! - Load user configuration from `conf/config.toml`.
//! - Wire the persistent stores, then hand off to the library, the
//!   extraction pipeline, or the reading session.

mod cancel;
mod chunk;
mod config;
mod extract;
mod gesture;
mod model;
mod progress;
mod render;
mod segment;
mod session;
mod storage;
mod store;

use crate::cancel::CancelToken;
use crate::config::{AppConfig, CONFIG_PATH, load_config};
use crate::extract::{BookExtractor, ProgressSink, ProgressUpdate};
use crate::model::Book;
use crate::progress::{ReadingProgress, SystemClock};
use crate::session::ReadingSession;
use crate::storage::JsonFileStore;
use crate::store::BookStore;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};
use uuid::Uuid;

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const USAGE: &str = "\
Usage: bookswipe <command>

Commands:
  add <file.epub>   ingest a book and open it
  list              show the library
  open <id>         open a book from the library
  show              print the chunk you are on
  next | prev       move one chunk
  goto <n>          jump to chunk n (numbers start at 1)
  scroll <delta>    feed a raw swipe distance through gesture handling
  close             close the current book
  progress          today's reading progress";

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let command = parse_args()?;
    let config = load_config(Path::new(CONFIG_PATH));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(command = command.name(), level = %config.log_level, "Starting bookswipe");

    match command {
        Command::Add { path } => cmd_add(&path, &config),
        Command::List => cmd_list(&config),
        Command::Open { id } => cmd_open(id, &config),
        Command::Show => cmd_show(&config),
        Command::Next => cmd_navigate(&config, NavStep::Forward),
        Command::Prev => cmd_navigate(&config, NavStep::Backward),
        Command::Goto { number } => cmd_navigate(&config, NavStep::To(number - 1)),
        Command::Scroll { delta } => cmd_navigate(&config, NavStep::Scroll(delta)),
        Command::Close => cmd_close(&config),
        Command::Progress => cmd_progress(&config),
    }
}

enum Command {
    Add { path: PathBuf },
    List,
    Open { id: Uuid },
    Show,
    Next,
    Prev,
    Goto { number: usize },
    Scroll { delta: f32 },
    Close,
    Progress,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::List => "list",
            Command::Open { .. } => "open",
            Command::Show => "show",
            Command::Next => "next",
            Command::Prev => "prev",
            Command::Goto { .. } => "goto",
            Command::Scroll { .. } => "scroll",
            Command::Close => "close",
            Command::Progress => "progress",
        }
    }
}

fn parse_args() -> Result<Command> {
    let mut args = env::args().skip(1);
    let name = args.next().ok_or_else(|| anyhow!(USAGE))?;

    let command = match name.as_str() {
        "add" => {
            let raw = args
                .next()
                .ok_or_else(|| anyhow!("Usage: bookswipe add <file.epub>"))?;
            Command::Add {
                path: PathBuf::from(raw),
            }
        }
        "list" => Command::List,
        "open" => {
            let raw = args
                .next()
                .ok_or_else(|| anyhow!("Usage: bookswipe open <id>"))?;
            let id = Uuid::parse_str(&raw)
                .with_context(|| format!("`{raw}` is not a book id; see `bookswipe list`"))?;
            Command::Open { id }
        }
        "show" => Command::Show,
        "next" => Command::Next,
        "prev" => Command::Prev,
        "goto" => {
            let raw = args
                .next()
                .ok_or_else(|| anyhow!("Usage: bookswipe goto <n>"))?;
            let number: usize = raw
                .parse()
                .with_context(|| format!("`{raw}` is not a chunk number"))?;
            if number == 0 {
                return Err(anyhow!("chunk numbers start at 1"));
            }
            Command::Goto { number }
        }
        "scroll" => {
            let raw = args
                .next()
                .ok_or_else(|| anyhow!("Usage: bookswipe scroll <delta>"))?;
            let delta: f32 = raw
                .parse()
                .with_context(|| format!("`{raw}` is not a scroll delta"))?;
            Command::Scroll { delta }
        }
        "close" => Command::Close,
        "progress" => Command::Progress,
        other => return Err(anyhow!("unknown command `{other}`\n\n{USAGE}")),
    };
    Ok(command)
}

fn file_store(config: &AppConfig) -> JsonFileStore {
    JsonFileStore::new(Path::new(&config.data_dir), "library")
}

fn open_store(config: &AppConfig) -> BookStore {
    BookStore::load(Box::new(file_store(config)), Box::new(SystemClock))
}

fn open_progress(config: &AppConfig) -> ReadingProgress {
    ReadingProgress::load(
        Box::new(file_store(config)),
        Box::new(SystemClock),
        config.daily_goal,
    )
}

fn open_session<'b>(book: &'b Book, config: &AppConfig) -> ReadingSession<'b> {
    ReadingSession::open(
        book,
        Box::new(file_store(config)),
        open_progress(config),
        config.swipe_threshold,
    )
}

/// Prints extraction progress as a single updating line on stderr.
struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn update(&mut self, update: ProgressUpdate) {
        eprint!("\r[{:>5.1}%] {}", update.percent, update.status);
        if update.percent >= 100.0 {
            eprintln!();
        }
    }
}

fn cmd_add(path: &Path, config: &AppConfig) -> Result<()> {
    if !is_epub(path) {
        return Err(anyhow!("expected an .epub file, got {}", path.display()));
    }

    let token = CancelToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        warn!("Interrupt received, cancelling extraction");
        handler_token.cancel();
    })
    .context("failed to install the interrupt handler")?;

    let extractor = BookExtractor::new(config.max_chunk_len);
    let mut sink = ConsoleSink;
    let book = extractor
        .extract_with_cancel(path, &mut sink, Some(&token))
        .with_context(|| format!("could not ingest {}", path.display()))?;

    let summary = format!(
        "Added \"{}\" by {} ({} chunks, {} words)",
        book.title,
        book.author,
        book.chunk_count(),
        book.word_count()
    );
    let mut store = open_store(config);
    store.add_book(book);

    println!("{summary}");
    println!("It is now open; run `bookswipe show` to start reading.");
    Ok(())
}

fn cmd_list(config: &AppConfig) -> Result<()> {
    let store = open_store(config);
    let books = store.list_books();
    if books.is_empty() {
        println!("No books yet. Add one with: bookswipe add <file.epub>");
        return Ok(());
    }
    for book in books {
        println!(
            "{}  {} by {}  (last read {}, {} chunks)",
            book.id,
            book.title,
            book.author,
            book.last_read.format("%Y-%m-%d %H:%M"),
            book.chunk_count()
        );
    }
    Ok(())
}

fn cmd_open(id: Uuid, config: &AppConfig) -> Result<()> {
    let mut store = open_store(config);
    let book = store.select_book(id)?;
    let session = open_session(&book, config);
    print_page(&book, &session);
    Ok(())
}

fn cmd_show(config: &AppConfig) -> Result<()> {
    let store = open_store(config);
    let book = current_book(&store)?;
    let session = open_session(book, config);
    print_page(book, &session);
    Ok(())
}

enum NavStep {
    Forward,
    Backward,
    To(usize),
    Scroll(f32),
}

fn cmd_navigate(config: &AppConfig, step: NavStep) -> Result<()> {
    let store = open_store(config);
    let book = current_book(&store)?;
    let mut session = open_session(book, config);

    match step {
        NavStep::Forward => session.advance(1),
        NavStep::Backward => session.advance(-1),
        NavStep::To(index) => session.go_to(index)?,
        NavStep::Scroll(delta) => session.handle_scroll(delta),
    }

    print_page(book, &session);
    Ok(())
}

fn cmd_close(config: &AppConfig) -> Result<()> {
    let mut store = open_store(config);
    if store.current_book().is_none() {
        println!("No book is open.");
        return Ok(());
    }
    store.clear_current();
    println!("Closed. The book stays in your library.");
    Ok(())
}

fn cmd_progress(config: &AppConfig) -> Result<()> {
    let progress = open_progress(config);
    println!(
        "Today: {} / {} words ({:.0}%)",
        progress.words_read(),
        progress.goal(),
        progress.percentage()
    );
    Ok(())
}

fn current_book(store: &BookStore) -> Result<&Book> {
    store
        .current_book()
        .ok_or_else(|| anyhow!("no book is open; use `bookswipe open <id>`"))
}

fn print_page(book: &Book, session: &ReadingSession<'_>) {
    println!(
        "{} (chunk {} of {})",
        book.title,
        session.current_index() + 1,
        book.chunk_count()
    );
    println!();
    println!("{}", session.current_chunk().content);
    println!();
    let progress = session.progress();
    println!(
        "Today: {} / {} words ({:.0}%)",
        progress.words_read(),
        progress.goal(),
        progress.percentage()
    );
}

fn is_epub(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase()),
        Some(ext) if ext == "epub"
    )
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    }
}

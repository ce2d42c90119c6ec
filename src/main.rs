use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sift::matcher::Query;
use sift::output::{OutputForm, Printer};
use sift::session::{Outcome, Session, SessionOptions};
use sift::store::reader::{read_source, Source};
use sift::store::{IngestOptions, RecordStore};
use sift::utils::{self, AppConfig};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use termcolor::{ColorChoice, StandardStream};
use tracing::info;

const RECORD_SEPARATOR: u8 = 0x1e;

#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Interactive fuzzy finder for lines read from stdin")]
struct Cli {
    /// Records are NUL-terminated
    #[arg(short = '0', long = "null", conflicts_with = "record_separator")]
    null: bool,

    /// Records are terminated by the ASCII record separator (0x1E)
    #[arg(short = 'a', long)]
    record_separator: bool,

    /// Print the best match every time it changes
    #[arg(short = 'c', long)]
    print_changes: bool,

    /// Print every match for the initial query and exit
    #[arg(short, long)]
    filter: bool,

    /// Text shown after the match counts
    #[arg(short = 'H', long)]
    header: Option<String>,

    /// Prompt shown before the query
    #[arg(short, long)]
    prompt: Option<String>,

    /// Initial query
    #[arg(short, long, default_value = "")]
    query: String,

    /// Prefix each record with an alphabetic label
    #[arg(short = 'j', long)]
    labels: bool,

    /// Print record indices instead of their content
    #[arg(short, long)]
    indices: bool,

    /// Keep input order instead of ranking by score
    #[arg(short = 's', long)]
    no_sort: bool,

    /// Accept immediately when there is exactly one record
    #[arg(short = '1', long)]
    select_one: bool,

    /// Scoring threads (0 = one per CPU)
    #[arg(long)]
    threads: Option<usize>,

    /// Highlight matches in --filter output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    /// Command whose output is read when stdin is a terminal
    #[arg(long, default_value = "find")]
    source: String,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
            ColorMode::Auto if io::stdout().is_terminal() => ColorChoice::Auto,
            ColorMode::Auto => ColorChoice::Never,
        }
    }
}

fn main() -> ExitCode {
    utils::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("sift: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = AppConfig::load()?;
    config.sort &= !cli.no_sort;
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }
    if let Some(prompt) = &cli.prompt {
        config.prompt = prompt.clone();
    }
    if let Some(header) = &cli.header {
        config.header = header.clone();
    }

    let delimiter = if cli.null {
        0
    } else if cli.record_separator {
        RECORD_SEPARATOR
    } else {
        b'\n'
    };
    let form = if cli.indices {
        OutputForm::Index
    } else {
        OutputForm::Content
    };

    let mut store = RecordStore::new(IngestOptions {
        delimiter,
        labels: cli.labels,
        escape_scan_limit: config.escape_scan_limit,
    });
    let source = if io::stdin().is_terminal() {
        Source::Command(cli.source.clone())
    } else {
        Source::Stdin
    };
    read_source(&source, &mut store)?;

    let options = SessionOptions {
        sort: config.sort,
        threads: config.effective_threads(),
        cache_size: config.cache_size,
    };
    let mut session = Session::new(store, options)?;
    let mut printer = Printer::stdout(form, delimiter, cli.color.choice());

    if cli.select_one {
        if let Outcome::Accept(ids) = session.accept_only() {
            for id in ids {
                printer.emit(session.store().get(id))?;
            }
            printer.flush()?;
            return Ok(ExitCode::SUCCESS);
        }
    }

    if cli.filter {
        return filter(&mut session, &cli.query, &mut printer);
    }

    interactive(session, &cli, &config, &mut printer)
}

/// Non-interactive mode: print every match for `query`
fn filter(session: &mut Session, query: &str, printer: &mut Printer<StandardStream>) -> Result<ExitCode> {
    session.set_query(Query::new(query));

    let mut positions = Vec::new();
    for hit in session.matches() {
        session.positions(hit, &mut positions);
        printer
            .emit_highlighted(session.store().get(hit.id), &positions)
            .context("Failed to write matches")?;
    }
    printer.flush()?;

    let count = session.matches().len();
    info!(matches = count, "filter finished");
    Ok(if count > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(feature = "interactive")]
fn interactive(
    session: Session,
    cli: &Cli,
    config: &AppConfig,
    printer: &mut Printer<StandardStream>,
) -> Result<ExitCode> {
    use sift::editor::ExternalEditor;
    use sift::tui::{self, App, Exit, Keymap};

    let keymap = Keymap::with_overrides(&config.bindings).context("Invalid key binding in config")?;
    let mut app = App::new(session, keymap);
    app.prompt = config.prompt.clone();
    app.header = config.header.clone();
    app.print_changes = cli.print_changes;
    app.set_query(&cli.query);

    let editor = ExternalEditor::resolve(config.editor.as_deref());
    let exit = tui::run(&mut app, editor, printer)?;

    info!(?exit, "session ended");
    match exit {
        Exit::Accept(ids) => {
            for id in ids {
                printer.emit(app.session.store().get(id))?;
            }
            printer.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Exit::Status(code) => Ok(ExitCode::from(code)),
    }
}

#[cfg(not(feature = "interactive"))]
fn interactive(
    _session: Session,
    _cli: &Cli,
    _config: &AppConfig,
    _printer: &mut Printer<StandardStream>,
) -> Result<ExitCode> {
    anyhow::bail!("built without the interactive feature; use --filter")
}

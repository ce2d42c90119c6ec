mod app;
mod keymap;
mod ui;

pub use app::{App, Exit};
pub use keymap::{parse_key, Action, Keymap};

use crate::editor::{EditError, EditSession, ExternalEditor};
use crate::output::Printer;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use termcolor::WriteColor;
use tracing::{debug, warn};

type Term = Terminal<CrosstermBackend<Box<dyn Write>>>;

/// Run the picker until a command ends it. Accepted and emitted records go to
/// `printer`; the UI itself is drawn on the controlling terminal.
pub fn run<W: WriteColor>(
    app: &mut App,
    mut editor: ExternalEditor,
    printer: &mut Printer<W>,
) -> Result<Exit> {
    let tty = open_terminal()?;
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut terminal = match enter(tty) {
        Ok(terminal) => terminal,
        Err(err) => {
            if let Err(restore) = disable_raw_mode() {
                warn!(error = %restore, "failed to leave raw mode");
            }
            return Err(err);
        }
    };

    let result = run_app(&mut terminal, app, &mut editor, printer);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Switch `tty` to the alternate screen and wrap it for drawing
fn enter(mut tty: Box<dyn Write>) -> Result<Term> {
    execute!(tty, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(tty))?;
    terminal.clear()?;
    Ok(terminal)
}

fn run_app<W: WriteColor>(
    terminal: &mut Term,
    app: &mut App,
    editor: &mut ExternalEditor,
    printer: &mut Printer<W>,
) -> Result<Exit> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;
        app.print_best(printer)?;

        // Only handle key press events, not release or repeat
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let mut suspending = SuspendingEditor {
                terminal: &mut *terminal,
                editor: &mut *editor,
            };
            if let Some(exit) = app.handle_key(key, &mut suspending, printer)? {
                debug!(?exit, "picker finished");
                return Ok(exit);
            }
        }
    }
}

/// The UI is drawn on the controlling terminal so stdin and stdout stay free
/// for records.
#[cfg(unix)]
fn open_terminal() -> Result<Box<dyn Write>> {
    let tty = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/tty")
        .context("Failed to open /dev/tty")?;
    Ok(Box::new(tty))
}

#[cfg(not(unix))]
fn open_terminal() -> Result<Box<dyn Write>> {
    Ok(Box::new(io::stderr()))
}

/// Hands the terminal to the external editor for the length of one edit
struct SuspendingEditor<'a> {
    terminal: &'a mut Term,
    editor: &'a mut ExternalEditor,
}

impl SuspendingEditor<'_> {
    fn suspend(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }

    fn resume(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        self.terminal.clear()
    }
}

impl EditSession for SuspendingEditor<'_> {
    fn edit(&mut self, content: &[u8]) -> Result<Vec<u8>, EditError> {
        if let Err(err) = self.suspend() {
            warn!(error = %err, "failed to suspend terminal for editor");
        }
        let result = self.editor.edit(content);
        if let Err(err) = self.resume() {
            warn!(error = %err, "failed to restore terminal after editor");
        }
        result
    }
}

use crate::editor::EditSession;
use crate::matcher::Query;
use crate::output::Printer;
use crate::session::{Command, Outcome, Session};
use crate::store::RecordId;
use crate::tui::keymap::{Action, Keymap};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::io;
use termcolor::WriteColor;
use tracing::info;

/// How the interactive loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    /// Print these records, then exit successfully
    Accept(Vec<RecordId>),
    /// Exit with this status and print nothing more
    Status(u8),
}

/// Interactive state on top of the ranking session
pub struct App {
    pub session: Session,
    /// Query text as typed
    pub query: String,
    pub prompt: String,
    pub header: String,
    /// Emit the best match after every redraw
    pub print_changes: bool,
    /// Shown in the status line until the next key
    pub status_message: Option<String>,
    keymap: Keymap,
}

impl App {
    pub fn new(session: Session, keymap: Keymap) -> Self {
        Self {
            session,
            query: String::new(),
            prompt: "> ".to_string(),
            header: String::new(),
            print_changes: false,
            status_message: None,
            keymap,
        }
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.session.set_query(Query::new(&self.query));
    }

    /// Status line: `[matches/universe] header`, with the total when the
    /// universe has been narrowed
    pub fn status_line(&self) -> String {
        let matches = self.session.matches().len();
        let universe = self.session.universe().len();
        let total = self.session.total_len();

        let counts = if universe == total {
            format!("[{}/{}]", matches, universe)
        } else {
            format!("[{}/{} ({})]", matches, universe, total)
        };

        match (&self.status_message, self.header.is_empty()) {
            (Some(message), _) => format!("{} {}", counts, message),
            (None, true) => counts,
            (None, false) => format!("{} {}", counts, self.header),
        }
    }

    /// Handle one key press. `Some` ends the loop.
    pub fn handle_key<W: WriteColor>(
        &mut self,
        key: KeyEvent,
        editor: &mut dyn EditSession,
        printer: &mut Printer<W>,
    ) -> io::Result<Option<Exit>> {
        self.status_message = None;

        match self.keymap.lookup(&key) {
            Some(Action::Run(command)) => return self.run(command, editor, printer),
            Some(Action::DeleteChar) => {
                self.query.pop();
            }
            Some(Action::DeleteWord) => self.delete_word(),
            Some(Action::ClearQuery) => self.query.clear(),
            None => match key.code {
                KeyCode::Char(c)
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    self.query.push(c);
                }
                _ => return Ok(None),
            },
        }

        self.session.set_query(Query::new(&self.query));
        Ok(None)
    }

    /// Run a session command and act on its outcome
    pub fn run<W: WriteColor>(
        &mut self,
        command: Command,
        editor: &mut dyn EditSession,
        printer: &mut Printer<W>,
    ) -> io::Result<Option<Exit>> {
        match self.session.apply(command, editor) {
            Outcome::Continue => {}
            Outcome::QueryCleared => self.query.clear(),
            Outcome::Emit(ids) => self.emit(&ids, printer)?,
            Outcome::Accept(ids) => {
                info!(records = ids.len(), "accepted");
                return Ok(Some(Exit::Accept(ids)));
            }
            Outcome::NoMatch => return Ok(Some(Exit::Status(1))),
            Outcome::Quit(code) => return Ok(Some(Exit::Status(code))),
            Outcome::EditFailed(err) => self.status_message = Some(err.to_string()),
        }
        Ok(None)
    }

    fn emit<W: WriteColor>(&self, ids: &[RecordId], printer: &mut Printer<W>) -> io::Result<()> {
        for &id in ids {
            printer.emit(self.session.store().get(id))?;
        }
        printer.flush()
    }

    /// With `print_changes`, emit the current best match
    pub fn print_best<W: WriteColor>(&self, printer: &mut Printer<W>) -> io::Result<()> {
        match self.session.matches().first() {
            Some(hit) if self.print_changes => self.emit(&[hit.id], printer),
            _ => Ok(()),
        }
    }

    /// Delete word backward (Ctrl+W)
    pub fn delete_word(&mut self) {
        let trimmed = self.query.trim_end_matches(' ');
        let cut = trimmed.rfind(' ').map(|i| i + 1).unwrap_or(0);
        self.query.truncate(cut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditError;
    use crate::output::OutputForm;
    use crate::session::SessionOptions;
    use crate::store::{IngestOptions, RecordStore};
    use termcolor::NoColor;

    struct NoEditor;

    impl EditSession for NoEditor {
        fn edit(&mut self, _content: &[u8]) -> Result<Vec<u8>, EditError> {
            Err(EditError::Read(io::Error::other("no editor in tests")))
        }
    }

    fn app(lines: &[u8]) -> App {
        let store = RecordStore::from_bytes(lines, IngestOptions::default());
        let options = SessionOptions {
            threads: 1,
            ..Default::default()
        };
        App::new(Session::new(store, options).unwrap(), Keymap::default())
    }

    fn printer() -> Printer<NoColor<Vec<u8>>> {
        Printer::new(NoColor::new(Vec::new()), OutputForm::Content, b'\n')
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str, out: &mut Printer<NoColor<Vec<u8>>>) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)), &mut NoEditor, out).unwrap();
        }
    }

    #[test]
    fn test_typing_filters() {
        let mut app = app(b"src/main.rs\nREADME.md\n");
        let mut out = printer();
        type_text(&mut app, "rea", &mut out);

        assert_eq!(app.query, "rea");
        assert_eq!(app.session.matches().len(), 1);
        assert_eq!(app.status_line(), "[1/2]");
    }

    #[test]
    fn test_enter_accepts_best() {
        let mut app = app(b"alpha\nbeta\n");
        let mut out = printer();
        type_text(&mut app, "b", &mut out);

        let exit = app.handle_key(key(KeyCode::Enter), &mut NoEditor, &mut out).unwrap();
        assert_eq!(exit, Some(Exit::Accept(vec![1])));
    }

    #[test]
    fn test_enter_without_matches_fails() {
        let mut app = app(b"alpha\n");
        let mut out = printer();
        type_text(&mut app, "zz", &mut out);

        let exit = app.handle_key(key(KeyCode::Enter), &mut NoEditor, &mut out).unwrap();
        assert_eq!(exit, Some(Exit::Status(1)));
    }

    #[test]
    fn test_escape_and_interrupt_codes() {
        let mut app = app(b"a\n");
        let mut out = printer();
        assert_eq!(
            app.handle_key(key(KeyCode::Esc), &mut NoEditor, &mut out).unwrap(),
            Some(Exit::Status(1))
        );
        assert_eq!(
            app.handle_key(ctrl('c'), &mut NoEditor, &mut out).unwrap(),
            Some(Exit::Status(130))
        );
    }

    #[test]
    fn test_narrow_clears_query_and_shows_total() {
        let mut app = app(b"src/app.rs\nsrc/ui.rs\ndocs/guide.md\n");
        let mut out = printer();
        type_text(&mut app, "src", &mut out);
        app.handle_key(key(KeyCode::Tab), &mut NoEditor, &mut out).unwrap();

        assert!(app.query.is_empty());
        assert_eq!(app.status_line(), "[2/2 (3)]");

        app.handle_key(key(KeyCode::BackTab), &mut NoEditor, &mut out).unwrap();
        assert_eq!(app.status_line(), "[3/3]");
    }

    #[test]
    fn test_narrow_to_single_record_accepts() {
        let mut app = app(b"alpha\nbeta\n");
        let mut out = printer();
        type_text(&mut app, "b", &mut out);
        let exit = app.handle_key(key(KeyCode::Tab), &mut NoEditor, &mut out).unwrap();

        assert_eq!(exit, Some(Exit::Accept(vec![1])));
    }

    #[test]
    fn test_line_editing() {
        let mut app = app(b"x\n");
        let mut out = printer();
        type_text(&mut app, "foo bar", &mut out);

        app.handle_key(ctrl('w'), &mut NoEditor, &mut out).unwrap();
        assert_eq!(app.query, "foo ");
        app.handle_key(key(KeyCode::Backspace), &mut NoEditor, &mut out).unwrap();
        assert_eq!(app.query, "foo");
        app.handle_key(ctrl('u'), &mut NoEditor, &mut out).unwrap();
        assert!(app.query.is_empty());
    }

    #[test]
    fn test_failed_edit_reports_in_status() {
        let mut app = app(b"a\nb\n");
        let mut out = printer();
        let exit = app.handle_key(ctrl('e'), &mut NoEditor, &mut out).unwrap();

        assert_eq!(exit, None);
        assert!(app.status_line().contains("no editor in tests"));
        assert_eq!(app.session.total_len(), 2);
    }

    #[test]
    fn test_emit_keeps_running() {
        let mut app = app(b"one\ntwo\n");
        let mut out = printer();
        let exit = app.handle_key(ctrl('y'), &mut NoEditor, &mut out).unwrap();

        assert_eq!(exit, None);
        assert_eq!(out.into_inner().into_inner(), b"one\n");
    }

    #[test]
    fn test_print_best_follows_query() {
        let mut app = app(b"alpha\nbeta\n");
        let mut out = printer();
        app.print_best(&mut out).unwrap();

        app.print_changes = true;
        app.print_best(&mut out).unwrap();
        type_text(&mut app, "b", &mut out);
        app.print_best(&mut out).unwrap();
        type_text(&mut app, "z", &mut out);
        app.print_best(&mut out).unwrap();

        assert_eq!(out.into_inner().into_inner(), b"alpha\nbeta\n");
    }
}

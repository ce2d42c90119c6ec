//! Printing accepted and filtered records

use crate::render::segments;
use crate::store::Record;
use std::io::{self, Write};
use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};

/// What is printed for an emitted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputForm {
    /// The record content with any label stripped
    #[default]
    Content,
    /// The record's ingestion index
    Index,
}

/// Writes delimiter-terminated records to a color-aware stream
pub struct Printer<W> {
    out: W,
    form: OutputForm,
    delimiter: u8,
}

impl Printer<StandardStream> {
    pub fn stdout(form: OutputForm, delimiter: u8, choice: ColorChoice) -> Self {
        Self::new(StandardStream::stdout(choice), form, delimiter)
    }
}

impl<W: WriteColor> Printer<W> {
    pub fn new(out: W, form: OutputForm, delimiter: u8) -> Self {
        Self {
            out,
            form,
            delimiter,
        }
    }

    /// Print one record in output form
    pub fn emit(&mut self, record: &Record) -> io::Result<()> {
        match self.form {
            OutputForm::Content => self.out.write_all(record.content())?,
            OutputForm::Index => write!(self.out, "{}", record.index())?,
        }
        self.out.write_all(&[self.delimiter])
    }

    /// Print one record with its matched bytes emphasized, when the stream
    /// takes color. Index output is never decorated.
    pub fn emit_highlighted(&mut self, record: &Record, positions: &[u32]) -> io::Result<()> {
        if self.form == OutputForm::Index || positions.is_empty() || !self.out.supports_color() {
            return self.emit(record);
        }

        // termcolor has no reverse video
        let mut emphasis = ColorSpec::new();
        emphasis.set_reset(false).set_bold(true).set_underline(true);

        for segment in segments(record, positions, record.label_len(), true) {
            if segment.highlighted {
                self.out.set_color(&emphasis)?;
                self.out.write_all(segment.bytes(record))?;
                self.out.reset()?;
            } else {
                self.out.write_all(segment.bytes(record))?;
            }
        }
        self.out.write_all(&[self.delimiter])
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DEFAULT_ESCAPE_SCAN_LIMIT;
    use termcolor::{Ansi, NoColor};

    fn record() -> Record {
        Record::new(4, b"E\t", b"apple.txt", DEFAULT_ESCAPE_SCAN_LIMIT)
    }

    #[test]
    fn test_emit_content_strips_label() {
        let mut printer = Printer::new(NoColor::new(Vec::new()), OutputForm::Content, b'\n');
        printer.emit(&record()).unwrap();
        assert_eq!(printer.into_inner().into_inner(), b"apple.txt\n");
    }

    #[test]
    fn test_emit_index_with_nul_delimiter() {
        let mut printer = Printer::new(NoColor::new(Vec::new()), OutputForm::Index, 0);
        printer.emit(&record()).unwrap();
        assert_eq!(printer.into_inner().into_inner(), b"4\0");
    }

    #[test]
    fn test_highlight_without_color_is_plain() {
        let mut printer = Printer::new(NoColor::new(Vec::new()), OutputForm::Content, b'\n');
        printer.emit_highlighted(&record(), &[2, 3]).unwrap();
        assert_eq!(printer.into_inner().into_inner(), b"apple.txt\n");
    }

    #[test]
    fn test_highlight_with_color_wraps_matches() {
        let mut printer = Printer::new(Ansi::new(Vec::new()), OutputForm::Content, b'\n');
        printer.emit_highlighted(&record(), &[2, 3]).unwrap();
        let out = printer.into_inner().into_inner();

        assert!(out.starts_with(b"\x1b["));
        assert!(out.ends_with(b"ple.txt\n"));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("ap"));
        assert!(text.contains("\x1b[0m"));
    }
}

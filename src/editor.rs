//! External editor round trip.
//!
//! The session hands a byte buffer to an [`EditSession`] and gets the edited
//! buffer back. Any failure leaves the caller's state untouched.

use std::fs;
#[cfg(unix)]
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::debug;

/// Editor used when neither the config nor the environment names one
const FALLBACK_EDITOR: &str = "vi";

#[derive(Debug, Error)]
pub enum EditError {
    #[error("failed to prepare temporary file: {0}")]
    TempFile(#[source] io::Error),

    #[error("failed to launch editor `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("editor `{command}` exited with {status}")]
    Status { command: String, status: ExitStatus },

    #[error("failed to read edited file: {0}")]
    Read(#[source] io::Error),
}

/// Capability to run one interactive editing session over a buffer
pub trait EditSession {
    fn edit(&mut self, content: &[u8]) -> Result<Vec<u8>, EditError>;
}

/// Runs an editor program on a temporary file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEditor {
    program: String,
    args: Vec<String>,
}

impl ExternalEditor {
    /// Parse a command line such as `code --wait`. `None` if blank.
    pub fn new(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
        })
    }

    /// Resolve the editor: `configured`, then `$VISUAL`, `$EDITOR`, then `vi`
    pub fn resolve(configured: Option<&str>) -> Self {
        let from_env = |name: &str| std::env::var(name).ok();
        configured
            .map(str::to_string)
            .into_iter()
            .chain(from_env("VISUAL"))
            .chain(from_env("EDITOR"))
            .find_map(|command| Self::new(&command))
            .unwrap_or_else(|| Self {
                program: FALLBACK_EDITOR.to_string(),
                args: Vec::new(),
            })
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(path);

        // Our own stdin and stdout are usually pipes
        if let Some((input, output)) = terminal_stdio() {
            cmd.stdin(input).stdout(output);
        }
        cmd
    }
}

impl EditSession for ExternalEditor {
    fn edit(&mut self, content: &[u8]) -> Result<Vec<u8>, EditError> {
        let mut file = tempfile::Builder::new()
            .prefix("sift-")
            .suffix(".txt")
            .tempfile()
            .map_err(EditError::TempFile)?;
        file.write_all(content)
            .and_then(|_| file.flush())
            .map_err(EditError::TempFile)?;

        debug!(editor = %self.command_line(), path = %file.path().display(), "launching editor");
        let status = self
            .command(file.path())
            .status()
            .map_err(|source| EditError::Spawn {
                command: self.command_line(),
                source,
            })?;

        if !status.success() {
            return Err(EditError::Status {
                command: self.command_line(),
                status,
            });
        }

        fs::read(file.path()).map_err(EditError::Read)
    }
}

#[cfg(unix)]
fn terminal_stdio() -> Option<(Stdio, Stdio)> {
    let tty = OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/tty")
        .ok()?;
    let output = tty.try_clone().ok()?;
    Some((Stdio::from(tty), Stdio::from(output)))
}

#[cfg(not(unix))]
fn terminal_stdio() -> Option<(Stdio, Stdio)> {
    None
}

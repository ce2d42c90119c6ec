use super::RecordStore;
use anyhow::{Context, Result};
use std::io::{self, BufRead, BufReader};
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// Where input lines come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Standard input
    Stdin,
    /// Standard output of a shell command
    Command(String),
}

/// Split a delimited buffer into records.
///
/// A trailing delimiter does not produce an extra empty record; a final
/// unterminated unit is kept whole.
pub fn split_records(bytes: &[u8], delimiter: u8) -> impl Iterator<Item = &[u8]> {
    let body = bytes.strip_suffix(&[delimiter]).unwrap_or(bytes);
    let empty = bytes.is_empty();
    body.split(move |&b| b == delimiter).filter(move |_| !empty)
}

/// Read delimited records from `reader` into `store`, returning the count
pub fn read_records<R: BufRead>(mut reader: R, store: &mut RecordStore) -> io::Result<usize> {
    let delimiter = store.options().delimiter;
    let mut line = Vec::new();
    let mut count = 0;

    loop {
        line.clear();
        if reader.read_until(delimiter, &mut line)? == 0 {
            break;
        }
        if line.last() == Some(&delimiter) {
            line.pop();
        }
        store.push(&line);
        count += 1;
    }

    Ok(count)
}

/// Fill `store` from `source`
pub fn read_source(source: &Source, store: &mut RecordStore) -> Result<usize> {
    let count = match source {
        Source::Stdin => read_records(io::stdin().lock(), store)
            .context("Failed to read records from stdin")?,
        Source::Command(command) => {
            let mut child = shell_command(command)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .spawn()
                .with_context(|| format!("Failed to run source command: {}", command))?;

            let stdout = child
                .stdout
                .take()
                .context("Source command has no stdout")?;
            let count = read_records(BufReader::new(stdout), store)
                .with_context(|| format!("Failed to read output of: {}", command))?;

            // Partial output (e.g. `find` hitting unreadable directories) is still usable
            let status = child.wait()?;
            if !status.success() {
                warn!(%command, %status, "source command exited unsuccessfully");
            }
            count
        }
    };

    info!(records = count, "ingested records");
    Ok(count)
}

/// Command running `command` through the platform shell
pub fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

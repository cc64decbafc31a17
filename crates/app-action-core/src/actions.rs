//! GitHub Actions workflow commands and step outputs.

use std::fs::OpenOptions;
use std::io::{Stdout, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::env::Environment;

/// Prefix of the heredoc delimiters written to the `GITHUB_OUTPUT` file.
pub const DELIMITER_PREFIX: &str = "ghadelimiter_";

/// Sink for everything the action reports back to the workflow run.
pub trait Reporter {
    /// Write a line to the step log.
    fn info(&self, message: &str);

    /// Emit an error annotation.
    fn error(&self, message: &str);

    /// Ask the runner to redact `value` from all further log output.
    fn add_mask(&self, value: &str);

    /// Start a collapsible log group.
    fn group(&self, title: &str);

    fn end_group(&self);

    /// Set a step output. Values may span multiple lines.
    fn set_output(&self, name: &str, value: &str) -> crate::Result<()>;
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }

    fn add_mask(&self, value: &str) {
        (**self).add_mask(value)
    }

    fn group(&self, title: &str) {
        (**self).group(title)
    }

    fn end_group(&self) {
        (**self).end_group()
    }

    fn set_output(&self, name: &str, value: &str) -> crate::Result<()> {
        (**self).set_output(name, value)
    }
}

/// [`Reporter`] speaking the GitHub Actions runner protocol.
///
/// Log lines and workflow commands go to `out` (stdout in production).
/// Outputs are appended to the `GITHUB_OUTPUT` file when the runner provides
/// one, and fall back to the `::set-output` command otherwise.
pub struct GitHubActions<W: Write = Stdout> {
    out: Mutex<W>,
    output_file: Option<PathBuf>,
}

impl GitHubActions<Stdout> {
    pub fn from_env(env: &impl Environment) -> Self {
        Self::with_writer(
            std::io::stdout(),
            env.var("GITHUB_OUTPUT")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        )
    }
}

impl<W: Write> GitHubActions<W> {
    pub fn with_writer(out: W, output_file: Option<PathBuf>) -> Self {
        Self {
            out: Mutex::new(out),
            output_file,
        }
    }

    pub fn into_writer(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let result = if line.ends_with('\n') {
            out.write_all(line.as_bytes())
        } else {
            writeln!(out, "{line}")
        };
        if let Err(e) = result.and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "failed to write to the step log");
        }
    }

    fn command(&self, name: &str, value: &str) {
        self.write_line(&format!("::{name}::{}", escape_data(value)));
    }
}

impl<W: Write> Reporter for GitHubActions<W> {
    fn info(&self, message: &str) {
        self.write_line(message);
    }

    fn error(&self, message: &str) {
        self.command("error", message);
    }

    fn add_mask(&self, value: &str) {
        self.command("add-mask", value);
    }

    fn group(&self, title: &str) {
        self.command("group", title);
    }

    fn end_group(&self) {
        self.write_line("::endgroup::");
    }

    fn set_output(&self, name: &str, value: &str) -> crate::Result<()> {
        let Some(path) = &self.output_file else {
            self.write_line(&format!("::set-output name={name}::{}", escape_data(value)));
            return Ok(());
        };

        // Fresh per write, so no value can close its own heredoc.
        let delimiter = format!("{DELIMITER_PREFIX}{}", uuid::Uuid::new_v4());
        let entry = format!("{name}<<{delimiter}\n{value}\n{delimiter}\n");
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(entry.as_bytes()))
            .map_err(|e| crate::Error::OutputWrite {
                name: name.to_owned(),
                source: e,
            })
    }
}

/// Escape a workflow command's data so newlines survive as one command.
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

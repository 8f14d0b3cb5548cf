use std::io::{self, BufRead, Write};

use resubmit_core::errors::{ErrorInfo, ResubError};
use resubmit_core::record::{render_field, JobRecord};

use crate::config::PromptDirective;

/// Asks the operator whether a submission should go ahead.
pub trait Confirm {
    /// Shows `preview` and returns true only on an affirmative answer.
    fn confirm(&mut self, preview: &[String]) -> Result<bool, ResubError>;
}

/// Lines shown before the confirmation question.
///
/// A column directive lists that column's value for every job, with
/// `<missing>` for records that lack it. A plain flag shows nothing.
pub fn preview_lines(records: &[JobRecord], directive: &PromptDirective) -> Vec<String> {
    let Some(column) = directive.column() else {
        return Vec::new();
    };
    let mut lines = vec![format!("About to submit {} job(s)", records.len())];
    lines.extend(records.iter().enumerate().map(|(idx, record)| {
        let value = render_field(record, column).unwrap_or_else(|| "<missing>".to_string());
        format!("  [{idx}] {column}={value}")
    }));
    lines
}

/// Line-based confirmation over arbitrary streams; only `y` is affirmative.
pub struct StreamConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StreamConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consumes the prompt and returns the output stream.
    pub fn into_output(self) -> W {
        self.output
    }
}

/// Confirmation on the process's standard streams, locking stdin only while asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, preview: &[String]) -> Result<bool, ResubError> {
        StreamConfirm::new(io::stdin().lock(), io::stdout()).confirm(preview)
    }
}

fn prompt_error(err: io::Error) -> ResubError {
    ResubError::Prompt(ErrorInfo::new("prompt-io", err.to_string()))
}

impl<R: BufRead, W: Write> Confirm for StreamConfirm<R, W> {
    fn confirm(&mut self, preview: &[String]) -> Result<bool, ResubError> {
        for line in preview {
            writeln!(self.output, "{line}").map_err(prompt_error)?;
        }
        write!(self.output, "Do you want to continue? [y/n] ").map_err(prompt_error)?;
        self.output.flush().map_err(prompt_error)?;
        let mut answer = String::new();
        self.input.read_line(&mut answer).map_err(prompt_error)?;
        Ok(answer.trim() == "y")
    }
}

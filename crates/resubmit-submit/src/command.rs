use std::process::Command;
use std::sync::Arc;

use resubmit_core::errors::{ErrorInfo, ResubError};
use resubmit_core::record::{render_field, JobRecord};

use crate::executor::JobFn;

/// Environment variable carrying the job record as JSON.
pub const JOB_ENV: &str = "RESUBMIT_JOB";

/// Substitutes `{column}` placeholders with the record's rendered values.
///
/// `{{` and `}}` produce literal braces.
pub fn render_command(template: &str, record: &JobRecord) -> Result<String, ResubError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    name.push(inner);
                }
                if !closed {
                    return Err(template_error("unclosed-placeholder", template, &name));
                }
                let value = render_field(record, &name)
                    .ok_or_else(|| template_error("unknown-placeholder", template, &name))?;
                out.push_str(&value);
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn template_error(code: &str, template: &str, name: &str) -> ResubError {
    ResubError::Configuration(
        ErrorInfo::new(code, format!("cannot fill placeholder '{{{name}}}'"))
            .with_context("template", template),
    )
}

/// Job function running a shell command per record.
///
/// The rendered command runs under `sh -c` with [`JOB_ENV`] set; the trimmed
/// standard output is the job's result.
pub fn command_job(template: impl Into<String>) -> JobFn<String> {
    let template = template.into();
    Arc::new(move |record| run_command(&template, record))
}

fn run_command(template: &str, record: &JobRecord) -> Result<String, ResubError> {
    let command = render_command(template, record)?;
    let payload = serde_json::to_string(record)
        .map_err(|err| ResubError::Serde(ErrorInfo::new("json_serialize", err.to_string())))?;
    let output = Command::new("sh")
        .arg("-c")
        .arg(&command)
        .env(JOB_ENV, payload)
        .output()
        .map_err(|err| {
            ResubError::Job(
                ErrorInfo::new("command-spawn", err.to_string()).with_context("command", &command),
            )
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let mut info = ErrorInfo::new(
            "command-failed",
            format!("command exited with {}", output.status),
        )
        .with_context("command", command);
        if !stderr.is_empty() {
            info = info.with_hint(stderr);
        }
        return Err(ResubError::Job(info));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

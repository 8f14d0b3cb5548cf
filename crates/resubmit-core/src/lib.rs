#![deny(missing_docs)]
#![doc = "Core error taxonomy and record types shared by the resubmit grid engine and submitter."]

pub mod errors;
pub mod record;

pub use errors::{ErrorInfo, ErrorKind, ResubError};
pub use record::{render_field, render_value, JobRecord};

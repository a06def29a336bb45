//! Line-based request framing understood by the external engine.
//!
//! A request is exactly three newline-terminated lines on the engine's
//! stdin: the operation token, the input path, the output path. Paths are
//! passed as given; the engine owns existence checks.

use crate::error::JobError;
use crate::job::{Job, Operation};

/// Number of lines in one request.
pub const REQUEST_LINES: usize = 3;

/// Serialize a job into the engine's stdin format.
pub fn encode(job: &Job) -> Result<Vec<u8>, JobError> {
    job.validate()?;

    let fields = [
        job.operation().as_str(),
        job.input_path(),
        job.output_path(),
    ];
    if fields.iter().any(|f| f.contains(['\n', '\r'])) {
        return Err(JobError::invalid("path contains a line break"));
    }

    let mut out = Vec::with_capacity(fields.iter().map(|f| f.len() + 1).sum());
    for field in fields {
        out.extend_from_slice(field.as_bytes());
        out.push(b'\n');
    }
    Ok(out)
}

/// Parse a request back into a job. Accepts exactly the framing [`encode`] emits.
pub fn decode(bytes: &[u8]) -> Result<Job, JobError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| JobError::invalid("request is not valid UTF-8"))?;
    let body = text
        .strip_suffix('\n')
        .ok_or_else(|| JobError::invalid("request is not newline-terminated"))?;

    let lines: Vec<&str> = body.split('\n').collect();
    if lines.len() != REQUEST_LINES {
        return Err(JobError::invalid(format!(
            "expected {REQUEST_LINES} request lines, got {}",
            lines.len()
        )));
    }

    let operation: Operation = lines[0].parse()?;
    let job = Job::new(operation, lines[1], lines[2]);
    job.validate()?;
    Ok(job)
}

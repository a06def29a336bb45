//! The unit of work handed to the engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// What the engine should do with the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Compress,
    Decompress,
}

impl Operation {
    /// Protocol token, as the engine expects it on its first input line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compress => "compress",
            Self::Decompress => "decompress",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compress" => Ok(Self::Compress),
            "decompress" => Ok(Self::Decompress),
            other => Err(JobError::invalid(format!("unknown operation: {other}"))),
        }
    }
}

/// One compress/decompress request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    operation: Operation,
    input_path: String,
    output_path: String,
}

impl Job {
    pub fn new(
        operation: Operation,
        input_path: impl Into<String>,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn input_path(&self) -> &str {
        &self.input_path
    }

    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    /// A job is runnable once both paths are filled in.
    pub fn validate(&self) -> Result<(), JobError> {
        if self.input_path.is_empty() || self.output_path.is_empty() {
            return Err(JobError::invalid("missing input or output path"));
        }
        Ok(())
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.operation, self.input_path, self.output_path
        )
    }
}

use std::process::ExitStatus;

use thiserror::Error;

use crate::aws::AwsError;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error(transparent)]
    Aws(#[from] AwsError),
    #[error("{command} exited with {status}: {stderr}")]
    Terraform {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse terraform output: {0}")]
    OutputParse(#[from] serde_json::Error),
    #[error("terraform output {0:?} is missing")]
    MissingOutput(String),
    #[error("terraform output {name:?} is not a {expected}")]
    OutputType { name: String, expected: &'static str },
    #[error("endpoint probe failed: {0}")]
    Probe(#[from] reqwest::Error),
    #[error("verification failed: {0}")]
    Verification(String),
}

pub type HarnessResult<T> = Result<T, HarnessError>;

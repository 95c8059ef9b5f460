use std::process::ExitCode;

use anyhow::Result;
use imagepress_core::domain::RunOutcome;
use imagepress_core::error::Error;
use imagepress_core::imaging::ImageBackend;
use imagepress_core::Pipeline;

/// How a batch ended, as far as the exit status is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Done,
    Fatal,
}

impl From<Completion> for ExitCode {
    fn from(completion: Completion) -> Self {
        match completion {
            Completion::Done => ExitCode::SUCCESS,
            Completion::Fatal => ExitCode::FAILURE,
        }
    }
}

/// Run one batch. A held lock is a normal, silent exit; only a missing
/// required codec (or an unusable catalog or lock file) fails the process.
pub fn run(pipeline: &mut Pipeline) -> Result<ExitCode> {
    execute(pipeline).map(ExitCode::from)
}

pub fn execute<B: ImageBackend>(pipeline: &mut Pipeline<B>) -> Result<Completion> {
    match pipeline.run() {
        Ok(RunOutcome::LockHeld) => Ok(Completion::Done),
        Ok(RunOutcome::Completed(_)) => Ok(Completion::Done),
        // Already logged with a remediation hint by the pipeline.
        Err(Error::MissingCapability(_)) => Ok(Completion::Fatal),
        Err(e) => Err(e.into()),
    }
}

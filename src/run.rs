//! Helpers for driving a `Machine` from the outside: a bounded step loop and the
//! classification of its result.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::machine::{Machine, Status};
use crate::types::{Mode, RuntimeError, DEFAULT_MAX_STEPS, DEFAULT_TAPE_DISPLAY};

/// Caller-side limits for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// How many loop iterations to allow before giving up on the machine.
    pub max_steps: usize,
    pub mode: Mode,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            mode: Mode::Normal,
        }
    }
}

/// The result of a bounded run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accept,
    Reject,
    /// Halted in a plain halt state with this tape output.
    Output(String),
    /// Still running when the step bound was exhausted.
    Diverged,
}

impl Verdict {
    /// Classifies a machine whose run has ended, either halted or out of steps.
    pub fn of(machine: &Machine) -> Self {
        match machine.status() {
            Status::Accepted => Verdict::Accept,
            Status::Rejected => Verdict::Reject,
            Status::Halted => Verdict::Output(machine.output()),
            Status::Running => Verdict::Diverged,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accept => f.write_str("yes"),
            Verdict::Reject => f.write_str("no"),
            Verdict::Output(tape) => f.write_str(tape),
            Verdict::Diverged => f.write_str("/"),
        }
    }
}

/// Runs `machine` until it halts or `options.max_steps` loop iterations have passed.
///
/// An implicit halt on a missing transition uses up an iteration without counting as a step.
pub fn run(machine: &mut Machine, options: &RunOptions) -> Result<Verdict, RuntimeError> {
    for _ in 0..options.max_steps {
        if machine.is_halted() {
            break;
        }
        machine.step(options.mode)?;
    }

    let verdict = Verdict::of(machine);
    tracing::debug!(steps = machine.steps(), state = machine.state(), %verdict, "run finished");

    Ok(verdict)
}

/// A summary of a finished run, suitable for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// `yes`, `no`, the tape output, or `/`.
    pub result: String,
    pub halted: bool,
    pub steps: usize,
    pub state: String,
    pub tape: String,
}

impl Report {
    pub fn new(machine: &Machine, verdict: &Verdict) -> Self {
        Self {
            result: verdict.to_string(),
            halted: machine.is_halted(),
            steps: machine.steps(),
            state: machine.state().to_string(),
            tape: machine.tape_string(DEFAULT_TAPE_DISPLAY),
        }
    }
}

//! Linear step controller for multi-step wizards
//!
//! Steps are numbered `1..=total_steps`. Moves past either end clamp, and
//! `go_to_step` with an out-of-range target leaves the current step alone.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepController {
    current: usize,
    initial: usize,
    total: usize,
}

impl StepController {
    pub fn new(total_steps: usize, initial_step: usize) -> Result<Self, StepError> {
        if total_steps == 0 {
            return Err(StepError::NoSteps);
        }
        if !(1..=total_steps).contains(&initial_step) {
            return Err(StepError::InitialOutOfRange {
                initial: initial_step,
                total: total_steps,
            });
        }
        Ok(Self {
            current: initial_step,
            initial: initial_step,
            total: total_steps,
        })
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn total_steps(&self) -> usize {
        self.total
    }

    /// Jump to `step`. Returns `false` and does nothing when out of range.
    pub fn go_to_step(&mut self, step: usize) -> bool {
        if !(1..=self.total).contains(&step) {
            return false;
        }
        self.current = step;
        true
    }

    pub fn next_step(&mut self) {
        self.current = (self.current + 1).min(self.total);
    }

    pub fn prev_step(&mut self) {
        self.current = self.current.saturating_sub(1).max(1);
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    pub fn is_first_step(&self) -> bool {
        self.current == 1
    }

    pub fn is_last_step(&self) -> bool {
        self.current == self.total
    }

    /// Completion percentage, rounded
    pub fn progress(&self) -> u8 {
        ((self.current as f64 / self.total as f64) * 100.0).round() as u8
    }
}

/// Named steps of the transcription wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionStep {
    Input = 1,
    Transcribing = 2,
    Select = 3,
}

impl TranscriptionStep {
    pub const COUNT: usize = 3;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            1 => Some(TranscriptionStep::Input),
            2 => Some(TranscriptionStep::Transcribing),
            3 => Some(TranscriptionStep::Select),
            _ => None,
        }
    }

    pub fn to_index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TranscriptionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptionStep::Input => write!(f, "Input"),
            TranscriptionStep::Transcribing => write!(f, "Transcribing"),
            TranscriptionStep::Select => write!(f, "Select"),
        }
    }
}

/// Simulated progress for a long-running call with no real progress signal.
///
/// Advances by a fixed step per tick and holds at the ceiling until
/// `complete` is called.
#[derive(Debug, Clone)]
pub struct ProgressSimulator {
    value: u8,
    step: u8,
    ceiling: u8,
}

impl ProgressSimulator {
    pub fn new(step: u8, ceiling: u8) -> Self {
        Self {
            value: 0,
            step,
            ceiling: ceiling.min(100),
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Advance one tick and return the new value
    pub fn tick(&mut self) -> u8 {
        if self.value < self.ceiling {
            self.value = self.value.saturating_add(self.step).min(self.ceiling);
        }
        self.value
    }

    pub fn complete(&mut self) {
        self.value = 100;
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StepError {
    #[error("A wizard needs at least one step")]
    NoSteps,

    #[error("Initial step {initial} is outside 1..={total}")]
    InitialOutOfRange { initial: usize, total: usize },

    #[error("Expected {expected} steps, configured {found}")]
    CountMismatch { expected: usize, found: usize },
}

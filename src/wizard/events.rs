//! Wizard events for subscribers

use crate::steps::TranscriptionStep;

/// Event broadcast by the transcription wizard
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WizardEvent {
    /// The wizard moved to a different step
    StepChanged { step: TranscriptionStep },
    /// Simulated transcription progress (0-100)
    Progress { percent: u8 },
    /// Transcript arrived
    TranscriptReady { segments: usize },
    /// Transcription failed and the wizard went back to input
    TranscriptionFailed { message: String },
    /// Selection list changed
    SelectionChanged { selected: usize, words: usize },
    GenerationStarted,
    GenerationFinished { article_id: String, words: usize },
    /// Generation failed; the wizard stays where it was
    GenerationFailed { message: String },
}

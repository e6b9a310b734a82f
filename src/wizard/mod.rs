//! Transcription wizard
//!
//! Drives the input → transcribing → select flow, owns the selection list
//! for the current transcript, and hands selected material to the article
//! generator. Services are injected so tests can swap in fakes.

mod events;

pub use events::WizardEvent;

use crate::article::{ArticleConfig, GeneratedArticle, GenerationRequest};
use crate::config::Config;
use crate::error::ServiceError;
use crate::selection::{Selection, SelectionStore};
use crate::services::{ArticleGenerator, Transcriber};
use crate::steps::{ProgressSimulator, StepController, StepError, TranscriptionStep};
use crate::transcript::{Segment, VideoReference};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{error, info, instrument, warn};

/// Timing knobs for the wizard
#[derive(Debug, Clone)]
pub struct WizardSettings {
    pub transcription_timeout: Duration,
    pub generation_timeout: Duration,
    pub progress_tick: Duration,
    pub progress_step: u8,
    pub progress_ceiling: u8,
    pub total_steps: usize,
    pub initial_step: usize,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            transcription_timeout: Duration::from_secs(300),
            generation_timeout: Duration::from_secs(120),
            progress_tick: Duration::from_millis(500),
            progress_step: 5,
            progress_ceiling: 90,
            total_steps: TranscriptionStep::COUNT,
            initial_step: TranscriptionStep::Input.to_index(),
        }
    }
}

impl WizardSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            transcription_timeout: config.transcription.timeout(),
            generation_timeout: config.generation.timeout(),
            progress_tick: config.transcription.progress_tick(),
            progress_step: config.transcription.progress_step,
            progress_ceiling: config.transcription.progress_ceiling,
            total_steps: config.wizard.total_steps,
            initial_step: config.wizard.initial_step,
        }
    }
}

/// Errors surfaced by wizard operations
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Not a recognised video link or id: {0}")]
    InvalidVideoReference(String),

    #[error("The transcript came back empty")]
    EmptyTranscript,

    #[error("Unknown segment: {0}")]
    UnknownSegment(String),

    #[error("Select at least one passage before generating")]
    NothingSelected,

    #[error("Another request is still in progress")]
    Busy,

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Invalid step layout: {0}")]
    Steps(#[from] StepError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub struct TranscriptionWizard {
    steps: StepController,
    progress: ProgressSimulator,
    selections: SelectionStore,
    segments: Vec<Segment>,
    video: Option<VideoReference>,
    last_article: Option<GeneratedArticle>,
    busy: bool,
    transcriber: Arc<dyn Transcriber>,
    generator: Arc<dyn ArticleGenerator>,
    settings: WizardSettings,
    event_tx: broadcast::Sender<WizardEvent>,
}

impl TranscriptionWizard {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn ArticleGenerator>,
        settings: WizardSettings,
    ) -> Result<Self, WizardError> {
        if settings.total_steps != TranscriptionStep::COUNT {
            return Err(StepError::CountMismatch {
                expected: TranscriptionStep::COUNT,
                found: settings.total_steps,
            }
            .into());
        }
        let steps = StepController::new(settings.total_steps, settings.initial_step)?;

        let (event_tx, _) = broadcast::channel(100);
        Ok(Self {
            steps,
            progress: ProgressSimulator::new(settings.progress_step, settings.progress_ceiling),
            selections: SelectionStore::new(),
            segments: Vec::new(),
            video: None,
            last_article: None,
            busy: false,
            transcriber,
            generator,
            settings,
            event_tx,
        })
    }

    /// Subscribe to wizard events
    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.event_tx.subscribe()
    }

    pub fn current_step(&self) -> TranscriptionStep {
        TranscriptionStep::from_index(self.steps.current_step()).unwrap_or(TranscriptionStep::Input)
    }

    /// Overall wizard completion (percent of steps)
    pub fn step_progress(&self) -> u8 {
        self.steps.progress()
    }

    /// Simulated transcription progress (percent)
    pub fn transcription_progress(&self) -> u8 {
        self.progress.value()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn video(&self) -> Option<&VideoReference> {
        self.video.as_ref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn selections(&self) -> &SelectionStore {
        &self.selections
    }

    pub fn last_article(&self) -> Option<&GeneratedArticle> {
        self.last_article.as_ref()
    }

    /// Transcribe a video and move to the select step.
    ///
    /// On any failure the wizard returns to the input step. Returns the
    /// number of segments received.
    #[instrument(skip(self))]
    pub async fn start_transcription(&mut self, input: &str) -> Result<usize, WizardError> {
        if self.busy {
            return Err(WizardError::Busy);
        }
        let video = VideoReference::parse(input)
            .ok_or_else(|| WizardError::InvalidVideoReference(input.trim().to_string()))?;

        info!(video = %video, "Starting transcription");
        self.segments.clear();
        self.selections.clear_all();
        self.last_article = None;
        self.video = Some(video.clone());
        self.progress.reset();
        self.busy = true;
        self.set_step(TranscriptionStep::Transcribing);

        let transcriber = Arc::clone(&self.transcriber);
        let call = timeout(
            self.settings.transcription_timeout,
            transcriber.transcribe(&video),
        );
        tokio::pin!(call);

        let mut ticker = interval(self.settings.progress_tick.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        let outcome = loop {
            tokio::select! {
                result = &mut call => break result,
                _ = ticker.tick() => {
                    let percent = self.progress.tick();
                    self.emit(WizardEvent::Progress { percent });
                }
            }
        };
        self.busy = false;

        let result = match outcome {
            Err(_) => Err(WizardError::Timeout {
                operation: "Transcription",
                after: self.settings.transcription_timeout,
            }),
            Ok(Err(e)) => Err(WizardError::Service(e)),
            Ok(Ok(segments)) if segments.is_empty() => Err(WizardError::EmptyTranscript),
            Ok(Ok(segments)) => Ok(segments),
        };

        match result {
            Ok(segments) => {
                let count = segments.len();
                self.segments = segments;
                self.progress.complete();
                self.emit(WizardEvent::Progress { percent: 100 });
                self.emit(WizardEvent::TranscriptReady { segments: count });
                self.set_step(TranscriptionStep::Select);
                info!(segments = count, "Transcription complete");
                Ok(count)
            }
            Err(e) => {
                error!("Transcription failed: {}", e);
                self.progress.reset();
                self.emit(WizardEvent::TranscriptionFailed {
                    message: e.to_string(),
                });
                self.set_step(TranscriptionStep::Input);
                Err(e)
            }
        }
    }

    /// Toggle a whole segment in the selection. Returns whether it is now selected.
    pub fn toggle_segment(&mut self, segment_id: &str) -> Result<bool, WizardError> {
        let segment = self
            .segments
            .iter()
            .find(|s| s.id == segment_id)
            .ok_or_else(|| WizardError::UnknownSegment(segment_id.to_string()))?;

        let selected = self.selections.add_card_selection(
            &segment.id,
            &segment.text,
            Some(&segment.start_time),
        );
        self.emit_selection_changed();
        Ok(selected)
    }

    /// Add a free-text highlight. Returns the id of the entry holding the
    /// text, or `None` for blank input.
    pub fn add_highlight(&mut self, text: &str, is_quote: bool) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        let id = self.selections.add_text_selection(text, is_quote);
        self.emit_selection_changed();
        Some(id)
    }

    pub fn remove_selection(&mut self, id: &str) {
        self.selections.remove_selection(id);
        self.emit_selection_changed();
    }

    pub fn toggle_quote(&mut self, id: &str) -> Option<bool> {
        let flag = self.selections.toggle_quote(id);
        if flag.is_some() {
            self.emit_selection_changed();
        }
        flag
    }

    pub fn toggle_segment_quote(&mut self, segment_id: &str) -> Option<bool> {
        let flag = self.selections.toggle_card_quote(segment_id);
        if flag.is_some() {
            self.emit_selection_changed();
        }
        flag
    }

    pub fn select_all_segments(&mut self) {
        self.selections.select_all_cards(&self.segments);
        self.emit_selection_changed();
    }

    pub fn clear_selections(&mut self) {
        self.selections.clear_all();
        self.emit_selection_changed();
    }

    /// Generate an article from the current selection.
    ///
    /// Failures leave the wizard on its current step with the selection
    /// intact.
    #[instrument(skip(self, config), fields(selected = self.selections.selected_count()))]
    pub async fn generate(
        &mut self,
        config: &ArticleConfig,
    ) -> Result<GeneratedArticle, WizardError> {
        if self.busy {
            return Err(WizardError::Busy);
        }
        if self.selections.is_empty() {
            return Err(WizardError::NothingSelected);
        }

        let request = GenerationRequest {
            selections: self.selections.selections().to_vec(),
            config: config.clone(),
        };

        info!(
            words = self.selections.total_words(),
            quotes = self.selections.quote_count(),
            "Requesting article generation"
        );
        self.busy = true;
        self.emit(WizardEvent::GenerationStarted);

        let generator = Arc::clone(&self.generator);
        let outcome = timeout(self.settings.generation_timeout, generator.generate(&request)).await;
        self.busy = false;

        let result = match outcome {
            Err(_) => Err(WizardError::Timeout {
                operation: "Article generation",
                after: self.settings.generation_timeout,
            }),
            Ok(result) => result.map_err(WizardError::from),
        };

        match result {
            Ok(article) => {
                self.emit(WizardEvent::GenerationFinished {
                    article_id: article.id.clone(),
                    words: article.word_count,
                });
                self.last_article = Some(article.clone());
                Ok(article)
            }
            Err(e) => {
                warn!("Article generation failed: {}", e);
                self.emit(WizardEvent::GenerationFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Back to the input step with everything cleared
    pub fn reset(&mut self) {
        self.steps.reset();
        self.progress.reset();
        self.segments.clear();
        self.selections.clear_all();
        self.video = None;
        self.last_article = None;
        self.busy = false;
        self.emit(WizardEvent::StepChanged {
            step: self.current_step(),
        });
    }

    /// Selected material in order, for display
    pub fn selected(&self) -> &[Selection] {
        self.selections.selections()
    }

    fn set_step(&mut self, step: TranscriptionStep) {
        if self.steps.go_to_step(step.to_index()) {
            self.emit(WizardEvent::StepChanged { step });
        }
    }

    fn emit_selection_changed(&self) {
        self.emit(WizardEvent::SelectionChanged {
            selected: self.selections.selected_count(),
            words: self.selections.total_words(),
        });
    }

    fn emit(&self, event: WizardEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeTranscriber {
        result: Mutex<Option<Result<Vec<Segment>, ServiceError>>>,
        delay: Duration,
    }

    impl FakeTranscriber {
        fn ok(segments: Vec<Segment>) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(Ok(segments))),
                delay: Duration::ZERO,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(Err(ServiceError::InvalidResponse("boom".into())))),
                delay: Duration::ZERO,
            })
        }

        fn slow(segments: Vec<Segment>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(Ok(segments))),
                delay,
            })
        }
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, _video: &VideoReference) -> Result<Vec<Segment>, ServiceError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    struct FakeGenerator {
        fail: bool,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl FakeGenerator {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ArticleGenerator for FakeGenerator {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> Result<GeneratedArticle, ServiceError> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(ServiceError::ServerError {
                    status: 500,
                    message: "down".into(),
                });
            }
            Ok(GeneratedArticle::new(format!(
                "# Draft\n\n{} passages",
                request.selections.len()
            )))
        }
    }

    fn segments() -> Vec<Segment> {
        vec![
            Segment {
                id: "s1".into(),
                text: "hello world".into(),
                start_time: "00:05".into(),
                end_time: None,
            },
            Segment {
                id: "s2".into(),
                text: "second passage here".into(),
                start_time: "00:12".into(),
                end_time: None,
            },
        ]
    }

    fn wizard(
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn ArticleGenerator>,
    ) -> TranscriptionWizard {
        let settings = WizardSettings {
            progress_tick: Duration::from_millis(10),
            progress_step: 30,
            ..WizardSettings::default()
        };
        TranscriptionWizard::new(transcriber, generator, settings).expect("wizard builds")
    }

    const VIDEO: &str = "https://youtu.be/dQw4w9WgXcQ";

    #[tokio::test]
    async fn test_transcription_moves_to_select() {
        let mut wizard = wizard(FakeTranscriber::ok(segments()), FakeGenerator::new(false));
        let mut events = wizard.subscribe();

        assert_eq!(wizard.current_step(), TranscriptionStep::Input);
        let count = wizard.start_transcription(VIDEO).await.expect("transcribes");

        assert_eq!(count, 2);
        assert_eq!(wizard.current_step(), TranscriptionStep::Select);
        assert_eq!(wizard.transcription_progress(), 100);
        assert_eq!(wizard.step_progress(), 100);
        assert_eq!(wizard.video().map(|v| v.video_id.as_str()), Some("dQw4w9WgXcQ"));

        assert_eq!(
            events.recv().await.unwrap(),
            WizardEvent::StepChanged {
                step: TranscriptionStep::Transcribing
            }
        );
        let mut saw_ready = false;
        while let Ok(event) = events.try_recv() {
            if event == (WizardEvent::TranscriptReady { segments: 2 }) {
                saw_ready = true;
            }
        }
        assert!(saw_ready);
    }

    #[tokio::test]
    async fn test_invalid_video_stays_on_input() {
        let mut wizard = wizard(FakeTranscriber::ok(segments()), FakeGenerator::new(false));
        let err = wizard.start_transcription("not a link").await.unwrap_err();
        assert!(matches!(err, WizardError::InvalidVideoReference(_)));
        assert_eq!(wizard.current_step(), TranscriptionStep::Input);
    }

    #[tokio::test]
    async fn test_failed_transcription_reverts_to_input() {
        let mut wizard = wizard(FakeTranscriber::failing(), FakeGenerator::new(false));
        let err = wizard.start_transcription(VIDEO).await.unwrap_err();
        assert!(matches!(err, WizardError::Service(_)));
        assert_eq!(wizard.current_step(), TranscriptionStep::Input);
        assert_eq!(wizard.transcription_progress(), 0);
        assert!(!wizard.is_busy());
    }

    #[tokio::test]
    async fn test_empty_transcript_is_an_error() {
        let mut wizard = wizard(FakeTranscriber::ok(Vec::new()), FakeGenerator::new(false));
        let err = wizard.start_transcription(VIDEO).await.unwrap_err();
        assert!(matches!(err, WizardError::EmptyTranscript));
        assert_eq!(wizard.current_step(), TranscriptionStep::Input);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_ticks_while_waiting() {
        let transcriber = FakeTranscriber::slow(segments(), Duration::from_millis(100));
        let mut wizard = wizard(transcriber, FakeGenerator::new(false));
        let mut events = wizard.subscribe();

        wizard.start_transcription(VIDEO).await.expect("transcribes");

        let mut percents = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let WizardEvent::Progress { percent } = event {
                percents.push(percent);
            }
        }
        // 30, 60, 90 then held at the ceiling, then 100 on completion
        assert_eq!(&percents[..3], &[30, 60, 90]);
        assert!(percents[3..percents.len() - 1].iter().all(|p| *p == 90));
        assert_eq!(percents.last(), Some(&100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transcription_timeout_reverts_to_input() {
        let transcriber = FakeTranscriber::slow(segments(), Duration::from_secs(10));
        let settings = WizardSettings {
            transcription_timeout: Duration::from_secs(1),
            ..WizardSettings::default()
        };
        let mut wizard =
            TranscriptionWizard::new(transcriber, FakeGenerator::new(false), settings).unwrap();

        let err = wizard.start_transcription(VIDEO).await.unwrap_err();
        assert!(matches!(err, WizardError::Timeout { .. }));
        assert_eq!(wizard.current_step(), TranscriptionStep::Input);
    }

    #[tokio::test]
    async fn test_selection_and_generation() {
        let generator = FakeGenerator::new(false);
        let mut wizard = wizard(FakeTranscriber::ok(segments()), generator.clone());
        wizard.start_transcription(VIDEO).await.unwrap();

        assert!(wizard.toggle_segment("s1").unwrap());
        wizard.add_highlight("foo bar baz", false);
        assert_eq!(wizard.selections().selected_count(), 2);
        assert_eq!(wizard.selections().total_words(), 5);
        assert_eq!(wizard.toggle_segment_quote("s1"), Some(true));

        let article = wizard
            .generate(&ArticleConfig::default())
            .await
            .expect("generates");
        assert_eq!(article.headline(), Some("Draft"));
        assert_eq!(wizard.last_article(), Some(&article));
        assert_eq!(wizard.current_step(), TranscriptionStep::Select);

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].selections[0].is_quote);
        assert_eq!(seen[0].selections[1].text, "foo bar baz");
    }

    #[tokio::test]
    async fn test_blank_highlight_is_rejected() {
        let mut wizard = wizard(FakeTranscriber::ok(segments()), FakeGenerator::new(false));
        wizard.start_transcription(VIDEO).await.unwrap();
        assert!(wizard.add_highlight("  \n", false).is_none());
        assert!(wizard.selections().is_empty());
        assert!(wizard.add_highlight(" kept as typed ", false).is_some());
        assert!(wizard.selections().is_text_selected(" kept as typed "));
    }

    #[test]
    fn test_settings_take_step_layout_from_config() {
        let config = crate::config::load_config().expect("embedded config");
        let settings = WizardSettings::from_config(config);
        assert_eq!(settings.total_steps, config.wizard.total_steps);
        assert_eq!(settings.initial_step, config.wizard.initial_step);

        let wizard = TranscriptionWizard::new(
            FakeTranscriber::ok(segments()),
            FakeGenerator::new(false),
            settings,
        )
        .expect("embedded layout matches the wizard");
        assert_eq!(wizard.current_step(), TranscriptionStep::Input);
    }

    #[test]
    fn test_step_count_mismatch_is_rejected() {
        let settings = WizardSettings {
            total_steps: 4,
            ..WizardSettings::default()
        };
        let err = TranscriptionWizard::new(
            FakeTranscriber::ok(segments()),
            FakeGenerator::new(false),
            settings,
        )
        .err()
        .expect("four steps do not fit the wizard");
        assert!(matches!(
            err,
            WizardError::Steps(StepError::CountMismatch {
                expected: 3,
                found: 4
            })
        ));
    }

    #[test]
    fn test_initial_step_is_honoured() {
        let settings = WizardSettings {
            initial_step: TranscriptionStep::Select.to_index(),
            ..WizardSettings::default()
        };
        let mut wizard = TranscriptionWizard::new(
            FakeTranscriber::ok(segments()),
            FakeGenerator::new(false),
            settings,
        )
        .expect("valid layout");
        assert_eq!(wizard.current_step(), TranscriptionStep::Select);
        wizard.reset();
        assert_eq!(wizard.current_step(), TranscriptionStep::Select);
    }

    #[tokio::test]
    async fn test_unknown_segment_is_rejected() {
        let mut wizard = wizard(FakeTranscriber::ok(segments()), FakeGenerator::new(false));
        wizard.start_transcription(VIDEO).await.unwrap();
        assert!(matches!(
            wizard.toggle_segment("nope"),
            Err(WizardError::UnknownSegment(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_requires_selection() {
        let generator = FakeGenerator::new(false);
        let mut wizard = wizard(FakeTranscriber::ok(segments()), generator.clone());
        wizard.start_transcription(VIDEO).await.unwrap();

        let err = wizard.generate(&ArticleConfig::default()).await.unwrap_err();
        assert!(matches!(err, WizardError::NothingSelected));
        assert!(generator.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_generation_keeps_step_and_selection() {
        let mut wizard = wizard(FakeTranscriber::ok(segments()), FakeGenerator::new(true));
        wizard.start_transcription(VIDEO).await.unwrap();
        wizard.select_all_segments();

        let err = wizard.generate(&ArticleConfig::default()).await.unwrap_err();
        assert!(matches!(
            err,
            WizardError::Service(ServiceError::ServerError { status: 500, .. })
        ));
        assert_eq!(wizard.current_step(), TranscriptionStep::Select);
        assert_eq!(wizard.selections().card_selection_count(), 2);
        assert!(!wizard.is_busy());
        assert!(wizard.last_article().is_none());
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let mut wizard = wizard(FakeTranscriber::ok(segments()), FakeGenerator::new(false));
        wizard.start_transcription(VIDEO).await.unwrap();
        wizard.select_all_segments();

        wizard.reset();
        assert_eq!(wizard.current_step(), TranscriptionStep::Input);
        assert!(wizard.segments().is_empty());
        assert!(wizard.selections().is_empty());
        assert!(wizard.video().is_none());
    }
}

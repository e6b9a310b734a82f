#![deny(clippy::all)]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use newsforge::article::{ArticleConfig, Persona, Tone};
use newsforge::config::{load_config, Config};
use newsforge::credentials::{self, AzureCredentials, OpenAICredentials};
use newsforge::preferences::{self, AiProvider, Preferences};
use newsforge::selection::MultiSelect;
use newsforge::services::{
    ArticleGenerator, AzureOpenAIClient, FileTranscriber, HttpTranscriber, OpenAIClient,
    Transcriber,
};
use newsforge::transcript::VideoReference;
use newsforge::wizard::{TranscriptionWizard, WizardEvent, WizardSettings};
use newsforge::{clipboard, storage};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Draft news articles from video transcripts and highlights
#[derive(Parser, Debug)]
#[command(name = "newsforge", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transcribe a video and print its segments
    Transcribe {
        #[command(flatten)]
        source: SourceArgs,
        /// Print segments as JSON
        #[arg(long)]
        json: bool,
    },
    /// Transcribe, select passages and generate an article
    Generate(GenerateArgs),
    /// Show or change stored preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// YouTube link or video id
    video: String,
    /// Read segments from a JSON file instead of calling the transcription service
    #[arg(long)]
    segments_file: Option<PathBuf>,
    /// Transcription service base URL
    #[arg(long, env = "NEWSFORGE_TRANSCRIPTION_ENDPOINT")]
    endpoint: Option<String>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Segment ids to include
    #[arg(long = "select", value_name = "SEGMENT_ID")]
    select: Vec<String>,
    /// Include every segment
    #[arg(long)]
    all: bool,
    /// Free-text passages to include
    #[arg(long = "text")]
    texts: Vec<String>,
    /// Free-text passages to include as direct quotes
    #[arg(long = "quote")]
    quotes: Vec<String>,
    /// Segment ids to render as direct quotes
    #[arg(long = "quote-segment", value_name = "SEGMENT_ID")]
    quote_segments: Vec<String>,
    #[arg(long)]
    tone: Option<Tone>,
    #[arg(long)]
    persona: Option<Persona>,
    /// 0 (literal) to 100 (free-form)
    #[arg(long)]
    creativity: Option<u8>,
    #[arg(long = "keyword")]
    keywords: Vec<String>,
    /// Paraphrase everything, even quote passages
    #[arg(long)]
    no_quotes: bool,
    #[arg(long)]
    no_headline: bool,
    #[arg(long)]
    seo: bool,
    /// Copy the article to the clipboard
    #[arg(long)]
    copy: bool,
    /// Save the article as Markdown
    #[arg(long)]
    save: bool,
}

#[derive(Subcommand, Debug)]
enum PrefsAction {
    /// Print the stored preferences as JSON
    Show,
    /// Update stored preferences
    Set {
        #[arg(long)]
        provider: Option<AiProvider>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        tone: Option<Tone>,
        #[arg(long)]
        persona: Option<Persona>,
        #[arg(long)]
        creativity: Option<u8>,
        #[arg(long)]
        article_location: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for articles and JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    credentials::load_dotenv();
    let config = load_config()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Transcribe { source, json } => transcribe(config, &source, json).await,
        Command::Generate(args) => generate(config, args).await,
        Command::Prefs { action } => prefs(action),
    }
}

fn build_transcriber(
    config: &Config,
    prefs: &Preferences,
    source: &SourceArgs,
) -> Result<Arc<dyn Transcriber>> {
    if let Some(path) = &source.segments_file {
        info!("Using segments from {:?}", path);
        return Ok(Arc::new(FileTranscriber::new(path)));
    }
    let endpoint = source
        .endpoint
        .as_deref()
        .unwrap_or(&config.transcription.endpoint);
    let transcriber = HttpTranscriber::new(
        endpoint,
        credentials::transcription_token(),
        &prefs.language_code(),
        config.transcription.timeout(),
    )?;
    Ok(Arc::new(transcriber))
}

fn build_generator(config: &Config, prefs: &Preferences) -> Result<Arc<dyn ArticleGenerator>> {
    let provider = prefs.ai_provider();
    info!("Selected AI provider: {}", provider);
    match provider {
        AiProvider::OpenAI => {
            let creds = OpenAICredentials::from_env()
                .context("OpenAI credentials missing - set OPENAI_API_KEY")?;
            Ok(Arc::new(OpenAIClient::new(
                &creds,
                &config.generation.openai_model,
            )?))
        }
        AiProvider::Azure => {
            let creds = AzureCredentials::from_env().context("Azure credentials missing")?;
            Ok(Arc::new(AzureOpenAIClient::new(&creds)?))
        }
    }
}

async fn transcribe(config: &Config, source: &SourceArgs, json: bool) -> Result<()> {
    let prefs = preferences::load_preferences();
    let video = VideoReference::parse(&source.video)
        .with_context(|| format!("Not a recognised video link or id: {}", source.video))?;
    let transcriber = build_transcriber(config, &prefs, source)?;

    let segments = transcriber.transcribe(&video).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
    } else {
        for segment in &segments {
            println!("[{}] {:>8}  {}", segment.start_time, segment.id, segment.text);
        }
    }
    Ok(())
}

async fn generate(config: &Config, args: GenerateArgs) -> Result<()> {
    let prefs = preferences::load_preferences();
    let transcriber = build_transcriber(config, &prefs, &args.source)?;
    let generator = build_generator(config, &prefs)?;

    let mut wizard =
        TranscriptionWizard::new(transcriber, generator, WizardSettings::from_config(config))?;
    let events = tokio::spawn(report_events(wizard.subscribe()));

    wizard.start_transcription(&args.source.video).await?;

    if args.all {
        wizard.select_all_segments();
    }
    let picked = picked_segments(&args);
    for id in picked.selected() {
        if !wizard.selections().is_card_selected(id) {
            wizard.toggle_segment(id)?;
        }
    }
    for id in &args.quote_segments {
        if !wizard.selections().is_quote(id) {
            wizard.toggle_quote(id);
        }
    }
    for text in &args.texts {
        wizard.add_highlight(text, false);
    }
    for text in &args.quotes {
        wizard.add_highlight(text, true);
    }

    let mut article_config = prefs.article_config();
    apply_overrides(&mut article_config, &args);

    let article = wizard.generate(&article_config).await?;
    drop(wizard);
    if let Err(e) = events.await {
        warn!("Event reporter stopped abnormally: {}", e);
    }

    println!("{}", article.content);

    if args.copy {
        clipboard::copy_to_clipboard(&article.content);
    }
    if args.save {
        let path = storage::save_article(&prefs, &article)?;
        eprintln!("Saved to {}", path.display());
    }
    Ok(())
}

/// Segment ids from `--select` and `--quote-segment`, first mention wins
fn picked_segments(args: &GenerateArgs) -> MultiSelect<String> {
    let mut picked = MultiSelect::new();
    picked.select_all(args.select.iter().cloned());
    picked.select_all(args.quote_segments.iter().cloned());
    picked
}

fn apply_overrides(config: &mut ArticleConfig, args: &GenerateArgs) {
    if let Some(tone) = args.tone {
        config.tone = tone;
    }
    if let Some(persona) = args.persona {
        config.persona = persona;
    }
    if let Some(creativity) = args.creativity {
        config.set_creativity(creativity);
    }
    for keyword in &args.keywords {
        config.add_keyword(keyword);
    }
    if args.no_quotes {
        config.include_quotes = false;
    }
    if args.no_headline {
        config.include_headline = false;
    }
    if args.seo {
        config.seo_optimized = true;
    }
}

/// Print wizard progress to stderr until the wizard goes away
async fn report_events(mut events: tokio::sync::broadcast::Receiver<WizardEvent>) {
    use tokio::sync::broadcast::error::RecvError;

    loop {
        match events.recv().await {
            Ok(WizardEvent::StepChanged { step }) => eprintln!("== {step}"),
            Ok(WizardEvent::Progress { percent }) => eprintln!("   transcribing... {percent}%"),
            Ok(WizardEvent::TranscriptReady { segments }) => {
                eprintln!("   {segments} segments received")
            }
            Ok(WizardEvent::SelectionChanged { selected, words }) => {
                eprintln!("   {selected} selected, {words} words")
            }
            Ok(WizardEvent::GenerationStarted) => eprintln!("== Generating article"),
            Ok(WizardEvent::GenerationFinished { words, .. }) => {
                eprintln!("   done ({words} words)")
            }
            Ok(WizardEvent::TranscriptionFailed { message })
            | Ok(WizardEvent::GenerationFailed { message }) => eprintln!("!! {message}"),
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

fn prefs(action: PrefsAction) -> Result<()> {
    match action {
        PrefsAction::Show => {
            let prefs = preferences::load_preferences();
            println!("{}", serde_json::to_string_pretty(&prefs)?);
        }
        PrefsAction::Set {
            provider,
            language,
            tone,
            persona,
            creativity,
            article_location,
        } => {
            let prefs = preferences::update_preferences(|p| {
                if provider.is_some() {
                    p.ai_provider = provider;
                }
                if language.is_some() {
                    p.language_code = language;
                }
                if tone.is_some() {
                    p.default_tone = tone;
                }
                if persona.is_some() {
                    p.default_persona = persona;
                }
                if let Some(value) = creativity {
                    p.default_creativity = Some(value.min(100));
                }
                if article_location.is_some() {
                    p.article_location = article_location;
                }
            })?;
            println!("{}", serde_json::to_string_pretty(&prefs)?);
        }
    }
    Ok(())
}

//! User preferences storage
//!
//! Handles saving and loading user preferences to a JSON file
//! in the user's config directory.

use crate::article::{ArticleConfig, Persona, Tone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info};

/// AI provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    OpenAI,
    Azure,
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiProvider::Azure => write!(f, "Azure OpenAI"),
            AiProvider::OpenAI => write!(f, "OpenAI"),
        }
    }
}

impl FromStr for AiProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(AiProvider::OpenAI),
            "azure" => Ok(AiProvider::Azure),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// User preferences
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// AI provider used for article generation
    pub ai_provider: Option<AiProvider>,
    /// Language code for transcription and output (defaults to "en")
    pub language_code: Option<String>,
    pub default_tone: Option<Tone>,
    pub default_persona: Option<Persona>,
    /// Default creativity (0 to 100)
    pub default_creativity: Option<u8>,
    /// Custom folder for saved articles (None = use default)
    pub article_location: Option<PathBuf>,
}

impl Preferences {
    pub fn ai_provider(&self) -> AiProvider {
        self.ai_provider.unwrap_or_default()
    }

    pub fn language_code(&self) -> String {
        self.language_code
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "en".to_string())
    }

    /// Article configuration seeded from the stored defaults
    pub fn article_config(&self) -> ArticleConfig {
        let mut config = ArticleConfig::default();
        config.tone = self.default_tone.unwrap_or_default();
        config.persona = self.default_persona.unwrap_or_default();
        config.language_code = self.language_code();
        if let Some(creativity) = self.default_creativity {
            config.set_creativity(creativity);
        }
        config
    }
}

/// Get the preferences file path
pub fn preferences_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Newsforge").join("preferences.json"))
}

/// Load preferences from the default location
pub fn load_preferences() -> Preferences {
    match preferences_path() {
        Some(path) => load_preferences_from(&path),
        None => Preferences::default(),
    }
}

/// Load preferences from a file
///
/// Returns default preferences if the file doesn't exist or can't be read
pub fn load_preferences_from(path: &Path) -> Preferences {
    if !path.exists() {
        return Preferences::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(prefs) => prefs,
            Err(e) => {
                error!("Failed to parse preferences: {}", e);
                Preferences::default()
            }
        },
        Err(e) => {
            error!("Failed to read preferences file: {}", e);
            Preferences::default()
        }
    }
}

/// Save preferences to the default location
pub fn save_preferences(prefs: &Preferences) -> Result<(), PreferencesError> {
    let path = preferences_path().ok_or(PreferencesError::NoConfigDir)?;
    save_preferences_to(&path, prefs)
}

/// Save preferences to a file, creating its directory if needed
pub fn save_preferences_to(path: &Path, prefs: &Preferences) -> Result<(), PreferencesError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            info!("Created preferences directory: {:?}", parent);
        }
    }

    let json = serde_json::to_string_pretty(prefs)?;
    fs::write(path, json)?;
    info!("Saved preferences to: {:?}", path);

    Ok(())
}

/// Apply a change to the stored preferences and save them
pub fn update_preferences<F>(change: F) -> Result<Preferences, PreferencesError>
where
    F: FnOnce(&mut Preferences),
{
    let mut prefs = load_preferences();
    change(&mut prefs);
    save_preferences(&prefs)?;
    Ok(prefs)
}

/// Get the default article location path
pub fn default_article_location() -> Option<PathBuf> {
    dirs::document_dir().map(|d| d.join("Newsforge").join("articles"))
}

/// Preferences errors
#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    #[error("Could not find config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

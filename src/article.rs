//! Article generation configuration and prompt construction

use crate::selection::{count_words, Selection};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Writing tone of the generated article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Neutral,
    Formal,
    Conversational,
    Analytical,
    Urgent,
}

impl Tone {
    fn instruction(self) -> &'static str {
        match self {
            Tone::Neutral => "Keep the tone neutral and factual.",
            Tone::Formal => "Use a formal, measured tone.",
            Tone::Conversational => "Use a warm, conversational tone that speaks to the reader.",
            Tone::Analytical => "Use an analytical tone: weigh evidence and explain implications.",
            Tone::Urgent => "Use an urgent, breaking-news tone with short paragraphs.",
        }
    }
}

/// Voice the article is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    #[default]
    Reporter,
    Columnist,
    Analyst,
    Editor,
}

impl Persona {
    fn description(self) -> &'static str {
        match self {
            Persona::Reporter => "an experienced news reporter",
            Persona::Columnist => "an opinion columnist with a distinct voice",
            Persona::Analyst => "a subject-matter analyst",
            Persona::Editor => "a senior editor writing a concise briefing",
        }
    }
}

macro_rules! impl_name_parsing {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $($ty::$variant => write!(f, $name),)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(format!("unknown {}: {}", stringify!($ty).to_lowercase(), other)),
                }
            }
        }
    };
}

impl_name_parsing!(Tone {
    Neutral => "neutral",
    Formal => "formal",
    Conversational => "conversational",
    Analytical => "analytical",
    Urgent => "urgent",
});

impl_name_parsing!(Persona {
    Reporter => "reporter",
    Columnist => "columnist",
    Analyst => "analyst",
    Editor => "editor",
});

/// Default creativity (0 = strictly literal, 100 = free-form)
pub const DEFAULT_CREATIVITY: u8 = 50;

/// Configuration for one generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleConfig {
    pub tone: Tone,
    pub persona: Persona,
    creativity: u8,
    keywords: Vec<String>,
    /// Keep quote selections verbatim as direct quotations
    pub include_quotes: bool,
    pub include_headline: bool,
    pub seo_optimized: bool,
    /// Output language code (e.g., "en", "no", "de")
    pub language_code: String,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            tone: Tone::default(),
            persona: Persona::default(),
            creativity: DEFAULT_CREATIVITY,
            keywords: Vec::new(),
            include_quotes: true,
            include_headline: true,
            seo_optimized: false,
            language_code: "en".to_string(),
        }
    }
}

impl ArticleConfig {
    pub fn creativity(&self) -> u8 {
        self.creativity
    }

    /// Set creativity, clamped to 0..=100
    pub fn set_creativity(&mut self, value: u8) {
        self.creativity = value.min(100);
    }

    pub fn with_creativity(mut self, value: u8) -> Self {
        self.set_creativity(value);
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Add a keyword. Blank and case-insensitive duplicates are dropped.
    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty()
            || self
                .keywords
                .iter()
                .any(|k| k.eq_ignore_ascii_case(keyword))
        {
            return false;
        }
        self.keywords.push(keyword.to_string());
        true
    }

    pub fn remove_keyword(&mut self, keyword: &str) {
        let keyword = keyword.trim();
        self.keywords.retain(|k| !k.eq_ignore_ascii_case(keyword));
    }

    /// Sampling temperature derived from creativity (0.0..=1.2)
    pub fn temperature(&self) -> f32 {
        f32::from(self.creativity) / 100.0 * 1.2
    }
}

/// Convert a language code to its full name for use in prompts
pub fn language_code_to_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "no" => "Norwegian",
        "da" => "Danish",
        "sv" => "Swedish",
        "fi" => "Finnish",
        "de" => "German",
        "fr" => "French",
        "es" => "Spanish",
        _ => code,
    }
}

/// Everything the generator needs for one article
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub selections: Vec<Selection>,
    pub config: ArticleConfig,
}

impl GenerationRequest {
    /// Characters of source material sent to the model
    pub fn source_len(&self) -> usize {
        self.selections.iter().map(|s| s.text.chars().count()).sum()
    }
}

/// A generated article draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArticle {
    pub id: String,
    pub content: String,
    pub word_count: usize,
}

impl GeneratedArticle {
    pub fn new(content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            word_count: count_words(&content),
            content,
        }
    }

    /// First Markdown heading, if the draft has one
    pub fn headline(&self) -> Option<&str> {
        self.content
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with('#'))
            .map(|line| line.trim_start_matches('#').trim())
            .filter(|line| !line.is_empty())
    }
}

/// Build the system instructions for the generator
pub fn build_instructions(config: &ArticleConfig) -> String {
    let language = language_code_to_name(&config.language_code);
    let mut out = format!(
        "You are {}. Write a news article based only on the source material provided by the user. {}",
        config.persona.description(),
        config.tone.instruction()
    );

    out.push_str(match config.creativity {
        0..=30 => " Stay close to the source wording and do not speculate.",
        31..=70 => " You may restructure and summarise freely but must not invent facts.",
        _ => " You may use vivid framing and narrative structure, but must not invent facts.",
    });

    if config.include_quotes {
        out.push_str(
            " Passages marked as QUOTE must appear verbatim inside quotation marks and be attributed; all other material should be paraphrased.",
        );
    } else {
        out.push_str(" Paraphrase all material, including passages marked as QUOTE.");
    }

    if config.include_headline {
        out.push_str(" Start with a Markdown level-one headline.");
    } else {
        out.push_str(" Do not include a headline.");
    }

    if !config.keywords.is_empty() {
        out.push_str(&format!(
            " Work these keywords naturally into the text: {}.",
            config.keywords.join(", ")
        ));
    }

    if config.seo_optimized {
        out.push_str(
            " Optimise for search: descriptive subheadings, a short lead paragraph, and a one-sentence meta description at the end prefixed with 'Meta:'.",
        );
    }

    out.push_str(&format!(
        " The output MUST be in {language}. Return only the article."
    ));
    out
}

/// Render the selected material as the user message
pub fn build_source_block(selections: &[Selection]) -> String {
    let mut out = String::from("Source material:\n");
    for (index, selection) in selections.iter().enumerate() {
        let stamp = selection
            .start_time
            .as_deref()
            .map(|t| format!(" [{t}]"))
            .unwrap_or_default();
        if selection.is_quote {
            out.push_str(&format!(
                "\n{}. QUOTE{}:\n> \"{}\"\n",
                index + 1,
                stamp,
                selection.text
            ));
        } else {
            out.push_str(&format!("\n{}. NOTE{}:\n{}\n", index + 1, stamp, selection.text));
        }
    }
    out
}

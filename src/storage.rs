//! Local storage for generated articles
//!
//! Saves drafts as Markdown to the user's Documents folder,
//! or a custom location if configured in preferences.

use crate::article::GeneratedArticle;
use crate::preferences::{self, Preferences};
use chrono::Local;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Get the articles directory
///
/// Returns the custom location from preferences if set,
/// otherwise the default location in Documents.
pub fn articles_dir(prefs: &Preferences) -> Option<PathBuf> {
    if let Some(custom) = &prefs.article_location {
        return Some(custom.clone());
    }
    preferences::default_article_location()
}

/// Save an article into the configured articles directory
pub fn save_article(prefs: &Preferences, article: &GeneratedArticle) -> Result<PathBuf, StorageError> {
    let dir = articles_dir(prefs).ok_or(StorageError::NoDocumentsDir)?;
    save_article_in(&dir, article)
}

/// Save an article into `dir`, creating it if needed
///
/// Returns the path to the saved file
pub fn save_article_in(dir: &Path, article: &GeneratedArticle) -> Result<PathBuf, StorageError> {
    if article.content.trim().is_empty() {
        return Err(StorageError::EmptyArticle);
    }

    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| StorageError::CreateDirectory {
            path: dir.to_path_buf(),
            source: e,
        })?;
        info!("Created articles directory: {:?}", dir);
    }

    // Timestamp plus a short id keeps two saves in the same second apart
    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    let short_id: String = article.id.chars().take(8).collect();
    let filepath = dir.join(format!("article-{timestamp}-{short_id}.md"));

    let mut file = fs::File::create(&filepath).map_err(|e| StorageError::CreateFile {
        path: filepath.clone(),
        source: e,
    })?;

    file.write_all(article.content.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| StorageError::WriteFile {
            path: filepath.clone(),
            source: e,
        })?;

    info!(words = article.word_count, "Saved article to: {:?}", filepath);
    Ok(filepath)
}

/// Storage errors with contextual information
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Could not find Documents directory")]
    NoDocumentsDir,

    #[error("Article is empty")]
    EmptyArticle,

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create file {path}: {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_article_writes_markdown() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("articles");
        let article = GeneratedArticle::new("# Headline\n\nBody.".to_string());

        let path = save_article_in(&target, &article).expect("saved");
        assert!(path.starts_with(&target));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("md"));
        assert_eq!(fs::read_to_string(path).unwrap(), article.content);
    }

    #[test]
    fn test_empty_article_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let article = GeneratedArticle::new("   ".to_string());
        assert!(matches!(
            save_article_in(dir.path(), &article),
            Err(StorageError::EmptyArticle)
        ));
    }

    #[test]
    fn test_custom_location_wins() {
        let prefs = Preferences {
            article_location: Some(PathBuf::from("/tmp/custom-articles")),
            ..Preferences::default()
        };
        assert_eq!(
            articles_dir(&prefs),
            Some(PathBuf::from("/tmp/custom-articles"))
        );
    }
}

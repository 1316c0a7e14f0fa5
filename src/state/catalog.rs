//! Immutable question catalog keyed by language, loaded once at startup.

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
    sync::Arc,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use validator::{Validate, ValidationErrors};

/// Language key every catalog must provide; unknown keys resolve to it.
pub const FALLBACK_LANGUAGE: &str = "en";

/// A single letter-keyed question.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct Question {
    /// Letter of the wheel this question belongs to.
    #[validate(length(min = 1))]
    pub letter: String,
    /// Prompt shown to the player.
    #[serde(rename = "question")]
    #[validate(length(min = 1))]
    pub prompt: String,
    /// Expected answer, compared trimmed and case-insensitively.
    #[serde(rename = "answer")]
    #[validate(length(min = 1))]
    pub expected_answer: String,
}

impl Question {
    /// Build a question from its parts.
    pub fn new(
        letter: impl Into<String>,
        prompt: impl Into<String>,
        expected_answer: impl Into<String>,
    ) -> Self {
        Self {
            letter: letter.into(),
            prompt: prompt.into(),
            expected_answer: expected_answer.into(),
        }
    }
}

/// Reasons the catalog file can be rejected.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a language-keyed JSON object of question arrays.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    /// The fallback language is absent.
    #[error("catalog is missing the fallback language `{FALLBACK_LANGUAGE}`")]
    MissingFallback,
    /// A language maps to an empty question list.
    #[error("language `{0}` has no questions")]
    EmptyLanguage(String),
    /// A question record has an empty field.
    #[error("invalid question #{index} in language `{language}`: {source}")]
    InvalidQuestion {
        /// Language the question belongs to.
        language: String,
        /// Position of the question in its list.
        index: usize,
        /// Field-level validation failures.
        #[source]
        source: ValidationErrors,
    },
    /// The same letter appears twice in one language.
    #[error("letter `{letter}` appears more than once in language `{language}`")]
    DuplicateLetter {
        /// Language holding the duplicate.
        language: String,
        /// Duplicated letter.
        letter: String,
    },
}

/// Mapping from language key to its ordered, shared question sequence.
#[derive(Debug, Clone)]
pub struct Catalog {
    languages: HashMap<String, Arc<[Question]>>,
    fallback: Arc<[Question]>,
}

impl Catalog {
    /// Read and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&contents)?;
        info!(
            path = %path.display(),
            languages = catalog.languages.len(),
            "loaded question catalog"
        );
        Ok(catalog)
    }

    /// Parse and validate a catalog from its JSON representation.
    pub fn from_json_str(contents: &str) -> Result<Self, CatalogError> {
        let raw: HashMap<String, Vec<Question>> = serde_json::from_str(contents)?;
        Self::from_languages(raw)
    }

    /// Validate an in-memory language map and freeze it into a catalog.
    pub fn from_languages(raw: HashMap<String, Vec<Question>>) -> Result<Self, CatalogError> {
        let mut languages = HashMap::with_capacity(raw.len());
        for (language, questions) in raw {
            validate_language(&language, &questions)?;
            languages.insert(language, Arc::from(questions));
        }

        let fallback = languages
            .get(FALLBACK_LANGUAGE)
            .cloned()
            .ok_or(CatalogError::MissingFallback)?;

        Ok(Self {
            languages,
            fallback,
        })
    }

    /// Resolve a language key, falling back to [`FALLBACK_LANGUAGE`] when unknown.
    ///
    /// Returns the key actually used together with its question sequence.
    pub fn resolve(&self, language: &str) -> (&str, Arc<[Question]>) {
        if let Some((key, questions)) = self.languages.get_key_value(language) {
            return (key.as_str(), questions.clone());
        }
        (FALLBACK_LANGUAGE, self.fallback.clone())
    }

    /// Question sequence for an exact language key.
    pub fn questions(&self, language: &str) -> Option<&[Question]> {
        self.languages.get(language).map(|questions| &questions[..])
    }

    /// Sorted list of available language keys.
    pub fn languages(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.languages.keys().cloned().collect();
        keys.sort();
        keys
    }
}

fn validate_language(language: &str, questions: &[Question]) -> Result<(), CatalogError> {
    if questions.is_empty() {
        return Err(CatalogError::EmptyLanguage(language.to_string()));
    }

    let mut seen = HashSet::with_capacity(questions.len());
    for (index, question) in questions.iter().enumerate() {
        question
            .validate()
            .map_err(|source| CatalogError::InvalidQuestion {
                language: language.to_string(),
                index,
                source,
            })?;
        if !seen.insert(question.letter.as_str()) {
            return Err(CatalogError::DuplicateLetter {
                language: language.to_string(),
                letter: question.letter.clone(),
            });
        }
    }

    Ok(())
}

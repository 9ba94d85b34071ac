//! Enthusiasm keywords used to weight comments.
//!
//! Keywords are locale data, not code: they are read from newline-separated
//! text where blank lines and `#` comments are ignored. A Japanese set ships
//! with the crate and `KEYWORDS_FILE` replaces it at runtime.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

const BUNDLED_JA: &str = include_str!("../data/keywords_ja.txt");

/// A set of substrings that mark an enthusiastic comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| !k.is_empty())
            .collect();
        keywords.dedup();
        Self { keywords }
    }

    /// Parse newline-separated keyword data.
    pub fn from_lines(data: &str) -> Self {
        Self::new(
            data.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Load keyword data from a file.
    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            EngineError::keywords(format!("failed to read {}: {}", path.display(), e))
        })?;
        let set = Self::from_lines(&data);
        if set.is_empty() {
            return Err(EngineError::keywords(format!(
                "{} contains no keywords",
                path.display()
            )));
        }
        Ok(set)
    }

    /// The Japanese keyword set bundled with the crate.
    pub fn bundled_japanese() -> Self {
        Self::from_lines(BUNDLED_JA)
    }

    /// `KEYWORDS_FILE` if set, otherwise the bundled set.
    pub fn from_env() -> EngineResult<Self> {
        match std::env::var("KEYWORDS_FILE") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => Ok(Self::bundled_japanese()),
        }
    }

    /// Whether `text` contains any keyword.
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }
}

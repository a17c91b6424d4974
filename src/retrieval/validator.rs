//! Shape checks for requested URLs.
//!
//! The dispatcher only sees the [`UrlValidator`] trait, so a stricter
//! parser can replace the default pattern without touching it. Any
//! `Fn(&str) -> bool` closure is a validator too.

use std::sync::LazyLock;

use regex::Regex;

/// Optional scheme, optional `www.`, then at least `word.word` somewhere
/// in the string. The match is unanchored.
pub const URL_PATTERN: &str = r"(https?://)?(www\.)?\w+\.\w+";

static DEFAULT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(URL_PATTERN).expect("URL_PATTERN is a valid regex"));

pub trait UrlValidator: Send + Sync {
    fn is_valid(&self, url: &str) -> bool;
}

impl<F> UrlValidator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, url: &str) -> bool {
        self(url)
    }
}

#[derive(Debug, Clone)]
pub struct PatternValidator {
    pattern: Regex,
}

impl PatternValidator {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl Default for PatternValidator {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }
}

impl UrlValidator for PatternValidator {
    fn is_valid(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }
}

//! Length validation for post bodies written in a markup language
//!
//! Limits apply to the text a reader sees, so markup is stripped before
//! counting characters. Each supported engine has a fixed stripping strategy.

use crate::app_config::MarkupConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::ValidationError;

/// Markup languages post bodies may be written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupEngine {
    #[default]
    Plain,
    BbCode,
    Markdown,
}

/// `[b]`, `[/b]`, `[url=...]`, `[*]`
static BBCODE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[/?(?:\*|[a-zA-Z][a-zA-Z0-9]*)(?:=[^\]]*)?\]").expect("valid bbcode tag regex")
});
/// `[label](target)` and `![alt](src)`, keeping the label
static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("valid markdown link regex"));
static MARKDOWN_LINE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:#{1,6}\s+|>\s?)").expect("valid markdown prefix regex"));
static MARKDOWN_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*{1,3}|_{2,3}|~~|`").expect("valid markdown emphasis regex"));

fn strip_plain(value: &str) -> Cow<'_, str> {
    Cow::Borrowed(value)
}

fn strip_bbcode(value: &str) -> Cow<'_, str> {
    BBCODE_TAG.replace_all(value, "")
}

fn strip_markdown(value: &str) -> Cow<'_, str> {
    let text = MARKDOWN_LINK.replace_all(value, "$1");
    let text = MARKDOWN_LINE_PREFIX.replace_all(&text, "").into_owned();
    Cow::Owned(MARKDOWN_EMPHASIS.replace_all(&text, "").into_owned())
}

impl MarkupEngine {
    pub const ALL: [MarkupEngine; 3] = [
        MarkupEngine::Plain,
        MarkupEngine::BbCode,
        MarkupEngine::Markdown,
    ];

    /// Stripping strategy for this engine.
    fn strategy(self) -> for<'v> fn(&'v str) -> Cow<'v, str> {
        match self {
            MarkupEngine::Plain => strip_plain,
            MarkupEngine::BbCode => strip_bbcode,
            MarkupEngine::Markdown => strip_markdown,
        }
    }

    /// Text left once markup is removed.
    pub fn strip<'v>(self, value: &'v str) -> Cow<'v, str> {
        (self.strategy())(value)
    }
}

fn max_length_error(length: usize, limit: usize) -> ValidationError {
    let mut err = ValidationError::new("max_length");
    err.message = Some(Cow::from(format!(
        "Ensure this value has at most {} characters (it has {}).",
        limit, length
    )));
    err.add_param(Cow::from("limit_value"), &limit);
    err.add_param(Cow::from("show_value"), &length);
    err
}

/// Max length check that is skipped entirely when no limit is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NullableMaxLengthValidator {
    pub limit_value: Option<usize>,
}

impl NullableMaxLengthValidator {
    pub fn new(limit_value: Option<usize>) -> Self {
        Self { limit_value }
    }

    pub fn validate(&self, value: &str) -> Result<(), ValidationError> {
        let limit = match self.limit_value {
            Some(limit) => limit,
            None => return Ok(()),
        };

        if validator::validate_length(value, None, Some(limit as u64), None) {
            Ok(())
        } else {
            Err(max_length_error(value.chars().count(), limit))
        }
    }
}

/// Max length check applied to the stripped text of the configured markup engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkupMaxLengthValidator {
    engine: MarkupEngine,
    inner: NullableMaxLengthValidator,
}

impl MarkupMaxLengthValidator {
    pub fn new(engine: MarkupEngine, limit_value: Option<usize>) -> Self {
        Self {
            engine,
            inner: NullableMaxLengthValidator::new(limit_value),
        }
    }

    pub fn from_config(config: &MarkupConfig) -> Self {
        Self::new(config.engine, config.max_length)
    }

    /// Validator for the globally configured engine and limit.
    pub fn from_settings() -> Self {
        Self::from_config(&crate::app_config::markup())
    }

    pub fn engine(&self) -> MarkupEngine {
        self.engine
    }

    pub fn validate(&self, value: &str) -> Result<(), ValidationError> {
        self.inner.validate(&self.engine.strip(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_without_limit_accepts_anything() {
        let v = NullableMaxLengthValidator::new(None);
        assert!(v.validate(&"x".repeat(1_000_000)).is_ok());
    }

    #[test]
    fn test_nullable_counts_characters() {
        let v = NullableMaxLengthValidator::new(Some(3));
        assert!(v.validate("héé").is_ok());
        let err = v.validate("héé!").unwrap_err();
        assert_eq!(err.code, "max_length");
        assert_eq!(err.params["limit_value"], serde_json::json!(3));
        assert_eq!(err.params["show_value"], serde_json::json!(4));
    }

    #[test]
    fn test_bbcode_tags_do_not_count() {
        assert_eq!(
            MarkupEngine::BbCode.strip("[b]bold[/b] [url=https://x.y]link[/url][*]"),
            "bold link"
        );
        let v = MarkupMaxLengthValidator::new(MarkupEngine::BbCode, Some(4));
        assert!(v.validate("[quote][i]abcd[/i][/quote]").is_ok());
        assert!(v.validate("[i]abcde[/i]").is_err());
    }

    #[test]
    fn test_markdown_syntax_does_not_count() {
        assert_eq!(
            MarkupEngine::Markdown.strip("# Title\n> **bold** [site](https://x.y) `code`"),
            "Title\nbold site code"
        );
    }

    #[test]
    fn test_plain_counts_markup_characters() {
        let v = MarkupMaxLengthValidator::new(MarkupEngine::Plain, Some(4));
        assert!(v.validate("[b]a[/b]").is_err());
    }

    #[test]
    fn test_from_config() {
        let config = MarkupConfig {
            engine: MarkupEngine::Markdown,
            max_length: Some(10),
        };
        let v = MarkupMaxLengthValidator::from_config(&config);
        assert_eq!(v.engine(), MarkupEngine::Markdown);
        assert!(v.validate("**0123456789**").is_ok());
    }

    #[test]
    fn test_every_engine_has_a_strategy() {
        for engine in MarkupEngine::ALL {
            assert_eq!(engine.strip("plain words"), "plain words");
        }
    }
}

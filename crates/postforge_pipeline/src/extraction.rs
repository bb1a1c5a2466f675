//! Structured draft extraction from completion text.
//!
//! Models asked for JSON still wrap it in prose or markdown fences. The
//! strategies in [`ExtractionStrategy::ORDER`] are tried in turn until one
//! yields a JSON object; when none does, the whole response becomes an
//! unstructured body.

use postforge_error::ParseError;
use serde_json::{Map, Value};

/// One way of locating a JSON object in free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ExtractionStrategy {
    /// The trimmed text is the object
    Direct,
    /// Outermost balanced `{ ... }` span
    BalancedBraces,
    /// Contents of a markdown code fence
    FencedBlock,
}

impl ExtractionStrategy {
    /// Order in which strategies are attempted.
    pub const ORDER: [Self; 3] = [Self::Direct, Self::BalancedBraces, Self::FencedBlock];

    /// Run this strategy, `None` when it finds no object.
    pub fn apply(self, text: &str) -> Option<Map<String, Value>> {
        let candidate = match self {
            Self::Direct => Some(text.trim().to_string()),
            Self::BalancedBraces => extract_balanced(text, '{', '}'),
            Self::FencedBlock => extract_from_code_block(text),
        }?;
        match serde_json::from_str::<Value>(&candidate) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

/// Locate the first JSON object any strategy can produce.
///
/// # Errors
///
/// Returns a [`ParseError`] when every strategy falls through.
///
/// # Examples
///
/// ```
/// use postforge_pipeline::{ExtractionStrategy, extract_object};
///
/// let (strategy, object) = extract_object("Sure! {\"title\": \"BTC\"} hope it helps").unwrap();
/// assert_eq!(strategy, ExtractionStrategy::BalancedBraces);
/// assert_eq!(object["title"], "BTC");
/// ```
pub fn extract_object(text: &str) -> Result<(ExtractionStrategy, Map<String, Value>), ParseError> {
    ExtractionStrategy::ORDER
        .into_iter()
        .find_map(|strategy| strategy.apply(text).map(|object| (strategy, object)))
        .ok_or_else(|| ParseError::new("no JSON object found", text.chars().count()))
}

/// Content of the first markdown code fence.
///
/// Prefers a fence tagged `json`, then any fence. An unclosed fence is
/// taken to run to the end of the text, which covers truncated responses.
fn extract_from_code_block(response: &str) -> Option<String> {
    let pattern = "```json";
    if let Some(start) = response.find(pattern) {
        let content_start = start + pattern.len();
        return Some(match response[content_start..].find("```") {
            Some(end) => response[content_start..content_start + end].trim().to_string(),
            None => response[content_start..].trim().to_string(),
        });
    }

    let start = response.find("```")?;
    let content_start = start + 3;
    // Skip a language tag on the opening line.
    let skip_to = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);
    Some(match response[skip_to..].find("```") {
        Some(end) => response[skip_to..skip_to + end].trim().to_string(),
        None => response[skip_to..].trim().to_string(),
    })
}

/// Span from the first `open` to its matching `close`, skipping delimiters
/// inside JSON strings.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(response[start..start + i + c.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// A candidate post as the model returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    /// Title, possibly empty
    pub title: String,
    /// Body text
    pub body: String,
    /// Hashtags as given
    pub hashtags: Vec<String>,
    /// Tickers as given
    pub tickers: Vec<String>,
    /// Mentions as given
    pub mentions: Vec<String>,
    /// Cited verifiable detail
    pub verifiable_detail: Option<String>,
    /// Parsed from a JSON object rather than taken verbatim
    pub structured: bool,
}

impl Draft {
    /// Whole response as the body, no title.
    pub fn unstructured(text: &str) -> Self {
        Self {
            body: text.trim().to_string(),
            ..Self::default()
        }
    }

    /// Read a draft out of a JSON object.
    ///
    /// `body` falls back to `text` then `content`. List fields accept an
    /// array of strings or a single string.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the object carries neither title nor body.
    pub fn from_object(object: &Map<String, Value>) -> Result<Self, ParseError> {
        let title = string_field(object, &["title"]).unwrap_or_default();
        let body = string_field(object, &["body", "text", "content"]).unwrap_or_default();
        if title.is_empty() && body.is_empty() {
            return Err(ParseError::new(
                "object has neither title nor body",
                Value::Object(object.clone()).to_string().chars().count(),
            ));
        }

        Ok(Self {
            title,
            body,
            hashtags: list_field(object, &["hashtags", "tags"]),
            tickers: list_field(object, &["tickers", "ticker"]),
            mentions: list_field(object, &["mentions", "mention"]),
            verifiable_detail: string_field(object, &["verifiable_detail"]),
            structured: true,
        })
    }

    /// Title and body joined the way the contract checks read them.
    pub fn merged_text(&self) -> String {
        if self.title.is_empty() {
            self.body.clone()
        } else {
            format!("{}\n{}", self.title, self.body)
        }
    }

    /// Body length in characters.
    pub fn body_chars(&self) -> usize {
        self.body.chars().count()
    }
}

/// Parse a structured draft, failing when no strategy yields one.
///
/// # Errors
///
/// Returns a [`ParseError`] when no usable object is found.
pub fn parse_draft(text: &str) -> Result<Draft, ParseError> {
    let (strategy, object) = extract_object(text)?;
    tracing::debug!(%strategy, "Extracted structured draft");
    Draft::from_object(&object)
}

/// Structured draft when possible, otherwise the whole text as body.
pub fn draft_from_response(text: &str) -> Draft {
    match parse_draft(text) {
        Ok(draft) => draft,
        Err(e) => {
            tracing::debug!(error = %e, "Falling back to unstructured draft");
            Draft::unstructured(text)
        }
    }
}

fn string_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn list_field(object: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|key| match object.get(*key)? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            Value::String(s) if !s.trim().is_empty() => Some(vec![s.trim().to_string()]),
            _ => None,
        })
        .unwrap_or_default()
}

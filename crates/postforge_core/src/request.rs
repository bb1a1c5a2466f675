//! Inbound request payload and its validated generation form.

use postforge_error::{InputError, InputErrorKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Model used when the caller names none.
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.1-8b-instruct";
/// Token symbol used when the caller names none.
pub const DEFAULT_TOKEN: &str = "BTC";
/// Output language used when the caller names none.
pub const DEFAULT_LANGUAGE: &str = "zh";
/// Sampling temperature used when the caller names none.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Completion budget used when the caller names none.
pub const DEFAULT_MAX_TOKENS: u32 = 900;
/// Upper clamp for the completion budget.
pub const MAX_TOKENS_CEILING: u32 = 2000;
/// Largest `min_chars` / `max_chars` a caller may ask for.
pub const MAX_CHARS_CEILING: usize = 5000;

/// Post shape, which selects the default length band.
///
/// # Examples
///
/// ```
/// use postforge_core::PostKind;
/// use std::str::FromStr;
///
/// assert_eq!(PostKind::from_str("Article").unwrap(), PostKind::Article);
/// assert_eq!(PostKind::default().band().max(), 280);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PostKind {
    /// Feed-sized post
    #[default]
    Short,
    /// Long-form post
    Article,
}

impl PostKind {
    /// Default character band for this kind.
    pub fn band(self) -> LengthBand {
        match self {
            PostKind::Short => LengthBand::new(140, 280),
            PostKind::Article => LengthBand::new(900, 1200),
        }
    }
}

/// Inclusive body length bounds, counted in Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LengthBand {
    min: usize,
    max: usize,
}

impl LengthBand {
    /// Create a band. Callers guarantee `min <= max`.
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Lower bound.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> usize {
        self.max
    }

    /// True when `len` lies within the band.
    pub fn contains(&self, len: usize) -> bool {
        len >= self.min && len <= self.max
    }
}

/// Caller-supplied context block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct InboundContext {
    /// Outline the post should follow
    #[serde(default)]
    pub outline: Option<String>,
    /// Topics to rotate through instead of the built-in pool
    #[serde(default)]
    pub topic_bank: Vec<String>,
    /// Fallback hashtags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Fallback tickers
    #[serde(default)]
    pub tickers: Vec<String>,
    /// Fallback mentions
    #[serde(default)]
    pub mentions: Vec<String>,
    /// Persona to write as
    #[serde(default)]
    pub persona: Option<String>,
}

/// Raw request body as callers send it.
///
/// Every field is optional at the wire level so that a missing prompt is
/// reported as an [`InputError`] rather than a deserialization failure.
///
/// # Examples
///
/// ```
/// use postforge_core::{InboundRequest, PostKind};
///
/// let inbound: InboundRequest = serde_json::from_str(
///     r#"{"prompt":"fee market update","token":"$eth","postKind":"article"}"#,
/// ).unwrap();
/// let request = inbound.into_generation_request("meta-llama/llama-3.1-8b-instruct").unwrap();
///
/// assert_eq!(request.token(), "ETH");
/// assert_eq!(*request.kind(), PostKind::Article);
/// assert_eq!(request.band().min(), 900);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct InboundRequest {
    /// Task text
    #[serde(default)]
    pub prompt: Option<String>,
    /// Extra system text prepended to the composed system prompt
    #[serde(default)]
    pub system: Option<String>,
    /// Model identifier
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Completion token budget, clamped to `[1, 2000]`
    #[serde(default)]
    pub max_tokens: Option<i64>,
    /// Output language
    #[serde(default)]
    pub language: Option<String>,
    /// Token symbol the post is about
    #[serde(default)]
    pub token: Option<String>,
    /// Minimum body length override
    #[serde(default)]
    pub min_chars: Option<usize>,
    /// Maximum body length override
    #[serde(default)]
    pub max_chars: Option<usize>,
    /// `short` or `article`
    #[serde(default, alias = "postKind")]
    pub mode: Option<String>,
    /// Ask the model for JSON output
    #[serde(default)]
    pub structured: Option<bool>,
    /// Per-request deadline override
    #[serde(default)]
    pub deadline_ms: Option<u64>,
    /// Context block
    #[serde(default)]
    pub context: Option<InboundContext>,
}

impl InboundRequest {
    /// Request with only a prompt set.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Self::default()
        }
    }

    /// Validate and apply defaults.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] when the prompt is missing or blank, the
    /// temperature is not a finite value in `[0, 2]`, the token symbol is
    /// not alphanumeric, the mode is unknown, or the length bounds conflict.
    pub fn into_generation_request(
        self,
        default_model: &str,
    ) -> Result<GenerationRequest, InputError> {
        let prompt = match self.prompt {
            Some(p) if !p.trim().is_empty() => p,
            _ => {
                return Err(InputError::new(InputErrorKind::MissingField(
                    "prompt".to_string(),
                )));
            }
        };

        let temperature = match self.temperature {
            None => DEFAULT_TEMPERATURE,
            Some(t) if t.is_finite() && (0.0..=2.0).contains(&t) => t as f32,
            Some(t) => return Err(invalid("temperature", format!("{} is outside [0, 2]", t))),
        };

        let max_tokens = self
            .max_tokens
            .map(|m| m.clamp(1, MAX_TOKENS_CEILING as i64) as u32)
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let token = normalize_token(self.token.as_deref())?;

        let kind = match self.mode.as_deref().map(str::trim) {
            None | Some("") => PostKind::default(),
            Some(m) => PostKind::from_str(m)
                .map_err(|_| invalid("mode", format!("unknown post kind '{}'", m)))?,
        };

        let default_band = kind.band();
        if self.max_chars == Some(0) {
            return Err(invalid("max_chars", "must be at least 1".to_string()));
        }
        for (field, value) in [("min_chars", self.min_chars), ("max_chars", self.max_chars)] {
            if let Some(v) = value.filter(|v| *v > MAX_CHARS_CEILING) {
                return Err(invalid(
                    field,
                    format!("{} exceeds the ceiling of {}", v, MAX_CHARS_CEILING),
                ));
            }
        }
        let min = self.min_chars.unwrap_or(default_band.min());
        let max = self.max_chars.unwrap_or(default_band.max().max(min));
        if min > max {
            return Err(invalid(
                "min_chars",
                format!("{} exceeds max_chars {}", min, max),
            ));
        }

        let language = self
            .language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let model = self
            .model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_model.to_string());

        let context = self.context.unwrap_or_default();

        Ok(GenerationRequest {
            token,
            language,
            prompt,
            system: self.system.filter(|s| !s.trim().is_empty()),
            kind,
            band: LengthBand::new(min, max),
            persona: context.persona.filter(|p| !p.trim().is_empty()),
            outline: context.outline.filter(|o| !o.trim().is_empty()),
            topic_bank: non_blank(context.topic_bank),
            tags: non_blank(context.tags),
            tickers: non_blank(context.tickers),
            mentions: non_blank(context.mentions),
            model,
            temperature,
            max_tokens,
            structured: self.structured.unwrap_or(true),
            deadline_ms: self.deadline_ms,
        })
    }
}

impl TryFrom<InboundRequest> for GenerationRequest {
    type Error = InputError;

    fn try_from(value: InboundRequest) -> Result<Self, Self::Error> {
        value.into_generation_request(DEFAULT_MODEL)
    }
}

#[track_caller]
fn invalid(field: &str, reason: String) -> InputError {
    InputError::new(InputErrorKind::InvalidField {
        field: field.to_string(),
        reason,
    })
}

fn normalize_token(raw: Option<&str>) -> Result<String, InputError> {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    let symbol = trimmed.trim_start_matches('$');
    if symbol.is_empty() {
        return Ok(DEFAULT_TOKEN.to_string());
    }
    if symbol.len() > 16 || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid(
            "token",
            format!("'{}' is not an alphanumeric symbol", trimmed),
        ));
    }
    Ok(symbol.to_ascii_uppercase())
}

fn non_blank(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Validated, immutable per-call generation input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct GenerationRequest {
    /// Uppercase token symbol; also the learning scope
    token: String,
    /// Output language
    language: String,
    /// Task text
    prompt: String,
    /// Extra system text
    system: Option<String>,
    /// Post shape
    kind: PostKind,
    /// Body length band
    band: LengthBand,
    /// Persona override
    persona: Option<String>,
    /// Outline to follow
    outline: Option<String>,
    /// Caller topic pool
    topic_bank: Vec<String>,
    /// Fallback hashtags
    tags: Vec<String>,
    /// Fallback tickers
    tickers: Vec<String>,
    /// Fallback mentions
    mentions: Vec<String>,
    /// Model identifier
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Completion token budget
    max_tokens: u32,
    /// Ask for JSON output
    structured: bool,
    /// Deadline override in milliseconds
    deadline_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_prompt_is_rejected() {
        let err = InboundRequest::default()
            .into_generation_request(DEFAULT_MODEL)
            .unwrap_err();
        assert!(matches!(err.kind, InputErrorKind::MissingField(ref f) if f == "prompt"));

        let err = InboundRequest::new("   ")
            .into_generation_request(DEFAULT_MODEL)
            .unwrap_err();
        assert!(matches!(err.kind, InputErrorKind::MissingField(_)));
    }

    #[test]
    fn defaults_are_applied() {
        let request = GenerationRequest::try_from(InboundRequest::new("hello")).unwrap();
        assert_eq!(request.token(), DEFAULT_TOKEN);
        assert_eq!(request.language(), DEFAULT_LANGUAGE);
        assert_eq!(request.model(), DEFAULT_MODEL);
        assert_eq!(*request.max_tokens(), DEFAULT_MAX_TOKENS);
        assert_eq!(*request.kind(), PostKind::Short);
        assert_eq!(*request.band(), LengthBand::new(140, 280));
        assert!(*request.structured());
    }

    #[test]
    fn max_tokens_is_clamped() {
        let high = InboundRequest::new("x").with_max_tokens(50_000i64);
        assert_eq!(*GenerationRequest::try_from(high).unwrap().max_tokens(), 2000);

        let low = InboundRequest::new("x").with_max_tokens(-3i64);
        assert_eq!(*GenerationRequest::try_from(low).unwrap().max_tokens(), 1);
    }

    #[test]
    fn bad_temperature_and_token_are_rejected() {
        let hot = InboundRequest::new("x").with_temperature(f64::NAN);
        assert!(GenerationRequest::try_from(hot).is_err());

        let token = InboundRequest::new("x").with_token("BT C");
        assert!(GenerationRequest::try_from(token).is_err());
    }

    #[test]
    fn conflicting_bounds_are_rejected() {
        let inbound = InboundRequest::new("x")
            .with_min_chars(500usize)
            .with_max_chars(200usize);
        assert!(GenerationRequest::try_from(inbound).is_err());
    }

    #[test]
    fn min_override_widens_default_max() {
        let inbound = InboundRequest::new("x").with_min_chars(400usize);
        let request = GenerationRequest::try_from(inbound).unwrap();
        assert_eq!(*request.band(), LengthBand::new(400, 400));
    }

    #[test]
    fn bounds_above_ceiling_are_rejected() {
        let huge_min = InboundRequest::new("x").with_min_chars(2_000_000_000usize);
        let err = GenerationRequest::try_from(huge_min).unwrap_err();
        assert!(matches!(
            err.kind,
            InputErrorKind::InvalidField { ref field, .. } if field == "min_chars"
        ));

        let huge_max = InboundRequest::new("x").with_max_chars(MAX_CHARS_CEILING + 1);
        assert!(GenerationRequest::try_from(huge_max).is_err());

        let at_ceiling = InboundRequest::new("x")
            .with_min_chars(MAX_CHARS_CEILING)
            .with_max_chars(MAX_CHARS_CEILING);
        let request = GenerationRequest::try_from(at_ceiling).unwrap();
        assert_eq!(request.band().max(), MAX_CHARS_CEILING);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let inbound = InboundRequest::new("x").with_mode("thread");
        assert!(GenerationRequest::try_from(inbound).is_err());
    }
}

//! Prompt composition.
//!
//! Composition is pure apart from the persona pick, which goes through the
//! injected [`Chooser`].

use crate::{Chooser, choose};
use postforge_core::{CandidatePool, FormatHint, GenerationRequest, LengthBand, Message};
use postforge_error::ValidationError;
use std::sync::Arc;

/// Personas used when a request names none.
pub const DEFAULT_PERSONAS: &[&str] = &[
    "a careful on-chain analyst who explains protocol mechanics in plain words",
    "a long-time community builder writing for newcomers",
    "a research desk editor who only states what can be checked",
    "a developer advocate who cares how things actually work",
];

/// Dimensions a post may cover.
pub const FOCUS_DIMENSIONS: &[&str] = &[
    "its role in the protocol",
    "tokenomics and supply",
    "ecosystem integrations",
    "recent milestones",
    "risks and limits",
];

/// Topics rotated when a request brings no topic bank.
pub fn default_topics() -> Vec<String> {
    [
        "network fees",
        "supply schedule",
        "self-custody",
        "ecosystem integrations",
        "developer activity",
        "governance and upgrades",
        "security incidents and lessons",
        "adoption milestones",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

/// Layout styles rotated for every request.
pub fn default_formats() -> Vec<FormatHint> {
    vec![
        FormatHint::new("list", "Lay the body out as a short numbered list of facts."),
        FormatHint::new("qa", "Write the body as one question followed by its answer."),
        FormatHint::new(
            "three_part",
            "Split the body into three parts separated by a line containing only ---.",
        ),
        FormatHint::new(
            "quote_lead",
            "Open with a short quoted line, then explain it.",
        ),
        FormatHint::new(
            "dialogue",
            "Write the body as a brief exchange between two speakers, A and B.",
        ),
        FormatHint::new(
            "glossary",
            "Define one term from the topic, then show where it matters.",
        ),
    ]
}

/// Built-in topic and format pool.
pub fn default_pool() -> CandidatePool {
    CandidatePool::new(default_topics(), default_formats())
}

const OUTPUT_SCHEMA: &str = r#"Reply with one JSON object and nothing else:
{"title": string, "body": string, "hashtags": [string], "tickers": [string], "mentions": [string], "verifiable_detail": string}
- title: at most 48 characters
- hashtags: at most 2, without '#'
- tickers: at most 1, without '$'
- mentions: at most 1, without '@'
- verifiable_detail: the timestamp, transaction hash fragment or block height the body cites"#;

fn language_name(code: &str) -> &str {
    match code.to_ascii_lowercase().as_str() {
        "zh" | "zh-cn" | "zh-hans" => "Simplified Chinese",
        "zh-tw" | "zh-hant" => "Traditional Chinese",
        "en" => "English",
        "ja" => "Japanese",
        "ko" => "Korean",
        _ => code,
    }
}

/// System and user text for one request.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct ComposedPrompt {
    /// System message
    system: String,
    /// User message
    user: String,
    /// JSON output was requested
    structured: bool,
    /// Persona that was used
    persona: String,
}

impl ComposedPrompt {
    /// Messages for the initial completion.
    pub fn messages(&self) -> Vec<Message> {
        vec![Message::system(&self.system), Message::user(&self.user)]
    }

    /// Messages asking for a minimal fix of `prior`.
    pub fn repair_messages(&self, failures: &ValidationError, prior: &str) -> Vec<Message> {
        let mut user = format!(
            "Your previous answer failed these checks: {}.\n\
             Fix only what is needed to pass them. Keep the tone, structure and length.\n",
            failures.describe()
        );
        if self.structured {
            user.push_str("Use the same JSON object format as before.\n");
        }
        user.push_str("Previous answer, verbatim:\n");
        user.push_str(prior);

        vec![Message::system(&self.system), Message::user(user)]
    }

    /// Messages asking to lengthen `body` into `band`.
    pub fn continuation_messages(&self, body: &str, band: &LengthBand) -> Vec<Message> {
        let user = format!(
            "The body below is too short. Extend it to between {} and {} characters \
             without repeating sentences or adding price talk. Reply with the full \
             extended body as plain text only.\n\n{}",
            band.min(),
            band.max(),
            body
        );
        vec![Message::system(&self.system), Message::user(user)]
    }
}

/// Builds prompts from a request and the rotated topic and format.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    chooser: Arc<dyn Chooser>,
}

impl PromptComposer {
    /// Composer drawing personas through `chooser`.
    pub fn new(chooser: Arc<dyn Chooser>) -> Self {
        Self { chooser }
    }

    /// Compose the system and user messages.
    ///
    /// # Examples
    ///
    /// ```
    /// use postforge_core::{GenerationRequest, InboundRequest};
    /// use postforge_pipeline::{FixedChooser, PromptComposer};
    /// use std::sync::Arc;
    ///
    /// let request = GenerationRequest::try_from(
    ///     InboundRequest::new("Explain halving").with_system("Be brief."),
    /// ).unwrap();
    /// let composer = PromptComposer::new(Arc::new(FixedChooser(0)));
    /// let prompt = composer.compose(&request, Some("supply schedule"), None);
    ///
    /// assert!(prompt.system().starts_with("Be brief."));
    /// assert!(prompt.user().contains("supply schedule"));
    /// assert!(prompt.user().contains("140"));
    /// ```
    pub fn compose(
        &self,
        request: &GenerationRequest,
        topic: Option<&str>,
        format: Option<&FormatHint>,
    ) -> ComposedPrompt {
        let persona = request
            .persona()
            .clone()
            .or_else(|| choose(self.chooser.as_ref(), DEFAULT_PERSONAS).map(|p| p.to_string()))
            .unwrap_or_default();
        let token = request.token();

        let mut system = String::new();
        if let Some(extra) = request.system() {
            system.push_str(extra.trim());
            system.push_str("\n\n");
        }
        system.push_str(&format!("You write as {}.\n", persona));
        system.push_str(&format!(
            "Focus on {} and cover one of: {}.\n",
            token,
            FOCUS_DIMENSIONS.join("; ")
        ));
        system.push_str(
            "Never predict prices. Never use technical-analysis language \
             (K线, 均线, MACD, RSI, 支撑位, 阻力位, 目标价, price targets, support or resistance levels).\n",
        );
        if let Some(format) = format {
            system.push_str(&format!("Format: {}\n", format.instruction()));
        }
        if *request.structured() {
            system.push('\n');
            system.push_str(OUTPUT_SCHEMA);
            system.push('\n');
        }

        let band = request.band();
        let mut user = format!("Task: {}\n", request.prompt().trim());
        if let Some(topic) = topic {
            user.push_str(&format!("Topic: {}\n", topic));
        }
        if let Some(outline) = request.outline() {
            user.push_str(&format!("Outline: {}\n", outline.trim()));
        }
        user.push_str(&format!(
            "Language: {}\n\
             Body length: {} to {} characters.\n\
             Structure: open with a hook, give evidence that includes one verifiable detail \
             (a timestamp, a transaction hash fragment or a block height), then say why it matters.\n\
             Mention {} by name. Do not end with a call to action.\n",
            language_name(request.language()),
            band.min(),
            band.max(),
            token
        ));

        ComposedPrompt {
            system,
            user,
            structured: *request.structured(),
            persona,
        }
    }
}

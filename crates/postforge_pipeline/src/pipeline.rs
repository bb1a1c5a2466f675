//! End-to-end generation under one deadline.

use crate::{
    Chooser, Deadline, Draft, LengthFitter, OutputValidator, PromptComposer, RandomChooser,
    RepairLoop, RepairSettings, RotationSelector, TitleSynthesizer, UpstreamClient,
    completion_request, default_pool, draft_from_response, sanitize,
};
use postforge_core::{
    CandidatePool, GenerationRequest, GenerationResult, InboundRequest, LearningState, Usage,
    ValidationFlags,
};
use postforge_error::PostforgeResult;
use postforge_interface::{CompletionDriver, StateStore};
use postforge_rate_limit::{CallerRateLimiter, PipelineConfig, PostforgeConfig, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const MAX_TAGS: usize = 2;
const MAX_TICKERS: usize = 1;
const MAX_MENTIONS: usize = 1;

/// Generates one publishable post per request.
///
/// Owns the upstream client, the learning store handle and every finishing
/// stage. Cheap to share behind an `Arc`; each call works on its own
/// snapshot of the learning state.
///
/// # Example
///
/// ```rust,ignore
/// use postforge_pipeline::Pipeline;
/// use postforge_storage::LearningStore;
///
/// let pipeline = Pipeline::new(driver, Arc::new(LearningStore::new()), &config);
/// let result = pipeline.handle("203.0.113.7", InboundRequest::new("fee market")).await?;
/// println!("{}\n{}", result.title, result.text);
/// ```
pub struct Pipeline {
    upstream: UpstreamClient,
    store: Arc<dyn StateStore>,
    config: PipelineConfig,
    default_model: String,
    chooser: Arc<dyn Chooser>,
    limiter: CallerRateLimiter,
    pool: CandidatePool,
}

impl Pipeline {
    /// Pipeline over `driver`, persisting rotation state in `store`.
    pub fn new(
        driver: Arc<dyn CompletionDriver>,
        store: Arc<dyn StateStore>,
        config: &PostforgeConfig,
    ) -> Self {
        Self {
            upstream: UpstreamClient::new(
                driver,
                RetryPolicy::from(config.retry),
                Duration::from_millis(config.pipeline.safety_margin_ms),
            ),
            store,
            config: config.pipeline.clone(),
            default_model: config.upstream.default_model.clone(),
            chooser: Arc::new(RandomChooser::from_entropy()),
            limiter: CallerRateLimiter::new(config.rate_limit),
            pool: default_pool(),
        }
    }

    /// Replace the source of randomness.
    pub fn with_chooser(mut self, chooser: Arc<dyn Chooser>) -> Self {
        self.chooser = chooser;
        self
    }

    /// Replace the per-caller limiter.
    pub fn with_limiter(mut self, limiter: CallerRateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Replace the built-in topic and format pool.
    pub fn with_candidates(mut self, pool: CandidatePool) -> Self {
        self.pool = pool;
        self
    }

    /// Pipeline settings in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Learning state store.
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Validate a raw request, admit the caller and generate.
    ///
    /// # Errors
    ///
    /// Input, rate-limit, timeout and upstream errors; see [`Pipeline::generate`].
    pub async fn handle(&self, caller: &str, inbound: InboundRequest) -> PostforgeResult<GenerationResult> {
        let request = inbound.into_generation_request(&self.default_model)?;
        self.generate_for_caller(caller, request).await
    }

    /// Admit `caller` through the limiter, then generate.
    ///
    /// # Errors
    ///
    /// Returns a rate-limit error without touching any state when the caller
    /// is over quota.
    pub async fn generate_for_caller(
        &self,
        caller: &str,
        request: GenerationRequest,
    ) -> PostforgeResult<GenerationResult> {
        self.limiter.admit(caller)?;
        self.generate(request).await
    }

    /// Generate one post.
    ///
    /// Only the initial completion can fail the request. After a candidate
    /// exists, repair, continuation and persistence problems degrade to
    /// advisory flags and log lines.
    ///
    /// # Errors
    ///
    /// - timeout error when the deadline expires before the first completion
    /// - upstream error when the first completion fails after retries
    #[instrument(
        skip(self, request),
        fields(token = %request.token(), kind = %request.kind(), model = %request.model())
    )]
    pub async fn generate(&self, request: GenerationRequest) -> PostforgeResult<GenerationResult> {
        let deadline = Deadline::from_millis(request.deadline_ms().unwrap_or(self.config.deadline_ms));
        let scope = request.token().clone();
        let mut state = self.store.load(&scope).await;
        let mut usage = Usage::default();

        let pool = if request.topic_bank().is_empty() {
            self.pool.clone()
        } else {
            self.pool.clone().with_topics(request.topic_bank().clone())
        };
        let rotation = RotationSelector::new(self.config.rotation_policy);
        let (topic, format) = rotation.rotate(&pool, &mut state);
        let format_label = format.map(|f| f.label().clone());

        let composer = PromptComposer::new(self.chooser.clone());
        let prompt = composer.compose(&request, topic.as_deref(), format);
        let initial_req = completion_request(
            request.model(),
            prompt.messages(),
            *request.temperature(),
            *request.max_tokens(),
        )?;
        let initial = self
            .upstream
            .complete(&initial_req, &deadline, "initial completion")
            .await?;
        if let Some(u) = &initial.usage {
            usage.accumulate(u);
        }

        let validator = OutputValidator::new(request.token());
        let draft = draft_from_response(&initial.text);
        let outcome = RepairLoop::new(&self.upstream, &validator, RepairSettings::from(&self.config))
            .run(&request, &prompt, draft, &initial.text, &deadline)
            .await;
        usage.accumulate(&outcome.usage);
        let model = outcome.model.clone().unwrap_or_else(|| initial.model.clone());

        let mut flags = ValidationFlags {
            repair_attempts: outcome.attempts,
            needs_review: outcome.needs_review,
            skipped_for_deadline: outcome.skipped_for_deadline,
            structured: outcome.candidate.structured,
            ..ValidationFlags::default()
        };

        let mut candidate = outcome.candidate;
        candidate.title = sanitize(&candidate.title);
        candidate.body = sanitize(&candidate.body);

        let fitter = LengthFitter::new(*request.band(), request.language());
        if fitter.is_short(&candidate.body) && self.config.continuation {
            if deadline.can_fit(Duration::from_millis(self.config.min_step_ms)) {
                if let Some(extended) = self
                    .continue_body(&request, &prompt, &candidate.body, &deadline, &mut usage)
                    .await
                {
                    candidate.body = sanitize(&extended);
                    flags.continuation_used = true;
                }
            } else {
                debug!("Skipping continuation, deadline too close");
                flags.skipped_for_deadline = true;
            }
        }
        let fitted = fitter.fit(&candidate.body);
        candidate.body = fitted.text;
        flags.padded = fitted.padded;
        flags.truncated = fitted.truncated;
        flags.below_min_length = fitted.short;

        let titles = TitleSynthesizer::new(
            request.token(),
            self.chooser.clone(),
            self.config.title_history,
        );
        let keyword = title_keyword(request.outline().as_deref(), topic.as_deref());
        candidate.title =
            titles.synthesize(&candidate.title, &candidate.body, keyword.as_deref(), &mut state);

        let tags = normalize_tags(&candidate.hashtags, request.tags());
        let tickers = normalize_tickers(&candidate.tickers, request.tickers());
        let mentions = normalize_mentions(&candidate.mentions, request.mentions());

        let report = validator.validate(&Draft {
            tickers: tickers.clone(),
            ..candidate.clone()
        });
        flags.token_mentioned = report.token_mentioned;
        flags.includes_verifiable_detail = report.includes_verifiable_detail;
        flags.ta_violation = report.ta_violation;
        flags.ok = report.ok();
        flags.needs_review = flags.needs_review || !report.ok();

        info!(
            ok = flags.ok,
            needs_review = flags.needs_review,
            repair_attempts = flags.repair_attempts,
            chars = candidate.body.chars().count(),
            elapsed_ms = deadline.elapsed().as_millis() as u64,
            "Generation finished"
        );

        self.persist(scope, state).await;

        Ok(GenerationResult {
            title: candidate.title,
            text: candidate.body,
            tags,
            tickers,
            mentions,
            verifiable_detail: candidate.verifiable_detail,
            topic_used: topic,
            format_hint: format_label,
            model,
            usage,
            flags,
        })
    }

    /// One continuation call; `Some` only when it produced a longer body.
    async fn continue_body(
        &self,
        request: &GenerationRequest,
        prompt: &crate::ComposedPrompt,
        body: &str,
        deadline: &Deadline,
        usage: &mut Usage,
    ) -> Option<String> {
        let req = completion_request(
            request.model(),
            prompt.continuation_messages(body, request.band()),
            *request.temperature(),
            *request.max_tokens(),
        )
        .ok()?;

        match self.upstream.complete(&req, deadline, "continuation").await {
            Ok(response) => {
                if let Some(u) = &response.usage {
                    usage.accumulate(u);
                }
                let extended = sanitize(&draft_from_response(&response.text).body);
                if extended.chars().count() > body.chars().count() {
                    debug!(
                        before = body.chars().count(),
                        after = extended.chars().count(),
                        "Continuation accepted"
                    );
                    Some(extended)
                } else {
                    debug!("Continuation was not longer, ignoring");
                    None
                }
            }
            Err(e) => {
                warn!(error = %e, "Continuation failed, keeping body");
                None
            }
        }
    }

    async fn persist(&self, scope: String, state: LearningState) {
        if self.config.persist_in_background {
            let store = Arc::clone(&self.store);
            tokio::spawn(async move {
                if let Err(e) = store.save(&scope, state).await {
                    warn!(scope = %scope, error = %e, "Failed to persist learning state");
                }
            });
        } else if let Err(e) = self.store.save(&scope, state).await {
            warn!(scope = %scope, error = %e, "Failed to persist learning state");
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("upstream", &self.upstream)
            .field("config", &self.config)
            .field("default_model", &self.default_model)
            .field("limiter", &self.limiter)
            .finish()
    }
}

/// First word of the outline, else the topic.
fn title_keyword(outline: Option<&str>, topic: Option<&str>) -> Option<String> {
    outline
        .and_then(|o| {
            o.split(|c: char| c.is_whitespace() || "，,、;；:：.。".contains(c))
                .map(str::trim)
                .find(|w| !w.is_empty())
        })
        .or(topic)
        .map(str::to_string)
}

fn normalize_list(
    primary: &[String],
    fallback: &[String],
    limit: usize,
    clean: impl Fn(&str) -> String,
) -> Vec<String> {
    let pick = |values: &[String]| {
        let mut out: Vec<String> = Vec::new();
        for value in values {
            let cleaned = clean(value);
            if !cleaned.is_empty() && !out.contains(&cleaned) {
                out.push(cleaned);
            }
            if out.len() == limit {
                break;
            }
        }
        out
    };
    let primary = pick(primary);
    if primary.is_empty() { pick(fallback) } else { primary }
}

fn normalize_tags(primary: &[String], fallback: &[String]) -> Vec<String> {
    normalize_list(primary, fallback, MAX_TAGS, |t| {
        t.trim().trim_start_matches('#').trim().to_string()
    })
}

fn normalize_tickers(primary: &[String], fallback: &[String]) -> Vec<String> {
    normalize_list(primary, fallback, MAX_TICKERS, |t| {
        t.trim().trim_start_matches('$').trim().to_uppercase()
    })
}

fn normalize_mentions(primary: &[String], fallback: &[String]) -> Vec<String> {
    normalize_list(primary, fallback, MAX_MENTIONS, |m| {
        m.trim().trim_start_matches('@').trim().to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn tags_are_cleaned_capped_and_deduped() {
        let tags = normalize_tags(&strings(&["#BTC", "BTC", " #halving ", "#extra"]), &[]);
        assert_eq!(tags, strings(&["BTC", "halving"]));
    }

    #[test]
    fn empty_output_falls_back_to_context() {
        let tickers = normalize_tickers(&strings(&["  ", "$"]), &strings(&["$eth", "sol"]));
        assert_eq!(tickers, strings(&["ETH"]));

        let mentions = normalize_mentions(&[], &strings(&["@binance"]));
        assert_eq!(mentions, strings(&["binance"]));
    }

    #[test]
    fn keyword_prefers_outline() {
        assert_eq!(
            title_keyword(Some("custody, then fees"), Some("network fees")).as_deref(),
            Some("custody")
        );
        assert_eq!(title_keyword(Some("  "), Some("fees")).as_deref(), Some("fees"));
        assert_eq!(title_keyword(None, None), None);
    }
}

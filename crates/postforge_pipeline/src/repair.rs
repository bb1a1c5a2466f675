//! Bounded corrective re-prompting.

use crate::{
    ComposedPrompt, Deadline, Draft, OutputValidator, UpstreamClient, ValidationReport,
    completion_request, draft_from_response,
};
use postforge_core::{GenerationRequest, Usage};
use postforge_rate_limit::{PipelineConfig, RepairAcceptance};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Repair loop settings, taken from `[pipeline]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepairSettings {
    /// Repair calls allowed per request
    pub max_repairs: u32,
    /// Temperature ceiling for repair calls
    pub repair_temperature: f32,
    /// Shortest body a repaired candidate may have
    pub min_body_chars: usize,
    /// Candidate kept when the loop ends
    pub acceptance: RepairAcceptance,
    /// Time a repair call needs to be worth starting
    pub min_step: Duration,
}

impl From<&PipelineConfig> for RepairSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_repairs: config.max_repairs,
            repair_temperature: config.repair_temperature,
            min_body_chars: config.repair_min_body_chars,
            acceptance: config.repair_acceptance,
            min_step: Duration::from_millis(config.min_step_ms),
        }
    }
}

/// Where the loop stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RepairState {
    Initial,
    Validated,
    Repairing(u32),
    Terminal,
}

/// What the loop settled on.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// Chosen candidate
    pub candidate: Draft,
    /// Checks for the chosen candidate
    pub report: ValidationReport,
    /// Repair calls issued
    pub attempts: u32,
    /// Compliance was never reached
    pub needs_review: bool,
    /// A repair was skipped because the deadline could not fit it
    pub skipped_for_deadline: bool,
    /// Usage of the repair calls
    pub usage: Usage,
    /// Model that produced the chosen candidate, when it came from a repair
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
struct Candidate {
    draft: Draft,
    report: ValidationReport,
    model: Option<String>,
}

/// Re-prompts the model with its failed checks until the candidate passes,
/// the attempt bound is hit, the deadline runs short or the upstream fails.
///
/// ```text
/// Initial -> Validated -> Repairing(n) -> Validated -> ... -> Terminal
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RepairLoop<'a> {
    upstream: &'a UpstreamClient,
    validator: &'a OutputValidator,
    settings: RepairSettings,
}

impl<'a> RepairLoop<'a> {
    /// Loop over `upstream`, judged by `validator`.
    pub fn new(upstream: &'a UpstreamClient, validator: &'a OutputValidator, settings: RepairSettings) -> Self {
        Self {
            upstream,
            validator,
            settings,
        }
    }

    /// Drive `initial` to a terminal candidate.
    ///
    /// `initial_text` is the raw response `initial` was parsed from; repair
    /// prompts quote the raw output of the running candidate verbatim.
    #[instrument(skip_all, fields(token = %request.token(), max_repairs = self.settings.max_repairs))]
    pub async fn run(
        &self,
        request: &GenerationRequest,
        prompt: &ComposedPrompt,
        initial: Draft,
        initial_text: &str,
        deadline: &Deadline,
    ) -> RepairOutcome {
        let mut state = RepairState::Initial;
        let mut running = Candidate {
            report: ValidationReport::default(),
            draft: initial,
            model: None,
        };
        let mut history: Vec<Candidate> = Vec::new();
        let mut last_raw = initial_text.to_string();
        let mut attempts = 0u32;
        let mut skipped_for_deadline = false;
        let mut usage = Usage::default();
        let temperature = request.temperature().min(self.settings.repair_temperature);

        loop {
            state = match state {
                RepairState::Initial => {
                    running.report = self.validator.validate(&running.draft);
                    history.push(running.clone());
                    RepairState::Validated
                }
                RepairState::Validated => {
                    if running.report.ok() || attempts >= self.settings.max_repairs {
                        RepairState::Terminal
                    } else if !deadline.can_fit(self.settings.min_step) {
                        info!(
                            remaining_ms = deadline.remaining().as_millis() as u64,
                            "Skipping repair, deadline too close"
                        );
                        skipped_for_deadline = true;
                        RepairState::Terminal
                    } else {
                        RepairState::Repairing(attempts + 1)
                    }
                }
                RepairState::Repairing(n) => {
                    attempts = n;
                    let failures = match running.report.into_result() {
                        Ok(()) => break,
                        Err(failures) => failures,
                    };
                    debug!(attempt = n, failures = %failures.describe(), "Requesting repair");

                    let req = match completion_request(
                        request.model(),
                        prompt.repair_messages(&failures, &last_raw),
                        temperature,
                        *request.max_tokens(),
                    ) {
                        Ok(req) => req,
                        Err(e) => {
                            warn!(error = %e, "Could not build repair request");
                            break;
                        }
                    };

                    match self.upstream.complete(&req, deadline, "repair").await {
                        Ok(response) => {
                            if let Some(u) = &response.usage {
                                usage.accumulate(u);
                            }
                            let draft = draft_from_response(&response.text);
                            if draft.body_chars() >= self.settings.min_body_chars {
                                let report = self.validator.validate(&draft);
                                debug!(attempt = n, passed = report.passed(), "Repaired candidate accepted");
                                last_raw = response.text;
                                running = Candidate {
                                    draft,
                                    report,
                                    model: Some(response.model),
                                };
                                history.push(running.clone());
                            } else {
                                debug!(
                                    attempt = n,
                                    chars = draft.body_chars(),
                                    "Repaired candidate too short, keeping previous"
                                );
                            }
                            RepairState::Validated
                        }
                        Err(e) => {
                            warn!(attempt = n, error = %e, "Repair call failed, keeping best candidate");
                            if e.is_timeout() {
                                skipped_for_deadline = true;
                            }
                            RepairState::Terminal
                        }
                    }
                }
                RepairState::Terminal => break,
            };
        }

        let chosen = match self.settings.acceptance {
            RepairAcceptance::Latest => running,
            RepairAcceptance::MostCompliant => history
                .into_iter()
                .fold(None::<Candidate>, |best, c| match best {
                    Some(b) if b.report.passed() >= c.report.passed() => Some(b),
                    _ => Some(c),
                })
                .unwrap_or(running),
        };

        let needs_review = !chosen.report.ok();
        info!(
            attempts,
            ok = chosen.report.ok(),
            needs_review,
            skipped_for_deadline,
            "Repair loop finished"
        );

        RepairOutcome {
            candidate: chosen.draft,
            report: chosen.report,
            attempts,
            needs_review,
            skipped_for_deadline,
            usage,
            model: chosen.model,
        }
    }
}

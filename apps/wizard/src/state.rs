//! The wizard's step-gating state machine.
//!
//! Every transition here is an in-memory merge that cannot fail. Forward
//! navigation that is not allowed yet is silently ignored; the `bool` returned
//! by navigation methods only reports whether anything changed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::client::ResumeFile;
use crate::step::WizardStep;
use crate::types::{AiQuestion, Analysis, OptimizedResume};

/// Job description and resume text must be strictly longer than this (in characters).
pub const MIN_CONTENT_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSource {
    Url,
    #[default]
    Text,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeSource {
    #[default]
    File,
    Text,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobDescriptionInput {
    pub source: JobSource,
    pub url: Option<String>,
    pub raw_text: String,
    pub parsed: Option<Value>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeInput {
    pub source: ResumeSource,
    pub file: Option<ResumeFile>,
    pub file_name: Option<String>,
    pub raw_text: String,
    pub parsed: Option<Value>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisState {
    pub is_loading: bool,
    pub data: Option<Analysis>,
    pub questions: Vec<AiQuestion>,
    /// Question id → answer text.
    pub answers: BTreeMap<String, String>,
    /// Always `< questions.len()`, or 0 when there are no questions.
    pub current_question_index: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub(crate) session_id: Option<Uuid>,
    pub(crate) current_step: WizardStep,
    pub(crate) job_description: JobDescriptionInput,
    pub(crate) resume: ResumeInput,
    pub(crate) analysis: AnalysisState,
    pub(crate) optimized_resume: Option<OptimizedResume>,
    pub(crate) is_optimizing: bool,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            session_id: None,
            current_step: WizardStep::JobDescription,
            job_description: JobDescriptionInput::default(),
            resume: ResumeInput::default(),
            analysis: AnalysisState::default(),
            optimized_resume: None,
            is_optimizing: false,
        }
    }
}

fn has_content(text: &str) -> bool {
    text.chars().count() > MIN_CONTENT_CHARS
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn job_description(&self) -> &JobDescriptionInput {
        &self.job_description
    }

    pub fn resume(&self) -> &ResumeInput {
        &self.resume
    }

    pub fn analysis(&self) -> &AnalysisState {
        &self.analysis
    }

    pub fn optimized_resume(&self) -> Option<&OptimizedResume> {
        self.optimized_resume.as_ref()
    }

    pub fn is_optimizing(&self) -> bool {
        self.is_optimizing
    }

    pub fn current_question(&self) -> Option<&AiQuestion> {
        self.analysis
            .questions
            .get(self.analysis.current_question_index)
    }

    // ── Navigation ──────────────────────────────────────────────────────────

    /// Whether the wizard may move to `step` given what has been entered so far.
    pub fn can_proceed(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::JobDescription => true,
            WizardStep::Resume => has_content(&self.job_description.raw_text),
            WizardStep::Questions => {
                has_content(&self.job_description.raw_text)
                    && (has_content(&self.resume.raw_text) || self.resume.file.is_some())
            }
            WizardStep::Review => self.analysis.data.is_some(),
            WizardStep::Export => self.optimized_resume.is_some(),
        }
    }

    pub fn go_to_step(&mut self, target: WizardStep) -> bool {
        if !self.can_proceed(target) {
            debug!("Step {} is not reachable yet", target.number());
            return false;
        }
        self.current_step = target;
        true
    }

    pub fn advance(&mut self) -> bool {
        match self.current_step.next() {
            Some(next) if self.can_proceed(next) => {
                self.current_step = next;
                true
            }
            _ => false,
        }
    }

    pub fn retreat(&mut self) -> bool {
        match self.current_step.previous() {
            Some(previous) => {
                self.current_step = previous;
                true
            }
            None => false,
        }
    }

    // ── Job description ─────────────────────────────────────────────────────

    pub fn set_job_source(&mut self, source: JobSource) {
        self.job_description.source = source;
    }

    pub fn set_job_url(&mut self, url: impl Into<String>) {
        self.job_description.url = Some(url.into());
    }

    pub fn set_job_text(&mut self, text: impl Into<String>) {
        self.job_description.raw_text = text.into();
    }

    pub fn set_job_parsed(&mut self, parsed: Value) {
        self.job_description.parsed = Some(parsed);
    }

    pub fn set_job_loading(&mut self, is_loading: bool) {
        self.job_description.is_loading = is_loading;
    }

    pub fn set_job_error(&mut self, error: Option<String>) {
        self.job_description.error = error;
    }

    // ── Resume ──────────────────────────────────────────────────────────────

    pub fn set_resume_source(&mut self, source: ResumeSource) {
        self.resume.source = source;
    }

    /// Attaches a file and records its name.
    pub fn set_resume_file(&mut self, file: ResumeFile) {
        self.resume.file_name = Some(file.name.clone());
        self.resume.file = Some(file);
    }

    pub fn set_resume_text(&mut self, text: impl Into<String>) {
        self.resume.raw_text = text.into();
    }

    pub fn set_resume_parsed(&mut self, parsed: Value) {
        self.resume.parsed = Some(parsed);
    }

    pub fn set_resume_loading(&mut self, is_loading: bool) {
        self.resume.is_loading = is_loading;
    }

    pub fn set_resume_error(&mut self, error: Option<String>) {
        self.resume.error = error;
    }

    // ── Analysis & questions ────────────────────────────────────────────────

    pub fn set_analysis_loading(&mut self, is_loading: bool) {
        self.analysis.is_loading = is_loading;
    }

    /// Records an analysis result and replaces the question list with its
    /// questions. The question pointer restarts at the first question and
    /// answers to questions that no longer exist are dropped.
    pub fn set_analysis_data(&mut self, data: Analysis) {
        let questions = data.questions.clone();
        self.analysis
            .answers
            .retain(|id, _| questions.iter().any(|q| &q.id == id));
        self.analysis.questions = questions;
        self.analysis.current_question_index = 0;
        self.analysis.data = Some(data);
    }

    pub fn set_analysis_error(&mut self, error: Option<String>) {
        self.analysis.error = error;
    }

    /// Records or overwrites the answer to a question the user has been shown.
    /// Answers for unknown or not-yet-shown questions are ignored.
    pub fn answer_question(&mut self, question_id: &str, text: impl Into<String>) -> bool {
        let shown = self
            .analysis
            .questions
            .iter()
            .take(self.analysis.current_question_index + 1)
            .any(|q| q.id == question_id);
        if !shown {
            debug!("Ignoring answer for question {question_id}: not shown");
            return false;
        }
        self.analysis
            .answers
            .insert(question_id.to_string(), text.into());
        true
    }

    pub fn next_question(&mut self) -> bool {
        self.step_question_pointer()
    }

    /// Moves past the current question without answering it. Currently the
    /// same transition as [`WizardState::next_question`].
    pub fn skip_question(&mut self) -> bool {
        self.step_question_pointer()
    }

    fn step_question_pointer(&mut self) -> bool {
        let analysis = &mut self.analysis;
        if analysis.current_question_index + 1 < analysis.questions.len() {
            analysis.current_question_index += 1;
            true
        } else {
            false
        }
    }

    // ── Optimization ────────────────────────────────────────────────────────

    pub fn set_optimized_resume(&mut self, resume: OptimizedResume) {
        self.optimized_resume = Some(resume);
    }

    pub fn set_optimizing(&mut self, is_optimizing: bool) {
        self.is_optimizing = is_optimizing;
    }

    /// Start over: every step's input is cleared, the session is forgotten, and
    /// the wizard returns to the first step.
    pub fn reset(&mut self) {
        *self = WizardState::default();
    }
}

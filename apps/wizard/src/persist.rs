//! The subset of wizard state that survives a reload. Uploaded files, loading
//! flags, parsed payloads and workflow results are never persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::{JobSource, ResumeSource, WizardState};
use crate::step::WizardStep;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedWizard {
    #[serde(default)]
    pub session_id: Option<Uuid>,
    pub current_step: WizardStep,
    #[serde(default)]
    pub job_description: PersistedJobDescription,
    #[serde(default)]
    pub resume: PersistedResume,
    #[serde(default)]
    pub analysis: PersistedAnalysis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedJobDescription {
    pub source: JobSource,
    pub url: Option<String>,
    pub raw_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedResume {
    pub source: ResumeSource,
    pub raw_text: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedAnalysis {
    pub answers: BTreeMap<String, String>,
}

impl From<&WizardState> for PersistedWizard {
    fn from(state: &WizardState) -> Self {
        Self {
            session_id: state.session_id,
            current_step: state.current_step,
            job_description: PersistedJobDescription {
                source: state.job_description.source,
                url: state.job_description.url.clone(),
                raw_text: state.job_description.raw_text.clone(),
            },
            resume: PersistedResume {
                source: state.resume.source,
                raw_text: state.resume.raw_text.clone(),
                file_name: state.resume.file_name.clone(),
            },
            analysis: PersistedAnalysis {
                answers: state.analysis.answers.clone(),
            },
        }
    }
}

impl WizardState {
    pub fn to_persisted(&self) -> PersistedWizard {
        PersistedWizard::from(self)
    }

    /// Rebuilds state from its persisted subset. The saved step is lowered to
    /// the furthest step still reachable with what was restored.
    pub fn from_persisted(saved: PersistedWizard) -> Self {
        let mut state = WizardState::new();
        state.session_id = saved.session_id;
        state.job_description.source = saved.job_description.source;
        state.job_description.url = saved.job_description.url;
        state.job_description.raw_text = saved.job_description.raw_text;
        state.resume.source = saved.resume.source;
        state.resume.raw_text = saved.resume.raw_text;
        state.resume.file_name = saved.resume.file_name;
        state.analysis.answers = saved.analysis.answers;

        state.current_step = WizardStep::ALL
            .iter()
            .copied()
            .filter(|step| *step <= saved.current_step)
            .rev()
            .find(|step| state.can_proceed(*step))
            .unwrap_or(WizardStep::JobDescription);
        state
    }
}

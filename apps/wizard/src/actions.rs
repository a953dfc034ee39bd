//! Network-calling wizard actions.
//!
//! Each action lazily creates the backend session, flags its section as
//! loading, makes one API call, and then either stores the result or records
//! the error on the section and hands it back to the caller. Either way the
//! persisted subset is written back to storage before the action returns.

use anyhow::Result;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::{ClientError, ResumeFile, UploadReceipt, WizardApi};
use crate::state::WizardState;
use crate::storage::LocalStorage;

#[derive(Debug, Clone, Copy)]
enum Section {
    JobDescription,
    Resume,
    Analysis,
}

pub struct Wizard<A> {
    state: WizardState,
    api: A,
    storage: Option<LocalStorage>,
}

impl<A: WizardApi> Wizard<A> {
    pub fn new(api: A) -> Self {
        Self {
            state: WizardState::new(),
            api,
            storage: None,
        }
    }

    /// Builds a wizard from whatever was last saved in `storage`.
    pub async fn restore(api: A, storage: LocalStorage) -> Result<Self> {
        let state = match storage.load().await? {
            Some(saved) => WizardState::from_persisted(saved),
            None => WizardState::new(),
        };
        Ok(Self {
            state,
            api,
            storage: Some(storage),
        })
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Direct access for the pure transitions (navigation, setters, answers).
    /// These are not written to storage until the next action or [`Wizard::save`].
    pub fn state_mut(&mut self) -> &mut WizardState {
        &mut self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn save(&self) -> Result<()> {
        match &self.storage {
            Some(storage) => storage.save(&self.state.to_persisted()).await,
            None => Ok(()),
        }
    }

    /// Resets every step and forgets the saved copy.
    pub async fn start_over(&mut self) -> Result<()> {
        self.state.reset();
        if let Some(storage) = &self.storage {
            storage.clear().await?;
        }
        Ok(())
    }

    /// Returns the backend session id, creating the session on first use.
    pub async fn init_session(&mut self) -> Result<Uuid, ClientError> {
        if let Some(id) = self.state.session_id {
            return Ok(id);
        }
        let id = self.api.create_session().await?;
        info!("Wizard bound to session {id}");
        self.state.session_id = Some(id);
        Ok(id)
    }

    pub async fn submit_job_url(&mut self, url: &str) -> Result<(), ClientError> {
        self.state.set_job_url(url);
        let session_id = self.begin(Section::JobDescription).await?;

        let result = self.api.scrape_job(url, session_id).await.map(|parsed| {
            self.state.job_description.raw_text = raw_text_of(&parsed);
            self.state.job_description.parsed = Some(parsed);
        });
        self.finish(Section::JobDescription, result).await
    }

    pub async fn submit_job_text(&mut self, text: impl Into<String>) -> Result<(), ClientError> {
        self.state.set_job_text(text);
        let session_id = self.begin(Section::JobDescription).await?;

        let updates = json!({
            "job_description": { "raw_text": self.state.job_description.raw_text }
        });
        let result = self.api.update_session(session_id, updates).await;
        self.finish(Section::JobDescription, result).await
    }

    pub async fn submit_resume_file(
        &mut self,
        file: ResumeFile,
    ) -> Result<UploadReceipt, ClientError> {
        self.state.set_resume_file(file.clone());
        let session_id = self.begin(Section::Resume).await?;

        let result = self.api.upload_resume(&file, session_id).await;
        self.finish(Section::Resume, result).await
    }

    pub async fn submit_resume_text(&mut self, text: impl Into<String>) -> Result<(), ClientError> {
        self.state.set_resume_text(text);
        let session_id = self.begin(Section::Resume).await?;

        let updates = json!({
            "resume_data": { "raw_text": self.state.resume.raw_text }
        });
        let result = self.api.update_session(session_id, updates).await;
        self.finish(Section::Resume, result).await
    }

    pub async fn start_analysis(&mut self) -> Result<(), ClientError> {
        let session_id = self.begin(Section::Analysis).await?;

        let result = self
            .api
            .analyze(session_id)
            .await
            .map(|analysis| self.state.set_analysis_data(analysis));
        self.finish(Section::Analysis, result).await
    }

    async fn begin(&mut self, section: Section) -> Result<Uuid, ClientError> {
        self.set_loading(section, true);
        self.set_error(section, None);
        match self.init_session().await {
            Ok(id) => Ok(id),
            Err(e) => {
                self.set_loading(section, false);
                self.set_error(section, Some(e.to_string()));
                self.persist().await;
                Err(e)
            }
        }
    }

    async fn finish<T>(
        &mut self,
        section: Section,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        self.set_loading(section, false);
        if let Err(e) = &result {
            warn!("Wizard {section:?} action failed: {e}");
            self.set_error(section, Some(e.to_string()));
        }
        self.persist().await;
        result
    }

    /// Storage failures never fail the action itself.
    async fn persist(&self) {
        if let Err(e) = self.save().await {
            warn!("Failed to save wizard state: {e:#}");
        }
    }

    fn set_loading(&mut self, section: Section, is_loading: bool) {
        match section {
            Section::JobDescription => self.state.set_job_loading(is_loading),
            Section::Resume => self.state.set_resume_loading(is_loading),
            Section::Analysis => self.state.set_analysis_loading(is_loading),
        }
    }

    fn set_error(&mut self, section: Section, error: Option<String>) {
        match section {
            Section::JobDescription => self.state.set_job_error(error),
            Section::Resume => self.state.set_resume_error(error),
            Section::Analysis => self.state.set_analysis_error(error),
        }
    }
}

/// The scraped posting's full text, falling back to its description.
fn raw_text_of(parsed: &Value) -> String {
    ["raw_text", "description"]
        .iter()
        .filter_map(|key| parsed.get(key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string()
}

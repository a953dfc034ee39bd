use serde_json::{json, Value};

use crate::workflow::{Workflow, WorkflowError, WorkflowOutput, WorkflowSource};

/// Serves a static payload in place of an unconfigured webhook.
#[derive(Debug, Clone)]
pub struct FixtureWorkflow {
    payload: Value,
}

impl FixtureWorkflow {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    pub fn scrape() -> Self {
        Self::new(json!({
            "title": "Software Engineer",
            "company": "Tech Company",
            "location": "Remote",
            "description": "We are looking for a talented software engineer to build and operate backend services.",
            "requirements": [
                "3+ years of experience",
                "Rust or Go in production",
                "Strong problem-solving skills"
            ],
            "raw_text": "Software Engineer at Tech Company (Remote). We are looking for a talented software engineer to build and operate backend services. Requirements: 3+ years of experience, Rust or Go in production, strong problem-solving skills."
        }))
    }

    pub fn analysis() -> Self {
        Self::new(json!({
            "skill_matches": [
                {
                    "skill": "Rust",
                    "strength": "strong",
                    "evidence": "4 years building Rust network services"
                },
                {
                    "skill": "PostgreSQL",
                    "strength": "strong",
                    "evidence": "Designed schemas for multiple production systems"
                },
                {
                    "skill": "Kubernetes",
                    "strength": "moderate",
                    "evidence": "Deployed services with Helm charts"
                }
            ],
            "skill_gaps": [
                {
                    "skill": "AWS",
                    "importance": "required",
                    "suggestion": "Highlight any cloud experience you have"
                },
                {
                    "skill": "Team Leadership",
                    "importance": "preferred",
                    "suggestion": "Mention any mentoring or leadership experience"
                }
            ],
            "questions": [
                {
                    "id": "q1",
                    "question": "The job requires 3+ years of backend experience. How many years have you worked on backend services?",
                    "type": "clarification"
                },
                {
                    "id": "q2",
                    "question": "Do you have any experience with AWS or other cloud platforms that we should highlight?",
                    "type": "missing_skill"
                },
                {
                    "id": "q3",
                    "question": "Can you describe a project where you led a team or mentored other developers?",
                    "type": "experience"
                }
            ],
            "ats_score": 72,
            "summary": "Your resume shows strong technical skills that match the core requirements. Consider adding more detail about cloud experience and leadership."
        }))
    }
}

#[async_trait::async_trait]
impl Workflow for FixtureWorkflow {
    async fn run(&self, _payload: &Value) -> Result<WorkflowOutput, WorkflowError> {
        Ok(WorkflowOutput {
            data: self.payload.clone(),
            source: WorkflowSource::Fixture,
        })
    }
}

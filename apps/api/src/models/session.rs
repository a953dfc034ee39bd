use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

pub const FIRST_STEP: i32 = 1;
pub const LAST_STEP: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub job_description: Option<Value>,
    pub resume_data: Option<Value>,
    pub analysis_data: Option<Value>,
    pub current_step: Option<i32>,
    pub answers: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionRow {
    pub fn new(id: Uuid, now: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id,
            user_id: None,
            job_description: None,
            resume_data: None,
            analysis_data: None,
            current_step: Some(FIRST_STEP),
            answers: None,
            created_at: now,
            updated_at: now,
            expires_at,
        }
    }

    /// Both inputs must be present before the analysis workflow can run.
    pub fn ready_for_analysis(&self) -> bool {
        is_present(&self.job_description) && is_present(&self.resume_data)
    }
}

fn is_present(value: &Option<Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

/// A partial update to a session. `Some(None)` clears a column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub job_description: Option<Option<Value>>,
    pub resume_data: Option<Option<Value>>,
    pub analysis_data: Option<Option<Value>>,
    pub current_step: Option<Option<i32>>,
    pub answers: Option<Option<Value>>,
}

impl SessionPatch {
    /// Builds a patch from the loose field map of a PATCH body, rejecting
    /// unknown columns and malformed values.
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, AppError> {
        let mut patch = SessionPatch::default();

        for (key, value) in fields {
            match key.as_str() {
                "job_description" => patch.job_description = Some(nullable(value)),
                "resume_data" => patch.resume_data = Some(nullable(value)),
                "analysis_data" => patch.analysis_data = Some(nullable(value)),
                "current_step" => patch.current_step = Some(parse_step(&value)?),
                "answers" => {
                    validate_answers(&value)?;
                    patch.answers = Some(nullable(value));
                }
                other => {
                    return Err(AppError::Validation(format!(
                        "Unknown session field: {other}"
                    )))
                }
            }
        }

        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        *self == SessionPatch::default()
    }

    pub fn apply(self, row: &mut SessionRow, now: DateTime<Utc>) {
        if let Some(v) = self.job_description {
            row.job_description = v;
        }
        if let Some(v) = self.resume_data {
            row.resume_data = v;
        }
        if let Some(v) = self.analysis_data {
            row.analysis_data = v;
        }
        if let Some(v) = self.current_step {
            row.current_step = v;
        }
        if let Some(v) = self.answers {
            row.answers = v;
        }
        row.updated_at = now;
    }
}

fn nullable(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        other => Some(other),
    }
}

fn parse_step(value: &Value) -> Result<Option<i32>, AppError> {
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_i64()
        .filter(|s| (FIRST_STEP as i64..=LAST_STEP as i64).contains(s))
        .map(|s| Some(s as i32))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "current_step must be an integer between {FIRST_STEP} and {LAST_STEP}"
            ))
        })
}

fn validate_answers(value: &Value) -> Result<(), AppError> {
    match value {
        Value::Null => Ok(()),
        Value::Object(map) if map.values().all(Value::is_string) => Ok(()),
        _ => Err(AppError::Validation(
            "answers must map question ids to text".to_string(),
        )),
    }
}

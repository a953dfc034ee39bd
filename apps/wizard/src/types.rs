//! Payload shapes produced by the analysis and optimization workflows.
//! Only the fields the wizard reads are typed; the rest ride along in `details`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiQuestion {
    pub id: String,
    pub question: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub questions: Vec<AiQuestion>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Rewritten resume produced by the optimization step. Opaque to the wizard.
pub type OptimizedResume = Value;

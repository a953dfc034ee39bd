//! Skill-gap analysis of a session's resume against its job description.

pub mod handlers;

/// Step the wizard lands on once analysis results are available.
pub const QUESTIONS_STEP: i32 = 3;

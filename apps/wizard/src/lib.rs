//! Client-side wizard for tailoring a resume to a job posting.
//!
//! [`WizardState`] is the five-step state machine: pure, infallible
//! transitions gated by [`WizardState::can_proceed`]. [`Wizard`] wraps it with
//! the network-calling actions that talk to the tailor API, and
//! [`LocalStorage`] keeps the persisted subset across reloads.

pub mod actions;
pub mod client;
pub mod persist;
pub mod state;
pub mod step;
pub mod storage;
pub mod types;

pub use actions::Wizard;
pub use client::{ClientError, HttpWizardApi, ResumeFile, UploadReceipt, WizardApi};
pub use persist::PersistedWizard;
pub use state::WizardState;
pub use step::WizardStep;
pub use storage::LocalStorage;

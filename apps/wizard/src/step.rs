use serde::{Deserialize, Serialize};

/// The five wizard screens, in order. Serialized as their step number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WizardStep {
    JobDescription = 1,
    Resume = 2,
    Questions = 3,
    Review = 4,
    Export = 5,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::JobDescription,
        WizardStep::Resume,
        WizardStep::Questions,
        WizardStep::Review,
        WizardStep::Export,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Option<WizardStep> {
        WizardStep::try_from(self.number() + 1).ok()
    }

    pub fn previous(self) -> Option<WizardStep> {
        WizardStep::try_from(self.number().checked_sub(1)?).ok()
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(WizardStep::JobDescription),
            2 => Ok(WizardStep::Resume),
            3 => Ok(WizardStep::Questions),
            4 => Ok(WizardStep::Review),
            5 => Ok(WizardStep::Export),
            other => Err(format!("wizard step must be 1-5, got {other}")),
        }
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.number()
    }
}

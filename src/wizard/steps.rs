use thiserror::Error;
use tracing::debug;

use super::state::{FieldId, WizardState};

/// The four wizard steps, numbered 1 to 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    #[default]
    Personal = 1,
    Academic = 2,
    Family = 3,
    Summary = 4,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Personal, Step::Academic, Step::Family, Step::Summary];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(n: u8) -> Option<Step> {
        match n {
            1 => Some(Step::Personal),
            2 => Some(Step::Academic),
            3 => Some(Step::Family),
            4 => Some(Step::Summary),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        self.number() as usize - 1
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Step::Personal => "Personal",
            Step::Academic => "Academic",
            Step::Family => "Family",
            Step::Summary => "Summary",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Personal => "Personal Information",
            Step::Academic => "Academic Information",
            Step::Family => "Family & Emergency Contact",
            Step::Summary => "Summary & Confirmation",
        }
    }

    /// Fields shown on this step, in display order
    pub fn fields(&self) -> &'static [FieldId] {
        match self {
            Step::Personal => &[
                FieldId::Surname,
                FieldId::GivenName,
                FieldId::Email,
                FieldId::Phone,
                FieldId::BirthDate,
                FieldId::BirthPlace,
                FieldId::Gender,
                FieldId::NationalId,
                FieldId::PreferredLanguage,
                FieldId::Region,
                FieldId::Department,
                FieldId::Photo,
                FieldId::IdentityDocument,
            ],
            Step::Academic => &[
                FieldId::Diploma,
                FieldId::BacSeries,
                FieldId::Mention,
                FieldId::DiplomaYear,
                FieldId::Program,
                FieldId::ExamCenter,
                FieldId::DepotCenter,
                FieldId::DiplomaFile,
            ],
            Step::Family => &[
                FieldId::FatherName,
                FieldId::MotherName,
                FieldId::GuardianName,
                FieldId::GuardianPhone,
                FieldId::EmergencyContactName,
                FieldId::EmergencyContactPhone,
                FieldId::EmergencyContactRelation,
            ],
            Step::Summary => &[],
        }
    }

    /// Fields that must be present before leaving this step
    pub fn required_fields(&self) -> &'static [FieldId] {
        match self {
            Step::Personal => &[
                FieldId::Surname,
                FieldId::GivenName,
                FieldId::Email,
                FieldId::Phone,
                FieldId::BirthDate,
                FieldId::Photo,
                FieldId::IdentityDocument,
            ],
            Step::Academic => &[
                FieldId::Diploma,
                FieldId::Program,
                FieldId::ExamCenter,
                FieldId::DepotCenter,
                FieldId::DiplomaFile,
            ],
            Step::Family => &[
                FieldId::GuardianName,
                FieldId::GuardianPhone,
                FieldId::EmergencyContactName,
                FieldId::EmergencyContactPhone,
            ],
            Step::Summary => &[],
        }
    }

    /// The message shown when this step's requirements are not met
    pub fn requirement_message(&self) -> &'static str {
        match self {
            Step::Personal => {
                "Personal information incomplete: surname, given name, email, phone, birth date, photo and identity document are required"
            }
            Step::Academic => {
                "Academic information incomplete: diploma, program, exam center, depot center and diploma file are required"
            }
            Step::Family => {
                "Family information incomplete: guardian name and phone, emergency contact name and phone are required"
            }
            Step::Summary => "",
        }
    }

    fn next(&self) -> Step {
        Step::from_number(self.number() + 1).unwrap_or(Step::Summary)
    }

    fn prev(&self) -> Step {
        Step::from_number(self.number().saturating_sub(1)).unwrap_or(Step::Personal)
    }
}

/// Sidebar status of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepResult {
    #[default]
    Pending,
    Completed,
    /// Last attempt to leave the step failed validation
    Failed,
}

/// Required fields of a step are missing
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", .step.requirement_message())]
pub struct ValidationError {
    pub step: Step,
    pub missing: Vec<FieldId>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Steps can only be revisited from the summary")]
    JumpNotAllowed { from: Step, to: Step },
}

/// Check the required fields of `step`.
pub fn validate(state: &WizardState, step: Step) -> Result<(), ValidationError> {
    let missing: Vec<FieldId> = step
        .required_fields()
        .iter()
        .copied()
        .filter(|field| !state.is_present(*field))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { step, missing })
    }
}

/// Check every data step, first failure wins.
pub fn validate_all(state: &WizardState) -> Result<(), ValidationError> {
    [Step::Personal, Step::Academic, Step::Family]
        .into_iter()
        .try_for_each(|step| validate(state, step))
}

/// Validate the current step and move forward, capped at the summary.
pub fn advance(state: &mut WizardState) -> Result<Step, ValidationError> {
    let from = state.current_step;
    validate(state, from)?;
    state.current_step = from.next();
    debug!("advance {:?} -> {:?}", from, state.current_step);
    Ok(state.current_step)
}

/// Move back one step, floored at the first; never validates.
pub fn retreat(state: &mut WizardState) -> Step {
    state.current_step = state.current_step.prev();
    state.current_step
}

/// Revisit an earlier step from the summary for correction.
pub fn jump_to(state: &mut WizardState, step: Step) -> Result<Step, StepError> {
    let from = state.current_step;
    if from != Step::Summary || step == Step::Summary {
        return Err(StepError::JumpNotAllowed { from, to: step });
    }
    state.current_step = step;
    debug!("jump {:?} -> {:?}", from, step);
    Ok(step)
}

use std::path::PathBuf;

use super::steps::Step;
use crate::api::{DocumentKind, OptionKind};

/// Every input of the wizard, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    // Personal
    Surname,
    GivenName,
    Email,
    Phone,
    BirthDate,
    BirthPlace,
    Gender,
    NationalId,
    PreferredLanguage,
    Region,
    Department,
    Photo,
    IdentityDocument,
    // Academic
    Diploma,
    BacSeries,
    Mention,
    DiplomaYear,
    Program,
    ExamCenter,
    DepotCenter,
    DiplomaFile,
    // Family
    FatherName,
    MotherName,
    GuardianName,
    GuardianPhone,
    EmergencyContactName,
    EmergencyContactPhone,
    EmergencyContactRelation,
}

/// How a field is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Picked from a backend option list
    Choice(OptionKind),
    /// Path of a local file uploaded after submission
    File(DocumentKind),
}

impl FieldId {
    pub fn label(&self) -> &'static str {
        match self {
            FieldId::Surname => "Surname",
            FieldId::GivenName => "Given name",
            FieldId::Email => "Email",
            FieldId::Phone => "Phone",
            FieldId::BirthDate => "Birth date",
            FieldId::BirthPlace => "Birth place",
            FieldId::Gender => "Gender",
            FieldId::NationalId => "National ID",
            FieldId::PreferredLanguage => "Language",
            FieldId::Region => "Region",
            FieldId::Department => "Department",
            FieldId::Photo => "Photo",
            FieldId::IdentityDocument => "ID / birth cert.",
            FieldId::Diploma => "Diploma",
            FieldId::BacSeries => "Bac series",
            FieldId::Mention => "Mention",
            FieldId::DiplomaYear => "Diploma year",
            FieldId::Program => "Program",
            FieldId::ExamCenter => "Exam center",
            FieldId::DepotCenter => "Depot center",
            FieldId::DiplomaFile => "Diploma file",
            FieldId::FatherName => "Father",
            FieldId::MotherName => "Mother",
            FieldId::GuardianName => "Guardian",
            FieldId::GuardianPhone => "Guardian phone",
            FieldId::EmergencyContactName => "Emergency contact",
            FieldId::EmergencyContactPhone => "Emergency phone",
            FieldId::EmergencyContactRelation => "Relation",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldId::Region => FieldKind::Choice(OptionKind::Region),
            FieldId::Department => FieldKind::Choice(OptionKind::Department),
            FieldId::Diploma => FieldKind::Choice(OptionKind::Diploma),
            FieldId::BacSeries => FieldKind::Choice(OptionKind::BacSeries),
            FieldId::Mention => FieldKind::Choice(OptionKind::Mention),
            FieldId::Program => FieldKind::Choice(OptionKind::Program),
            FieldId::ExamCenter => FieldKind::Choice(OptionKind::ExamCenter),
            FieldId::DepotCenter => FieldKind::Choice(OptionKind::DepotCenter),
            FieldId::Photo => FieldKind::File(DocumentKind::Photo),
            FieldId::IdentityDocument => FieldKind::File(DocumentKind::IdentityDocument),
            FieldId::DiplomaFile => FieldKind::File(DocumentKind::Diploma),
            _ => FieldKind::Text,
        }
    }

    pub fn is_required(&self) -> bool {
        self.step().required_fields().contains(self)
    }

    pub fn step(&self) -> Step {
        if Step::Personal.fields().contains(self) {
            Step::Personal
        } else if Step::Academic.fields().contains(self) {
            Step::Academic
        } else {
            Step::Family
        }
    }

    /// Field holding the selection for an option list
    pub fn for_option(kind: OptionKind) -> FieldId {
        match kind {
            OptionKind::Region => FieldId::Region,
            OptionKind::Department => FieldId::Department,
            OptionKind::Diploma => FieldId::Diploma,
            OptionKind::Program => FieldId::Program,
            OptionKind::BacSeries => FieldId::BacSeries,
            OptionKind::Mention => FieldId::Mention,
            OptionKind::ExamCenter => FieldId::ExamCenter,
            OptionKind::DepotCenter => FieldId::DepotCenter,
        }
    }
}

/// Free-text and file-path fields of the personal step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonalInfo {
    pub surname: String,
    pub given_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    pub birth_place: String,
    pub gender: String,
    pub national_id: String,
    pub preferred_language: String,
    pub region_id: Option<i64>,
    pub department_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcademicInfo {
    pub diploma_id: Option<i64>,
    pub bac_series_id: Option<i64>,
    pub mention_id: Option<i64>,
    pub diploma_year: String,
    pub program_id: Option<i64>,
    pub exam_center_id: Option<i64>,
    pub depot_center_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilyInfo {
    pub father_name: String,
    pub mother_name: String,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub emergency_contact_relation: String,
}

/// Local paths of the documents to upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Documents {
    pub photo: String,
    pub identity_document: String,
    pub diploma: String,
}

/// Everything the candidate entered, plus the current step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub current_step: Step,
    pub personal: PersonalInfo,
    pub academic: AcademicInfo,
    pub family: FamilyInfo,
    pub documents: Documents,
}

impl WizardState {
    pub fn new(preferred_language: &str) -> Self {
        let mut state = Self::default();
        state.personal.preferred_language = preferred_language.to_string();
        state
    }

    fn text_slot(&self, field: FieldId) -> Option<&String> {
        let slot = match field {
            FieldId::Surname => &self.personal.surname,
            FieldId::GivenName => &self.personal.given_name,
            FieldId::Email => &self.personal.email,
            FieldId::Phone => &self.personal.phone,
            FieldId::BirthDate => &self.personal.birth_date,
            FieldId::BirthPlace => &self.personal.birth_place,
            FieldId::Gender => &self.personal.gender,
            FieldId::NationalId => &self.personal.national_id,
            FieldId::PreferredLanguage => &self.personal.preferred_language,
            FieldId::Photo => &self.documents.photo,
            FieldId::IdentityDocument => &self.documents.identity_document,
            FieldId::DiplomaYear => &self.academic.diploma_year,
            FieldId::DiplomaFile => &self.documents.diploma,
            FieldId::FatherName => &self.family.father_name,
            FieldId::MotherName => &self.family.mother_name,
            FieldId::GuardianName => &self.family.guardian_name,
            FieldId::GuardianPhone => &self.family.guardian_phone,
            FieldId::EmergencyContactName => &self.family.emergency_contact_name,
            FieldId::EmergencyContactPhone => &self.family.emergency_contact_phone,
            FieldId::EmergencyContactRelation => &self.family.emergency_contact_relation,
            _ => return None,
        };
        Some(slot)
    }

    fn text_slot_mut(&mut self, field: FieldId) -> Option<&mut String> {
        let slot = match field {
            FieldId::Surname => &mut self.personal.surname,
            FieldId::GivenName => &mut self.personal.given_name,
            FieldId::Email => &mut self.personal.email,
            FieldId::Phone => &mut self.personal.phone,
            FieldId::BirthDate => &mut self.personal.birth_date,
            FieldId::BirthPlace => &mut self.personal.birth_place,
            FieldId::Gender => &mut self.personal.gender,
            FieldId::NationalId => &mut self.personal.national_id,
            FieldId::PreferredLanguage => &mut self.personal.preferred_language,
            FieldId::Photo => &mut self.documents.photo,
            FieldId::IdentityDocument => &mut self.documents.identity_document,
            FieldId::DiplomaYear => &mut self.academic.diploma_year,
            FieldId::DiplomaFile => &mut self.documents.diploma,
            FieldId::FatherName => &mut self.family.father_name,
            FieldId::MotherName => &mut self.family.mother_name,
            FieldId::GuardianName => &mut self.family.guardian_name,
            FieldId::GuardianPhone => &mut self.family.guardian_phone,
            FieldId::EmergencyContactName => &mut self.family.emergency_contact_name,
            FieldId::EmergencyContactPhone => &mut self.family.emergency_contact_phone,
            FieldId::EmergencyContactRelation => &mut self.family.emergency_contact_relation,
            _ => return None,
        };
        Some(slot)
    }

    fn choice_slot_mut(&mut self, field: FieldId) -> Option<&mut Option<i64>> {
        let slot = match field {
            FieldId::Region => &mut self.personal.region_id,
            FieldId::Department => &mut self.personal.department_id,
            FieldId::Diploma => &mut self.academic.diploma_id,
            FieldId::BacSeries => &mut self.academic.bac_series_id,
            FieldId::Mention => &mut self.academic.mention_id,
            FieldId::Program => &mut self.academic.program_id,
            FieldId::ExamCenter => &mut self.academic.exam_center_id,
            FieldId::DepotCenter => &mut self.academic.depot_center_id,
            _ => return None,
        };
        Some(slot)
    }

    /// Text (or file path) of a field; empty for choice fields.
    pub fn text(&self, field: FieldId) -> &str {
        self.text_slot(field).map(String::as_str).unwrap_or("")
    }

    pub fn set_text(&mut self, field: FieldId, value: &str) {
        if let Some(slot) = self.text_slot_mut(field) {
            slot.clear();
            slot.push_str(value);
        }
    }

    pub fn choice(&self, field: FieldId) -> Option<i64> {
        match field {
            FieldId::Region => self.personal.region_id,
            FieldId::Department => self.personal.department_id,
            FieldId::Diploma => self.academic.diploma_id,
            FieldId::BacSeries => self.academic.bac_series_id,
            FieldId::Mention => self.academic.mention_id,
            FieldId::Program => self.academic.program_id,
            FieldId::ExamCenter => self.academic.exam_center_id,
            FieldId::DepotCenter => self.academic.depot_center_id,
            _ => None,
        }
    }

    /// Raw setter; cascading resets live in the option loader.
    pub fn set_choice(&mut self, field: FieldId, value: Option<i64>) {
        if let Some(slot) = self.choice_slot_mut(field) {
            *slot = value;
        }
    }

    pub fn is_present(&self, field: FieldId) -> bool {
        match field.kind() {
            FieldKind::Choice(_) => self.choice(field).is_some(),
            FieldKind::Text | FieldKind::File(_) => !self.text(field).trim().is_empty(),
        }
    }

    /// Path of a document, if one was given
    pub fn document_path(&self, kind: DocumentKind) -> Option<PathBuf> {
        let raw = match kind {
            DocumentKind::Photo => &self.documents.photo,
            DocumentKind::IdentityDocument => &self.documents.identity_document,
            DocumentKind::Diploma => &self.documents.diploma,
        };
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_belongs_to_exactly_one_step() {
        for step in [Step::Personal, Step::Academic, Step::Family] {
            for field in step.fields() {
                assert_eq!(field.step(), step, "{field:?}");
            }
        }
        assert!(Step::Summary.fields().is_empty());
    }

    #[test]
    fn text_and_choice_slots_are_separate() {
        let mut state = WizardState::new("fr");
        assert_eq!(state.text(FieldId::PreferredLanguage), "fr");

        state.set_text(FieldId::Surname, "Ngono");
        state.set_text(FieldId::Region, "ignored");
        state.set_choice(FieldId::Region, Some(1));
        state.set_choice(FieldId::Surname, Some(9));

        assert_eq!(state.text(FieldId::Surname), "Ngono");
        assert_eq!(state.text(FieldId::Region), "");
        assert_eq!(state.choice(FieldId::Region), Some(1));
        assert_eq!(state.choice(FieldId::Surname), None);
    }

    #[test]
    fn presence_ignores_whitespace() {
        let mut state = WizardState::default();
        state.set_text(FieldId::Email, "   ");
        assert!(!state.is_present(FieldId::Email));
        state.set_text(FieldId::Email, "a@b.cm");
        assert!(state.is_present(FieldId::Email));
    }

    #[test]
    fn document_paths_are_trimmed() {
        let mut state = WizardState::default();
        assert_eq!(state.document_path(DocumentKind::Photo), None);
        state.set_text(FieldId::Photo, " /tmp/me.jpg ");
        assert_eq!(state.document_path(DocumentKind::Photo), Some(PathBuf::from("/tmp/me.jpg")));
    }

    #[test]
    fn required_flags_match_step_tables() {
        assert!(FieldId::Photo.is_required());
        assert!(FieldId::DepotCenter.is_required());
        assert!(FieldId::EmergencyContactPhone.is_required());
        assert!(!FieldId::Region.is_required());
        assert!(!FieldId::BacSeries.is_required());
        assert!(!FieldId::FatherName.is_required());
    }
}

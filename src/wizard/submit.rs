use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::national_id::normalize_national_id;
use super::state::{FieldId, WizardState};
use super::steps::{validate_all, Step, ValidationError};
use super::WizardMessage;
use crate::api::types::PENDING_STATUS;
use crate::api::{
    ApiError, DocumentKind, DocumentUpload, EnrollmentApi, NewEnrollment, StudentProfile,
};

/// Accepted birth date layouts, tried in order
const BIRTH_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// One network step of the submission, shown as a task line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTask {
    Profile,
    Enrollment,
    Upload(DocumentKind),
}

impl SubmitTask {
    pub fn name(&self) -> String {
        match self {
            SubmitTask::Profile => "Saving student profile".to_string(),
            SubmitTask::Enrollment => "Creating enrollment".to_string(),
            SubmitTask::Upload(kind) => format!("Uploading {}", kind.display_name()),
        }
    }
}

/// Tasks the submission will run for `state`, in order
pub fn plan(state: &WizardState) -> Vec<SubmitTask> {
    let mut tasks = vec![SubmitTask::Profile, SubmitTask::Enrollment];
    tasks.extend(
        DocumentKind::ALL
            .into_iter()
            .filter(|kind| state.document_path(*kind).is_some())
            .map(SubmitTask::Upload),
    );
    tasks
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub student_id: i64,
    pub enrollment_id: i64,
    pub uploaded: Vec<DocumentKind>,
    /// Upload problems; the enrollment exists regardless
    pub warnings: Vec<String>,
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Incomplete(#[from] ValidationError),

    #[error("Profile could not be saved: {0}")]
    Profile(ApiError),

    #[error("Enrollment could not be created: {0}")]
    Enrollment(ApiError),
}

impl SubmitError {
    /// Message shown to the candidate
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Incomplete(e) => e.to_string(),
            SubmitError::Profile(e) | SubmitError::Enrollment(e) => match e {
                ApiError::Conflict { .. } => {
                    "You are already enrolled. Check your dossier for its status.".to_string()
                }
                ApiError::Validation { field, message } => {
                    format!("The field '{field}' was rejected: {message}")
                }
                _ => "Submission failed. Please try again later.".to_string(),
            },
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// ISO form of a birth date when it parses, the trimmed input otherwise.
pub fn normalize_birth_date(raw: &str) -> String {
    let value = raw.trim();
    BIRTH_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| value.to_string())
}

pub fn build_profile(state: &WizardState) -> StudentProfile {
    let personal = &state.personal;
    let family = &state.family;
    StudentProfile {
        surname: personal.surname.trim().to_string(),
        given_name: personal.given_name.trim().to_string(),
        email: personal.email.trim().to_string(),
        phone: personal.phone.trim().to_string(),
        birth_date: normalize_birth_date(&personal.birth_date),
        birth_place: optional(&personal.birth_place),
        gender: optional(&personal.gender),
        region_id: personal.region_id,
        department_id: personal.department_id,
        father_name: optional(&family.father_name),
        mother_name: optional(&family.mother_name),
        guardian_name: family.guardian_name.trim().to_string(),
        guardian_phone: family.guardian_phone.trim().to_string(),
    }
}

fn required_choice(state: &WizardState, field: FieldId) -> Result<i64, ValidationError> {
    state.choice(field).ok_or_else(|| ValidationError {
        step: Step::Academic,
        missing: vec![field],
    })
}

pub fn build_enrollment(state: &WizardState, student_id: i64) -> Result<NewEnrollment, ValidationError> {
    let national_id = normalize_national_id(&state.personal.national_id);
    let family = &state.family;

    Ok(NewEnrollment {
        student_id,
        program_id: required_choice(state, FieldId::Program)?,
        exam_center_id: required_choice(state, FieldId::ExamCenter)?,
        depot_center_id: required_choice(state, FieldId::DepotCenter)?,
        diploma_id: required_choice(state, FieldId::Diploma)?,
        bac_series_id: state.academic.bac_series_id,
        mention_id: state.academic.mention_id,
        diploma_year: optional(&state.academic.diploma_year),
        status: PENDING_STATUS.to_string(),
        national_id: national_id.clone(),
        metadata: json!({
            "preferred_language": optional(&state.personal.preferred_language),
            "emergency_contact_name": family.emergency_contact_name.trim(),
            "emergency_contact_phone": family.emergency_contact_phone.trim(),
            "emergency_contact_relation": optional(&family.emergency_contact_relation),
            "national_id": national_id,
        }),
    })
}

/// Create the profile, falling back to updating the existing one on conflict.
async fn upsert_profile(api: &dyn EnrollmentApi, profile: &StudentProfile) -> Result<i64, ApiError> {
    match api.create_student(profile).await {
        Ok(record) => Ok(record.id),
        Err(ApiError::Conflict { existing_id, .. }) => {
            let id = match existing_id {
                Some(id) => id,
                None => api.current_student().await?.id,
            };
            info!("Student profile exists ({}), updating it", id);
            Ok(api.update_student(id, profile).await?.id)
        }
        Err(e) => Err(e),
    }
}

/// Run the ordered submission, reporting each task over `tx`.
///
/// Profile and enrollment failures abort; upload failures only add warnings.
pub async fn submit(
    api: &dyn EnrollmentApi,
    state: &WizardState,
    tx: &mpsc::UnboundedSender<WizardMessage>,
) -> Result<SubmissionReceipt, SubmitError> {
    validate_all(state)?;
    let tasks = plan(state);

    let _ = tx.send(WizardMessage::TaskStarted(0));
    let profile = build_profile(state);
    let student_id = match upsert_profile(api, &profile).await {
        Ok(id) => id,
        Err(e) => {
            let _ = tx.send(WizardMessage::TaskFailed(0, e.to_string()));
            return Err(SubmitError::Profile(e));
        }
    };
    let _ = tx.send(WizardMessage::TaskSuccess(0, Some(format!("student #{student_id}"))));

    let _ = tx.send(WizardMessage::TaskStarted(1));
    let enrollment = build_enrollment(state, student_id)?;
    let enrollment_id = match api.create_enrollment(&enrollment).await {
        Ok(record) => record.id,
        Err(e) => {
            let _ = tx.send(WizardMessage::TaskFailed(1, e.to_string()));
            return Err(SubmitError::Enrollment(e));
        }
    };
    info!("Enrollment {} created for student {}", enrollment_id, student_id);
    let _ = tx.send(WizardMessage::TaskSuccess(1, Some(format!("enrollment #{enrollment_id}"))));

    let mut uploaded = Vec::new();
    let mut warnings = Vec::new();

    for (idx, task) in tasks.iter().enumerate().skip(2) {
        let SubmitTask::Upload(kind) = *task else {
            continue;
        };
        let Some(path) = state.document_path(kind) else {
            continue;
        };

        let _ = tx.send(WizardMessage::TaskStarted(idx));
        let result = match DocumentUpload::read(enrollment_id, kind, &path).await {
            Ok(upload) => api.upload_document(upload).await,
            Err(e) => Err(ApiError::Io(e)),
        };

        match result {
            Ok(()) => {
                uploaded.push(kind);
                let _ = tx.send(WizardMessage::TaskSuccess(idx, None));
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", kind.tag(), e);
                warnings.push(format!("Could not upload {}: {}", kind.display_name(), e));
                let _ = tx.send(WizardMessage::TaskFailed(idx, e.to_string()));
            }
        }
    }

    Ok(SubmissionReceipt {
        student_id,
        enrollment_id,
        uploaded,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{ApiCall, RecordingApi};
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Mutex;

    fn complete_state(dir: &Path) -> WizardState {
        let mut state = WizardState::new("fr");
        let photo = dir.join("photo.jpg");
        let id_doc = dir.join("acte.pdf");
        let diploma = dir.join("bac.pdf");
        for path in [&photo, &id_doc, &diploma] {
            std::fs::write(path, b"data").unwrap();
        }

        state.set_text(FieldId::Surname, " Ngono ");
        state.set_text(FieldId::GivenName, "Alice");
        state.set_text(FieldId::Email, "alice@example.cm");
        state.set_text(FieldId::Phone, "690000000");
        state.set_text(FieldId::BirthDate, "02/04/2005");
        state.set_text(FieldId::Photo, &photo.to_string_lossy());
        state.set_text(FieldId::IdentityDocument, &id_doc.to_string_lossy());
        state.set_choice(FieldId::Diploma, Some(1));
        state.set_choice(FieldId::BacSeries, Some(2));
        state.set_choice(FieldId::Program, Some(101));
        state.set_choice(FieldId::ExamCenter, Some(1));
        state.set_choice(FieldId::DepotCenter, Some(2));
        state.set_text(FieldId::DiplomaFile, &diploma.to_string_lossy());
        state.set_text(FieldId::GuardianName, "Paul Ngono");
        state.set_text(FieldId::GuardianPhone, "677000000");
        state.set_text(FieldId::EmergencyContactName, "Marie");
        state.set_text(FieldId::EmergencyContactPhone, "699000000");
        state
    }

    fn channel() -> (
        mpsc::UnboundedSender<WizardMessage>,
        mpsc::UnboundedReceiver<WizardMessage>,
    ) {
        mpsc::unbounded_channel()
    }

    #[test]
    fn birth_dates_are_normalized() {
        assert_eq!(normalize_birth_date("2005-04-02"), "2005-04-02");
        assert_eq!(normalize_birth_date("02/04/2005"), "2005-04-02");
        assert_eq!(normalize_birth_date(" 02-04-2005 "), "2005-04-02");
        assert_eq!(normalize_birth_date("April 2005"), "April 2005");
        assert_eq!(normalize_birth_date("31/02/2005"), "31/02/2005");
    }

    #[test]
    fn enrollment_carries_metadata_and_pending_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = complete_state(dir.path());
        state.set_text(FieldId::NationalId, "cnieu042");
        state.set_text(FieldId::EmergencyContactRelation, "Aunt");

        let enrollment = build_enrollment(&state, 7).unwrap();
        assert_eq!(enrollment.student_id, 7);
        assert_eq!(enrollment.status, "pending");
        assert_eq!(enrollment.national_id.as_deref(), Some("CNIEU042"));
        assert_eq!(enrollment.bac_series_id, Some(2));
        assert_eq!(enrollment.mention_id, None);
        assert_eq!(enrollment.metadata["preferred_language"], "fr");
        assert_eq!(enrollment.metadata["emergency_contact_relation"], "Aunt");
        assert_eq!(enrollment.metadata["national_id"], "CNIEU042");
    }

    #[test]
    fn malformed_national_id_is_sent_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = complete_state(dir.path());
        state.set_text(FieldId::NationalId, "CNIEU12");

        let enrollment = build_enrollment(&state, 7).unwrap();
        assert_eq!(enrollment.national_id, None);
        assert!(enrollment.metadata["national_id"].is_null());
    }

    #[test]
    fn profile_is_trimmed_with_iso_birth_date() {
        let dir = tempfile::tempdir().unwrap();
        let state = complete_state(dir.path());
        let profile = build_profile(&state);
        assert_eq!(profile.surname, "Ngono");
        assert_eq!(profile.birth_date, "2005-04-02");
        assert_eq!(profile.birth_place, None);
    }

    #[tokio::test]
    async fn fresh_candidate_calls_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let state = complete_state(dir.path());
        let api = RecordingApi::new();
        let (tx, mut rx) = channel();

        let receipt = submit(&api, &state, &tx).await.unwrap();

        assert_eq!(receipt.student_id, 7);
        assert_eq!(receipt.enrollment_id, 501);
        assert_eq!(receipt.uploaded, DocumentKind::ALL.to_vec());
        assert!(receipt.warnings.is_empty());

        let calls = api.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0], ApiCall::CreateStudent);
        match &calls[1] {
            ApiCall::CreateEnrollment(enrollment) => assert_eq!(enrollment.student_id, 7),
            other => panic!("expected enrollment, got {other:?}"),
        }
        assert_eq!(calls[2], ApiCall::UploadDocument(501, DocumentKind::Photo));
        assert_eq!(calls[3], ApiCall::UploadDocument(501, DocumentKind::IdentityDocument));
        assert_eq!(calls[4], ApiCall::UploadDocument(501, DocumentKind::Diploma));

        drop(tx);
        let mut successes = 0;
        while let Some(msg) = rx.recv().await {
            if matches!(msg, WizardMessage::TaskSuccess(..)) {
                successes += 1;
            }
        }
        assert_eq!(successes, 5);
    }

    #[tokio::test]
    async fn conflict_updates_reported_profile() {
        let dir = tempfile::tempdir().unwrap();
        let state = complete_state(dir.path());
        let api = RecordingApi {
            student_conflict: Some(Some(42)),
            ..RecordingApi::new()
        };
        let (tx, _rx) = channel();

        let receipt = submit(&api, &state, &tx).await.unwrap();

        assert_eq!(receipt.student_id, 42);
        let calls = api.calls();
        assert_eq!(&calls[..2], &[ApiCall::CreateStudent, ApiCall::UpdateStudent(42)]);
        match &calls[2] {
            ApiCall::CreateEnrollment(enrollment) => assert_eq!(enrollment.student_id, 42),
            other => panic!("expected enrollment, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn conflict_without_id_looks_up_current_student() {
        let dir = tempfile::tempdir().unwrap();
        let state = complete_state(dir.path());
        let api = RecordingApi {
            student_conflict: Some(None),
            ..RecordingApi::new()
        };
        let (tx, _rx) = channel();

        submit(&api, &state, &tx).await.unwrap();

        let calls = api.calls();
        assert_eq!(
            &calls[..3],
            &[ApiCall::CreateStudent, ApiCall::CurrentStudent, ApiCall::UpdateStudent(7)]
        );
    }

    #[tokio::test]
    async fn diploma_upload_failure_still_yields_receipt() {
        let dir = tempfile::tempdir().unwrap();
        let state = complete_state(dir.path());
        let api = RecordingApi {
            failing_uploads: HashSet::from([DocumentKind::Diploma]),
            ..RecordingApi::new()
        };
        let (tx, _rx) = channel();

        let receipt = submit(&api, &state, &tx).await.unwrap();

        assert_eq!(receipt.enrollment_id, 501);
        assert_eq!(receipt.uploaded, vec![DocumentKind::Photo, DocumentKind::IdentityDocument]);
        assert_eq!(receipt.warnings.len(), 1);
        assert!(receipt.warnings[0].contains("diploma"));
    }

    #[tokio::test]
    async fn unreadable_file_is_a_warning_not_an_upload() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = complete_state(dir.path());
        state.set_text(FieldId::Photo, &dir.path().join("gone.jpg").to_string_lossy());
        let api = RecordingApi::new();
        let (tx, _rx) = channel();

        let receipt = submit(&api, &state, &tx).await.unwrap();

        assert!(!receipt.uploaded.contains(&DocumentKind::Photo));
        assert_eq!(receipt.warnings.len(), 1);
        let uploads = api
            .calls()
            .into_iter()
            .filter(|c| matches!(c, ApiCall::UploadDocument(..)))
            .count();
        assert_eq!(uploads, 2);
    }

    #[tokio::test]
    async fn incomplete_state_makes_no_calls() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = complete_state(dir.path());
        state.set_text(FieldId::GuardianPhone, "");
        let api = RecordingApi::new();
        let (tx, _rx) = channel();

        let err = submit(&api, &state, &tx).await.unwrap_err();

        assert!(matches!(err, SubmitError::Incomplete(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn enrollment_conflict_means_already_enrolled() {
        let dir = tempfile::tempdir().unwrap();
        let state = complete_state(dir.path());
        let api = RecordingApi {
            enrollment_error: Mutex::new(Some(ApiError::Conflict {
                message: "duplicate".into(),
                existing_id: None,
            })),
            ..RecordingApi::new()
        };
        let (tx, _rx) = channel();

        let err = submit(&api, &state, &tx).await.unwrap_err();

        assert!(err.user_message().contains("already enrolled"));
        assert!(!api.calls().iter().any(|c| matches!(c, ApiCall::UploadDocument(..))));
    }

    #[test]
    fn user_messages_by_cause() {
        let field = SubmitError::Enrollment(ApiError::Validation {
            field: "program_id".into(),
            message: "is closed".into(),
        });
        assert!(field.user_message().contains("program_id"));

        let generic = SubmitError::Profile(ApiError::Status {
            status: 500,
            message: "oops".into(),
        });
        assert_eq!(generic.user_message(), "Submission failed. Please try again later.");
    }

    #[test]
    fn plan_lists_only_given_documents() {
        let mut state = WizardState::default();
        state.set_text(FieldId::Photo, "/tmp/p.jpg");
        assert_eq!(
            plan(&state),
            vec![
                SubmitTask::Profile,
                SubmitTask::Enrollment,
                SubmitTask::Upload(DocumentKind::Photo)
            ]
        );
    }
}

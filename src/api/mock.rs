//! In-memory backend that records every call, for tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::error::{ApiError, Result};
use super::types::{
    DocumentKind, DocumentUpload, IdRecord, NewEnrollment, OptionItem, OptionKind, OptionQuery,
    StudentProfile,
};
use super::EnrollmentApi;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ListOptions(OptionKind, OptionQuery),
    CreateStudent,
    UpdateStudent(i64),
    CurrentStudent,
    CreateEnrollment(NewEnrollment),
    UploadDocument(i64, DocumentKind),
}

pub struct RecordingApi {
    pub calls: Mutex<Vec<ApiCall>>,
    pub options: Mutex<HashMap<(OptionKind, OptionQuery), Vec<OptionItem>>>,
    pub failing_options: Mutex<HashSet<OptionKind>>,
    pub student_id: i64,
    pub enrollment_id: i64,
    pub student_conflict: Option<Option<i64>>,
    pub enrollment_error: Mutex<Option<ApiError>>,
    pub failing_uploads: HashSet<DocumentKind>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            options: Mutex::new(HashMap::new()),
            failing_options: Mutex::new(HashSet::new()),
            student_id: 7,
            enrollment_id: 501,
            student_conflict: None,
            enrollment_error: Mutex::new(None),
            failing_uploads: HashSet::new(),
        }
    }

    pub fn with_options(self, kind: OptionKind, query: OptionQuery, items: Vec<OptionItem>) -> Self {
        self.options.lock().unwrap().insert((kind, query), items);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl EnrollmentApi for RecordingApi {
    async fn list_options(&self, kind: OptionKind, query: OptionQuery) -> Result<Vec<OptionItem>> {
        self.record(ApiCall::ListOptions(kind, query));
        if self.failing_options.lock().unwrap().contains(&kind) {
            return Err(ApiError::Status {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self
            .options
            .lock()
            .unwrap()
            .get(&(kind, query))
            .cloned()
            .unwrap_or_default())
    }

    async fn create_student(&self, _profile: &StudentProfile) -> Result<IdRecord> {
        self.record(ApiCall::CreateStudent);
        match self.student_conflict {
            Some(existing_id) => Err(ApiError::Conflict {
                message: "student already exists".to_string(),
                existing_id,
            }),
            None => Ok(IdRecord { id: self.student_id }),
        }
    }

    async fn update_student(&self, id: i64, _profile: &StudentProfile) -> Result<IdRecord> {
        self.record(ApiCall::UpdateStudent(id));
        Ok(IdRecord { id })
    }

    async fn current_student(&self) -> Result<IdRecord> {
        self.record(ApiCall::CurrentStudent);
        Ok(IdRecord { id: self.student_id })
    }

    async fn create_enrollment(&self, enrollment: &NewEnrollment) -> Result<IdRecord> {
        self.record(ApiCall::CreateEnrollment(enrollment.clone()));
        if let Some(err) = self.enrollment_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(IdRecord { id: self.enrollment_id })
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<()> {
        self.record(ApiCall::UploadDocument(upload.enrollment_id, upload.kind));
        if self.failing_uploads.contains(&upload.kind) {
            return Err(ApiError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )));
        }
        Ok(())
    }
}

mod client;
mod demo;
pub mod envelope;
mod error;
#[cfg(test)]
pub(crate) mod mock;
pub mod session;
pub mod types;

pub use client::HttpApi;
pub use demo::{demo_options, DemoApi};
pub use error::{ApiError, Result};
pub use session::SessionToken;
pub use types::{
    DocumentKind, DocumentUpload, IdRecord, NewEnrollment, OptionItem, OptionKind, OptionQuery,
    StudentProfile,
};

use async_trait::async_trait;
use std::sync::Arc;

/// Backend operations used by the enrollment wizard
#[async_trait]
pub trait EnrollmentApi: Send + Sync {
    // Reference data
    async fn list_options(&self, kind: OptionKind, query: OptionQuery) -> Result<Vec<OptionItem>>;

    // Student profile
    async fn create_student(&self, profile: &StudentProfile) -> Result<IdRecord>;
    async fn update_student(&self, id: i64, profile: &StudentProfile) -> Result<IdRecord>;
    async fn current_student(&self) -> Result<IdRecord>;

    // Enrollment and its documents
    async fn create_enrollment(&self, enrollment: &NewEnrollment) -> Result<IdRecord>;
    async fn upload_document(&self, upload: DocumentUpload) -> Result<()>;
}

/// Create the backend for the given mode: canned data in dryrun, HTTP otherwise
pub fn create_api(
    dryrun: bool,
    base_url: &str,
    token: Option<SessionToken>,
) -> Result<Arc<dyn EnrollmentApi>> {
    if dryrun {
        Ok(Arc::new(DemoApi::new()))
    } else {
        Ok(Arc::new(HttpApi::new(base_url, token)?))
    }
}

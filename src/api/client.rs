//! reqwest implementation of [`EnrollmentApi`] against the SGEE backend.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::envelope;
use super::error::{ApiError, Result};
use super::session::SessionToken;
use super::types::{
    DocumentUpload, IdRecord, NewEnrollment, OptionItem, OptionKind, OptionQuery, StudentProfile,
};
use super::EnrollmentApi;

/// HTTP client for the SGEE REST API
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    token: Option<SessionToken>,
}

impl HttpApi {
    pub fn new(base_url: &str, token: Option<SessionToken>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sgee-enroll/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, token.bearer()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let resp = self.authorize(request).send().await?;
        read_body(resp).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send(request).await?;
        envelope::parse(&body)
    }
}

/// Return the body of a successful response, or classify the failure.
async fn read_body(resp: Response) -> Result<String> {
    let status = resp.status();
    let url = resp.url().path().to_string();
    let body = resp.text().await?;

    if status.is_success() {
        debug!("{} {} ({} bytes)", status.as_u16(), url, body.len());
        Ok(body)
    } else {
        warn!("{} {}: {}", status.as_u16(), url, body);
        Err(ApiError::from_response(status.as_u16(), &body))
    }
}

#[async_trait]
impl EnrollmentApi for HttpApi {
    async fn list_options(&self, kind: OptionKind, query: OptionQuery) -> Result<Vec<OptionItem>> {
        let request = self
            .client
            .get(self.url(kind.path()))
            .query(&query.params(kind));
        self.send_json(request).await
    }

    async fn create_student(&self, profile: &StudentProfile) -> Result<IdRecord> {
        info!("Creating student profile");
        let request = self.client.post(self.url("students")).json(profile);
        self.send_json(request).await
    }

    async fn update_student(&self, id: i64, profile: &StudentProfile) -> Result<IdRecord> {
        info!("Updating student profile {}", id);
        let request = self.client.put(self.url(&format!("students/{id}"))).json(profile);
        self.send_json(request).await
    }

    async fn current_student(&self) -> Result<IdRecord> {
        let request = self.client.get(self.url("students/me"));
        self.send_json(request).await
    }

    async fn create_enrollment(&self, enrollment: &NewEnrollment) -> Result<IdRecord> {
        info!("Creating enrollment for student {}", enrollment.student_id);
        let request = self.client.post(self.url("enrollments")).json(enrollment);
        self.send_json(request).await
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<()> {
        info!(
            "Uploading {} ({} bytes) for enrollment {}",
            upload.kind.tag(),
            upload.bytes.len(),
            upload.enrollment_id
        );

        let part = Part::bytes(upload.bytes).file_name(upload.file_name);
        let form = Form::new()
            .part("file", part)
            .text("enrollment_id", upload.enrollment_id.to_string())
            .text("document_type", upload.kind.tag());

        let request = self.client.post(self.url("documents")).multipart(form);
        self.send(request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let api = HttpApi::new("http://localhost:8000/api/", None).unwrap();
        assert_eq!(api.base_url(), "http://localhost:8000/api");
        assert_eq!(api.url("/students/me"), "http://localhost:8000/api/students/me");
        assert_eq!(api.url("regions"), "http://localhost:8000/api/regions");
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_http_error() {
        // Port 9 (discard) is closed on test machines; the connect fails fast.
        let api = HttpApi::new("http://127.0.0.1:9", None).unwrap();
        let err = api
            .list_options(OptionKind::Region, OptionQuery::All)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
    }
}

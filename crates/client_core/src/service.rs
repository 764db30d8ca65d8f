use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::InterviewId,
    error::ErrorDetail,
    protocol::{
        AuthResponse, HealthResponse, InterviewHistoryResponse, InterviewRecord, LoginRequest,
        RegisterRequest, StartInterviewRequest, StartInterviewResponse, SubmitResponseRequest,
        SubmitResponseResponse, UploadResumeResponse,
    },
};
use tracing::debug;

use crate::error::ServiceError;

/// A resume file picked by the user, ready for multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Everything the session controller needs from the interview backend.
///
/// The controller only ever talks to this trait; tests substitute a
/// recording double and the CLI plugs in [`HttpInterviewService`].
#[async_trait]
pub trait InterviewService: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ServiceError>;
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ServiceError>;
    async fn upload_resume(
        &self,
        token: &str,
        upload: ResumeUpload,
    ) -> Result<UploadResumeResponse, ServiceError>;
    async fn start_interview(
        &self,
        token: &str,
        request: &StartInterviewRequest,
    ) -> Result<StartInterviewResponse, ServiceError>;
    async fn submit_response(
        &self,
        token: &str,
        request: &SubmitResponseRequest,
    ) -> Result<SubmitResponseResponse, ServiceError>;
    /// Also doubles as the token-validation probe during rehydration: a 2xx
    /// listing means the bearer token is still good.
    async fn interview_history(
        &self,
        token: &str,
    ) -> Result<InterviewHistoryResponse, ServiceError>;
    async fn fetch_interview(
        &self,
        token: &str,
        interview_id: &InterviewId,
    ) -> Result<InterviewRecord, ServiceError>;
    async fn health(&self) -> Result<HealthResponse, ServiceError>;
}

/// reqwest-backed [`InterviewService`] speaking JSON over HTTP(S) with
/// bearer-token auth.
pub struct HttpInterviewService {
    http: Client,
    base_url: String,
}

impl HttpInterviewService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Turn a non-2xx response into `ServiceError::Api`, salvaging the
    /// `detail` field when the body carries one.
    async fn api_error(response: Response) -> ServiceError {
        let status = response.status().as_u16();
        let detail = match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorDetail>(&body)
                .map(|e| e.detail)
                .unwrap_or(None),
            Err(_) => None,
        };
        debug!(status, detail = detail.as_deref(), "service request failed");
        ServiceError::Api { status, detail }
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, ServiceError> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl InterviewService for HttpInterviewService {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ServiceError> {
        let response = self
            .http
            .post(self.url("/api/register"))
            .json(request)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ServiceError> {
        let response = self
            .http
            .post(self.url("/api/login"))
            .json(request)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn upload_resume(
        &self,
        token: &str,
        upload: ResumeUpload,
    ) -> Result<UploadResumeResponse, ServiceError> {
        let mime = mime_guess::from_path(&upload.filename)
            .first_or_octet_stream()
            .to_string();
        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str(&mime)?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .http
            .post(self.url("/api/upload-resume"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn start_interview(
        &self,
        token: &str,
        request: &StartInterviewRequest,
    ) -> Result<StartInterviewResponse, ServiceError> {
        let response = self
            .http
            .post(self.url("/api/start-interview"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn submit_response(
        &self,
        token: &str,
        request: &SubmitResponseRequest,
    ) -> Result<SubmitResponseResponse, ServiceError> {
        let response = self
            .http
            .post(self.url("/api/submit-response"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn interview_history(
        &self,
        token: &str,
    ) -> Result<InterviewHistoryResponse, ServiceError> {
        let response = self
            .http
            .get(self.url("/api/interview-history"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn fetch_interview(
        &self,
        token: &str,
        interview_id: &InterviewId,
    ) -> Result<InterviewRecord, ServiceError> {
        let response = self
            .http
            .get(self.url(&format!("/api/interview/{interview_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn health(&self) -> Result<HealthResponse, ServiceError> {
        let response = self.http.get(self.url("/api/health")).send().await?;
        Self::parse(response).await
    }
}

//! HTTP client for the assessment backend.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use assess_core::model::{Question, SubmissionRecord, TestId, TestSummary, UserId};

use crate::config::BackendConfig;
use crate::error::BackendError;

/// A source document uploaded for question generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    /// # Errors
    ///
    /// Returns `BackendError::InvalidDocument` unless the name ends in `.pdf`
    /// and the content is non-empty.
    pub fn pdf(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, BackendError> {
        let file_name = file_name.into();
        if !file_name.to_ascii_lowercase().ends_with(".pdf") {
            return Err(BackendError::InvalidDocument(format!(
                "{file_name} is not a PDF file"
            )));
        }
        if bytes.is_empty() {
            return Err(BackendError::InvalidDocument(format!("{file_name} is empty")));
        }
        Ok(Self { file_name, bytes })
    }

    /// # Errors
    ///
    /// Returns `BackendError::Io` if the file cannot be read, or
    /// `BackendError::InvalidDocument` if it is not a PDF.
    pub async fn read_pdf(path: &Path) -> Result<Self, BackendError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = tokio::fs::read(path).await?;
        Self::pdf(file_name, bytes)
    }
}

/// Acknowledgement returned by the submit endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SubmitAck {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// Remote collaborator for loading, generating and submitting assessments.
#[async_trait]
pub trait AssessmentBackend: Send + Sync {
    /// Load the questions of a previously taken test.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` on transport or non-success status.
    async fn fetch_test(&self, test_id: &TestId) -> Result<Vec<Question>, BackendError>;

    /// Upload a document and receive freshly generated questions.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` on transport or non-success status.
    async fn upload_document(&self, document: &Document) -> Result<Vec<Question>, BackendError>;

    /// # Errors
    ///
    /// Returns `BackendError` on transport or non-success status.
    async fn submit(&self, record: &SubmissionRecord) -> Result<SubmitAck, BackendError>;

    /// # Errors
    ///
    /// Returns `BackendError` on transport or non-success status.
    async fn history(&self, user_id: &UserId) -> Result<Vec<TestSummary>, BackendError>;

    /// # Errors
    ///
    /// Returns `BackendError` on transport or non-success status.
    async fn bookmarked(&self, user_id: &UserId) -> Result<Vec<TestSummary>, BackendError>;

    /// # Errors
    ///
    /// Returns `BackendError` on transport or non-success status.
    async fn set_bookmark(&self, test_id: &TestId, bookmarked: bool) -> Result<(), BackendError>;
}

#[derive(Debug, Deserialize)]
struct QuestionsResponse {
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct TestsResponse {
    #[serde(default)]
    tests: Vec<TestSummary>,
}

#[derive(Debug, Serialize)]
struct BookmarkRequest {
    bookmarked: bool,
}

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns `BackendError::Http` if the HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, url = %response.url(), "backend returned an error status");
            return Err(BackendError::HttpStatus(status));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl AssessmentBackend for HttpBackend {
    async fn fetch_test(&self, test_id: &TestId) -> Result<Vec<Question>, BackendError> {
        let url = self
            .config
            .endpoint(&format!("assessment/test/{}/", test_id.as_str()))?;
        tracing::debug!(%url, "fetching test");
        let response = self.client.get(url).send().await?;
        let body: QuestionsResponse = Self::read_json(response).await?;
        Ok(body.questions)
    }

    async fn upload_document(&self, document: &Document) -> Result<Vec<Question>, BackendError> {
        let url = self.config.endpoint("assessment/upload-pdf/")?;
        tracing::debug!(%url, file = %document.file_name, bytes = document.bytes.len(), "uploading document");
        let part = Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str("application/pdf")?;
        let form = Form::new().part("pdf_file", part);
        let response = self.client.post(url).multipart(form).send().await?;
        let body: QuestionsResponse = Self::read_json(response).await?;
        Ok(body.questions)
    }

    async fn submit(&self, record: &SubmissionRecord) -> Result<SubmitAck, BackendError> {
        let url = self.config.endpoint("assessment/submit/")?;
        tracing::debug!(%url, test_id = record.test_id(), "submitting test");
        let response = self.client.post(url).json(record).send().await?;
        Self::read_json(response).await
    }

    async fn history(&self, user_id: &UserId) -> Result<Vec<TestSummary>, BackendError> {
        let mut url = self.config.endpoint("assessment/history/")?;
        url.query_pairs_mut().append_pair("user_id", user_id.as_str());
        let response = self.client.get(url).send().await?;
        let body: TestsResponse = Self::read_json(response).await?;
        Ok(body.tests)
    }

    async fn bookmarked(&self, user_id: &UserId) -> Result<Vec<TestSummary>, BackendError> {
        let mut url = self.config.endpoint("assessment/bookmark/")?;
        url.query_pairs_mut().append_pair("user_id", user_id.as_str());
        let response = self.client.get(url).send().await?;
        let body: TestsResponse = Self::read_json(response).await?;
        Ok(body.tests)
    }

    async fn set_bookmark(&self, test_id: &TestId, bookmarked: bool) -> Result<(), BackendError> {
        let url = self
            .config
            .endpoint(&format!("assessment/bookmark/{}/", test_id.as_str()))?;
        let response = self
            .client
            .patch(url)
            .json(&BookmarkRequest { bookmarked })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::HttpStatus(status));
        }
        Ok(())
    }
}

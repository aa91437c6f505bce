//! HTTP implementation of the [`Backend`] trait

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};

use crate::common::config::Config;
use crate::common::{Error, Result};

use super::types::{RunId, RunMeta, RunRequest, RunResponse, RunStatus, UploadResponse};
use super::Backend;

/// Talks to the test execution API over HTTPS
pub struct HttpBackend {
    client: reqwest::Client,
    config: Config,
    token: Option<String>,
}

impl HttpBackend {
    /// Create a backend from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("genesis-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let token = config.token();
        if token.is_none() {
            tracing::warn!(
                path = %config.token_path.display(),
                "no access token found, requests will be unauthenticated"
            );
        }

        Ok(Self {
            client,
            config: config.clone(),
            token,
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    fn upload_url(&self, org: &str) -> String {
        self.config.upload_url(org)
    }
}

/// Turn a non-success response into an error message including the body
async fn check(response: Response) -> std::result::Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        Err(format!("server responded with {}", status))
    } else {
        Err(format!("server responded with {}: {}", status, body))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upload_files(
        &self,
        org: &str,
        file_name: &str,
        raw: Vec<u8>,
        definition: Vec<u8>,
    ) -> Result<String> {
        let url = self.upload_url(org);
        tracing::debug!(%url, bytes = raw.len(), "uploading definition");

        let form = Form::new()
            .part("files", Part::bytes(raw).file_name(file_name.to_string()))
            .part(
                "definition",
                Part::bytes(definition).file_name("definition.yaml"),
            );

        let response = self
            .authorized(self.client.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::upload(file_name, e))?;
        let response = check(response)
            .await
            .map_err(|e| Error::upload(file_name, e))?;

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::upload(file_name, format!("unexpected response: {}", e)))?;
        Ok(upload.id)
    }

    async fn run_test(
        &self,
        org: &str,
        definition_id: &str,
        meta: &RunMeta,
        dns: &[String],
    ) -> Result<Vec<RunId>> {
        let url = self.url(&format!(
            "/api/v1/testexecution/run/{}/{}",
            org, definition_id
        ));
        tracing::debug!(%url, "submitting run request");

        let response = self
            .authorized(self.client.post(&url))
            .json(&RunRequest { meta, dns })
            .send()
            .await
            .map_err(|e| Error::Submission(e.to_string()))?;
        let response = check(response).await.map_err(Error::Submission)?;

        let ids: RunResponse = response
            .json()
            .await
            .map_err(|e| Error::Submission(format!("unexpected response: {}", e)))?;
        Ok(ids.into_ids())
    }

    async fn run_status(&self, run: &RunId) -> Result<RunStatus> {
        let url = self.url(&format!("/api/v1/testexecution/status/{}", run));

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::Internal(format!("status request failed: {}", e)))?;
        let response = check(response).await.map_err(Error::Internal)?;

        response
            .json()
            .await
            .map_err(|e| Error::Internal(format!("unexpected status response: {}", e)))
    }
}

//! Blocking HTTP implementation of [`StagingClient`].

use std::fs;
use std::path::Path;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::upload::bundle_files;
use super::wire::{self, ActivityLog, Data, StartRequest, StartResponse, TransitionRequest};
use super::{RawResponse, StagingClient};
use crate::config::{Config, Credentials, TransportSettings};
use crate::error::{Result, StagingError};
use crate::models::{StagingActivity, StagingProfile, StagingRepositoryProfile};
use crate::retry::{ErrorClass, Retry, RetryContext, RetryError, RetryPolicy};

const JSON: &str = "application/json";
const OCTET_STREAM: &str = "application/octet-stream";

/// Talks to the Nexus staging REST API.
///
/// Every request except `start` goes through its own transport retry loop;
/// connection failures, timeouts, 408, 429 and 5xx answers are retried
/// before the caller sees them.
pub struct HttpStagingClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    retry: RetryPolicy,
}

impl HttpStagingClient {
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        transport: &TransportSettings,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(transport.connect_timeout())
            .timeout(transport.request_timeout())
            .user_agent(concat!("stagectl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            retry: transport.to_policy(),
        })
    }

    /// Build a client for the configured repository, resolving credentials for its host.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = config.credentials_for(&config.host()?)?;
        Self::new(&config.repository, credentials, &config.transport)
    }

    /// Override the transport retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send one request with transport-level retry.
    fn execute(
        &self,
        method: Method,
        url: &str,
        payload: Option<(&str, &[u8])>,
    ) -> Result<RawResponse> {
        let observer = |ctx: &RetryContext<'_, StagingError>| {
            warn!(
                "{} {} failed (attempt {}): {}. Retrying in {}ms",
                method,
                url,
                ctx.attempt,
                ctx.last_error,
                ctx.next_wait.as_millis()
            );
        };

        let result = Retry::new(self.retry.clone())
            .classify_error(|e: StagingError| {
                if e.is_transient() {
                    ErrorClass::Retryable(e)
                } else {
                    ErrorClass::NonRetryable(e)
                }
            })
            .observer(&observer)
            .run(|| self.send_once(&method, url, payload))
            .map_err(RetryError::into_inner);
        result
    }

    fn send_once(
        &self,
        method: &Method,
        url: &str,
        payload: Option<(&str, &[u8])>,
    ) -> Result<RawResponse> {
        debug!("{method} {url}");

        let mut request = self
            .client
            .request(method.clone(), url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(ACCEPT, JSON);
        if let Some((content_type, bytes)) = payload {
            request = request
                .header(CONTENT_TYPE, content_type)
                .body(bytes.to_vec());
        }

        let response = request.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        debug!("{method} {url} -> {status}");

        let raw = RawResponse::new(status, body);
        let err = http_error(method, url, &raw);
        if err.is_transient() {
            return Err(err);
        }
        Ok(raw)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, context: &str) -> Result<T> {
        let url = self.url(path);
        let raw = self.execute(Method::GET, &url, None)?;
        if !raw.is_success() {
            return Err(http_error(&Method::GET, &url, &raw));
        }
        wire::decode(&raw.body, context)
    }

    fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<RawResponse> {
        let url = self.url(path);
        let bytes = encode(&url, body)?;
        self.execute(Method::POST, &url, Some((JSON, &bytes)))
    }

    fn transition(
        &self,
        action: &str,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> Result<RawResponse> {
        let path = format!("staging/profiles/{}/{action}", profile.id);
        self.post_json(&path, &TransitionRequest::new(profile, repo))
    }
}

fn encode<B: Serialize>(url: &str, body: &B) -> Result<Vec<u8>> {
    serde_json::to_vec(body).map_err(|source| StagingError::Decode {
        context: format!("request body for {url}"),
        source,
    })
}

fn http_error(method: &Method, url: &str, raw: &RawResponse) -> StagingError {
    StagingError::Http {
        method: method.to_string(),
        url: url.to_string(),
        status: raw.status,
        body: raw.body.clone(),
    }
}

impl StagingClient for HttpStagingClient {
    fn list_repository_profiles(&self) -> Result<Vec<StagingRepositoryProfile>> {
        let repos: Data<Vec<StagingRepositoryProfile>> =
            self.get_json("staging/profile_repositories", "staging repositories")?;
        Ok(repos.data)
    }

    fn list_profiles(&self) -> Result<Vec<StagingProfile>> {
        let profiles: Data<Vec<StagingProfile>> =
            self.get_json("staging/profiles", "staging profiles")?;
        Ok(profiles.data)
    }

    fn start_staging(
        &self,
        profile: &StagingProfile,
        description: &str,
    ) -> Result<StagingRepositoryProfile> {
        let url = self.url(&format!("staging/profiles/{}/start", profile.id));
        let request = Data::new(StartRequest {
            description: description.to_string(),
        });
        let bytes = encode(&url, &request)?;
        // Sent once: a start the server already applied must not be repeated.
        let raw = self.send_once(&Method::POST, &url, Some((JSON, &bytes)))?;
        if !raw.is_success() {
            return Err(http_error(&Method::POST, &url, &raw));
        }

        let created: Data<StartResponse> = wire::decode(&raw.body, "start response")?;
        let description = if created.data.description.is_empty() {
            description.to_string()
        } else {
            created.data.description
        };
        Ok(StagingRepositoryProfile::new(
            profile,
            created.data.staged_repository_id,
            description,
        ))
    }

    fn finish_staging(
        &self,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> Result<RawResponse> {
        self.transition("finish", profile, repo)
    }

    fn promote_staging(
        &self,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> Result<RawResponse> {
        self.transition("promote", profile, repo)
    }

    fn drop_staging(
        &self,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> Result<RawResponse> {
        self.transition("drop", profile, repo)
    }

    fn fetch_activity_log(&self, repo: &StagingRepositoryProfile) -> Result<Vec<StagingActivity>> {
        let path = format!("staging/repository/{}/activity", repo.repository_id);
        let log: ActivityLog = self.get_json(&path, "activity log")?;
        Ok(log.into_activities())
    }

    fn upload_bundle(&self, bundle_dir: &Path, repo: &StagingRepositoryProfile) -> Result<()> {
        let files = bundle_files(bundle_dir)?;
        for file in &files {
            let bytes = fs::read(&file.path)?;
            let url = self.url(&format!(
                "staging/deployByRepositoryId/{}/{}",
                repo.repository_id, file.relative
            ));
            let raw = self.execute(Method::PUT, &url, Some((OCTET_STREAM, &bytes)))?;
            if !raw.is_success() {
                return Err(http_error(&Method::PUT, &url, &raw));
            }
            debug!("Uploaded {} ({} bytes)", file.relative, bytes.len());
        }

        info!(
            "Uploaded {} files from {} to {}",
            files.len(),
            bundle_dir.display(),
            repo.repository_id
        );
        Ok(())
    }
}

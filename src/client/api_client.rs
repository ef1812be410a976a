use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::attendance::capture::CapturedImage;
use crate::attendance::role::RoleConfig;
use crate::client::roster::models::roster_models::{AttendanceRecord, Person, SubjectId};
use crate::client::roster::services::roster_services::{get_history, get_roster};
use crate::client::verification::models::verification_models::VerificationResponse;
use crate::client::verification::services::verification_services::post_verification;
use crate::config::config::Config;
use crate::error::{Error, Result};

/// The three backend endpoints the attendance screens use.
pub trait AttendanceBackend {
    async fn fetch_roster(&self, role: &RoleConfig, token: &str) -> Result<Vec<Person>>;

    async fn fetch_history(&self, role: &RoleConfig, token: &str) -> Result<Vec<AttendanceRecord>>;

    /// `Ok` whenever the server answered, whatever the status; `Err` only
    /// when no response arrived.
    async fn upload_verification(
        &self,
        role: &RoleConfig,
        subject: SubjectId,
        image: &CapturedImage,
        token: &str,
    ) -> Result<VerificationResponse>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(ApiClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl AttendanceBackend for ApiClient {
    async fn fetch_roster(&self, role: &RoleConfig, token: &str) -> Result<Vec<Person>> {
        match get_roster(&self.http, &self.url(&role.roster_path), token).await? {
            (StatusCode::OK, Some(people)) => Ok(people),
            (status, _) => Err(Error::Status(status.as_u16())),
        }
    }

    async fn fetch_history(&self, role: &RoleConfig, token: &str) -> Result<Vec<AttendanceRecord>> {
        match get_history(&self.http, &self.url(&role.history_path), token).await? {
            (StatusCode::OK, Some(records)) => Ok(records),
            (status, _) => Err(Error::Status(status.as_u16())),
        }
    }

    async fn upload_verification(
        &self,
        role: &RoleConfig,
        subject: SubjectId,
        image: &CapturedImage,
        token: &str,
    ) -> Result<VerificationResponse> {
        let url = self.url(&role.verify_path_for(subject));
        Ok(post_verification(&self.http, &url, image, token).await?)
    }
}

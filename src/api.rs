//! Assisterr incentive API client
//!
//! Three endpoints, all under https://api.assisterr.ai/incentive:
//! - GET  auth/login/get_message/     plain-text login message
//! - POST auth/login/                 signed login, returns token + user
//! - POST users/me/daily_points/      bearer-authenticated daily claim

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClaimError, Result, Step};

pub const API_BASE: &str = "https://api.assisterr.ai";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const LOGIN_MESSAGE_PATH: &str = "incentive/auth/login/get_message/";
const LOGIN_PATH: &str = "incentive/auth/login/";
const DAILY_POINTS_PATH: &str = "incentive/users/me/daily_points/";

const SITE_ORIGIN: &str = "https://build.assisterr.ai";
const SITE_REFERER: &str = "https://build.assisterr.ai/";
const BROWSER_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
);

/// Signed login assertion
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub message: String,
    pub signature: String,
    pub key: String,
}

/// Login response body. Fields are optional so a partial body can be
/// rejected with context instead of failing to parse.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserProfile {
    pub wallet_id: Option<String>,
    pub username: Option<String>,
    pub points: Option<f64>,
}

/// Daily claim response body
#[derive(Debug, Clone, Deserialize)]
pub struct DailyPoints {
    pub points: Option<f64>,
    pub previous_points: Option<f64>,
}

/// Transport seam for the three remote calls
#[async_trait]
pub trait RewardsApi: Send + Sync {
    async fn login_message(&self) -> Result<String>;

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;

    async fn claim_daily(&self, access_token: &str) -> Result<DailyPoints>;
}

pub struct AssisterrClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl AssisterrClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        Self::with_base_url(API_BASE, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ORIGIN, HeaderValue::from_static(SITE_ORIGIN));
        headers.insert(REFERER, HeaderValue::from_static(SITE_REFERER));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn transport(&self, step: Step, err: reqwest::Error) -> ClaimError {
        ClaimError::from_transport(step, self.timeout, err)
    }

    /// Turn a non-2xx response into the step's rejection error
    async fn check_status(&self, step: Step, resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let error_text = resp.text().await.unwrap_or_else(|_| "Unknown error".into());
        Err(ClaimError::rejected(
            step,
            format!("status {}: {}", status, error_text.trim()),
        ))
    }
}

#[async_trait]
impl RewardsApi for AssisterrClient {
    async fn login_message(&self) -> Result<String> {
        let step = Step::Challenge;
        debug!("Requesting login message");

        let resp = self
            .client
            .get(self.url(LOGIN_MESSAGE_PATH))
            .send()
            .await
            .map_err(|e| self.transport(step, e))?;

        let resp = self.check_status(step, resp).await?;
        resp.text().await.map_err(|e| self.transport(step, e))
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let step = Step::Login;
        debug!(key = %request.key, "Submitting signed login");

        let resp = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport(step, e))?;

        let resp = self.check_status(step, resp).await?;
        resp.json().await.map_err(|e| self.transport(step, e))
    }

    async fn claim_daily(&self, access_token: &str) -> Result<DailyPoints> {
        let step = Step::Claim;
        debug!("Claiming daily points");

        let resp = self
            .client
            .post(self.url(DAILY_POINTS_PATH))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| self.transport(step, e))?;

        let resp = self.check_status(step, resp).await?;
        resp.json().await.map_err(|e| self.transport(step, e))
    }
}

//! In-memory rewards API for unit tests

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::api::{DailyPoints, LoginRequest, LoginResponse, RewardsApi, UserProfile};
use crate::error::{ClaimError, Result};

#[derive(Debug, Clone)]
pub(crate) enum Call {
    Message { at: Instant },
    Login { request: LoginRequest },
    Claim { access_token: String },
}

pub(crate) struct MockApi {
    pub message: String,
    /// Public keys (base58) whose login is answered with a rejection
    pub reject_login_for: Vec<String>,
    /// Public keys (base58) whose login panics
    pub panic_login_for: Vec<String>,
    pub claim: Option<DailyPoints>,
    pub calls: Mutex<Vec<Call>>,
}

impl MockApi {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            reject_login_for: Vec::new(),
            panic_login_for: Vec::new(),
            claim: Some(DailyPoints {
                points: Some(110.0),
                previous_points: Some(100.0),
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn logins(&self) -> Vec<LoginRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Login { request } => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn claims(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Claim { access_token } => Some(access_token),
                _ => None,
            })
            .collect()
    }

    pub fn message_times(&self) -> Vec<Instant> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Message { at } => Some(at),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RewardsApi for MockApi {
    async fn login_message(&self) -> Result<String> {
        self.record(Call::Message { at: Instant::now() });
        Ok(self.message.clone())
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        self.record(Call::Login {
            request: request.clone(),
        });
        if self.panic_login_for.contains(&request.key) {
            panic!("login handler blew up");
        }
        if self.reject_login_for.contains(&request.key) {
            return Err(ClaimError::LoginRejected("status 401 Unauthorized".into()));
        }
        Ok(LoginResponse {
            access_token: Some(format!("token-{}", request.key)),
            user: Some(UserProfile {
                wallet_id: Some(request.key.clone()),
                username: Some("u1".into()),
                points: Some(100.0),
            }),
        })
    }

    async fn claim_daily(&self, access_token: &str) -> Result<DailyPoints> {
        self.record(Call::Claim {
            access_token: access_token.to_string(),
        });
        self.claim
            .clone()
            .ok_or_else(|| ClaimError::ClaimRejected("status 400 Bad Request".into()))
    }
}

//! Error taxonomy for one account's login and claim steps

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The remote step an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Challenge,
    Login,
    Claim,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Challenge => "challenge",
            Step::Login => "login",
            Step::Claim => "daily claim",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("failed to fetch login message: {0}")]
    ChallengeFetch(String),

    #[error("login rejected: {0}")]
    LoginRejected(String),

    #[error("daily claim rejected: {0}")]
    ClaimRejected(String),

    #[error("{step} request timed out after {}s", timeout.as_secs())]
    TransportTimeout { step: Step, timeout: Duration },

    #[error("no accounts configured in {}: {reason}", path.display())]
    NoAccountsConfigured { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClaimError {
    /// Remote step the error came from, if any
    pub fn step(&self) -> Option<Step> {
        match self {
            ClaimError::ChallengeFetch(_) => Some(Step::Challenge),
            ClaimError::LoginRejected(_) => Some(Step::Login),
            ClaimError::ClaimRejected(_) => Some(Step::Claim),
            ClaimError::TransportTimeout { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Map a transport failure onto the taxonomy for the step it happened in
    pub(crate) fn from_transport(step: Step, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ClaimError::TransportTimeout { step, timeout };
        }
        ClaimError::rejected(step, err.to_string())
    }

    pub(crate) fn rejected(step: Step, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        match step {
            Step::Challenge => ClaimError::ChallengeFetch(reason),
            Step::Login => ClaimError::LoginRejected(reason),
            Step::Claim => ClaimError::ClaimRejected(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClaimError>;

//! Daily points claim

use std::sync::Arc;

use tracing::info;

use crate::api::{DailyPoints, RewardsApi};
use crate::auth::SessionCredential;
use crate::error::{ClaimError, Result};

/// Points totals returned by a successful claim
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClaimResult {
    pub points: f64,
    pub previous_points: f64,
}

impl ClaimResult {
    /// Points awarded by this claim. Zero when the server had nothing new.
    pub fn delta(&self) -> f64 {
        self.points - self.previous_points
    }
}

impl TryFrom<DailyPoints> for ClaimResult {
    type Error = ClaimError;

    fn try_from(resp: DailyPoints) -> Result<Self> {
        match (resp.points, resp.previous_points) {
            (Some(points), Some(previous_points)) => Ok(Self {
                points,
                previous_points,
            }),
            (None, None) => Err(ClaimError::ClaimRejected(
                "response has neither points nor previous_points".into(),
            )),
            (None, _) => Err(ClaimError::ClaimRejected("response has no points".into())),
            (_, None) => Err(ClaimError::ClaimRejected(
                "response has no previous_points".into(),
            )),
        }
    }
}

pub struct RewardClaimer {
    api: Arc<dyn RewardsApi>,
}

impl RewardClaimer {
    pub fn new(api: Arc<dyn RewardsApi>) -> Self {
        Self { api }
    }

    /// Claim once with `credential`. Whether a second claim in the same
    /// period is a zero-delta success or an error is up to the server.
    pub async fn claim(&self, credential: SessionCredential) -> Result<ClaimResult> {
        let resp = self.api.claim_daily(&credential.access_token).await?;
        let result = ClaimResult::try_from(resp)?;

        info!(
            wallet_id = %credential.user.wallet_id,
            delta = result.delta(),
            "Daily claim success | Rewards - {}",
            result.delta()
        );
        Ok(result)
    }
}

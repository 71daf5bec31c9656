//! Wallet challenge-response login
//!
//! 1. Fetch the login message (the challenge) from the server
//! 2. Strip quote characters and sign the remaining bytes with the wallet key
//! 3. Submit `{message, signature, key}` and receive an access token

use std::sync::Arc;

use tracing::{debug, info};

use crate::api::{LoginRequest, LoginResponse, RewardsApi};
use crate::error::{ClaimError, Result};
use crate::wallet::{self, Identity, SecretKey, Signature};

/// Where a login attempt currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    FetchingChallenge,
    SigningChallenge,
    SubmittingAssertion,
    Authenticated,
    Failed,
}

/// Server-issued login message with quotes removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge(String);

impl Challenge {
    pub fn from_server(raw: &str) -> Self {
        Self(normalize_challenge(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Remove every single and double quote. The server may return the message
/// as a JSON string literal; both the signature and the echoed message use
/// the unquoted text.
pub fn normalize_challenge(raw: &str) -> String {
    raw.chars().filter(|c| *c != '"' && *c != '\'').collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub wallet_id: String,
    pub username: Option<String>,
    pub points: Option<f64>,
}

/// Bearer token and profile from a successful login. Consumed by one claim.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCredential {
    pub access_token: String,
    pub user: SessionUser,
}

impl SessionCredential {
    pub fn display_name(&self) -> &str {
        self.user.username.as_deref().unwrap_or(&self.user.wallet_id)
    }
}

impl TryFrom<LoginResponse> for SessionCredential {
    type Error = ClaimError;

    fn try_from(resp: LoginResponse) -> Result<Self> {
        let access_token = resp
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClaimError::LoginRejected("response has no access_token".into()))?;
        let user = resp
            .user
            .ok_or_else(|| ClaimError::LoginRejected("response has no user".into()))?;
        let wallet_id = user
            .wallet_id
            .ok_or_else(|| ClaimError::LoginRejected("response user has no wallet_id".into()))?;

        Ok(Self {
            access_token,
            user: SessionUser {
                wallet_id,
                username: user.username,
                points: user.points,
            },
        })
    }
}

pub struct ChallengeAuthenticator {
    api: Arc<dyn RewardsApi>,
}

impl ChallengeAuthenticator {
    pub fn new(api: Arc<dyn RewardsApi>) -> Self {
        Self { api }
    }

    pub async fn fetch_challenge(&self) -> Result<Challenge> {
        let raw = self.api.login_message().await?;
        let challenge = Challenge::from_server(&raw);
        if challenge.as_str().trim().is_empty() {
            return Err(ClaimError::ChallengeFetch("empty login message".into()));
        }
        Ok(challenge)
    }

    pub fn sign_challenge(&self, challenge: &Challenge, secret: &SecretKey) -> Result<Signature> {
        wallet::sign_detached(challenge.as_bytes(), secret)
    }

    pub async fn submit_assertion(
        &self,
        challenge: &Challenge,
        signature: &Signature,
        identity: &Identity,
    ) -> Result<SessionCredential> {
        let request = LoginRequest {
            message: challenge.as_str().to_string(),
            signature: signature.to_base58(),
            key: identity.to_base58(),
        };
        let resp = self.api.login(&request).await?;
        SessionCredential::try_from(resp)
    }

    /// Run the full handshake for account `index` (zero-based)
    pub async fn login(&self, index: usize, secret: &SecretKey) -> Result<SessionCredential> {
        let mut phase = AuthPhase::FetchingChallenge;
        let result = self.handshake(secret, &mut phase).await;

        match &result {
            Ok(credential) => {
                debug!(account = index + 1, phase = ?AuthPhase::Authenticated, "Login complete");
                info!("Login Successfully");
                info!("Wallet {} | {}", index + 1, credential.user.wallet_id);
                info!(
                    "Username    : {}",
                    credential.user.username.as_deref().unwrap_or("-")
                );
                info!("Points      : {}", format_points(credential.user.points));
            }
            Err(e) => {
                debug!(
                    account = index + 1,
                    failed_in = ?phase,
                    phase = ?AuthPhase::Failed,
                    "Login aborted: {}",
                    e
                );
            }
        }
        result
    }

    async fn handshake(
        &self,
        secret: &SecretKey,
        phase: &mut AuthPhase,
    ) -> Result<SessionCredential> {
        // Bad key material fails before anything goes over the wire
        let identity = wallet::derive_public_identity(secret)?;

        *phase = AuthPhase::FetchingChallenge;
        let challenge = self.fetch_challenge().await?;

        *phase = AuthPhase::SigningChallenge;
        let signature = self.sign_challenge(&challenge, secret)?;

        *phase = AuthPhase::SubmittingAssertion;
        self.submit_assertion(&challenge, &signature, &identity).await
    }
}

pub(crate) fn format_points(points: Option<f64>) -> String {
    points.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserProfile;
    use crate::testing::MockApi;
    use crate::wallet::test_secret;

    #[test]
    fn test_normalize_challenge() {
        assert_eq!(normalize_challenge("\"abc123\""), "abc123");
        assert_eq!(normalize_challenge("'\"xyz\"'"), "xyz");
        assert_eq!(normalize_challenge("it's \"signed\" text"), "its signed text");
        assert_eq!(normalize_challenge("plain"), "plain");
    }

    #[tokio::test]
    async fn test_signed_message_matches_submitted_message() {
        let api = Arc::new(MockApi::new("'\"xyz\"'"));
        let auth = ChallengeAuthenticator::new(api.clone());
        let secret = test_secret(1);

        auth.login(0, &secret).await.unwrap();

        let logins = api.logins();
        assert_eq!(logins.len(), 1);
        assert_eq!(logins[0].message, "xyz");

        let expected = wallet::sign_detached(b"xyz", &secret).unwrap();
        assert_eq!(logins[0].signature, expected.to_base58());
        assert_eq!(
            logins[0].key,
            wallet::derive_public_identity(&secret).unwrap().to_base58()
        );
    }

    #[tokio::test]
    async fn test_login_returns_credential() {
        let api = Arc::new(MockApi::new("\"abc123\""));
        let auth = ChallengeAuthenticator::new(api.clone());
        let secret = test_secret(2);
        let key = wallet::derive_public_identity(&secret).unwrap().to_base58();

        let credential = auth.login(0, &secret).await.unwrap();
        assert_eq!(credential.access_token, format!("token-{}", key));
        assert_eq!(credential.user.wallet_id, key);
        assert_eq!(credential.display_name(), "u1");
    }

    #[tokio::test]
    async fn test_rejected_login() {
        let secret = test_secret(3);
        let mut api = MockApi::new("abc");
        api.reject_login_for
            .push(wallet::derive_public_identity(&secret).unwrap().to_base58());
        let auth = ChallengeAuthenticator::new(Arc::new(api));

        let err = auth.login(0, &secret).await.unwrap_err();
        assert!(matches!(err, ClaimError::LoginRejected(_)));
    }

    #[tokio::test]
    async fn test_invalid_key_never_hits_network() {
        let api = Arc::new(MockApi::new("abc"));
        let auth = ChallengeAuthenticator::new(api.clone());

        let err = auth.login(0, &SecretKey::new("short")).await.unwrap_err();
        assert!(matches!(err, ClaimError::InvalidKeyMaterial(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_challenge_is_fetch_error() {
        let auth = ChallengeAuthenticator::new(Arc::new(MockApi::new("\"\"")));
        let err = auth.fetch_challenge().await.unwrap_err();
        assert!(matches!(err, ClaimError::ChallengeFetch(_)));
    }

    #[test]
    fn test_credential_requires_token_and_user() {
        let user = UserProfile {
            wallet_id: Some("w1".into()),
            username: Some("u1".into()),
            points: Some(100.0),
        };

        let missing_token = LoginResponse {
            access_token: None,
            user: Some(user.clone()),
        };
        assert!(matches!(
            SessionCredential::try_from(missing_token),
            Err(ClaimError::LoginRejected(_))
        ));

        let missing_user = LoginResponse {
            access_token: Some("t1".into()),
            user: None,
        };
        assert!(matches!(
            SessionCredential::try_from(missing_user),
            Err(ClaimError::LoginRejected(_))
        ));

        let missing_wallet = LoginResponse {
            access_token: Some("t1".into()),
            user: Some(UserProfile {
                wallet_id: None,
                ..user.clone()
            }),
        };
        assert!(matches!(
            SessionCredential::try_from(missing_wallet),
            Err(ClaimError::LoginRejected(_))
        ));

        let ok = LoginResponse {
            access_token: Some("t1".into()),
            user: Some(user),
        };
        let credential = SessionCredential::try_from(ok).unwrap();
        assert_eq!(credential.access_token, "t1");
        assert_eq!(credential.user.points, Some(100.0));
    }
}

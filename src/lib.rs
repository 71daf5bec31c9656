//! Assisterr daily claim - wallet login and reward claiming on a schedule
//!
//! Every 12 hours each configured Solana wallet logs in to the Assisterr
//! incentive API and claims its daily points.
//!
//! # How it works
//!
//! 1. Private keys are read from `accounts.txt` (one base58 key per line)
//! 2. For each wallet, the server issues a login message
//! 3. The message (quotes stripped) is signed with the wallet's Ed25519 key
//! 4. The signed login returns an access token, used once to claim points
//! 5. Accounts run one after another, 2 seconds apart
//! 6. After the last account the scheduler waits 12 hours and repeats
//!
//! # Failure handling
//!
//! - A failed login skips that account's claim
//! - A failed claim forfeits that account's reward for the period
//! - Neither stops the rest of the batch; there is no retry until the next cycle

pub mod accounts;
pub mod api;
pub mod auth;
pub mod claim;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod wallet;

#[cfg(test)]
mod testing;

pub use accounts::{AccountsFile, KeySource};
pub use api::{AssisterrClient, RewardsApi};
pub use auth::{ChallengeAuthenticator, SessionCredential};
pub use claim::{ClaimResult, RewardClaimer};
pub use config::Config;
pub use error::{ClaimError, Step};
pub use scheduler::{AccountScheduler, CountdownDisplay, CycleSummary};
pub use wallet::{SecretKey, Wallet};

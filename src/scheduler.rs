//! Account scheduler
//!
//! Processes every account in order, one at a time, with a 2 second pause
//! between accounts. After a full pass it waits 12 hours (reporting the
//! remaining time every second) and starts over.

use std::any::Any;
use std::fmt::Display;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use futures::FutureExt;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::api::RewardsApi;
use crate::auth::ChallengeAuthenticator;
use crate::claim::{ClaimResult, RewardClaimer};
use crate::error::ClaimError;
use crate::wallet::SecretKey;

pub const PACING_DELAY: Duration = Duration::from_secs(2);
pub const CYCLE_INTERVAL: Duration = Duration::from_secs(12 * 60 * 60);
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Processing,
    Waiting,
}

#[derive(Debug, Clone)]
pub struct SchedulerState {
    pub phase: Phase,
    pub next_run_at: Option<Instant>,
    pub cycles_completed: u64,
}

/// What happened to one account in one cycle
#[derive(Debug)]
pub enum AccountOutcome {
    Claimed(ClaimResult),
    LoginFailed(ClaimError),
    ClaimFailed(ClaimError),
    Panicked(String),
}

#[derive(Debug, Default)]
pub struct CycleSummary {
    pub outcomes: Vec<AccountOutcome>,
}

impl CycleSummary {
    pub fn logged_in(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, AccountOutcome::Claimed(_) | AccountOutcome::ClaimFailed(_)))
            .count()
    }

    pub fn claimed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, AccountOutcome::Claimed(_)))
            .count()
    }

    pub fn total_delta(&self) -> f64 {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                AccountOutcome::Claimed(result) => Some(result.delta()),
                _ => None,
            })
            .sum()
    }
}

/// Receives the countdown while the scheduler waits for the next cycle
pub trait CountdownDisplay: Send + Sync {
    fn tick(&mut self, next_run: DateTime<Local>, remaining: Duration);

    /// Called exactly once when a wait ends, however it ends
    fn finish(&mut self);
}

/// Countdown written to the log
#[derive(Debug, Default)]
pub struct LogCountdown;

impl CountdownDisplay for LogCountdown {
    fn tick(&mut self, next_run: DateTime<Local>, remaining: Duration) {
        debug!(
            "Next Run : {} | Time Remaining : {}",
            format_next_run(&next_run),
            format_remaining(remaining)
        );
    }

    fn finish(&mut self) {}
}

/// Ticker for one wait. Dropping it stops the ticks and finishes the display.
struct Countdown<'a> {
    ticker: Interval,
    display: &'a mut dyn CountdownDisplay,
    deadline: Instant,
    next_run: DateTime<Local>,
}

impl<'a> Countdown<'a> {
    fn start(
        display: &'a mut dyn CountdownDisplay,
        deadline: Instant,
        next_run: DateTime<Local>,
    ) -> Self {
        let mut ticker = tokio::time::interval(COUNTDOWN_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            ticker,
            display,
            deadline,
            next_run,
        }
    }

    async fn run(&mut self) {
        let wait = tokio::time::sleep_until(self.deadline);
        tokio::pin!(wait);

        loop {
            tokio::select! {
                biased;
                _ = &mut wait => return,
                _ = self.ticker.tick() => {
                    let remaining = self.deadline.saturating_duration_since(Instant::now());
                    self.display.tick(self.next_run, remaining);
                }
            }
        }
    }
}

impl Drop for Countdown<'_> {
    fn drop(&mut self) {
        self.display.finish();
    }
}

pub struct AccountScheduler {
    authenticator: ChallengeAuthenticator,
    claimer: RewardClaimer,
    accounts: Vec<SecretKey>,
    display: Box<dyn CountdownDisplay>,
    state: SchedulerState,
}

impl AccountScheduler {
    pub fn new(api: Arc<dyn RewardsApi>, accounts: Vec<SecretKey>) -> Self {
        Self {
            authenticator: ChallengeAuthenticator::new(api.clone()),
            claimer: RewardClaimer::new(api),
            accounts,
            display: Box::new(LogCountdown),
            state: SchedulerState {
                phase: Phase::Processing,
                next_run_at: None,
                cycles_completed: 0,
            },
        }
    }

    pub fn with_display(mut self, display: Box<dyn CountdownDisplay>) -> Self {
        self.display = display;
        self
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    /// One pass over `accounts`. Failures and panics stay with their account.
    pub async fn run_cycle(&self, accounts: &[SecretKey]) -> CycleSummary {
        let mut summary = CycleSummary::default();

        for (index, secret) in accounts.iter().enumerate() {
            let outcome = AssertUnwindSafe(self.process_account(index, secret))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    let message = panic_message(payload.as_ref());
                    error!(account = index + 1, "Account {} crashed: {}", index + 1, message);
                    AccountOutcome::Panicked(message)
                });
            summary.outcomes.push(outcome);

            if index + 1 < accounts.len() {
                tokio::time::sleep(PACING_DELAY).await;
            }
        }

        summary
    }

    async fn process_account(&self, index: usize, secret: &SecretKey) -> AccountOutcome {
        let credential = match self.authenticator.login(index, secret).await {
            Ok(credential) => credential,
            Err(e) => {
                let step = e.step().map(|s| s.to_string()).unwrap_or_else(|| "key".into());
                error!(
                    account = index + 1,
                    step = %step,
                    "Login failed for account {}: {}",
                    index + 1,
                    e
                );
                return AccountOutcome::LoginFailed(e);
            }
        };

        let name = credential.display_name().to_string();
        match self.claimer.claim(credential).await {
            Ok(result) => AccountOutcome::Claimed(result),
            Err(e) => {
                error!(
                    account = index + 1,
                    step = "daily claim",
                    "Daily claim failed for {}: {}",
                    name,
                    e
                );
                AccountOutcome::ClaimFailed(e)
            }
        }
    }

    /// Run cycles until the future is dropped
    pub async fn run_forever(&mut self) {
        loop {
            self.state.phase = Phase::Processing;
            self.state.next_run_at = None;

            let cycle = AssertUnwindSafe(self.run_cycle(&self.accounts))
                .catch_unwind()
                .await;
            match cycle {
                Ok(summary) => info!(
                    "Cycle complete: {}/{} logged in, {} claimed, rewards +{}",
                    summary.logged_in(),
                    summary.outcomes.len(),
                    summary.claimed(),
                    summary.total_delta()
                ),
                Err(payload) => error!("Cycle aborted: {}", panic_message(payload.as_ref())),
            }
            self.state.cycles_completed += 1;

            let deadline = Instant::now() + CYCLE_INTERVAL;
            self.state.phase = Phase::Waiting;
            self.state.next_run_at = Some(deadline);

            let next_run =
                Local::now() + chrono::Duration::seconds(CYCLE_INTERVAL.as_secs() as i64);
            info!("Next run at {}", format_next_run(&next_run));

            let mut countdown = Countdown::start(self.display.as_mut(), deadline, next_run);
            countdown.run().await;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// `HHh MMm SSs`
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!(
        "{:02}h {:02}m {:02}s",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// `dd/mm/yyyy HH:MM:SS`
pub fn format_next_run<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%d/%m/%Y %H:%M:%S").to_string()
}

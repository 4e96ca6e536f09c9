use crate::api::{ClientError, SocialClient};
use crate::core::models::Follower;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const FOLLOWERS_PAGE_LIMIT: u8 = 100;
pub const FOLLOW_PAUSE: Duration = Duration::from_millis(500);

/// What a single polling cycle ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Profile or followers fetch failed; nothing was followed.
    FetchFailed(String),
    /// The profile carried no (or a zero) follower count.
    NoFollowersCount,
    NoGrowth { followers: u64, baseline: u64 },
    /// Growth was seen but every follower on the page is already followed.
    AlreadyFollowingAll { followers: u64 },
    FollowedBack {
        followed: Vec<String>,
        failed: Vec<String>,
        baseline: u64,
    },
}

#[derive(Debug, Default)]
struct FollowReport {
    followed: Vec<String>,
    failed: Vec<String>,
}

pub struct FollowBackBot {
    client: Arc<dyn SocialClient>,
    actor: String,
    latest_followers_count: u64,
    follow_pause: Duration,
}

impl FollowBackBot {
    pub fn new(client: Arc<dyn SocialClient>, actor: impl Into<String>) -> Self {
        Self {
            client,
            actor: actor.into(),
            latest_followers_count: 0,
            follow_pause: FOLLOW_PAUSE,
        }
    }

    #[cfg(test)]
    pub fn with_baseline(mut self, baseline: u64) -> Self {
        self.latest_followers_count = baseline;
        self
    }

    pub fn baseline(&self) -> u64 {
        self.latest_followers_count
    }

    /// Logs in as the configured actor. Failure is logged and otherwise ignored.
    pub async fn login(&self, password: &str) -> bool {
        tracing::info!(actor = %self.actor, "Log-in initializing...");

        match self.client.login(&self.actor, password).await {
            Ok(session) => {
                tracing::info!(
                    outcome = "success",
                    handle = %session.handle,
                    did = %session.did,
                    "Logged in"
                );
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Error during login");
                false
            }
        }
    }

    /// Runs one polling cycle. Never fails: errors are logged and reported
    /// through the returned outcome.
    pub async fn check_followers(&mut self) -> CycleOutcome {
        tracing::info!("Checking followers count...");

        match self.poll().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Error during fetch followers");
                CycleOutcome::FetchFailed(e.to_string())
            }
        }
    }

    async fn poll(&mut self) -> Result<CycleOutcome, ClientError> {
        let profile = self.client.get_profile(&self.actor).await?;

        let followers = match profile.followers_count {
            Some(count) if count > 0 => count,
            _ => {
                tracing::warn!("No followers output!");
                return Ok(CycleOutcome::NoFollowersCount);
            }
        };

        let baseline = self.latest_followers_count;
        if followers <= baseline {
            tracing::debug!(followers, baseline, "No new followers");
            return Ok(CycleOutcome::NoGrowth {
                followers,
                baseline,
            });
        }

        tracing::info!(followers, baseline, "New follower found!");
        tracing::info!("Fetching followers list...");

        let page = self
            .client
            .get_followers(&self.actor, FOLLOWERS_PAGE_LIMIT)
            .await?;
        let to_follow = page.to_follow();

        if to_follow.is_empty() {
            tracing::warn!("You follow everyone!");
            return Ok(CycleOutcome::AlreadyFollowingAll { followers });
        }

        let report = self.follow_back(&to_follow).await;

        // Estimated, not re-read from the server. Failed follows still count.
        self.latest_followers_count = followers + to_follow.len() as u64;

        tracing::info!(
            outcome = "success",
            followed = report.followed.len(),
            failed = report.failed.len(),
            baseline = self.latest_followers_count,
            "Follow-back cycle done"
        );

        Ok(CycleOutcome::FollowedBack {
            followed: report.followed,
            failed: report.failed,
            baseline: self.latest_followers_count,
        })
    }

    async fn follow_back(&self, to_follow: &[&Follower]) -> FollowReport {
        let mut report = FollowReport::default();

        for follower in to_follow {
            tracing::info!(handle = %follower.handle, "Following {}...", follower.handle);

            match self.client.follow(&follower.did).await {
                Ok(uri) => {
                    tracing::info!(
                        outcome = "success",
                        handle = %follower.handle,
                        %uri,
                        "You're now following {}!",
                        follower.handle
                    );
                    report.followed.push(follower.handle.clone());
                    tokio::time::sleep(self.follow_pause).await;
                }
                Err(e) => {
                    tracing::error!(
                        handle = %follower.handle,
                        error = %e,
                        "Cannot follow {}",
                        follower.handle
                    );
                    report.failed.push(follower.handle.clone());
                }
            }
        }

        report
    }

    /// Polls forever, sleeping `interval` after every cycle, until `shutdown`
    /// resolves. Shutdown is only observed between cycles.
    pub async fn run_until<F>(&mut self, interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        tracing::info!(interval_ms = interval.as_millis() as u64, "Polling loop started");

        loop {
            let outcome = self.check_followers().await;
            tracing::debug!(?outcome, baseline = self.baseline(), "Cycle finished");

            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping polling loop");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}

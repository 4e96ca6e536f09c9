use crate::core::settings::Settings;
use crate::daemon::{self, CycleOutcome};
use anyhow::Result;

/// Logs in and runs a single follow-back cycle.
pub async fn run(settings: Settings) -> Result<()> {
    let mut bot = daemon::connect(&settings).await?;
    let outcome = bot.check_followers().await;

    println!("{}", describe(&outcome));
    Ok(())
}

fn describe(outcome: &CycleOutcome) -> String {
    match outcome {
        CycleOutcome::FetchFailed(error) => format!("Fetch failed: {}", error),
        CycleOutcome::NoFollowersCount => "No follower count reported".to_string(),
        CycleOutcome::NoGrowth {
            followers,
            baseline,
        } => format!("No new followers ({} total, baseline {})", followers, baseline),
        CycleOutcome::AlreadyFollowingAll { followers } => {
            format!("Already following everyone ({} followers)", followers)
        }
        CycleOutcome::FollowedBack {
            followed,
            failed,
            baseline,
        } => {
            let mut line = format!("Followed back {} account(s)", followed.len());
            if !failed.is_empty() {
                line.push_str(&format!(", failed: {}", failed.join(", ")));
            }
            line.push_str(&format!(" (baseline now {})", baseline));
            line
        }
    }
}

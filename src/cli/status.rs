use crate::api::{BskyClient, SocialClient};
use crate::core::models::Profile;
use crate::core::settings::Settings;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
struct StatusOutput {
    handle: String,
    did: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    followers: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    following: Option<u64>,
    #[serde(with = "chrono::serde::ts_seconds")]
    fetched_at: DateTime<Utc>,
}

impl From<Profile> for StatusOutput {
    fn from(profile: Profile) -> Self {
        Self {
            handle: profile.handle,
            did: profile.did,
            followers: profile.followers_count,
            following: profile.follows_count,
            fetched_at: Utc::now(),
        }
    }
}

pub async fn run(settings: Settings, json: bool) -> Result<()> {
    let client = BskyClient::new(&settings.service)?;

    client
        .login(&settings.username, &settings.password)
        .await
        .context("Failed to log in")?;

    let profile = client
        .get_profile(&settings.username)
        .await
        .context("Failed to fetch profile")?;

    let output = StatusOutput::from(profile);

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text_output(&output);
    }

    Ok(())
}

fn print_text_output(output: &StatusOutput) {
    println!("{} ({})", output.handle, output.did);
    println!("  {:<10} {}", "Followers:", format_count(output.followers));
    println!("  {:<10} {}", "Following:", format_count(output.following));
}

fn format_count(count: Option<u64>) -> String {
    count.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

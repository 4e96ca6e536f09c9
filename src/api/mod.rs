mod bsky;
#[cfg(test)]
pub mod mock;

use crate::core::models::{FollowersPage, Profile, Session};
use async_trait::async_trait;

pub use bsky::BskyClient;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status} ({error}): {message}")]
    Api {
        status: u16,
        error: String,
        message: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no active session, log in first")]
    NotAuthenticated,
}

impl ClientError {
    pub fn is_expired_token(&self) -> bool {
        matches!(self, ClientError::Api { error, .. } if error == "ExpiredToken")
    }
}

/// The slice of the social-network API the bot relies on.
#[async_trait]
pub trait SocialClient: Send + Sync {
    /// Creates a session; later calls authenticate with it.
    async fn login(&self, identifier: &str, password: &str) -> Result<Session, ClientError>;

    async fn get_profile(&self, actor: &str) -> Result<Profile, ClientError>;

    /// Fetches a single page of the most recent followers of `actor`.
    async fn get_followers(&self, actor: &str, limit: u8) -> Result<FollowersPage, ClientError>;

    /// Follows `did`, returning the URI of the created follow record.
    async fn follow(&self, did: &str) -> Result<String, ClientError>;
}

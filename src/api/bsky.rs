use crate::api::{ClientError, SocialClient};
use crate::core::models::{FollowersPage, Profile, Session};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;

const FOLLOW_COLLECTION: &str = "app.bsky.graph.follow";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'a str,
    record: FollowRecord<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FollowRecord<'a> {
    #[serde(rename = "$type")]
    record_type: &'a str,
    subject: &'a str,
    created_at: String,
}

#[derive(Deserialize)]
struct CreateRecordResponse {
    uri: String,
}

#[derive(Deserialize)]
struct XrpcErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// XRPC client for a Bluesky PDS.
pub struct BskyClient {
    http: reqwest::Client,
    service: String,
    session: RwLock<Option<Session>>,
}

impl BskyClient {
    pub fn new(service: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("bsky-follow-back/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            service: service.trim_end_matches('/').to_string(),
            session: RwLock::new(None),
        })
    }

    fn xrpc_url(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.service, nsid)
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.read().await.as_ref() {
            Some(session) => request.bearer_auth(&session.access_jwt),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Sends an authenticated request. An expired access token triggers one
    /// session refresh followed by a single retry.
    async fn send_authorized<T, F>(&self, build: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        match self.send(self.authorized(build()).await).await {
            Err(e) if e.is_expired_token() => {
                tracing::info!("Access token expired, refreshing session");
                self.refresh_session().await?;
                self.send(self.authorized(build()).await).await
            }
            result => result,
        }
    }

    async fn refresh_session(&self) -> Result<(), ClientError> {
        let refresh_jwt = self
            .session
            .read()
            .await
            .as_ref()
            .map(|session| session.refresh_jwt.clone())
            .ok_or(ClientError::NotAuthenticated)?;

        let request = self
            .http
            .post(self.xrpc_url("com.atproto.server.refreshSession"))
            .bearer_auth(refresh_jwt);

        let session: Session = self.send(request).await?;
        tracing::debug!(handle = %session.handle, "Session refreshed");
        *self.session.write().await = Some(session);
        Ok(())
    }
}

#[async_trait]
impl SocialClient for BskyClient {
    async fn login(&self, identifier: &str, password: &str) -> Result<Session, ClientError> {
        let request = self
            .http
            .post(self.xrpc_url("com.atproto.server.createSession"))
            .json(&CreateSessionRequest {
                identifier,
                password,
            });

        let session: Session = self.send(request).await?;
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn get_profile(&self, actor: &str) -> Result<Profile, ClientError> {
        self.send_authorized(|| {
            self.http
                .get(self.xrpc_url("app.bsky.actor.getProfile"))
                .query(&[("actor", actor)])
        })
        .await
    }

    async fn get_followers(&self, actor: &str, limit: u8) -> Result<FollowersPage, ClientError> {
        self.send_authorized(|| {
            self.http
                .get(self.xrpc_url("app.bsky.graph.getFollowers"))
                .query(&[("actor", actor.to_string()), ("limit", limit.to_string())])
        })
        .await
    }

    async fn follow(&self, did: &str) -> Result<String, ClientError> {
        let repo = self
            .session
            .read()
            .await
            .as_ref()
            .map(|session| session.did.clone())
            .ok_or(ClientError::NotAuthenticated)?;

        let record = follow_request(&repo, did, Utc::now());
        let created: CreateRecordResponse = self
            .send_authorized(|| {
                self.http
                    .post(self.xrpc_url("com.atproto.repo.createRecord"))
                    .json(&record)
            })
            .await?;
        Ok(created.uri)
    }
}

fn follow_request<'a>(repo: &'a str, subject: &'a str, now: DateTime<Utc>) -> CreateRecordRequest<'a> {
    CreateRecordRequest {
        repo,
        collection: FOLLOW_COLLECTION,
        record: FollowRecord {
            record_type: FOLLOW_COLLECTION,
            subject,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    }
}

fn api_error(status: u16, body: &str) -> ClientError {
    let parsed = serde_json::from_str::<XrpcErrorBody>(body).ok();
    let (error, message) = match parsed {
        Some(XrpcErrorBody { error, message }) => (error, message),
        None => (None, None),
    };

    ClientError::Api {
        status,
        error: error.unwrap_or_else(|| "Unknown".to_string()),
        message: message.unwrap_or_else(|| body.trim().to_string()),
    }
}

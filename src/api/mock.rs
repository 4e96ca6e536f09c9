use crate::api::{ClientError, SocialClient};
use crate::core::models::{Follower, FollowersPage, Profile, Session, ViewerState};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

/// Scripted client for exercising the bot without a network.
#[derive(Default)]
pub struct MockClient {
    login_fails: bool,
    profiles: Mutex<VecDeque<Result<Profile, ClientError>>>,
    pages: Mutex<VecDeque<Result<FollowersPage, ClientError>>>,
    failing_follows: HashSet<String>,
    logins: Mutex<usize>,
    follower_fetches: Mutex<Vec<u8>>,
    follows: Mutex<Vec<(String, Instant)>>,
}

pub fn api_failure(message: &str) -> ClientError {
    ClientError::Api {
        status: 500,
        error: "InternalServerError".to_string(),
        message: message.to_string(),
    }
}

pub fn profile(followers_count: Option<u64>) -> Profile {
    Profile {
        did: "did:plc:me".to_string(),
        handle: "me.test".to_string(),
        followers_count,
        follows_count: Some(0),
    }
}

/// A follower named `<name>.test` with DID `did:plc:<name>`.
pub fn follower(name: &str, already_followed: bool) -> Follower {
    Follower {
        did: format!("did:plc:{name}"),
        handle: format!("{name}.test"),
        viewer: Some(ViewerState {
            following: already_followed
                .then(|| format!("at://did:plc:me/app.bsky.graph.follow/{name}")),
        }),
    }
}

pub fn page(followers: Vec<Follower>) -> FollowersPage {
    FollowersPage { followers }
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failed_login(mut self) -> Self {
        self.login_fails = true;
        self
    }

    pub fn with_profile(self, result: Result<Profile, ClientError>) -> Self {
        self.profiles.lock().unwrap().push_back(result);
        self
    }

    pub fn with_page(self, result: Result<FollowersPage, ClientError>) -> Self {
        self.pages.lock().unwrap().push_back(result);
        self
    }

    pub fn with_failing_follow(mut self, did: &str) -> Self {
        self.failing_follows.insert(did.to_string());
        self
    }

    pub fn login_count(&self) -> usize {
        *self.logins.lock().unwrap()
    }

    pub fn follower_fetches(&self) -> Vec<u8> {
        self.follower_fetches.lock().unwrap().clone()
    }

    pub fn followed_dids(&self) -> Vec<String> {
        self.follows
            .lock()
            .unwrap()
            .iter()
            .map(|(did, _)| did.clone())
            .collect()
    }

    pub fn follow_times(&self) -> Vec<Instant> {
        self.follows.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl SocialClient for MockClient {
    async fn login(&self, identifier: &str, _password: &str) -> Result<Session, ClientError> {
        *self.logins.lock().unwrap() += 1;
        if self.login_fails {
            return Err(ClientError::Api {
                status: 401,
                error: "AuthenticationRequired".to_string(),
                message: "Invalid identifier or password".to_string(),
            });
        }
        Ok(Session {
            did: "did:plc:me".to_string(),
            handle: identifier.to_string(),
            access_jwt: "access".to_string(),
            refresh_jwt: "refresh".to_string(),
        })
    }

    async fn get_profile(&self, _actor: &str) -> Result<Profile, ClientError> {
        self.profiles
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(api_failure("no scripted profile")))
    }

    async fn get_followers(&self, _actor: &str, limit: u8) -> Result<FollowersPage, ClientError> {
        self.follower_fetches.lock().unwrap().push(limit);
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(api_failure("no scripted followers page")))
    }

    async fn follow(&self, did: &str) -> Result<String, ClientError> {
        self.follows
            .lock()
            .unwrap()
            .push((did.to_string(), Instant::now()));
        if self.failing_follows.contains(did) {
            return Err(api_failure(&format!("cannot follow {did}")));
        }
        Ok(format!("at://did:plc:me/app.bsky.graph.follow/{did}"))
    }
}

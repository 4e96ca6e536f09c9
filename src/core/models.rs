use serde::{Deserialize, Serialize};

/// Authenticated session returned by `com.atproto.server.createSession`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub did: String,
    pub handle: String,
    pub access_jwt: String,
    pub refresh_jwt: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub followers_count: Option<u64>,
    #[serde(default)]
    pub follows_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerState {
    /// URI of our follow record for this account, present when we follow it.
    #[serde(default)]
    pub following: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follower {
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub viewer: Option<ViewerState>,
}

impl Follower {
    pub fn is_followed(&self) -> bool {
        self.viewer
            .as_ref()
            .and_then(|viewer| viewer.following.as_deref())
            .is_some_and(|uri| !uri.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FollowersPage {
    pub followers: Vec<Follower>,
}

impl FollowersPage {
    /// Followers we do not follow yet, in page order.
    pub fn to_follow(&self) -> Vec<&Follower> {
        self.followers.iter().filter(|f| !f.is_followed()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_profile_without_counts() {
        let profile: Profile =
            serde_json::from_str(r#"{"did":"did:plc:abc","handle":"alice.test"}"#).unwrap();
        assert_eq!(profile.followers_count, None);
        assert_eq!(profile.follows_count, None);
    }

    #[test]
    fn test_decode_profile_with_counts() {
        let profile: Profile = serde_json::from_str(
            r#"{"did":"did:plc:abc","handle":"alice.test","followersCount":12,"followsCount":3,"postsCount":9}"#,
        )
        .unwrap();
        assert_eq!(profile.followers_count, Some(12));
        assert_eq!(profile.follows_count, Some(3));
    }

    #[test]
    fn test_to_follow_keeps_page_order_and_skips_followed() {
        let page: FollowersPage = serde_json::from_str(
            r#"{
                "followers": [
                    {"did":"did:plc:1","handle":"one.test","viewer":{"muted":false}},
                    {"did":"did:plc:2","handle":"two.test","viewer":{"following":"at://did:plc:me/app.bsky.graph.follow/x"}},
                    {"did":"did:plc:3","handle":"three.test"},
                    {"did":"did:plc:4","handle":"four.test","viewer":{"followedBy":"at://did:plc:4/app.bsky.graph.follow/y"}}
                ],
                "cursor": "abc"
            }"#,
        )
        .unwrap();

        let handles: Vec<&str> = page.to_follow().iter().map(|f| f.handle.as_str()).collect();
        assert_eq!(handles, vec!["one.test", "three.test", "four.test"]);
    }

    #[test]
    fn test_session_debug_hides_tokens() {
        let session: Session = serde_json::from_str(
            r#"{"did":"did:plc:me","handle":"me.test","accessJwt":"aaa.bbb.ccc","refreshJwt":"ddd.eee.fff"}"#,
        )
        .unwrap();
        let rendered = format!("{:?}", session);
        assert!(rendered.contains("did:plc:me"));
        assert!(!rendered.contains("aaa.bbb.ccc"));
    }
}

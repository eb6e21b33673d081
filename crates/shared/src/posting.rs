use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Identifier the platform assigns to a published post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub struct PostId(pub String);

impl PostId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PostError {
    #[display("posting API error {status}: {message}")]
    Http { status: u16, message: String },
    #[display("posting request failed: {_0}")]
    Transport(#[error(not(source))] String),
    #[display("Failed to parse posting response: {_0}")]
    Decode(#[error(not(source))] String),
    #[display("posting client is not authenticated")]
    Unauthenticated,
}

/// A platform that accepts top-level posts and replies.
#[async_trait]
pub trait PostingClient: Send + Sync {
    /// Whether credentials are present. Checked before any network call.
    fn is_authenticated(&self) -> bool;

    async fn create_post(&self, text: &str) -> Result<PostId, PostError>;

    async fn create_reply(&self, text: &str, parent: &PostId) -> Result<PostId, PostError>;
}

#[derive(Serialize)]
struct TweetRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<ReplySettings<'a>>,
}

#[derive(Serialize)]
struct ReplySettings<'a> {
    in_reply_to_tweet_id: &'a str,
}

#[derive(Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Deserialize)]
struct TweetData {
    id: String,
}

/// X API v2 client using an OAuth 2.0 user-context bearer token.
pub struct XClient {
    client: Client,
    access_token: Option<String>,
    base_url: String,
}

impl XClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.x.com";

    pub fn new(access_token: Option<String>, base_url: impl Into<String>) -> Result<Self, PostError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| PostError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            access_token: access_token.filter(|t| !t.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn send_tweet(&self, request: &TweetRequest<'_>) -> Result<PostId, PostError> {
        let token = self.access_token.as_ref().ok_or(PostError::Unauthenticated)?;

        let response = self
            .client
            .post(format!("{}/2/tweets", self.base_url))
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| PostError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(PostError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let tweet = response
            .json::<TweetResponse>()
            .await
            .map_err(|e| PostError::Decode(e.to_string()))?;

        Ok(PostId(tweet.data.id))
    }
}

#[async_trait]
impl PostingClient for XClient {
    fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    async fn create_post(&self, text: &str) -> Result<PostId, PostError> {
        self.send_tweet(&TweetRequest { text, reply: None }).await
    }

    async fn create_reply(&self, text: &str, parent: &PostId) -> Result<PostId, PostError> {
        self.send_tweet(&TweetRequest {
            text,
            reply: Some(ReplySettings {
                in_reply_to_tweet_id: parent.as_str(),
            }),
        })
        .await
    }
}

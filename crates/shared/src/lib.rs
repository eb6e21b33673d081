// Public modules
pub mod config;
pub mod fetcher;
pub mod llm;
pub mod models;
pub mod posting;
pub mod publisher;
pub mod render;
pub mod retry;

// Re-export commonly used types
pub use config::{Config, FetchSettings};
pub use fetcher::{parse_stories, NewsFetcher};
pub use llm::{LlmClient, LlmError, XaiClient};
pub use models::{PublishResult, PublishStatus, Story, StoryError};
pub use posting::{PostError, PostId, PostingClient, XClient};
pub use publisher::{ThreadPublisher, ThreadReport, ThreadState};
pub use retry::{retry_with_backoff, RetryOutcome, RetryPolicy, Retryable};

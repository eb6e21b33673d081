use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::models::{PublishResult, Story};
use crate::posting::{PostId, PostingClient};
use crate::render;

/// Progress of one thread publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadState {
    NotStarted,
    RootPosted { anchor: PostId },
    /// Story `rank` was posted as a reply and is the current anchor.
    Posting { rank: u32, anchor: PostId },
    Closed,
    Aborted,
}

impl ThreadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ThreadState::Closed | ThreadState::Aborted)
    }

    fn anchor(&self) -> Option<&PostId> {
        match self {
            ThreadState::RootPosted { anchor } | ThreadState::Posting { anchor, .. } => Some(anchor),
            _ => None,
        }
    }
}

/// Audit trail of a publish run.
#[derive(Debug, Clone)]
pub struct ThreadReport {
    results: Vec<PublishResult>,
    state: ThreadState,
}

impl ThreadReport {
    pub fn results(&self) -> &[PublishResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<PublishResult> {
        self.results
    }

    pub fn state(&self) -> &ThreadState {
        &self.state
    }

    pub fn posted_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_posted()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.posted_count()
    }
}

pub struct ThreadPublisher<P> {
    client: P,
    run_at: DateTime<Utc>,
}

impl<P: PostingClient> ThreadPublisher<P> {
    pub fn new(client: P) -> Self {
        Self {
            client,
            run_at: Utc::now(),
        }
    }

    /// Overrides the timestamp shown in the root post's banner.
    pub fn with_run_at(mut self, run_at: DateTime<Utc>) -> Self {
        self.run_at = run_at;
        self
    }

    /// Posts `stories` as a reply chain followed by a closing question.
    ///
    /// A failed root post ends the run with a single failed result. A failed
    /// reply stops the chain there, keeping what was already posted, and the
    /// closer is skipped. Results are in attempt order.
    pub async fn publish_thread(&self, stories: &[Story]) -> ThreadReport {
        let mut results = Vec::new();

        let Some((root, rest)) = stories.split_first() else {
            info!("nothing to publish");
            return ThreadReport {
                results,
                state: ThreadState::Aborted,
            };
        };

        if !self.client.is_authenticated() {
            warn!("posting client is not authenticated, skipping publish");
            results.push(PublishResult::failed(
                PublishResult::NON_STORY_RANK,
                "posting client unavailable; publish skipped",
            ));
            return ThreadReport {
                results,
                state: ThreadState::Aborted,
            };
        }

        let root_text = render::first_post(root, self.run_at);
        let mut state = match self.client.create_post(&root_text).await {
            Ok(id) => {
                info!(rank = root.rank(), post_id = %id, "posted thread root");
                results.push(PublishResult::posted(root.rank(), id.as_str()));
                ThreadState::RootPosted { anchor: id }
            }
            Err(e) => {
                warn!(rank = root.rank(), error = %e, "root post failed, abandoning thread");
                results.push(PublishResult::failed(root.rank(), e.to_string()));
                return ThreadReport {
                    results,
                    state: ThreadState::Aborted,
                };
            }
        };

        for story in rest {
            let Some(anchor) = state.anchor().cloned() else {
                break;
            };

            let text = render::reply_post(story);
            match self.client.create_reply(&text, &anchor).await {
                Ok(id) => {
                    info!(rank = story.rank(), post_id = %id, parent = %anchor, "posted reply");
                    results.push(PublishResult::posted(story.rank(), id.as_str()));
                    state = ThreadState::Posting {
                        rank: story.rank(),
                        anchor: id,
                    };
                }
                Err(e) => {
                    warn!(rank = story.rank(), error = %e, "reply failed, stopping thread");
                    results.push(PublishResult::failed(story.rank(), e.to_string()));
                    return ThreadReport {
                        results,
                        state: ThreadState::Aborted,
                    };
                }
            }
        }

        if let Some(anchor) = state.anchor() {
            match self.client.create_reply(&render::closer_post(), anchor).await {
                Ok(id) => {
                    info!(post_id = %id, "posted closer");
                    results.push(PublishResult::posted(PublishResult::NON_STORY_RANK, id.as_str()));
                }
                Err(e) => {
                    warn!(error = %e, "closer failed");
                    results.push(PublishResult::failed(PublishResult::NON_STORY_RANK, e.to_string()));
                }
            }
        }

        ThreadReport {
            results,
            state: ThreadState::Closed,
        }
    }
}

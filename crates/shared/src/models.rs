use serde::Serialize;

/// Placeholder used when the model omits a source or link line.
pub const UNKNOWN: &str = "unknown";

/// Reasons a story cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum StoryError {
    #[display("story rank must be 1 or greater")]
    ZeroRank,
    #[display("story headline is empty")]
    EmptyHeadline,
}

/// One ranked news story parsed from the model's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    rank: u32,
    headline: String,
    summary: String,
    source: String,
    link: String,
}

impl Story {
    /// Builds a story, trimming every field.
    ///
    /// Blank `source` and `link` fall back to [`UNKNOWN`]. A zero rank or an
    /// empty headline is rejected.
    pub fn new(
        rank: u32,
        headline: impl Into<String>,
        summary: impl Into<String>,
        source: impl Into<String>,
        link: impl Into<String>,
    ) -> Result<Self, StoryError> {
        if rank == 0 {
            return Err(StoryError::ZeroRank);
        }

        let headline = headline.into().trim().to_string();
        if headline.is_empty() {
            return Err(StoryError::EmptyHeadline);
        }

        Ok(Self {
            rank,
            headline,
            summary: summary.into().trim().to_string(),
            source: or_unknown(source.into()),
            link: or_unknown(link.into()),
        })
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    /// True when the summary line was present.
    pub fn is_well_formed(&self) -> bool {
        !self.summary.is_empty()
    }
}

fn or_unknown(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum PublishStatus {
    #[display("posted")]
    Posted,
    #[display("failed")]
    Failed,
}

/// Outcome of a single post attempt in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishResult {
    pub story_rank: u32,
    pub platform_post_id: Option<String>,
    pub status: PublishStatus,
    pub error: Option<String>,
}

impl PublishResult {
    /// Rank used for entries that are not stories (closer, skipped batch).
    pub const NON_STORY_RANK: u32 = 0;

    pub fn posted(story_rank: u32, post_id: impl Into<String>) -> Self {
        Self {
            story_rank,
            platform_post_id: Some(post_id.into()),
            status: PublishStatus::Posted,
            error: None,
        }
    }

    pub fn failed(story_rank: u32, error: impl Into<String>) -> Self {
        Self {
            story_rank,
            platform_post_id: None,
            status: PublishStatus::Failed,
            error: Some(error.into()),
        }
    }

    pub fn is_posted(&self) -> bool {
        self.status == PublishStatus::Posted
    }

    pub fn is_story(&self) -> bool {
        self.story_rank != Self::NON_STORY_RANK
    }
}

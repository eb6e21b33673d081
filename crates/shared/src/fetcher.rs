use tracing::{debug, info, warn};

use crate::config::FetchSettings;
use crate::llm::LlmClient;
use crate::models::Story;
use crate::retry::{retry_with_backoff, RetryOutcome, RetryPolicy};

/// Instruction sent to the model. `{count}` is replaced with the story count.
pub const NEWS_PROMPT: &str = r#"Provide a concise list of the top {count} most important worldwide news stories right now (last hour if possible).

Focus on global impact, breaking events, politics, tech, disasters, etc.
Rank by worldwide discussion and importance.

Format each story exactly like this, with a blank line between stories:
1. Short engaging headline (under 20 words)
One-sentence summary.
Source: Main outlet (e.g., Reuters, BBC)
Link: Direct article URL

Number the stories 1 to {count}. Omit the Source or Link line only if unknown.
Output only the numbered list, no intro or closing text."#;

/// Minimum non-empty lines a chunk needs to become a story.
const MIN_CHUNK_LINES: usize = 4;

pub fn build_prompt(max_stories: usize) -> String {
    NEWS_PROMPT.replace("{count}", &max_stories.to_string())
}

pub struct NewsFetcher<C> {
    client: C,
    settings: FetchSettings,
}

impl<C: LlmClient> NewsFetcher<C> {
    pub fn new(client: C, settings: FetchSettings) -> Self {
        Self { client, settings }
    }

    /// Fetches with the configured story count and retry budget.
    pub async fn fetch(&self) -> Vec<Story> {
        self.fetch_top_stories(self.settings.max_stories, self.settings.max_retries)
            .await
    }

    /// Asks the model for the current top stories and parses its reply.
    ///
    /// Never fails: permanent upstream errors, exhausted retries and
    /// unparseable replies all yield an empty list, which callers treat as
    /// "nothing usable was produced".
    pub async fn fetch_top_stories(&self, max_stories: usize, max_retries: u32) -> Vec<Story> {
        let max_stories = max_stories.max(1);
        let prompt = build_prompt(max_stories);
        let policy = RetryPolicy::new(max_retries, self.settings.backoff_base);

        let client = &self.client;
        let prompt = prompt.as_str();
        let outcome = retry_with_backoff(policy, move |attempt| {
            debug!(attempt = attempt + 1, "requesting top stories");
            client.complete(prompt)
        })
        .await;

        let text = match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                info!(attempts, "received response from LLM");
                value
            }
            RetryOutcome::Exhausted {
                last_error,
                attempts,
            } => {
                warn!(attempts, error = %last_error, "giving up on LLM after retries");
                return Vec::new();
            }
            RetryOutcome::Aborted { error, attempts } => {
                warn!(attempts, %error, "LLM request failed permanently");
                return Vec::new();
            }
        };

        let stories = parse_stories(&text, max_stories);
        if stories.is_empty() {
            warn!("LLM response contained no usable stories");
        }
        stories
    }
}

/// Parses the model's numbered list into at most `max_stories` stories.
///
/// The text is split on blank lines. A chunk is kept only when its first
/// line starts with `<n>.` for `n` in `1..=max_stories` and it has at least
/// four non-empty lines. Ranks are reassigned contiguously in chunk order.
pub fn parse_stories(text: &str, max_stories: usize) -> Vec<Story> {
    let mut stories = Vec::new();

    for chunk in split_chunks(text) {
        if stories.len() >= max_stories {
            break;
        }

        let Some(number) = leading_number(chunk[0]) else {
            continue;
        };
        if number == 0 || number > max_stories {
            debug!(number, "skipping chunk numbered outside requested range");
            continue;
        }

        if chunk.len() < MIN_CHUNK_LINES {
            debug!(number, lines = chunk.len(), "dropping malformed chunk");
            continue;
        }

        let rank = stories.len() as u32 + 1;
        if number != rank as usize {
            warn!(number, rank, "model numbering differs from assigned rank");
        }

        let headline = strip_emphasis(strip_number_prefix(chunk[0]));
        let source = prefixed_value(&chunk, "Source:").unwrap_or_default();
        let link = prefixed_value(&chunk, "Link:").unwrap_or_default();

        match Story::new(rank, headline, chunk[1], source, link) {
            Ok(story) => stories.push(story),
            Err(e) => debug!(number, error = %e, "dropping chunk"),
        }
    }

    stories
}

/// Blank-line separated blocks, each as its trimmed non-empty lines.
fn split_chunks(text: &str) -> Vec<Vec<&str>> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(trimmed);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// The integer in a `<n>.` prefix, if the line has one.
fn leading_number(line: &str) -> Option<usize> {
    let digits_end = line
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(line.len());
    if digits_end == 0 || !line[digits_end..].starts_with('.') {
        return None;
    }
    line[..digits_end].parse().ok()
}

fn strip_number_prefix(line: &str) -> &str {
    line.trim_start_matches(|c: char| c.is_ascii_digit())
        .strip_prefix('.')
        .unwrap_or(line)
        .trim()
}

fn strip_emphasis(text: &str) -> &str {
    let mut text = text;
    for marker in ["**", "__"] {
        if let Some(inner) = text
            .strip_prefix(marker)
            .and_then(|t| t.strip_suffix(marker))
        {
            text = inner.trim();
        }
    }
    text
}

fn prefixed_value<'a>(lines: &[&'a str], prefix: &str) -> Option<&'a str> {
    lines
        .iter()
        .copied()
        .find_map(|line| line.strip_prefix(prefix))
        .map(str::trim)
}

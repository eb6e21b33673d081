use chrono::{DateTime, Utc};

use crate::models::Story;

/// Character limit for a single post.
pub const MAX_POST_CHARS: usize = 280;
const ELLIPSIS: &str = "...";

pub const BANNER_LABEL: &str = "🌍 Top World News This Hour";
pub const CLOSER_TEXT: &str = "Which story surprises you most? Reply below! 👇";

pub fn banner(run_at: DateTime<Utc>) -> String {
    format!(
        "{} ({})",
        BANNER_LABEL,
        run_at.format("%a %-d %b %Y, %H:%M UTC")
    )
}

/// Root post: banner followed by the first story.
pub fn first_post(story: &Story, run_at: DateTime<Utc>) -> String {
    let text = format!(
        "{}\n\n🔥 1. {}\n\n{}\n\n🔗 {}\nSource: {}\n\n#WorldNews #Breaking",
        banner(run_at),
        story.headline(),
        story.summary(),
        story.link(),
        story.source()
    );
    truncate_post(&text)
}

pub fn reply_post(story: &Story) -> String {
    let text = format!(
        "👇 {}. {}\n\n{}\n\n🔗 {}\nSource: {}\n\n#NewsUpdate",
        story.rank(),
        story.headline(),
        story.summary(),
        story.link(),
        story.source()
    );
    truncate_post(&text)
}

pub fn closer_post() -> String {
    CLOSER_TEXT.to_string()
}

/// Cuts text longer than [`MAX_POST_CHARS`] to exactly that many characters,
/// ending in `...`. Shorter text is returned unchanged.
pub fn truncate_post(text: &str) -> String {
    if text.chars().count() <= MAX_POST_CHARS {
        return text.to_string();
    }

    let keep = MAX_POST_CHARS - ELLIPSIS.chars().count();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn run_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 5, 0).unwrap()
    }

    fn quake() -> Story {
        Story::new(1, "Quake hits region", "Thousands affected.", "Reuters", "http://x/1").unwrap()
    }

    #[test]
    fn test_first_post_template() {
        let text = first_post(&quake(), run_at());

        assert_eq!(
            text,
            "🌍 Top World News This Hour (Sat 14 Mar 2026, 09:05 UTC)\n\n\
             🔥 1. Quake hits region\n\nThousands affected.\n\n\
             🔗 http://x/1\nSource: Reuters\n\n#WorldNews #Breaking"
        );
    }

    #[test]
    fn test_reply_post_template() {
        let story = Story::new(2, "Market rallies", "Stocks up 3%.", "AP", "http://x/2").unwrap();

        assert_eq!(
            reply_post(&story),
            "👇 2. Market rallies\n\nStocks up 3%.\n\n🔗 http://x/2\nSource: AP\n\n#NewsUpdate"
        );
    }

    #[test]
    fn test_rendering_is_repeatable() {
        let story = quake();
        assert_eq!(reply_post(&story), reply_post(&story));
        assert_eq!(first_post(&story, run_at()), first_post(&story, run_at()));
    }

    #[test]
    fn test_truncate_leaves_short_text_alone() {
        let exact = "a".repeat(MAX_POST_CHARS);
        assert_eq!(truncate_post("short"), "short");
        assert_eq!(truncate_post(&exact), exact);
    }

    #[test]
    fn test_truncate_long_text_to_limit() {
        let long = "é".repeat(400);
        let truncated = truncate_post(&long);

        assert_eq!(truncated.chars().count(), MAX_POST_CHARS);
        assert!(truncated.ends_with("..."));
        assert!(truncated.starts_with("éé"));
    }

    #[test]
    fn test_long_first_post_keeps_banner() {
        let summary = "Details ".repeat(60);
        let story = Story::new(1, "Headline", summary, "Reuters", "http://x/1").unwrap();

        let text = first_post(&story, run_at());
        assert_eq!(text.chars().count(), MAX_POST_CHARS);
        assert!(text.starts_with(&banner(run_at())));
        assert!(text.ends_with("..."));
    }
}

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use shared::{
    render, Config, FetchSettings, NewsFetcher, PublishStatus, Story, ThreadPublisher, ThreadState,
    XClient, XaiClient,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "news-thread")]
#[command(about = "Fetch the top world news from Grok and post it as an X thread")]
struct Args {
    /// Number of stories to request and post
    #[arg(short = 'n', long, default_value = "5")]
    max_stories: usize,

    /// Attempts at the LLM before giving up
    #[arg(short = 'r', long, default_value = "3")]
    max_retries: u32,

    /// Base backoff delay in seconds, doubled after each failed attempt
    #[arg(long, default_value = "1")]
    backoff_secs: u64,

    /// Print the rendered thread instead of posting it
    #[arg(long)]
    dry_run: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_stories(stories: &[Story]) {
    for story in stories {
        println!("  {}. {}", story.rank(), story.headline());
        println!("     {}", story.summary());
        println!("     Source: {} | {}", story.source(), story.link());
    }
}

fn print_dry_run(stories: &[Story]) {
    let Some((root, rest)) = stories.split_first() else {
        return;
    };

    println!("\n--- root ---\n{}", render::first_post(root, Utc::now()));
    for story in rest {
        println!("\n--- reply ---\n{}", render::reply_post(story));
    }
    println!("\n--- closer ---\n{}", render::closer_post());
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();
    let config = Config::from_env()?;

    let settings = FetchSettings::new(
        args.max_stories,
        args.max_retries,
        Duration::from_secs(args.backoff_secs),
    );

    println!("🤖 Fetching top news via Grok ({})...", config.xai_model);
    let llm = XaiClient::new(config.xai_api_key, config.xai_api_base, config.xai_model)
        .context("Failed to set up xAI client")?;
    let stories = NewsFetcher::new(llm, settings).fetch().await;

    if stories.is_empty() {
        println!("No news stories fetched. Nothing to publish.");
        return Ok(());
    }

    println!("✓ Found {} stories", stories.len());
    print_stories(&stories);

    if args.dry_run {
        print_dry_run(&stories);
        return Ok(());
    }

    println!("\n🧵 Posting thread to X...");
    let poster = XClient::new(config.x_access_token, config.x_api_base)
        .context("Failed to set up X client")?;
    let report = ThreadPublisher::new(poster).publish_thread(&stories).await;

    let has_stories = report.results().iter().any(|r| r.is_story());
    for result in report.results() {
        let label = if result.is_story() {
            format!("story {}", result.story_rank)
        } else if has_stories {
            "closer".to_string()
        } else {
            "thread".to_string()
        };
        match result.status {
            PublishStatus::Posted => println!(
                "  ✓ {} posted ({})",
                label,
                result.platform_post_id.as_deref().unwrap_or("?")
            ),
            PublishStatus::Failed => println!(
                "  ✗ {} failed: {}",
                label,
                result.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    match report.state() {
        ThreadState::Closed => println!(
            "\n✅ Thread published: {} posted, {} failed",
            report.posted_count(),
            report.failed_count()
        ),
        _ => println!(
            "\n⚠ Thread incomplete: {} posted, {} failed",
            report.posted_count(),
            report.failed_count()
        ),
    }

    Ok(())
}

//! imgcast-post - Republish today's top imgur images to Twitter

use chrono::{DateTime, FixedOffset, Local};
use clap::Parser;
use libimgcast::caption::caption_for;
use libimgcast::logging::{LogFormat, LoggingConfig};
use libimgcast::platforms::twitter::TwitterClient;
use libimgcast::source::HttpFetcher;
use libimgcast::{Config, ImgcastError, Pipeline, Result, RunOptions, RunOutcome, RunReport};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "imgcast-post")]
#[command(version)]
#[command(about = "Republish the top single-image posts from the imgur front page to Twitter")]
#[command(long_about = r#"Republish the top single-image posts from the imgur front page to Twitter.

Each run checks the account's newest tweet and stops if it is from today, so
the tool can be scheduled more than once a day without double posting.

EXAMPLES:
    # Normal run, reads ./config.toml
    imgcast-post

    # See what would be posted without touching the account
    imgcast-post --dry-run --verbose

    # Machine-readable summary
    imgcast-post --format json | jq '.report.results'

CONFIGURATION:
    --config PATH, then $IMGCAST_CONFIG, then ./config.toml

    [twitter]
    consumer_key = "..."
    consumer_secret = "..."
    access_token = "..."
    access_secret = "..."

EXIT CODES:
    0 - Success, including "already posted today"
    1 - Run failed, or every post attempt failed
    2 - Authentication failed
    3 - Invalid input
"#)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Select and download candidates but do not post
    #[arg(long)]
    dry_run: bool,

    /// Post even if the account already posted today
    #[arg(long)]
    force: bool,

    /// Number of images to post (overrides config)
    #[arg(long, value_name = "N")]
    max_posts: Option<usize>,

    /// Directory for downloaded images (overrides config)
    #[arg(long, value_name = "DIR")]
    image_dir: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format: text, json or pretty (default from IMGCAST_LOG_FORMAT)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if let Some(format) = cli.log_format {
        logging.format = format;
    }
    logging.verbose = cli.verbose;
    logging.init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    if cli.max_posts == Some(0) {
        return Err(ImgcastError::InvalidInput(
            "--max-posts must be at least 1".to_string(),
        ));
    }

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    let mut options = RunOptions::from_config(&config.run);
    if let Some(max_posts) = cli.max_posts {
        options.max_posts = max_posts;
    }
    if let Some(image_dir) = cli.image_dir {
        options.image_dir = image_dir;
    }
    options.dry_run = cli.dry_run;
    options.force = cli.force;

    let platform = TwitterClient::from_config(&config.twitter)?;
    let fetcher = HttpFetcher::new(&config.source.user_agent)?;
    info!("Posting as @{}", platform.account());

    let pipeline = Pipeline::new(
        Box::new(platform),
        Box::new(fetcher),
        config.source.clone(),
        options,
    );

    let now: DateTime<FixedOffset> = Local::now().into();
    let outcome = pipeline.run(now).await?;

    match cli.format.as_str() {
        "json" => print_json(&outcome),
        _ => print_text(&outcome, &now),
    }

    match &outcome {
        RunOutcome::Completed(report) if report.all_failed() => {
            eprintln!("Error: all {} post attempts failed", report.failed());
            Ok(1)
        }
        _ => Ok(0),
    }
}

fn print_text(outcome: &RunOutcome, now: &DateTime<FixedOffset>) {
    match outcome {
        RunOutcome::AlreadyPosted(record) => {
            println!(
                "Already posted today ({} at {}), nothing to do",
                record.id,
                record.created_at.with_timezone(now.offset()).format("%H:%M")
            );
        }
        RunOutcome::Completed(report) if report.dry_run => {
            for candidate in &report.candidates {
                println!("{}\n", caption_for(candidate, now.date_naive()));
            }
            println!("Dry run: {} posts selected", report.candidates.len());
        }
        RunOutcome::Completed(report) => print_report(report),
    }
}

fn print_report(report: &RunReport) {
    for result in &report.results {
        match (&result.post_id, &result.error) {
            (Some(id), _) => println!("No. {}: posted {}", result.rank, id),
            (None, Some(error)) => println!("No. {}: failed: {}", result.rank, error),
            (None, None) => println!("No. {}: failed", result.rank),
        }
    }
    println!(
        "{} posted, {} failed",
        report.published(),
        report.failed()
    );
}

fn print_json(outcome: &RunOutcome) {
    let value = match outcome {
        RunOutcome::AlreadyPosted(record) => serde_json::json!({
            "status": "already_posted",
            "latest_post": record,
        }),
        RunOutcome::Completed(report) => serde_json::json!({
            "status": if report.dry_run { "dry_run" } else { "completed" },
            "published": report.published(),
            "failed": report.failed(),
            "report": report,
        }),
    };
    println!("{}", value);
}

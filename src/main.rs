use clap::Parser;
use trendboard::jobs::{self, JobOutcome};
use trendboard::sentiment::VaderScorer;
use trendboard::{AppConfig, Context, initialize, serve};

mod args;
use args::{Args, Job};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match AppConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };

    // Print WebDriver info message for browser-driven jobs
    if args.job.needs_browser() {
        println!("Note: This job requires a WebDriver server (e.g., ChromeDriver).");
        println!(
            "Set WEBDRIVER_URL environment variable if not using the default http://localhost:4444"
        );
    }

    // Initialization failures are fatal before any pipeline runs
    let ctx = match initialize(config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            ::log::error!("Initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    let exit_code = match args.job {
        Job::News => {
            report(
                "news",
                jobs::news::run(&ctx.fetcher, ctx.store.as_ref(), "news", "latest_headlines")
                    .await,
            )
        }
        Job::Dashboard => run_dashboard(&ctx).await,
        Job::Opinions => {
            let scorer = VaderScorer::new();
            report(
                "opinions",
                jobs::opinions::run(&ctx.fetcher, ctx.store.as_ref(), &scorer).await,
            )
        }
        Job::Serve => match serve::run(ctx.store.clone(), &ctx.config.bind_addr).await {
            Ok(()) => 0,
            Err(e) => {
                ::log::error!("Read API failed: {}", e);
                1
            }
        },
    };

    std::process::exit(exit_code);
}

/// Run both dashboard halves; one failing does not stop the other.
async fn run_dashboard(ctx: &Context) -> i32 {
    let news = report(
        "dashboard news",
        jobs::news::run(
            &ctx.fetcher,
            ctx.store.as_ref(),
            "dashboard_data",
            "latest_news",
        )
        .await,
    );
    let gold = report(
        "dashboard gold rates",
        jobs::gold::run(&ctx.fetcher, ctx.store.as_ref()).await,
    );
    news.max(gold)
}

/// Log a run's outcome and map it to an exit code. A failed run is logged
/// and terminates with nothing persisted; a skip is reported, not an
/// error.
fn report(name: &str, outcome: Result<JobOutcome, trendboard::error::JobError>) -> i32 {
    match outcome {
        Ok(JobOutcome::Stored { count }) => {
            ::log::info!("{} run stored {} records", name, count);
            0
        }
        Ok(JobOutcome::Skipped { reason }) => {
            ::log::warn!("{} run skipped: {}", name, reason);
            0
        }
        Err(e) => {
            ::log::error!("{} run failed: {}", name, e);
            1
        }
    }
}

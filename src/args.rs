use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "trendboard")]
#[command(about = "Scrapes headlines, gold rates and forum sentiment into a document store")]
#[command(version)]
pub struct Args {
    /// Job to run; each job is a fixed pipeline with no further parameters
    #[arg(value_enum)]
    pub job: Job,

    /// Path to a JSON config file (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Job {
    /// Top headlines into news/latest_headlines
    News,
    /// Headlines and gold rates into the dashboard_data collection
    Dashboard,
    /// Trending-topic sentiment into the sentiments collection
    Opinions,
    /// HTTP read API over the stored headline document
    Serve,
}

impl Job {
    /// Whether this job drives the headless browser
    pub fn needs_browser(&self) -> bool {
        matches!(self, Job::Dashboard | Job::Opinions)
    }
}

use clap::{Parser, Subcommand};

use crate::commands;
use crate::commands::run::RunOptions;

#[derive(Parser)]
#[command(name = "wsb-mentions")]
#[command(about = "Daily ticker mentions from r/wallstreetbets joined with closing prices", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the forum, count mentions, fetch prices and store the day
    Run {
        /// Maximum number of newest posts to scan
        #[arg(short, long)]
        limit: Option<usize>,

        /// Trailing window in hours
        #[arg(long)]
        hours: Option<i64>,

        /// Skip reply threads
        #[arg(long)]
        no_comments: bool,

        /// Community to scan instead of SUBREDDIT
        #[arg(short, long)]
        subreddit: Option<String>,
    },
    /// Start the API and dashboard server
    Serve {
        /// Port to listen on (default: PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show stored data summary
    Status,
    /// Print the tickers recognised in a piece of text
    Extract {
        /// Text to scan
        text: String,
    },
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            limit,
            hours,
            no_comments,
            subreddit,
        } => {
            commands::run::run(RunOptions {
                limit,
                hours,
                no_comments,
                subreddit,
            })
            .await;
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or_else(|| {
                crate::utils::env_or("PORT", crate::constants::DEFAULT_PORT)
            });
            commands::serve::run(port).await;
        }
        Commands::Status => {
            commands::status::run().await;
        }
        Commands::Extract { text } => {
            commands::extract::run(text);
        }
    }
}

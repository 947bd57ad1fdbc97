//! amz-reviews - Collect and summarize Amazon product reviews
//!
//! A Rust implementation with TLS fingerprint emulation for reliable scraping.

use amz_reviews::commands::ReviewsCommand;
use amz_reviews::config::{Config, OutputFormat, RequestMethod};
use amz_reviews::reviews::ErrorPolicy;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "amz-reviews",
    version,
    about = "Collect and summarize Amazon product reviews",
    long_about = "Walks every page of an Amazon product review listing, exports the reviews and summarizes the ratings."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "AMZ_PROXY")]
    proxy: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true, env = "AMZ_DELAY")]
    delay: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect all reviews from a product review listing
    #[command(alias = "c")]
    Crawl {
        /// URL of the first review page (prompted for if omitted)
        url: Option<String>,

        /// Write the reviews to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of pages to fetch
        #[arg(long)]
        max_pages: Option<u32>,

        /// Query parameter carrying the page number
        #[arg(long)]
        page_param: Option<String>,

        /// HTTP method for page requests (get, post)
        #[arg(long)]
        method: Option<RequestMethod>,

        /// Fail on the first fetch or extraction error instead of continuing
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command {
        Commands::Crawl { url, output, max_pages, page_param, method, strict } => {
            if let Some(output) = output {
                config.output = Some(output);
            }
            if let Some(max_pages) = max_pages {
                config.max_pages = max_pages;
            }
            if let Some(page_param) = page_param {
                config.page_param = page_param;
            }
            if let Some(method) = method {
                config.method = method;
            }
            if strict {
                config.policy = ErrorPolicy::strict();
            }

            let url = match url {
                Some(url) => url,
                None => prompt_for_url()?,
            };

            let cmd = ReviewsCommand::new(config);
            let output = cmd.execute(&url).await?;
            println!("{}", output);
        }
    }

    Ok(())
}

/// Asks for the review page URL on the terminal.
fn prompt_for_url() -> Result<String> {
    let url: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Paste the URL of the product's review page")
        .interact_text()
        .context("Failed to read review page URL")?;

    Ok(url.trim().to_string())
}

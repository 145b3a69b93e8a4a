use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use reviewscope::config::AppConfig;
use reviewscope::core::{CleanOutcome, ReviewScope};

#[derive(Parser)]
#[command(name = "reviewscope-cli")]
#[command(about = "ReviewScope Command Line Interface")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(short, long, help = "Configuration file path")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a product ID from a product page URL
    ExtractId {
        #[arg(help = "Product page URL")]
        url: String,
    },

    /// Fetch raw reviews for a product and print them as JSON
    Scrape {
        #[arg(help = "Product ID")]
        product_id: String,

        #[arg(short, long, help = "Number of result pages to fetch")]
        pages: Option<u32>,

        #[arg(short, long, help = "Provider sort order")]
        sort: Option<String>,

        #[arg(short, long, help = "Output file path (defaults to stdout)")]
        output: Option<String>,
    },

    /// Scrape, clean, and store the canonical dataset for a product
    Clean {
        #[arg(help = "Product ID")]
        product_id: String,

        #[arg(short, long, help = "Number of result pages to fetch")]
        pages: Option<u32>,

        #[arg(short, long, help = "Provider sort order")]
        sort: Option<String>,
    },

    /// Summarize the cached dataset for a product
    Summarize {
        #[arg(help = "Product ID")]
        product_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.verbose { "debug" } else { "info" };
    std::env::set_var("RUST_LOG", format!("reviewscope={}", log_level));

    tracing_subscriber::fmt::init();

    info!("ReviewScope CLI v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = if let Some(config_path) = cli.config {
        AppConfig::load_from_file(&config_path).await?
    } else {
        AppConfig::load().await?
    };

    let app = ReviewScope::new(config)?;

    match cli.command {
        Commands::ExtractId { url } => {
            execute_extract_id(&app, &url)?;
        }
        Commands::Scrape { product_id, pages, sort, output } => {
            execute_scrape(&app, &product_id, pages, sort, output).await?;
        }
        Commands::Clean { product_id, pages, sort } => {
            execute_clean(&app, &product_id, pages, sort).await?;
        }
        Commands::Summarize { product_id } => {
            execute_summarize(&app, &product_id).await?;
        }
    }

    Ok(())
}

fn execute_extract_id(app: &ReviewScope, url: &str) -> Result<()> {
    let product_id = app.extract_product_id(url)?;
    println!("{}", product_id);
    Ok(())
}

async fn execute_scrape(
    app: &ReviewScope,
    product_id: &str,
    pages: Option<u32>,
    sort: Option<String>,
    output: Option<String>,
) -> Result<()> {
    let pages = pages.unwrap_or(app.config().scraper.default_pages);
    let sort = sort.unwrap_or_else(|| app.config().scraper.default_sort.clone());

    let rows = app.scrape_reviews(product_id, pages, &sort).await?;
    println!("Fetched {} reviews for product {}", rows.len(), product_id);

    let json = serde_json::to_string_pretty(&rows)?;
    match output {
        Some(path) => {
            tokio::fs::write(&path, json).await?;
            println!("Raw reviews written to: {}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}

async fn execute_clean(
    app: &ReviewScope,
    product_id: &str,
    pages: Option<u32>,
    sort: Option<String>,
) -> Result<()> {
    let pages = pages.unwrap_or(app.config().scraper.default_pages);
    let sort = sort.unwrap_or_else(|| app.config().scraper.default_sort.clone());

    let rows = app.scrape_reviews(product_id, pages, &sort).await?;
    println!("Fetched {} reviews for product {}", rows.len(), product_id);

    match app.clean_and_store(product_id, &rows).await? {
        CleanOutcome::Cached { location } => {
            println!("Dataset already cached at: {}", location);
        }
        CleanOutcome::Uploaded { location, count } => {
            println!("Cleaned {} reviews, stored at: {}", count, location);
        }
    }

    Ok(())
}

async fn execute_summarize(app: &ReviewScope, product_id: &str) -> Result<()> {
    let summary = app.summarize(product_id).await?;

    println!(
        "Summary for product {} ({} reviews, model {}):",
        product_id, summary.review_count, summary.model_id
    );
    println!();
    println!("{}", summary.summary);

    Ok(())
}

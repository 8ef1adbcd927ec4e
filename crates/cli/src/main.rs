//! Shop Console CLI - Tag automation and collection tools.
//!
//! # Usage
//!
//! ```bash
//! # Merge collection tags into a product export
//! sc-cli tag --master products_export.csv --archive collections.zip
//!
//! # Author smart collections
//! sc-cli collections add --handle summer --title Summer --condition-tag cus-summer
//! sc-cli collections list
//!
//! # List a storefront's collections
//! sc-cli extract example.myshopify.com --search summer
//!
//! # Create the authored collections in a shop
//! sc-cli import --file smart_collections.json --shop demo.myshopify.com --token shpat_...
//! ```
//!
//! # Commands
//!
//! - `tag` - Run tag automation on local files
//! - `collections` - Edit a smart collections file
//! - `extract` - Extract and cache storefront collections
//! - `import` - Import smart collections through the Admin API

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;
use shop_console_core::SortOrder;
use shop_console_core::collections::SMART_COLLECTIONS_FILE_NAME;
use shop_console_core::tagging::{DEFAULT_TAG_PREFIX, OUTPUT_FILE_NAME};

mod commands;

#[derive(Parser)]
#[command(name = "sc-cli")]
#[command(author, version, about = "Shop Console CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge collection membership tags into a master product CSV
    Tag {
        /// Master product CSV export
        #[arg(short, long)]
        master: PathBuf,

        /// ZIP of per-collection CSV exports
        #[arg(short, long)]
        archive: PathBuf,

        /// Prefix for derived tags
        #[arg(short, long, default_value = DEFAULT_TAG_PREFIX)]
        prefix: String,

        /// Output CSV path
        #[arg(short, long, default_value = OUTPUT_FILE_NAME)]
        output: PathBuf,

        /// Tag every row with a mapped handle, not only product rows
        #[arg(long)]
        tag_all_rows: bool,
    },
    /// Edit a smart collections file
    Collections {
        #[command(subcommand)]
        action: CollectionsAction,
    },
    /// Extract a storefront's public collections
    Extract(ExtractArgs),
    /// Import smart collections into a shop
    Import {
        /// Smart collections JSON file
        #[arg(short, long, default_value = SMART_COLLECTIONS_FILE_NAME)]
        file: PathBuf,

        /// Shop domain or URL
        #[arg(short, long)]
        shop: String,

        /// Admin API access token
        #[arg(short, long, env = "SHOPIFY_ACCESS_TOKEN", hide_env_values = true)]
        token: String,
    },
}

#[derive(Subcommand)]
enum CollectionsAction {
    /// Add a smart collection
    Add {
        /// Collections file
        #[arg(short, long, default_value = SMART_COLLECTIONS_FILE_NAME)]
        file: PathBuf,

        /// Collection handle
        #[arg(long)]
        handle: String,

        /// Collection title
        #[arg(long)]
        title: String,

        /// Tag a product must carry to be included
        #[arg(long)]
        condition_tag: String,

        /// Description HTML
        #[arg(long, default_value = "")]
        body_html: String,

        /// Sort order (`best-selling`, `alpha-asc`, `alpha-desc`, `price-asc`, `price-desc`, `created-desc`)
        #[arg(long, default_value = "best-selling")]
        sort_order: SortOrder,
    },
    /// List smart collections
    List {
        /// Collections file
        #[arg(short, long, default_value = SMART_COLLECTIONS_FILE_NAME)]
        file: PathBuf,
    },
    /// Remove a smart collection by index
    Remove {
        /// Collections file
        #[arg(short, long, default_value = SMART_COLLECTIONS_FILE_NAME)]
        file: PathBuf,

        /// Index shown by `list`
        #[arg(short, long)]
        index: usize,
    },
}

#[derive(Args)]
struct ExtractArgs {
    /// Store URL or domain
    #[arg(required_unless_present_any = ["cached", "clear"])]
    url: Option<String>,

    /// Cache file
    #[arg(long, default_value = commands::extract::DEFAULT_CACHE_FILE)]
    cache: PathBuf,

    /// Only show collections whose title contains this text
    #[arg(short, long)]
    search: Option<String>,

    /// Show the cached collections instead of fetching
    #[arg(long, conflicts_with = "clear")]
    cached: bool,

    /// Delete the cache file
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    // Initialize tracing, defaulting to info so run logs and import progress show
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Tag {
            master,
            archive,
            prefix,
            output,
            tag_all_rows,
        } => {
            let report = commands::tag::run(&commands::tag::TagOptions {
                master: &master,
                archive: &archive,
                output: &output,
                prefix: &prefix,
                tag_all_rows,
            })?;
            if let Some(output) = &report.output {
                for skipped in &output.skipped {
                    println!("skipped {}: {}", skipped.entry, skipped.reason);
                }
                println!(
                    "Updated tags in {} of {} rows ({} handles mapped)",
                    output.updated_count, output.row_count, output.handles_mapped
                );
            }
        }
        Commands::Collections { action } => match action {
            CollectionsAction::Add {
                file,
                handle,
                title,
                condition_tag,
                body_html,
                sort_order,
            } => {
                let index = commands::collections::add(
                    &file,
                    commands::collections::NewCollection {
                        handle,
                        title,
                        condition_tag,
                        body_html,
                        sort_order,
                    },
                )?;
                println!("Added collection at index {index}");
            }
            CollectionsAction::List { file } => {
                let set = commands::collections::load(&file)?;
                if set.is_empty() {
                    println!("No collections in {}", file.display());
                }
                for line in commands::collections::describe(&set) {
                    println!("{line}");
                }
            }
            CollectionsAction::Remove { file, index } => {
                let removed = commands::collections::remove(&file, index)?;
                println!("Removed {}", removed.handle);
            }
        },
        Commands::Extract(args) => extract(args).await?,
        Commands::Import { file, shop, token } => {
            let results = commands::import::run(&file, &shop, SecretString::from(token)).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn extract(args: ExtractArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.clear {
        if commands::extract::clear(&args.cache)? {
            println!("Cleared {}", args.cache.display());
        }
        return Ok(());
    }

    let collections = match (&args.url, args.cached) {
        (_, true) => commands::extract::cached(&args.cache)?,
        (Some(url), false) => commands::extract::fetch(url, &args.cache).await?,
        (None, false) => return Err("a store URL is required".into()),
    };
    for line in commands::extract::describe(&collections, args.search.as_deref()) {
        println!("{line}");
    }
    Ok(())
}

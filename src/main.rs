// src/main.rs
mod extractors;
mod intent;
mod lookup;
mod storage;
mod utils;

use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;

use extractors::html::split_page_assets;
use extractors::project::{extract_page, extract_project, PAGE_EDIT_SPEC, SINGLE_PAGE_SPEC};
use intent::classifier::{classify, wants_website};
use intent::query::build_search_query;
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the site-builder extraction toolkit
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract marker-delimited files from a model response
    Extract {
        /// File with the raw model response (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Which marker profile the response was generated against
        #[arg(long, value_enum, default_value = "project")]
        profile: Profile,

        /// Output directory for extracted files
        #[arg(short, long, default_value = "./output")]
        output_dir: String,

        /// Directory name for this extraction under the output directory
        #[arg(long, default_value = "site")]
        project_name: String,

        /// Also split the extracted page into body.html/styles.css/scripts.js
        #[arg(long)]
        split_assets: bool,

        /// Log what would be written without touching the filesystem
        #[arg(long)]
        dry_run: bool,
    },

    /// Classify a chat utterance for search and website intent
    Classify {
        /// The user utterance
        message: String,
    },

    /// Classify an utterance and, when it needs fresh data, run the lookup
    Lookup {
        /// The user utterance
        message: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Profile {
    /// Full Next.js project response (fifteen marker pairs)
    Project,
    /// Single generated page (NEW_PAGE markers, fenced html fallback)
    Page,
    /// Element-edit response (HTML + commentary markers)
    Edit,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Setup logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    let cli = Cli::parse();
    tracing::debug!("Starting with args: {:?}", cli);

    match cli.command {
        Command::Extract {
            input,
            profile,
            output_dir,
            project_name,
            split_assets,
            dry_run,
        } => run_extract(input, profile, &output_dir, &project_name, split_assets, dry_run),
        Command::Classify { message } => {
            run_classify(&message);
            Ok(())
        }
        Command::Lookup { message } => run_lookup(&message).await,
    }
}

fn run_extract(
    input: Option<PathBuf>,
    profile: Profile,
    output_dir: &str,
    project_name: &str,
    split_assets: bool,
    dry_run: bool,
) -> Result<(), AppError> {
    let source = read_source(input)?;
    tracing::info!("Read {} bytes of model response", source.len());

    let mut files: BTreeMap<String, String> = match profile {
        Profile::Project => extract_project(&source),
        Profile::Page => extract_page(&source, &SINGLE_PAGE_SPEC),
        Profile::Edit => extract_page(&source, &PAGE_EDIT_SPEC),
    };

    if files.is_empty() {
        return Err(AppError::Processing(
            "no marker blocks found in the model response".to_string(),
        ));
    }

    if split_assets {
        if let Some(page) = files.get("index.html").cloned() {
            let assets = split_page_assets(&page);
            if !assets.body.is_empty() {
                files.insert("body.html".to_string(), assets.body);
            }
            if !assets.styles.is_empty() {
                files.insert("styles.css".to_string(), assets.styles);
            }
            if !assets.scripts.is_empty() {
                files.insert("scripts.js".to_string(), assets.scripts);
            }
        } else {
            tracing::warn!("--split-assets given but no page was extracted");
        }
    }

    tracing::info!("Extracted {} file(s)", files.len());

    if dry_run {
        for (name, content) in &files {
            tracing::info!("[dry-run] would write {} ({} bytes)", name, content.len());
        }
        return Ok(());
    }

    let storage = StorageManager::new(output_dir)?;
    let written = storage.save_project(project_name, &files)?;
    let manifest = storage.save_manifest(project_name, &files)?;

    tracing::info!(
        "Wrote {} file(s) and manifest {}",
        written.len(),
        manifest.display()
    );

    Ok(())
}

fn run_classify(message: &str) {
    let signal = classify(message);
    let website = wants_website(message);
    let query = build_search_query(message);

    println!("search_intent: {}", signal.search);
    match signal.trigger {
        Some(trigger) => println!("trigger: {:?}", trigger),
        None => println!("trigger: none"),
    }
    println!("website_intent: {}", website);
    println!("search_query: {}", query);
}

async fn run_lookup(message: &str) -> Result<(), AppError> {
    let signal = classify(message);
    if !signal.search {
        println!("Запрос не требует поиска.");
        return Ok(());
    }

    let query = build_search_query(message);
    tracing::info!("Search intent {:?}, querying for: {}", signal.trigger, query);

    match lookup::client::quick_answer(message, &query).await {
        Some(answer) => println!("{}", answer),
        None => println!("Ничего не нашлось по запросу: {}", query),
    }

    Ok(())
}

fn read_source(input: Option<PathBuf>) -> Result<String, AppError> {
    match input {
        Some(path) => {
            tracing::info!("Reading model response from {}", path.display());
            Ok(std::fs::read_to_string(path)?)
        }
        None => {
            tracing::info!("Reading model response from stdin");
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

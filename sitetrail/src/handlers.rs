use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use pager::Pager;
use sitetrail_core::config::{Settings, StoreKind};
use sitetrail_core::crawl::{SiteCrawler, WebCrawler, generate_crawl_report};
use sitetrail_core::data::Database;
use sitetrail_core::report::{ReportFormat, render_route, render_search_report, save_report};
use sitetrail_core::search::SearchStrategy;
use sitetrail_core::{CacheKey, RecordStore, SearchService, StoreBackend, normalize_identity};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Validate a user-supplied seed and return its normalized identity.
pub fn parse_seed(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("A seed URL is required");
    }
    let identity = normalize_identity(trimmed);
    let parsed = Url::parse(&identity).with_context(|| format!("Invalid URL '{}'", raw))?;
    if parsed.host_str().is_none() {
        bail!("URL '{}' has no host", raw);
    }
    Ok(identity)
}

pub fn parse_report_format(raw: &str) -> Result<ReportFormat> {
    ReportFormat::from_str(raw).ok_or_else(|| anyhow!("Unknown report format '{}'", raw))
}

pub fn parse_strategy(raw: &str) -> Result<SearchStrategy> {
    SearchStrategy::from_str(raw).ok_or_else(|| anyhow!("Unknown search method '{}'", raw))
}

/// Settings from the global flags.
pub fn settings_from_matches(matches: &ArgMatches) -> Result<Settings> {
    let mut settings = Settings::default();
    if let Some(dir) = matches.get_one::<String>("data-dir") {
        settings = settings.with_data_dir(dir);
    }
    if let Some(kind) = matches.get_one::<String>("store") {
        settings.store =
            StoreKind::from_str(kind).ok_or_else(|| anyhow!("Unknown store '{}'", kind))?;
    }
    Ok(settings)
}

/// What `init` left on disk.
#[derive(Debug, Clone)]
pub struct InitSummary {
    pub data_dir: PathBuf,
    pub json_dir: PathBuf,
    pub database: PathBuf,
    pub removed_existing: bool,
}

/// Create the data directory layout. With `force`, existing record sets in
/// both stores are deleted first.
pub fn init_data_dir(settings: &Settings, force: bool) -> Result<InitSummary> {
    let json_dir = settings.json_store_dir();
    let database = settings.database_path();
    let mut removed_existing = false;

    if force {
        if json_dir.exists() {
            fs::remove_dir_all(&json_dir)
                .with_context(|| format!("Failed to remove {}", json_dir.display()))?;
            removed_existing = true;
        }
        if Database::exists(&database) {
            Database::drop(&database)
                .with_context(|| format!("Failed to remove {}", database.display()))?;
            removed_existing = true;
        }
    }

    fs::create_dir_all(&json_dir)
        .with_context(|| format!("Failed to create {}", json_dir.display()))?;
    Database::new(&database)
        .with_context(|| format!("Failed to create database {}", database.display()))?;

    Ok(InitSummary {
        data_dir: settings.data_dir().to_path_buf(),
        json_dir,
        database,
        removed_existing,
    })
}

/// Write `content` to `output` when given, otherwise to the terminal.
pub fn emit(content: &str, output: Option<&PathBuf>, page: bool) -> Result<()> {
    match output {
        Some(path) => {
            save_report(content, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => {
            if page {
                Pager::with_pager("less -R").setup();
            }
            print!("{}", content);
        }
    }
    Ok(())
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> Result<String> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().to_lowercase())
}

fn open_service(settings: &Settings, quiet: bool) -> Result<SearchService<StoreBackend, WebCrawler>> {
    let store = StoreBackend::open(settings).context("Failed to open record store")?;
    let crawler = WebCrawler::new(settings.threads, settings.timeout_secs).with_progress_bars(!quiet);
    Ok(SearchService::new(store, crawler).with_crawl_depth(settings.crawl_depth))
}

pub fn handle_init(args: &ArgMatches, settings: &Settings) -> Result<()> {
    let settings = match args.get_one::<String>("PATH") {
        Some(path) => settings.clone().with_data_dir(path),
        None => settings.clone(),
    };
    let mut force = args.get_flag("force");

    print_divider();
    println!("{}", "  SITETRAIL INITIALIZATION".bright_white().bold());
    print_divider();
    println!();
    println!(
        "{} Target: {}",
        "→".blue(),
        settings.data_dir().display().to_string().bright_white()
    );
    println!();

    let has_data = settings.json_store_dir().exists() || Database::exists(&settings.database_path());
    if has_data && !force {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("Stored record sets already exist at this location.");
        let response = print_prompt("Delete them and start fresh? [y/N]:")?;
        println!();
        if response == "y" || response == "yes" {
            force = true;
        } else {
            println!("{} Keeping existing data", "→".blue());
        }
    }

    let summary = init_data_dir(&settings, force)?;
    if summary.removed_existing {
        println!("{} Existing record sets removed", "✓".green().bold());
    }

    println!();
    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!();
    println!(
        "{} Data directory: {}",
        "✓".green().bold(),
        summary.data_dir.display().to_string().bright_white()
    );
    println!(
        "{} JSON store: {}",
        "✓".green().bold(),
        summary.json_dir.display().to_string().bright_white()
    );
    println!(
        "{} Database: {}",
        "✓".green().bold(),
        summary.database.display().to_string().bright_white()
    );
    println!();
    Ok(())
}

pub async fn handle_crawl(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let raw = args
        .get_one::<String>("url")
        .ok_or_else(|| anyhow!("--url is required"))?;
    let identity = parse_seed(raw)?;
    let depth = *args.get_one::<usize>("depth").unwrap_or(&settings.crawl_depth);
    let threads = *args.get_one::<usize>("threads").unwrap_or(&settings.threads);
    let timeout = *args.get_one::<u64>("timeout").unwrap_or(&settings.timeout_secs);

    if !quiet {
        println!("\n{} Crawling {}", "→".blue(), identity.bright_white());
        println!("Workers: {}", threads);
        println!("Max depth: {}\n", depth);
    }

    let store = StoreBackend::open(settings).context("Failed to open record store")?;
    let crawler = WebCrawler::new(threads, timeout)
        .with_progress_bars(!quiet)
        .with_progress_callback(Arc::new(|msg: String| debug!("{}", msg)));

    let records = crawler
        .crawl(&identity, depth)
        .await
        .with_context(|| format!("Crawl of {} failed", identity))?;

    let key = CacheKey::from_identity(&identity);
    if records.is_empty() {
        store.remove(&key)?;
        bail!("No pages could be crawled from {}", identity);
    }
    store.save(&key, &identity, &records)?;

    println!("\n{} Crawl complete! Stored as {}\n", "✓".green().bold(), key.file_name());
    emit(&generate_crawl_report(&records), None, !quiet)
}

pub async fn handle_search(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let raw = args
        .get_one::<String>("url")
        .ok_or_else(|| anyhow!("--url is required"))?;
    let identity = parse_seed(raw)?;
    let keyword = args
        .get_one::<String>("keyword")
        .map(String::as_str)
        .unwrap_or_default();
    let strategy = parse_strategy(args.get_one::<String>("method").map_or("bfs", String::as_str))?;
    let depth = *args.get_one::<usize>("depth").unwrap_or(&settings.crawl_depth);
    let format = parse_report_format(args.get_one::<String>("format").map_or("text", String::as_str))?;
    let output = args.get_one::<PathBuf>("output");

    let service = open_service(settings, quiet)?;
    let report = service
        .search(&identity, keyword, strategy, depth)
        .await?
        .ok_or_else(|| anyhow!("No data available for {}", identity))?;

    let rendered = render_search_report(&report, format)?;
    emit(&rendered, output, format == ReportFormat::Text && !quiet)
}

pub async fn handle_route(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let raw = args
        .get_one::<String>("url")
        .ok_or_else(|| anyhow!("--url is required"))?;
    let identity = parse_seed(raw)?;
    let target = args
        .get_one::<String>("target")
        .ok_or_else(|| anyhow!("--target is required"))?;
    let format = parse_report_format(args.get_one::<String>("format").map_or("text", String::as_str))?;

    let service = open_service(settings, quiet)?;
    let path = service
        .route(&identity, target)
        .await?
        .ok_or_else(|| anyhow!("No data available for {}", identity))?;

    let rendered = render_route(target.trim(), &path, format)?;
    emit(&rendered, None, false)
}

pub fn handle_list(settings: &Settings) -> Result<()> {
    let store = StoreBackend::open(settings).context("Failed to open record store")?;
    let identities = store.list_known_identities()?;

    if identities.is_empty() {
        println!("{} No stored record sets", "ℹ".blue());
        return Ok(());
    }

    for identity in &identities {
        let key = CacheKey::from_identity(identity);
        println!(
            "  {} {}",
            identity.bright_white(),
            key.as_str()[..12].bright_black()
        );
    }
    println!("\n{} {} sites", "✓".green().bold(), identities.len());
    Ok(())
}

pub fn handle_key(args: &ArgMatches) -> Result<()> {
    let raw = args
        .get_one::<String>("URL")
        .ok_or_else(|| anyhow!("URL is required"))?;
    let identity = normalize_identity(raw);
    let key = CacheKey::from_identity(&identity);
    println!("{} {}", "identity:".blue(), identity.bright_white());
    println!("{} {}", "key:     ".blue(), key);
    println!("{} {}", "file:    ".blue(), key.file_name());
    Ok(())
}

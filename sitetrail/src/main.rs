use anyhow::Result;
use clap::ArgMatches;
use commands::command_argument_builder;
use sitetrail::handlers;
use sitetrail_core::print_banner;
use tracing_subscriber::EnvFilter;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_tracing(chosen_command.get_flag("verbose"));

    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    if let Err(e) = run(&chosen_command, quiet).await {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(matches: &ArgMatches, quiet: bool) -> Result<()> {
    let settings = handlers::settings_from_matches(matches)?;

    match matches.subcommand() {
        Some(("init", primary_command)) => handlers::handle_init(primary_command, &settings),
        Some(("crawl", primary_command)) => {
            handlers::handle_crawl(primary_command, &settings, quiet).await
        }
        Some(("search", primary_command)) => {
            handlers::handle_search(primary_command, &settings, quiet).await
        }
        Some(("route", primary_command)) => {
            handlers::handle_route(primary_command, &settings, quiet).await
        }
        Some(("list", _)) => handlers::handle_list(&settings),
        Some(("key", primary_command)) => handlers::handle_key(primary_command),
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

use crate::CLAP_STYLING;
use clap::{arg, command};
use sitetrail_core::config::DEFAULT_DATA_DIR;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitetrail")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitetrail")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Log crawl and cache activity").required(false))
        .arg(
            arg!(--"data-dir" <PATH>)
                .required(false)
                .help("Directory holding crawled record sets")
                .default_value(DEFAULT_DATA_DIR),
        )
        .arg(
            arg!(--"store" <KIND>)
                .required(false)
                .help("Record store backend")
                .value_parser(["json", "sqlite"])
                .default_value("json"),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Creates the sitetrail data directory and database")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location of the data directory (defaults to --data-dir)"),
                )
                .arg(
                    arg!(-f - -"force")
                        .help("Removes any existing record sets at the location first")
                        .required(false),
                ),
        )
        .subcommand(
            command!("crawl")
                .about("Crawl a site from its seed URL and store the record set")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The seed URL to crawl"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum link depth from the seed")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("2"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async worker 'threads' in the worker pool.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                ),
        )
        .subcommand(
            command!("search")
                .about(
                    "Search a site's pages for a keyword, crawling the seed first if it has \
                not been seen before",
                )
                .arg(
                    arg!(-u --"url" <SEED>)
                        .required(true)
                        .help("Seed URL of the site to search"),
                )
                .arg(
                    arg!(-k --"keyword" <KEYWORD>)
                        .required(true)
                        .help("Case-insensitive keyword matched against titles and content"),
                )
                .arg(
                    arg!(-m --"method" <METHOD>)
                        .required(false)
                        .help("Traversal order")
                        .value_parser(["bfs", "dfs"])
                        .default_value("bfs"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum depth to search from the seed")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("2"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown", "md"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("route")
                .about("Show the chain of pages leading from the seed to a target URL")
                .arg(
                    arg!(-u --"url" <SEED>)
                        .required(true)
                        .help("Seed URL of the site"),
                )
                .arg(
                    arg!(--"target" <URL>)
                        .required(true)
                        .help("The page to trace back to the seed"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown", "md"])
                        .default_value("text"),
                ),
        )
        .subcommand(command!("list").about("List every seed with a stored record set"))
        .subcommand(
            command!("key")
                .about("Print the normalized identity and cache key for a URL")
                .arg(arg!(<URL>).required(true).help("Any form of the seed URL")),
        )
}

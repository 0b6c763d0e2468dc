use clap::{arg, command};
use quintin_core::{DEFAULT_ARTIFACT, DEFAULT_SEED};
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("quintin")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("quintin")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress progress and the crawl summary")
                .required(false)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl every same-origin page of the lore site and write them to a flat \
                text artifact.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("Seed URL; only pages on its scheme and host are followed")
                        .value_parser(clap::value_parser!(Url))
                        .default_value(DEFAULT_SEED),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Where to write the lore artifact")
                        .default_value(DEFAULT_ARTIFACT),
                )
                .arg(
                    arg!(--"max-pages" <NUM>)
                        .required(false)
                        .help("Stop after visiting this many pages (default: no limit)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"max-depth" <NUM>)
                        .required(false)
                        .help("Do not follow links more than this many hops from the seed")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"refetch")
                        .required(false)
                        .help("Fetch every page again when writing the artifact instead of reusing crawled text")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("lore")
                .about("Look up a lore snippet through the lore index")
                .arg(
                    arg!(-i --"index" <PATH>)
                        .required(false)
                        .help("JSON file mapping topics to lore URLs")
                        .default_value("lore_index.json"),
                )
                .arg(
                    arg!([TOPIC])
                        .required(false)
                        .help("Topic to look up")
                        .conflicts_with_all(["prompt", "random", "list"]),
                )
                .arg(
                    arg!(-p --"prompt" <TEXT>)
                        .required(false)
                        .help("Free text; the first word naming a topic is looked up")
                        .conflicts_with_all(["random", "list"]),
                )
                .arg(
                    arg!(--"random")
                        .required(false)
                        .help("Pick a topic at random")
                        .action(clap::ArgAction::SetTrue)
                        .conflicts_with("list"),
                )
                .arg(
                    arg!(--"list")
                        .required(false)
                        .help("List the topics in the index")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}

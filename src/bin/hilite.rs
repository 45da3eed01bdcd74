//! Command-line interface for hilite
//! Highlights a file (or stdin) and prints the classified node tree as JSON.
//!
//! Usage:
//!   hilite highlight `<language>` [path]          - Highlight as the given language
//!   hilite auto [path] [--subset `<a,b,...>`]     - Highlight with language detection
//!   hilite list                                 - List registered languages
//!
//! `--prefix` and `--config` apply to every subcommand. `HILITE_<SECTION>__<KEY>` variables
//! (`HILITE_OUTPUT__PREFIX`) sit between the config file and the flags. Logging is
//! configured through `HILITE_LOG` (for example `HILITE_LOG=hilite=debug`).

use clap::{Arg, ArgMatches, Command};
use hilite::highlight::config::Loader;
use hilite::highlight::{HighlightConfig, Highlighter};
use std::io::Read;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn main() {
    init_tracing();

    let matches = Command::new("hilite")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Grammar-driven syntax highlighting to a JSON node tree")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .short('p')
                .global(true)
                .help("Class name prefix (e.g., 'hljs-', or '' for none)"),
        )
        .subcommand(
            Command::new("highlight")
                .about("Highlight a file as the given language")
                .arg(
                    Arg::new("language")
                        .help("Language name or alias")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("path")
                        .help("File to highlight (stdin when omitted)")
                        .index(2),
                ),
        )
        .subcommand(
            Command::new("auto")
                .about("Highlight a file in whichever language fits best")
                .arg(
                    Arg::new("path")
                        .help("File to highlight (stdin when omitted)")
                        .index(1),
                )
                .arg(
                    Arg::new("subset")
                        .long("subset")
                        .short('s')
                        .value_delimiter(',')
                        .help("Comma separated candidate languages"),
                ),
        )
        .subcommand(Command::new("list").about("List registered languages"))
        .get_matches();

    let config = load_config(&matches);
    let highlighter = Highlighter::from_config(&config)
        .unwrap_or_else(|e| fail(format!("Error loading grammars: {}", e)));

    match matches.subcommand() {
        Some(("highlight", highlight_matches)) => {
            handle_highlight_command(&highlighter, &config, highlight_matches);
        }
        Some(("auto", auto_matches)) => {
            handle_auto_command(&highlighter, &config, auto_matches);
        }
        Some(("list", _)) => {
            handle_list_command(&highlighter);
        }
        _ => unreachable!(),
    }
}

/// Console logging, filtered by `HILITE_LOG` (default `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_env("HILITE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);
    tracing_subscriber::registry().with(console_layer).init();
}

fn load_config(matches: &ArgMatches) -> HighlightConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    loader = loader.with_environment("HILITE");
    if let Some(prefix) = matches.get_one::<String>("prefix") {
        loader = loader
            .set_override("output.prefix", prefix.as_str())
            .unwrap_or_else(|e| fail(format!("Invalid prefix: {}", e)));
    }
    loader
        .build()
        .unwrap_or_else(|e| fail(format!("Error loading configuration: {}", e)))
}

/// Handle the highlight command
fn handle_highlight_command(
    highlighter: &Highlighter,
    config: &HighlightConfig,
    matches: &ArgMatches,
) {
    let Some(language) = matches.get_one::<String>("language") else {
        fail("Missing language".to_string());
    };
    let source = read_source(matches.get_one::<String>("path"));

    let result = highlighter
        .highlight(language, &source, &config.highlight_options())
        .unwrap_or_else(|e| fail(format!("Highlight error: {}", e)));
    print_json(&result);
}

/// Handle the auto command
fn handle_auto_command(highlighter: &Highlighter, config: &HighlightConfig, matches: &ArgMatches) {
    let source = read_source(matches.get_one::<String>("path"));

    let mut options = config.auto_options();
    if let Some(subset) = matches.get_many::<String>("subset") {
        options = options.with_subset(subset.cloned());
    }

    let result = highlighter
        .highlight_auto(&source, &options)
        .unwrap_or_else(|e| fail(format!("Highlight error: {}", e)));
    print_json(&result);
}

/// Handle the list command
fn handle_list_command(highlighter: &Highlighter) {
    println!("Registered languages:\n");
    for name in highlighter.registry().list_names() {
        println!("  {}", name);
    }
}

fn read_source(path: Option<&String>) -> String {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .unwrap_or_else(|e| fail(format!("Error reading file: {}", e))),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .unwrap_or_else(|e| fail(format!("Error reading stdin: {}", e)));
            source
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(format!("Serialization error: {}", e)),
    }
}

fn fail(message: String) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

use clap::{crate_version, App, Arg, ArgMatches};
use sitestack::build::build_site;
use sitestack::config::Config;
use sitestack::frontmatter::Format;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{error, Level};

fn main() {
    let matches = App::new("sitestack")
        .version(crate_version!())
        .about("Builds a static site from a source tree with directory-scoped metadata")
        .arg(
            Arg::with_name("source")
                .long("source")
                .takes_value(true)
                .value_name("DIR")
                .help("path to site source (input) [default: src]"),
        )
        .arg(
            Arg::with_name("target")
                .long("target")
                .takes_value(true)
                .value_name("DIR")
                .help("path to site target (output) [default: tgt]"),
        )
        .arg(
            Arg::with_name("global-key")
                .long("global-key")
                .takes_value(true)
                .value_name("KEY")
                .help("template key for the index of all files [default: files]"),
        )
        .arg(
            Arg::with_name("template-key")
                .long("template-key")
                .takes_value(true)
                .value_name("KEY")
                .help("metadata key naming a markdown file's template [default: template]"),
        )
        .arg(
            Arg::with_name("front-matter")
                .long("front-matter")
                .takes_value(true)
                .possible_values(&["json", "yaml"])
                .help("format of front matter blocks [default: json]"),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .takes_value(true)
                .value_name("FILE")
                .help("project file (default: nearest sitestack.yaml, if any)"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("log debug output"),
        )
        .get_matches();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_max_level(if matches.is_present("verbose") {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    if let Err(e) = run(&matches) {
        error!("{}", chain(e.as_ref()));
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let config = load_config(matches)?.absolutize()?;
    build_site(&config)?;
    Ok(())
}

/// Loads the project file (explicit or discovered) and applies command-line
/// overrides on top of it.
fn load_config(matches: &ArgMatches) -> Result<Config, Box<dyn Error>> {
    let mut config = match matches.value_of("config") {
        Some(path) => Config::from_project_file(Path::new(path))?,
        None => Config::from_directory(&std::env::current_dir()?)?,
    };
    if let Some(source) = matches.value_of("source") {
        config.source_directory = PathBuf::from(source);
    }
    if let Some(target) = matches.value_of("target") {
        config.target_directory = PathBuf::from(target);
    }
    if let Some(key) = matches.value_of("global-key") {
        config.global_key = key.to_owned();
    }
    if let Some(key) = matches.value_of("template-key") {
        config.template_key = key.to_owned();
    }
    if let Some(format) = matches.value_of("front-matter") {
        config.front_matter = format.parse::<Format>()?;
    }
    Ok(config)
}

/// Formats an error followed by each of its sources.
fn chain(err: &(dyn Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        // most errors already embed their cause in their own message
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

use anyhow::Result;
use clap::{App, Arg};
use std::str::FromStr;
use tracing::{subscriber::set_global_default, Level};

mod commands;
mod config;

fn main() -> Result<()> {
    let matches = App::new("kcloak")
        .version("0.1.0")
        .about("Mondrian k-anonymization for CSV files")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .global(true)
                .default_value("./kcloak.toml")
                .help("Path to the config file to use"),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .takes_value(true)
                .global(true)
                .default_value("INFO")
                .help("Sets the level of verbosity"),
        )
        .subcommand(
            App::new("anonymize")
                .about("Anonymizes a CSV file")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .help("CSV file with a header row"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .takes_value(true)
                        .help("Where to write the anonymized CSV, stdout when omitted"),
                )
                .arg(
                    Arg::new("group")
                        .short('g')
                        .long("group")
                        .help("Group output rows by equivalence class"),
                ),
        )
        .subcommand(
            App::new("inspect")
                .about("Validates the config and prints column roles and hierarchies")
                .arg(Arg::new("input").help("CSV file to check the declared columns against")),
        )
        .get_matches();

    let tracing_level = Level::from_str(
        matches
            .value_of("verbosity")
            .expect("Missing value for 'verbosity' argument"),
    )?;

    let collector = tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(std::io::stderr)
        .finish();

    set_global_default(collector)?;

    match matches.subcommand() {
        Some(("anonymize", matches)) => commands::anonymize::execute(matches),
        Some(("inspect", matches)) => commands::inspect::execute(matches),
        _ => {
            anyhow::bail!("No command given, try `kcloak --help`")
        }
    }
}

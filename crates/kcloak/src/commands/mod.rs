use crate::config::load_config;
use anyhow::Result;
use clap::ArgMatches;
use mondrian_anonymization::AnonymizationConfig;
use std::path::Path;

pub mod anonymize;
pub mod inspect;

fn config_from_matches(matches: &ArgMatches) -> Result<AnonymizationConfig> {
    let config_file_path = Path::new(
        matches
            .value_of("config")
            .expect("Missing value for 'config' argument"),
    );

    let config_file_path = std::env::current_dir()?.join(config_file_path);
    let config = load_config(&config_file_path)?;
    config.validate()?;
    Ok(config)
}

use super::config_from_matches;
use anyhow::{Context, Result};
use arrow::csv::Writer;
use clap::ArgMatches;
use mondrian_anonymization::{
    conversion::{anonymization_to_batch, csv_reader, records_from_batch},
    AnonymizationConfig, Anonymizer, Record, RecordId, Summary,
};
use std::{
    fs::File,
    io::{Read, Seek, Write},
};
use tracing::{debug, info};

/// Anonymizes the CSV in `input` as one dataset and writes the result as CSV.
pub fn anonymize_csv<R, W>(
    input: R,
    output: W,
    config: &AnonymizationConfig,
    group_by_partition: bool,
) -> Result<Summary>
where
    R: Read + Seek,
    W: Write,
{
    let anonymizer = Anonymizer::from_config(config)?;
    let id_column = config.id_column.as_deref();

    let mut records: Vec<Record> = vec![];
    for batch in csv_reader(input, &anonymizer)? {
        let batch = batch?;
        let first_id = records.len() as RecordId;
        records.extend(records_from_batch(&batch, &anonymizer, id_column, first_id)?);
        debug!("Read batch of {} rows", batch.num_rows());
    }

    for column in config.identifier_columns() {
        debug!("Suppressing identifier column {}", column);
    }

    let anonymization = anonymizer.anonymize(&records)?;
    let batch = anonymization_to_batch(&anonymization, &anonymizer, id_column, group_by_partition)?;

    let mut writer = Writer::new(output);
    writer.write(&batch)?;

    Ok(anonymization.summary())
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = config_from_matches(matches)?;

    let input = matches
        .value_of("input")
        .expect("Missing value for 'input' argument");
    let file = File::open(input).with_context(|| format!("Failed to open {}", input))?;

    let output: Box<dyn Write> = match matches.value_of("output") {
        Some(path) => {
            Box::new(File::create(path).with_context(|| format!("Failed to create {}", path))?)
        }
        None => Box::new(std::io::stdout()),
    };

    let summary = anonymize_csv(file, output, &config, matches.is_present("group"))?;
    info!(
        records = summary.records,
        classes = summary.classes,
        min_class_size = summary.min_class_size,
        max_class_size = summary.max_class_size,
        unsplittable = summary.unsplittable,
        "Anonymized {}",
        input
    );

    Ok(())
}

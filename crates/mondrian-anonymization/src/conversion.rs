//! Conversion between Arrow record batches and the record model.

use crate::{
    anonymizer::Anonymizer,
    config::QuasiIdentifierKind,
    error::{AnonymizationError, Result},
    generalize::{AnonymizedRecord, Anonymization},
    record::{Record, RecordId, Value},
};
use arrow::{
    array::{Array, ArrayRef, Float64Array, StringArray, UInt64Array},
    compute::cast,
    csv::{reader::infer_file_schema, Reader, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{
    collections::HashSet,
    io::{Read, Seek, SeekFrom},
    sync::Arc,
};

pub const PARTITION_ID_COLUMN: &str = "partition_id";
pub const DEFAULT_ID_COLUMN: &str = "record_id";

/// Rows read to infer the schema of a CSV file.
pub const SCHEMA_INFERENCE_ROWS: usize = 1000;

/// `inferred` with every categorical quasi-identifier and sensitive column
/// read as `Utf8`, so values such as `007` or `02134` keep their spelling.
pub fn input_schema(inferred: &Schema, anonymizer: &Anonymizer) -> Schema {
    let textual: HashSet<&str> = anonymizer
        .quasi_identifiers()
        .iter()
        .filter(|qi| matches!(qi.kind, QuasiIdentifierKind::Categorical(_)))
        .map(|qi| qi.name.as_str())
        .chain(anonymizer.sensitive_attributes().iter().map(String::as_str))
        .collect();

    Schema::new(
        inferred
            .fields()
            .iter()
            .map(|field| {
                if textual.contains(field.name().as_str()) {
                    Field::new(field.name(), DataType::Utf8, true)
                } else {
                    field.clone()
                }
            })
            .collect(),
    )
}

/// CSV reader (with header row) whose schema is inferred from the data,
/// except for the columns [`input_schema`] keeps textual.
pub fn csv_reader<R: Read + Seek>(mut input: R, anonymizer: &Anonymizer) -> Result<Reader<R>> {
    let (inferred, _) = infer_file_schema(&mut input, b',', Some(SCHEMA_INFERENCE_ROWS), true)?;
    input.seek(SeekFrom::Start(0))?;

    Ok(ReaderBuilder::new()
        .has_header(true)
        .with_schema(Arc::new(input_schema(&inferred, anonymizer)))
        .build(input)?)
}

fn column(batch: &RecordBatch, name: &str) -> Result<ArrayRef> {
    let index = batch.schema().index_of(name).map_err(|_| {
        AnonymizationError::InvalidConfiguration(format!(
            "column {} is missing from the input table",
            name
        ))
    })?;
    Ok(batch.column(index).clone())
}

fn strings(array: &ArrayRef) -> Result<StringArray> {
    let array = cast(array, &DataType::Utf8)?;
    Ok(StringArray::from(array.data().clone()))
}

fn numbers(array: &ArrayRef) -> Result<Float64Array> {
    let array = cast(array, &DataType::Float64)?;
    Ok(Float64Array::from(array.data().clone()))
}

fn record_ids(batch: &RecordBatch, id_column: Option<&str>, first_id: RecordId) -> Result<Vec<RecordId>> {
    match id_column {
        None => Ok((0..batch.num_rows() as RecordId).map(|row| first_id + row).collect()),
        Some(name) => {
            let ids = cast(&column(batch, name)?, &DataType::UInt64)?;
            let ids = UInt64Array::from(ids.data().clone());
            (0..ids.len())
                .map(|row| {
                    if ids.is_null(row) {
                        Err(AnonymizationError::InvalidValue {
                            column: name.to_string(),
                            record: first_id + row as RecordId,
                            reason: "record ids must be non-negative integers",
                        })
                    } else {
                        Ok(ids.value(row))
                    }
                })
                .collect()
        }
    }
}

fn missing(column: &str, record: RecordId) -> AnonymizationError {
    AnonymizationError::InvalidValue {
        column: column.to_string(),
        record,
        reason: "value is missing or cannot be read as the declared kind",
    }
}

/// Reads the declared quasi-identifier and sensitive columns of `batch`.
/// Other columns are ignored. Without an `id_column`, rows are numbered
/// starting at `first_id`. Sensitive nulls stay `None`.
pub fn records_from_batch(
    batch: &RecordBatch,
    anonymizer: &Anonymizer,
    id_column: Option<&str>,
    first_id: RecordId,
) -> Result<Vec<Record>> {
    let ids = record_ids(batch, id_column, first_id)?;
    let mut records: Vec<Record> = ids.iter().map(|id| Record::new(*id)).collect();

    for quasi_identifier in anonymizer.quasi_identifiers() {
        let name = &quasi_identifier.name;
        let array = column(batch, name)?;

        match &quasi_identifier.kind {
            QuasiIdentifierKind::Numerical => {
                let values = numbers(&array)?;
                for (row, record) in records.iter_mut().enumerate() {
                    if values.is_null(row) {
                        return Err(missing(name, record.id));
                    }
                    record
                        .quasi_identifiers
                        .insert(name.clone(), Value::Numeric(values.value(row)));
                }
            }
            QuasiIdentifierKind::Categorical(_) => {
                let values = strings(&array)?;
                for (row, record) in records.iter_mut().enumerate() {
                    if values.is_null(row) {
                        return Err(missing(name, record.id));
                    }
                    record.quasi_identifiers.insert(
                        name.clone(),
                        Value::Categorical(values.value(row).to_string()),
                    );
                }
            }
        }
    }

    for name in anonymizer.sensitive_attributes() {
        let values = strings(&column(batch, name)?)?;
        for (row, record) in records.iter_mut().enumerate() {
            let value = if values.is_null(row) {
                None
            } else {
                Some(values.value(row).to_string())
            };
            record.sensitive.insert(name.clone(), value);
        }
    }

    Ok(records)
}

fn string_column<F>(records: &[&AnonymizedRecord], value: F) -> ArrayRef
where
    F: for<'r> Fn(&'r AnonymizedRecord) -> Option<&'r str>,
{
    Arc::new(records.iter().map(|record| value(record)).collect::<StringArray>())
}

/// Output table: the id column, generalized quasi-identifiers, sensitive
/// attributes and the partition id. Rows follow `anonymization.records`,
/// or partition order when `group_by_partition` is set.
pub fn anonymization_to_batch(
    anonymization: &Anonymization,
    anonymizer: &Anonymizer,
    id_column: Option<&str>,
    group_by_partition: bool,
) -> Result<RecordBatch> {
    let rows: Vec<&AnonymizedRecord> = if group_by_partition {
        anonymization.sorted_by_partition()
    } else {
        anonymization.records.iter().collect()
    };

    let mut fields = vec![Field::new(
        id_column.unwrap_or(DEFAULT_ID_COLUMN),
        DataType::UInt64,
        false,
    )];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(UInt64Array::from(
        rows.iter().map(|record| record.id).collect::<Vec<u64>>(),
    ))];

    for quasi_identifier in anonymizer.quasi_identifiers() {
        let name = quasi_identifier.name.as_str();
        fields.push(Field::new(name, DataType::Utf8, false));
        columns.push(string_column(&rows, |record| {
            record.quasi_identifiers.get(name).map(String::as_str)
        }));
    }

    for name in anonymizer.sensitive_attributes() {
        fields.push(Field::new(name, DataType::Utf8, true));
        columns.push(string_column(&rows, |record| {
            record.sensitive.get(name).and_then(|value| value.as_deref())
        }));
    }

    fields.push(Field::new(PARTITION_ID_COLUMN, DataType::UInt64, false));
    columns.push(Arc::new(UInt64Array::from(
        rows.iter()
            .map(|record| record.partition_id as u64)
            .collect::<Vec<u64>>(),
    )));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

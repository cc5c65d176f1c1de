use crate::{
    config::{QuasiIdentifier, QuasiIdentifierKind},
    error::{AnonymizationError, Result},
    hierarchy::{Hierarchy, NodeId},
    record::{Record, RecordId, Value},
};
use std::{collections::HashSet, sync::Arc};

/// Quasi-identifier values of every record for one column, with
/// categorical values already resolved to their hierarchy leaves.
#[derive(Debug)]
pub(crate) enum Column {
    Numerical(Vec<f64>),
    Categorical {
        hierarchy: Arc<Hierarchy>,
        leaves: Vec<NodeId>,
    },
}

/// Column-oriented view of the quasi-identifiers the partitioner works on.
/// Rows are addressed by their position in the input.
#[derive(Debug)]
pub(crate) struct Dataset {
    pub ids: Vec<RecordId>,
    pub columns: Vec<Column>,
}

impl Dataset {
    /// Fails on duplicate record ids, on missing or invalid quasi-identifier
    /// values and on missing sensitive attributes, so nothing is partitioned
    /// unless every record is usable.
    pub fn from_records(
        records: &[Record],
        quasi_identifiers: &[QuasiIdentifier],
        sensitive_attributes: &[String],
    ) -> Result<Self> {
        let mut ids = HashSet::with_capacity(records.len());
        for record in records {
            if !ids.insert(record.id) {
                return Err(AnonymizationError::InvalidValue {
                    column: "id".to_string(),
                    record: record.id,
                    reason: "record ids must be unique",
                });
            }
            for name in sensitive_attributes {
                sensitive_value(record, name)?;
            }
        }

        let mut columns = Vec::with_capacity(quasi_identifiers.len());

        for quasi_identifier in quasi_identifiers {
            let column = match &quasi_identifier.kind {
                QuasiIdentifierKind::Numerical => Column::Numerical(
                    records
                        .iter()
                        .map(|record| numeric_value(record, &quasi_identifier.name))
                        .collect::<Result<Vec<f64>>>()?,
                ),
                QuasiIdentifierKind::Categorical(hierarchy) => Column::Categorical {
                    hierarchy: hierarchy.clone(),
                    leaves: records
                        .iter()
                        .map(|record| categorical_leaf(record, &quasi_identifier.name, hierarchy))
                        .collect::<Result<Vec<NodeId>>>()?,
                },
            };
            columns.push(column);
        }

        Ok(Self {
            ids: records.iter().map(|record| record.id).collect(),
            columns,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn value<'a>(record: &'a Record, column: &str) -> Result<&'a Value> {
    record.quasi_identifiers.get(column).ok_or_else(|| {
        AnonymizationError::InvalidConfiguration(format!(
            "record {} has no value for the quasi-identifier {}",
            record.id, column
        ))
    })
}

pub(crate) fn sensitive_value<'a>(record: &'a Record, column: &str) -> Result<&'a Option<String>> {
    record.sensitive.get(column).ok_or_else(|| {
        AnonymizationError::InvalidConfiguration(format!(
            "record {} has no value for the sensitive attribute {}",
            record.id, column
        ))
    })
}

fn numeric_value(record: &Record, column: &str) -> Result<f64> {
    match value(record, column)? {
        Value::Numeric(number) if number.is_finite() => Ok(*number),
        Value::Numeric(_) => Err(AnonymizationError::InvalidValue {
            column: column.to_string(),
            record: record.id,
            reason: "numerical values must be finite",
        }),
        Value::Categorical(_) => Err(AnonymizationError::InvalidValue {
            column: column.to_string(),
            record: record.id,
            reason: "expected a numerical value",
        }),
    }
}

fn categorical_leaf(record: &Record, column: &str, hierarchy: &Hierarchy) -> Result<NodeId> {
    match value(record, column)? {
        Value::Categorical(label) => hierarchy.resolve(label),
        // Numbers may be codes in a hierarchy, e.g. zip codes.
        Value::Numeric(number) => hierarchy.resolve(&number.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::tests::letters;

    fn quasi_identifiers() -> Vec<QuasiIdentifier> {
        vec![
            QuasiIdentifier::numerical("age"),
            QuasiIdentifier::categorical(
                "letter",
                Arc::new(Hierarchy::new("letters", &letters()).unwrap()),
            ),
        ]
    }

    #[test]
    fn test_from_records() {
        let records = vec![
            Record::new(10)
                .with_quasi_identifier("age", 30)
                .with_quasi_identifier("letter", "A1"),
            Record::new(11)
                .with_quasi_identifier("age", 40)
                .with_quasi_identifier("letter", "B2"),
        ];

        let dataset = Dataset::from_records(&records, &quasi_identifiers(), &[]).unwrap();

        assert_eq!(dataset.ids, vec![10, 11]);
        assert_eq!(dataset.len(), 2);
        match &dataset.columns[0] {
            Column::Numerical(values) => assert_eq!(values, &vec![30.0, 40.0]),
            _ => panic!("age should be numerical"),
        }
        match &dataset.columns[1] {
            Column::Categorical { hierarchy, leaves } => {
                let labels: Vec<&str> = leaves.iter().map(|leaf| hierarchy.label(*leaf)).collect();
                assert_eq!(labels, vec!["A1", "B2"]);
            }
            _ => panic!("letter should be categorical"),
        }
    }

    #[test]
    fn test_unknown_value() {
        let records = vec![Record::new(0)
            .with_quasi_identifier("age", 30)
            .with_quasi_identifier("letter", "C1")];

        assert!(matches!(
            Dataset::from_records(&records, &quasi_identifiers(), &[]),
            Err(AnonymizationError::UnknownValue { .. })
        ));
    }

    #[test]
    fn test_missing_value() {
        let records = vec![Record::new(0).with_quasi_identifier("letter", "A1")];

        assert!(matches!(
            Dataset::from_records(&records, &quasi_identifiers(), &[]),
            Err(AnonymizationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_non_finite_value() {
        let records = vec![Record::new(3)
            .with_quasi_identifier("age", f64::NAN)
            .with_quasi_identifier("letter", "A1")];

        assert!(matches!(
            Dataset::from_records(&records, &quasi_identifiers(), &[]),
            Err(AnonymizationError::InvalidValue { record: 3, .. })
        ));
    }

    #[test]
    fn test_duplicate_record_id() {
        let records = vec![
            Record::new(4)
                .with_quasi_identifier("age", 30)
                .with_quasi_identifier("letter", "A1"),
            Record::new(4)
                .with_quasi_identifier("age", 31)
                .with_quasi_identifier("letter", "A2"),
        ];

        assert!(matches!(
            Dataset::from_records(&records, &quasi_identifiers(), &[]),
            Err(AnonymizationError::InvalidValue { record: 4, .. })
        ));
    }

    #[test]
    fn test_missing_sensitive_attribute() {
        let records = vec![
            Record::new(0)
                .with_quasi_identifier("age", 30)
                .with_quasi_identifier("letter", "A1")
                .with_sensitive("income", "<=50K"),
            Record::new(1)
                .with_quasi_identifier("age", 31)
                .with_quasi_identifier("letter", "A2"),
        ];

        assert!(matches!(
            Dataset::from_records(&records, &quasi_identifiers(), &["income".to_string()]),
            Err(AnonymizationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_null_sensitive_value_is_accepted() {
        let records = vec![Record::new(0)
            .with_quasi_identifier("age", 30)
            .with_quasi_identifier("letter", "A1")
            .with_null_sensitive("income")];

        assert!(Dataset::from_records(&records, &quasi_identifiers(), &["income".to_string()]).is_ok());
    }
}

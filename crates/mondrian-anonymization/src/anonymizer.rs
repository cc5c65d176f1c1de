use crate::{
    config::{AnonymizationConfig, QuasiIdentifier},
    dataset::Dataset,
    error::{AnonymizationError, Result},
    generalize::{generalize, Anonymization},
    partition::partition_dataset,
    record::Record,
};
use std::collections::HashSet;
use tracing::{info, warn};

/// Mondrian k-anonymizer for a fixed set of quasi-identifiers and
/// sensitive attributes.
#[derive(Debug, Clone)]
pub struct Anonymizer {
    k: usize,
    quasi_identifiers: Vec<QuasiIdentifier>,
    sensitive_attributes: Vec<String>,
}

impl Anonymizer {
    pub fn new(
        k: usize,
        quasi_identifiers: Vec<QuasiIdentifier>,
        sensitive_attributes: Vec<String>,
    ) -> Result<Self> {
        if k < 1 {
            return Err(AnonymizationError::InvalidConfiguration(format!(
                "k must be at least 1, got {}",
                k
            )));
        }

        let mut names = HashSet::new();
        for name in quasi_identifiers
            .iter()
            .map(|qi| qi.name.as_str())
            .chain(sensitive_attributes.iter().map(String::as_str))
        {
            if !names.insert(name) {
                return Err(AnonymizationError::InvalidConfiguration(format!(
                    "column {} is declared more than once",
                    name
                )));
            }
        }

        Ok(Self {
            k,
            quasi_identifiers,
            sensitive_attributes,
        })
    }

    pub fn from_config(config: &AnonymizationConfig) -> Result<Self> {
        Self::new(
            config.k,
            config.quasi_identifiers()?,
            config.sensitive_columns(),
        )
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn quasi_identifiers(&self) -> &[QuasiIdentifier] {
        &self.quasi_identifiers
    }

    pub fn sensitive_attributes(&self) -> &[String] {
        &self.sensitive_attributes
    }

    /// Partitions `records` into equivalence classes of at least `k`
    /// records and generalizes their quasi-identifiers.
    ///
    /// Every value is validated before partitioning starts; on error no
    /// output is produced.
    pub fn anonymize(&self, records: &[Record]) -> Result<Anonymization> {
        info!(
            k = self.k,
            records = records.len(),
            quasi_identifiers = self.quasi_identifiers.len(),
            "starting anonymization"
        );

        let dataset =
            Dataset::from_records(records, &self.quasi_identifiers, &self.sensitive_attributes)?;

        if !dataset.is_empty() && dataset.len() < self.k {
            warn!(
                k = self.k,
                records = dataset.len(),
                "fewer records than k, the single equivalence class is smaller than k"
            );
        }

        let terminals = partition_dataset(&dataset, self.k);
        let anonymization = generalize(
            records,
            &self.quasi_identifiers,
            &self.sensitive_attributes,
            &dataset,
            terminals,
        )?;

        let summary = anonymization.summary();
        info!(
            classes = summary.classes,
            min_class_size = summary.min_class_size,
            max_class_size = summary.max_class_size,
            mean_class_size = summary.mean_class_size,
            unsplittable = summary.unsplittable,
            "finished anonymization"
        );

        Ok(anonymization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_k_is_rejected() {
        assert!(matches!(
            Anonymizer::new(0, vec![QuasiIdentifier::numerical("age")], vec![]),
            Err(AnonymizationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_overlapping_columns_are_rejected() {
        assert!(Anonymizer::new(
            2,
            vec![QuasiIdentifier::numerical("age")],
            vec!["age".to_string()]
        )
        .is_err());
    }

    #[test]
    fn test_empty_input() {
        let anonymizer =
            Anonymizer::new(2, vec![QuasiIdentifier::numerical("age")], vec![]).unwrap();
        let anonymization = anonymizer.anonymize(&[]).unwrap();

        assert!(anonymization.records.is_empty());
        assert!(anonymization.classes.is_empty());
    }

    #[test]
    fn test_numerical_only() {
        let anonymizer =
            Anonymizer::new(2, vec![QuasiIdentifier::numerical("age")], vec![]).unwrap();
        let records: Vec<Record> = [18, 40, 46, 22, 22, 26, 32, 17, 29]
            .iter()
            .enumerate()
            .map(|(id, age)| Record::new(id as u64).with_quasi_identifier("age", *age))
            .collect();

        let anonymization = anonymizer.anonymize(&records).unwrap();

        assert!(anonymization.classes.iter().all(|class| class.len() >= 2));
        assert_eq!(
            anonymization
                .classes
                .iter()
                .map(|class| class.len())
                .sum::<usize>(),
            9
        );
    }

    #[test]
    fn test_largest_k_gives_a_single_class() {
        let anonymizer =
            Anonymizer::new(usize::MAX, vec![QuasiIdentifier::numerical("age")], vec![]).unwrap();
        let records: Vec<Record> = [18, 40, 46]
            .iter()
            .enumerate()
            .map(|(id, age)| Record::new(id as u64).with_quasi_identifier("age", *age))
            .collect();

        let anonymization = anonymizer.anonymize(&records).unwrap();

        assert_eq!(anonymization.classes.len(), 1);
        assert_eq!(anonymization.classes[0].generalized("age"), Some("18-46"));
    }

    #[test]
    fn test_missing_sensitive_attribute_is_rejected() {
        let anonymizer = Anonymizer::new(
            1,
            vec![QuasiIdentifier::numerical("age")],
            vec!["income".to_string()],
        )
        .unwrap();
        let records = vec![
            Record::new(0)
                .with_quasi_identifier("age", 30)
                .with_sensitive("income", "<=50K"),
            Record::new(1).with_quasi_identifier("age", 31),
        ];

        assert!(matches!(
            anonymizer.anonymize(&records),
            Err(AnonymizationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_duplicate_record_ids_are_rejected() {
        let anonymizer =
            Anonymizer::new(1, vec![QuasiIdentifier::numerical("age")], vec![]).unwrap();
        let records = vec![
            Record::new(9).with_quasi_identifier("age", 30),
            Record::new(9).with_quasi_identifier("age", 31),
        ];

        assert!(matches!(
            anonymizer.anonymize(&records),
            Err(AnonymizationError::InvalidValue { record: 9, .. })
        ));
    }
}

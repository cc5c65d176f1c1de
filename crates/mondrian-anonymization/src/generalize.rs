use crate::{
    config::QuasiIdentifier,
    dataset::{sensitive_value, Column, Dataset},
    error::Result,
    partition::{Bound, Partition, TerminalPartition},
    record::{Record, RecordId},
};
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};

/// A terminal partition together with the generalized value of every
/// quasi-identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct EquivalenceClass {
    pub partition_id: usize,
    pub record_ids: Vec<RecordId>,
    /// Generalized values in quasi-identifier declaration order.
    pub generalized: Vec<(String, String)>,
    /// Number of splits between the whole dataset and this class.
    pub depth: usize,
}

impl EquivalenceClass {
    pub fn len(&self) -> usize {
        self.record_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_ids.is_empty()
    }

    pub fn generalized(&self, column: &str) -> Option<&str> {
        self.generalized
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnonymizedRecord {
    pub id: RecordId,
    pub quasi_identifiers: BTreeMap<String, String>,
    pub sensitive: HashMap<String, Option<String>>,
    pub partition_id: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub records: usize,
    pub classes: usize,
    pub min_class_size: usize,
    pub max_class_size: usize,
    pub mean_class_size: f64,
    pub unsplittable: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Anonymization {
    /// One row per input record, in input order.
    pub records: Vec<AnonymizedRecord>,
    /// Equivalence classes ordered by partition id.
    pub classes: Vec<EquivalenceClass>,
    /// Partition ids of classes that had at least `2k` members but could
    /// not be split on any dimension.
    pub unsplittable: Vec<usize>,
}

impl Anonymization {
    /// Rows reordered so that members of a class are adjacent, classes in
    /// partition id order. Input order is kept within a class.
    pub fn sorted_by_partition(&self) -> Vec<&AnonymizedRecord> {
        self.records
            .iter()
            .sorted_by_key(|record| record.partition_id)
            .collect()
    }

    pub fn class(&self, partition_id: usize) -> Option<&EquivalenceClass> {
        self.classes.get(partition_id)
    }

    pub fn summary(&self) -> Summary {
        let sizes = || self.classes.iter().map(EquivalenceClass::len);
        Summary {
            records: self.records.len(),
            classes: self.classes.len(),
            min_class_size: sizes().min().unwrap_or(0),
            max_class_size: sizes().max().unwrap_or(0),
            mean_class_size: if self.classes.is_empty() {
                0.0
            } else {
                self.records.len() as f64 / self.classes.len() as f64
            },
            unsplittable: self.unsplittable.len(),
        }
    }
}

/// Formats a numerical interval as `min-max`, or a single value when both
/// ends coincide.
pub fn format_interval(min: f64, max: f64) -> String {
    if min == max {
        format!("{}", min)
    } else {
        format!("{}-{}", min, max)
    }
}

/// Generalized value of every quasi-identifier for `partition`.
pub(crate) fn generalize_partition(dataset: &Dataset, partition: &Partition) -> Vec<String> {
    dataset
        .columns
        .iter()
        .zip(&partition.bounds)
        .map(|(column, bound)| match (column, bound) {
            (_, Bound::Numerical { min, max }) => format_interval(*min, *max),
            (Column::Categorical { hierarchy, .. }, Bound::Categorical(node)) => {
                hierarchy.label(*node).to_string()
            }
            (Column::Numerical(_), Bound::Categorical(_)) => unreachable!(
                "bounds are derived from the column kind"
            ),
        })
        .collect()
}

/// Assigns partition ids in terminal order and builds the output rows.
pub(crate) fn generalize(
    records: &[Record],
    quasi_identifiers: &[QuasiIdentifier],
    sensitive_attributes: &[String],
    dataset: &Dataset,
    terminals: Vec<TerminalPartition>,
) -> Result<Anonymization> {
    let mut partition_ids = vec![0; records.len()];
    let mut generalized_values = Vec::with_capacity(terminals.len());
    let mut classes = Vec::with_capacity(terminals.len());
    let mut unsplittable = vec![];

    for (partition_id, terminal) in terminals.into_iter().enumerate() {
        let values = generalize_partition(dataset, &terminal.partition);

        for row in &terminal.partition.members {
            partition_ids[*row] = partition_id;
        }

        if terminal.unsplittable {
            unsplittable.push(partition_id);
        }

        classes.push(EquivalenceClass {
            partition_id,
            record_ids: terminal
                .partition
                .members
                .iter()
                .map(|row| dataset.ids[*row])
                .collect(),
            generalized: quasi_identifiers
                .iter()
                .map(|qi| qi.name.clone())
                .zip(values.iter().cloned())
                .collect(),
            depth: terminal.partition.depth,
        });
        generalized_values.push(values);
    }

    let records = records
        .iter()
        .zip(partition_ids)
        .map(|(record, partition_id)| {
            let sensitive = sensitive_attributes
                .iter()
                .map(|name| {
                    sensitive_value(record, name).map(|value| (name.clone(), value.clone()))
                })
                .collect::<Result<HashMap<String, Option<String>>>>()?;

            Ok(AnonymizedRecord {
                id: record.id,
                quasi_identifiers: quasi_identifiers
                    .iter()
                    .map(|qi| qi.name.clone())
                    .zip(generalized_values[partition_id].iter().cloned())
                    .collect(),
                sensitive,
                partition_id,
            })
        })
        .collect::<Result<Vec<AnonymizedRecord>>>()?;

    Ok(Anonymization {
        records,
        classes,
        unsplittable,
    })
}

//! Recursive Mondrian partitioning.
//!
//! Partitions are processed depth-first from an explicit stack. Children of
//! an accepted split are visited in the order the splitter returns them
//! (lower numerical half first, hierarchy children in declaration order),
//! so the order in which partitions become terminal, and with it every
//! partition id, is fixed for a given input.

use crate::{
    dataset::{Column, Dataset},
    hierarchy::NodeId,
    split::select_valid_split,
    width::{rank_dimensions, widths},
};
use itertools::{Itertools, MinMaxResult};
use tracing::{debug, warn};

/// Summary of one quasi-identifier over the members of a partition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Bound {
    Numerical { min: f64, max: f64 },
    /// Lowest common ancestor of the leaves present.
    Categorical(NodeId),
}

#[derive(Clone, Debug)]
pub(crate) struct Partition {
    /// Row positions into the dataset, in input order.
    pub members: Vec<usize>,
    pub bounds: Vec<Bound>,
    pub depth: usize,
}

impl Partition {
    /// `members` must not be empty.
    pub fn new(dataset: &Dataset, members: Vec<usize>, depth: usize) -> Self {
        let bounds = dataset
            .columns
            .iter()
            .map(|column| match column {
                Column::Numerical(values) => {
                    match members.iter().map(|row| values[*row]).minmax_by(f64::total_cmp) {
                        MinMaxResult::NoElements => Bound::Numerical { min: 0.0, max: 0.0 },
                        MinMaxResult::OneElement(value) => Bound::Numerical {
                            min: value,
                            max: value,
                        },
                        MinMaxResult::MinMax(min, max) => Bound::Numerical { min, max },
                    }
                }
                Column::Categorical { hierarchy, leaves } => Bound::Categorical(
                    hierarchy
                        .lowest_common_ancestor(members.iter().map(|row| leaves[*row]))
                        .unwrap_or_else(|| hierarchy.root()),
                ),
            })
            .collect();

        Self {
            members,
            bounds,
            depth,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug)]
pub(crate) struct TerminalPartition {
    pub partition: Partition,
    /// At least `2k` members, yet no dimension could be split.
    pub unsplittable: bool,
}

/// Splits the whole dataset into terminal partitions, returned in the order
/// they became terminal.
pub(crate) fn partition_dataset(dataset: &Dataset, k: usize) -> Vec<TerminalPartition> {
    if dataset.is_empty() {
        return vec![];
    }

    let root = Partition::new(dataset, (0..dataset.len()).collect(), 0);
    let global_bounds = root.bounds.clone();

    let mut partitions = vec![root];
    let mut finished_partitions = vec![];

    while let Some(partition) = partitions.pop() {
        if partition.len() < k.saturating_mul(2) {
            finished_partitions.push(TerminalPartition {
                partition,
                unsplittable: false,
            });
            continue;
        }

        let widths = widths(dataset, &partition, &global_bounds);
        let ranking = rank_dimensions(&widths);

        match select_valid_split(dataset, &partition, &ranking, k) {
            Some(split) => {
                debug!(
                    dimension = split.dimension,
                    width = widths[split.dimension],
                    size = partition.len(),
                    children = split.children.len(),
                    "split partition"
                );
                partitions.extend(split.children.into_iter().rev());
            }
            None => {
                warn!(
                    size = partition.len(),
                    depth = partition.depth,
                    "UnsplittablePartition: no dimension yields a valid split"
                );
                finished_partitions.push(TerminalPartition {
                    partition,
                    unsplittable: true,
                });
            }
        }
    }

    finished_partitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::QuasiIdentifier,
        hierarchy::{tests::letters, Hierarchy},
        record::Record,
    };
    use std::{collections::HashSet, sync::Arc};

    fn dataset(rows: &[(i32, &str)]) -> Dataset {
        let records: Vec<Record> = rows
            .iter()
            .enumerate()
            .map(|(id, (age, letter))| {
                Record::new(id as u64)
                    .with_quasi_identifier("age", *age)
                    .with_quasi_identifier("letter", *letter)
            })
            .collect();

        let quasi_identifiers = vec![
            QuasiIdentifier::numerical("age"),
            QuasiIdentifier::categorical(
                "letter",
                Arc::new(Hierarchy::new("letters", &letters()).unwrap()),
            ),
        ];

        Dataset::from_records(&records, &quasi_identifiers, &[]).unwrap()
    }

    #[test]
    fn test_bounds() {
        let dataset = dataset(&[(30, "A1"), (20, "A2"), (50, "A1")]);
        let partition = Partition::new(&dataset, vec![0, 1, 2], 0);

        assert_eq!(partition.bounds[0], Bound::Numerical { min: 20.0, max: 50.0 });
        match (&partition.bounds[1], &dataset.columns[1]) {
            (Bound::Categorical(node), Column::Categorical { hierarchy, .. }) => {
                assert_eq!(hierarchy.label(*node), "A")
            }
            _ => panic!("letter should be categorical"),
        }

        let single = Partition::new(&dataset, vec![2], 1);
        assert_eq!(single.bounds[0], Bound::Numerical { min: 50.0, max: 50.0 });
    }

    #[test]
    fn test_small_dataset_is_a_single_partition() {
        let dataset = dataset(&[(10, "A1"), (20, "B1"), (30, "A2")]);
        let partitions = partition_dataset(&dataset, 2);

        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].partition.members, vec![0, 1, 2]);
        assert!(!partitions[0].unsplittable);
    }

    #[test]
    fn test_huge_k_keeps_everything_together() {
        let dataset = dataset(&[(10, "A1"), (20, "B1"), (30, "A2")]);
        let partitions = partition_dataset(&dataset, usize::MAX);

        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].partition.members, vec![0, 1, 2]);
        assert!(!partitions[0].unsplittable);
    }

    #[test]
    fn test_identical_records_are_unsplittable() {
        let dataset = dataset(&[(10, "A1"); 6]);
        let partitions = partition_dataset(&dataset, 2);

        assert_eq!(partitions.len(), 1);
        assert!(partitions[0].unsplittable);
    }

    #[test]
    fn test_members_are_covered_exactly_once() {
        let rows: Vec<(i32, &str)> = (0..37)
            .map(|i| (i * 7 % 23, ["A1", "A2", "B1", "B2"][i as usize % 4]))
            .collect();
        let dataset = dataset(&rows);

        for k in 1..=10 {
            let partitions = partition_dataset(&dataset, k);

            let mut seen = HashSet::new();
            for terminal in &partitions {
                assert!(terminal.partition.len() >= k);
                for member in &terminal.partition.members {
                    assert!(seen.insert(*member));
                }
            }
            assert_eq!(seen.len(), rows.len());
        }
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = dataset(&[]);
        assert!(partition_dataset(&dataset, 3).is_empty());
    }
}

use crate::{
    dataset::{Column, Dataset},
    hierarchy::NodeId,
    partition::{Bound, Partition},
};

#[derive(Debug)]
pub(crate) struct Split {
    pub dimension: usize,
    pub children: Vec<Partition>,
}

/// Lower median: the element at `(n - 1) / 2` of the sorted values.
fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let index = (values.len() - 1) / 2;
    let (_, median, _) = values.select_nth_unstable_by(index, f64::total_cmp);
    Some(*median)
}

fn split_numerical(values: &[f64], partition: &Partition, max: f64) -> Option<Vec<Vec<usize>>> {
    let median = median(partition.members.iter().map(|row| values[*row]).collect())?;

    // Nothing would end up above the median.
    if median >= max {
        return None;
    }

    let (lower, upper): (Vec<usize>, Vec<usize>) = partition
        .members
        .iter()
        .partition(|row| values[**row] <= median);

    Some(vec![lower, upper])
}

fn split_categorical(column: &Column, partition: &Partition, node: NodeId) -> Option<Vec<Vec<usize>>> {
    let (hierarchy, leaves) = match column {
        Column::Categorical { hierarchy, leaves } => (hierarchy, leaves),
        Column::Numerical(_) => return None,
    };

    let groups = hierarchy.child_groups(node);
    let mut children: Vec<Vec<usize>> = vec![vec![]; groups.len()];

    for row in &partition.members {
        // The node is the common ancestor of every member, so exactly one
        // child group holds the member's leaf.
        if let Some(index) = groups.iter().position(|group| group.contains(&leaves[*row])) {
            children[index].push(*row);
        }
    }

    children.retain(|child| !child.is_empty());
    if children.len() < 2 {
        return None;
    }

    Some(children)
}

/// Candidate member groups for splitting `partition` along `dimension`.
/// Empty groups are dropped; `None` when fewer than two groups remain.
pub(crate) fn split_partition(
    dataset: &Dataset,
    partition: &Partition,
    dimension: usize,
) -> Option<Vec<Vec<usize>>> {
    let column = &dataset.columns[dimension];
    match (column, &partition.bounds[dimension]) {
        (Column::Numerical(values), Bound::Numerical { max, .. }) => {
            split_numerical(values, partition, *max)
        }
        (Column::Categorical { .. }, Bound::Categorical(node)) => {
            split_categorical(column, partition, *node)
        }
        _ => None,
    }
}

/// Every non-empty group must hold at least `k` members, and there must be
/// at least two of them.
pub(crate) fn is_valid_split(groups: &[Vec<usize>], k: usize) -> bool {
    let non_empty = groups.iter().filter(|group| !group.is_empty()).count();
    non_empty >= 2
        && groups
            .iter()
            .all(|group| group.is_empty() || group.len() >= k)
}

/// Tries `ordered_dimensions` in turn and returns the first valid split.
pub(crate) fn select_valid_split(
    dataset: &Dataset,
    partition: &Partition,
    ordered_dimensions: &[usize],
    k: usize,
) -> Option<Split> {
    ordered_dimensions.iter().find_map(|dimension| {
        let groups = split_partition(dataset, partition, *dimension)?;
        if !is_valid_split(&groups, k) {
            return None;
        }

        Some(Split {
            dimension: *dimension,
            children: groups
                .into_iter()
                .filter(|group| !group.is_empty())
                .map(|group| Partition::new(dataset, group, partition.depth + 1))
                .collect(),
        })
    })
}

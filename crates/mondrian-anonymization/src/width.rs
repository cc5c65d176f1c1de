use crate::{
    dataset::{Column, Dataset},
    partition::{Bound, Partition},
};
use std::cmp::Ordering;

/// Normalized spread of one dimension of `partition`, in `[0, 1]`.
///
/// Numerical dimensions use the value range relative to the global range.
/// Categorical dimensions use the height of the lowest common ancestor of
/// the values present relative to the height of the whole hierarchy.
pub(crate) fn dimension_width(column: &Column, bound: &Bound, global_bound: &Bound) -> f64 {
    match (column, bound, global_bound) {
        (
            Column::Numerical(_),
            Bound::Numerical { min, max },
            Bound::Numerical {
                min: global_min,
                max: global_max,
            },
        ) => {
            let global_range = global_max - global_min;
            if global_range > 0.0 {
                (max - min) / global_range
            } else {
                0.0
            }
        }
        (Column::Categorical { hierarchy, .. }, Bound::Categorical(node), _) => {
            let total_height = hierarchy.height(hierarchy.root());
            if total_height > 0 {
                hierarchy.height(*node) as f64 / total_height as f64
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

pub(crate) fn widths(dataset: &Dataset, partition: &Partition, global_bounds: &[Bound]) -> Vec<f64> {
    dataset
        .columns
        .iter()
        .zip(&partition.bounds)
        .zip(global_bounds)
        .map(|((column, bound), global_bound)| dimension_width(column, bound, global_bound))
        .collect()
}

/// Dimensions worth trying, widest first. Equal widths keep declaration
/// order; dimensions of width 0 cannot be split and are left out.
pub(crate) fn rank_dimensions(widths: &[f64]) -> Vec<usize> {
    let mut ranking: Vec<usize> = (0..widths.len()).filter(|i| widths[*i] > 0.0).collect();
    // Stable sort, so ties stay in declaration order.
    ranking.sort_by(|a, b| widths[*b].partial_cmp(&widths[*a]).unwrap_or(Ordering::Equal));
    ranking
}

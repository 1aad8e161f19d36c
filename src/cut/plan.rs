//! The per-axis slice/sum plan assembled from executor directives.
//!
//! Executors return directives instead of mutating a shared slice array;
//! the plan merges them, applies the slicing in one pass and renumbers the
//! summed axes for every dimension that collapsed to a scalar on the way.

use ndarray::{Array1, ArrayD, Axis, SliceInfoElem};

use crate::wave::Wave;

/// What one executor wants done with one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AxisDirective {
    /// Collapse the axis by selecting a single index.
    SelectIndex(usize),
    /// Sum over the entire axis.
    SumAll,
    /// Sum over the half-open index range `[lo, hi)`.
    SumRange(usize, usize),
}

/// Per-axis slice state after merging directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisSlice {
    Full,
    Index(usize),
    Range(usize, usize),
}

/// The merged plan for one cut: slice states plus the axes to sum.
///
/// Axis numbers are in the *source* array's numbering throughout; `apply`
/// translates them to post-slicing positions internally.
#[derive(Debug, Clone)]
pub(crate) struct ReductionPlan {
    slices: Vec<AxisSlice>,
    sum_axes: Vec<usize>,
}

impl ReductionPlan {
    pub(crate) fn new(ndim: usize) -> Self {
        Self {
            slices: vec![AxisSlice::Full; ndim],
            sum_axes: Vec::new(),
        }
    }

    /// Merge one directive. The registry's mutual-exclusion rule guarantees
    /// at most one directive per axis.
    pub(crate) fn set(&mut self, axis: usize, directive: AxisDirective) {
        match directive {
            AxisDirective::SelectIndex(i) => self.slices[axis] = AxisSlice::Index(i),
            AxisDirective::SumAll => {
                self.slices[axis] = AxisSlice::Full;
                self.sum_axes.push(axis);
            }
            AxisDirective::SumRange(lo, hi) => {
                self.slices[axis] = AxisSlice::Range(lo, hi);
                self.sum_axes.push(axis);
            }
        }
    }

    /// Apply the plan to a wave.
    ///
    /// Returns the reduced buffer, the coordinate vectors of the surviving
    /// axes (in source order) and the source-numbered list of axes removed
    /// by the plan, which the free-line pass uses to shift its own axis
    /// numbers.
    pub(crate) fn apply(&self, wave: &Wave) -> (ArrayD<f64>, Vec<Option<Array1<f64>>>, Vec<usize>) {
        let elems: Vec<SliceInfoElem> = self
            .slices
            .iter()
            .map(|s| match *s {
                AxisSlice::Full => SliceInfoElem::Slice {
                    start: 0,
                    end: None,
                    step: 1,
                },
                AxisSlice::Index(i) => SliceInfoElem::Index(i as isize),
                AxisSlice::Range(lo, hi) => SliceInfoElem::Slice {
                    start: lo as isize,
                    end: Some(hi as isize),
                    step: 1,
                },
            })
            .collect();
        let mut data = wave.data.slice(elems.as_slice()).to_owned();

        // Scalar-index slicing already dropped those axes, so every summed
        // axis shifts down by the number of collapsed axes before it.
        let collapsed: Vec<usize> = self
            .slices
            .iter()
            .enumerate()
            .filter_map(|(ax, s)| matches!(s, AxisSlice::Index(_)).then_some(ax))
            .collect();
        let mut shifted: Vec<usize> = self
            .sum_axes
            .iter()
            .map(|&s| s - collapsed.iter().filter(|&&c| c < s).count())
            .collect();
        shifted.sort_unstable_by(|a, b| b.cmp(a));
        for ax in shifted {
            data = data.sum_axis(Axis(ax));
        }

        let kept_axes: Vec<Option<Array1<f64>>> = (0..wave.ndim())
            .filter(|ax| !collapsed.contains(ax) && !self.sum_axes.contains(ax))
            .map(|ax| wave.axes[ax].clone())
            .collect();

        let mut removed: Vec<usize> = collapsed;
        removed.extend_from_slice(&self.sum_axes);
        removed.sort_unstable();

        (data, kept_axes, removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    fn counting_wave(shape: &[usize]) -> Wave {
        let n: usize = shape.iter().product();
        let data = ArrayD::from_shape_vec(IxDyn(shape), (0..n).map(|v| v as f64).collect())
            .unwrap();
        Wave::from_data(data)
    }

    #[test]
    fn select_index_collapses_axis() {
        let w = counting_wave(&[4, 5, 6]);
        let mut plan = ReductionPlan::new(3);
        plan.set(0, AxisDirective::SelectIndex(0));
        plan.set(2, AxisDirective::SelectIndex(0));
        let (data, kept, removed) = plan.apply(&w);
        assert_eq!(data.shape(), &[5]);
        assert_eq!(kept.len(), 1);
        assert_eq!(removed, vec![0, 2]);
        assert_eq!(data[IxDyn(&[2])], w.data[IxDyn(&[0, 2, 0])]);
    }

    #[test]
    fn sum_range_reduces_by_summation() {
        let w = counting_wave(&[4, 5, 6]);
        let mut plan = ReductionPlan::new(3);
        plan.set(1, AxisDirective::SumRange(1, 3));
        let (data, _, removed) = plan.apply(&w);
        assert_eq!(data.shape(), &[4, 6]);
        assert_eq!(removed, vec![1]);
        let expected = w.data[IxDyn(&[2, 1, 3])] + w.data[IxDyn(&[2, 2, 3])];
        assert_eq!(data[IxDyn(&[2, 3])], expected);
    }

    #[test]
    fn sum_axes_renumber_after_scalar_collapse() {
        // Axis 0 collapses to a scalar index, so summing axis 2 must target
        // position 1 of the sliced array.
        let w = counting_wave(&[3, 4, 5]);
        let mut plan = ReductionPlan::new(3);
        plan.set(0, AxisDirective::SelectIndex(1));
        plan.set(2, AxisDirective::SumAll);
        let (data, _, removed) = plan.apply(&w);
        assert_eq!(data.shape(), &[4]);
        assert_eq!(removed, vec![0, 2]);
        let manual: f64 = (0..5).map(|k| w.data[IxDyn(&[1, 2, k])]).sum();
        assert_eq!(data[IxDyn(&[2])], manual);
    }
}

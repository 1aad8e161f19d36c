//! The cut computation: resolve the enabled executors into one slice/sum
//! plan, apply it, then run the free-line interpolation pass.
//!
//! Axes the caller wants to keep are excluded from the plan (`ignore`); a
//! free-line reference excludes the line's two underlying axes instead and
//! queues the line for the second pass. Axis numbers stored in a free line
//! refer to the source array, so they are shifted down for every axis the
//! plan (or an earlier line) already removed.

use std::collections::BTreeSet;

use super::axes::AxisRef;
use super::free_line::FreeLineExecutor;
use super::plan::ReductionPlan;
use super::registry::ExecutorRegistry;
use crate::error::CutError;
use crate::wave::Wave;

impl ExecutorRegistry {
    /// Compute the reduced wave for the 1 or 2 axes the caller keeps.
    ///
    /// A two-axis result is transposed when the request is axis-swapped
    /// (first literal index greater than the second, or the second entry is
    /// a free-line reference), so the first requested axis becomes the
    /// first dimension.
    pub fn make_wave(&self, wave: &Wave, axes: &[AxisRef]) -> Result<Wave, CutError> {
        let start = std::time::Instant::now();
        if axes.is_empty() || axes.len() > 2 {
            return Err(CutError::InvalidAxisCount(axes.len()));
        }
        if axes.len() == 2 && axes[0] == axes[1] {
            return Err(CutError::DuplicateAxis(axes[0]));
        }

        // Axes exempt from the plan: literal kept axes, plus the two axes
        // under each requested free line.
        let mut ignore: BTreeSet<usize> = BTreeSet::new();
        let mut lines: Vec<&FreeLineExecutor> = Vec::new();
        for r in axes {
            match *r {
                AxisRef::Axis(axis) => {
                    if axis >= wave.ndim() {
                        return Err(CutError::AxisOutOfRange {
                            axis,
                            ndim: wave.ndim(),
                        });
                    }
                    ignore.insert(axis);
                }
                AxisRef::Line(id) => {
                    let fl = self
                        .find_free_line(id)
                        .ok_or(CutError::DanglingFreeLine(id))?;
                    for &axis in fl.axes() {
                        if axis >= wave.ndim() {
                            return Err(CutError::AxisOutOfRange {
                                axis,
                                ndim: wave.ndim(),
                            });
                        }
                        ignore.insert(axis);
                    }
                    lines.push(fl);
                }
            }
        }

        let mut plan = ReductionPlan::new(wave.ndim());
        for executor in self.build_execution_list(wave.ndim()) {
            for (axis, directive) in executor.directives(wave, &ignore) {
                plan.set(axis, directive);
            }
        }
        let (data, kept_axes, mut removed) = plan.apply(wave);
        let mut result = Wave {
            data,
            axes: kept_axes,
        };

        // Free-line pass. `removed` holds source-numbered axes gone from
        // the intermediate wave; each applied line removes one more (its
        // higher axis), so a second line shifts past the first.
        for fl in lines {
            let [a, b] = *fl.axes();
            let shift =
                |axis: usize| axis - removed.iter().filter(|&&gone| gone < axis).count();
            result = fl.execute(&result, [shift(a), shift(b)]);
            removed.push(a.max(b));
        }

        if axes.len() == 2 && result.ndim() == 2 {
            let swap = match (axes[0], axes[1]) {
                (AxisRef::Axis(a), AxisRef::Axis(b)) => a > b,
                (AxisRef::Axis(_), AxisRef::Line(_)) => true,
                _ => false,
            };
            if swap {
                let Wave { data, axes: mut coords } = result;
                coords.swap(0, 1);
                result = Wave {
                    data: data.reversed_axes(),
                    axes: coords,
                };
            }
        }

        log::debug!(
            "cut {:?} -> shape {:?} in {:.2?}",
            axes,
            result.shape(),
            start.elapsed()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cut::executor::{AllExecutor, RegionExecutor};
    use ndarray::{ArrayD, IxDyn};

    fn counting_wave(shape: &[usize]) -> Wave {
        let n: usize = shape.iter().product();
        let data =
            ArrayD::from_shape_vec(IxDyn(shape), (0..n).map(|v| v as f64).collect()).unwrap();
        Wave::from_data(data)
    }

    #[test]
    fn default_cut_indexes_other_axes_at_zero() {
        let w = counting_wave(&[4, 5, 6]);
        let reg = ExecutorRegistry::new();
        for k in 0..3 {
            let res = reg.make_wave(&w, &[AxisRef::Axis(k)]).unwrap();
            assert_eq!(res.data.shape(), &[w.shape()[k]]);
            for i in 0..w.shape()[k] {
                let mut idx = [0usize, 0, 0];
                idx[k] = i;
                assert_eq!(res.data[IxDyn(&[i])], w.data[IxDyn(&idx)]);
            }
        }
    }

    #[test]
    fn all_executors_sum_the_other_axes() {
        let w = counting_wave(&[3, 4, 5]);
        let mut reg = ExecutorRegistry::new();
        reg.append(AllExecutor::new(0));
        reg.append(AllExecutor::new(2));
        let res = reg.make_wave(&w, &[AxisRef::Axis(1)]).unwrap();
        assert_eq!(res.data.shape(), &[4]);
        for j in 0..4 {
            let manual: f64 = (0..3)
                .flat_map(|i| (0..5).map(move |k| (i, k)))
                .map(|(i, k)| w.data[IxDyn(&[i, j, k])])
                .sum();
            assert_eq!(res.data[IxDyn(&[j])], manual);
        }
    }

    #[test]
    fn region_scenario_matches_manual_reduction() {
        // arr (4,5,6), Region on axis 1 over indices [1,3), cut on [0,2]:
        // result (4,6) == arr[:, 1:3, :].sum(axis=1)
        let w = counting_wave(&[4, 5, 6]);
        let mut reg = ExecutorRegistry::new();
        reg.append(RegionExecutor::new(vec![1], vec![[1.0, 3.0]]));
        let res = reg
            .make_wave(&w, &[AxisRef::Axis(0), AxisRef::Axis(2)])
            .unwrap();
        assert_eq!(res.data.shape(), &[4, 6]);
        for i in 0..4 {
            for k in 0..6 {
                let manual = w.data[IxDyn(&[i, 1, k])] + w.data[IxDyn(&[i, 2, k])];
                assert_eq!(res.data[IxDyn(&[i, k])], manual);
            }
        }
    }

    #[test]
    fn swapped_request_transposes_the_result() {
        let w = counting_wave(&[4, 5, 6]);
        let reg = ExecutorRegistry::new();
        let res = reg
            .make_wave(&w, &[AxisRef::Axis(2), AxisRef::Axis(1)])
            .unwrap();
        assert_eq!(res.data.shape(), &[6, 5]);
        for j in 0..5 {
            for k in 0..6 {
                assert_eq!(res.data[IxDyn(&[k, j])], w.data[IxDyn(&[0, j, k])]);
            }
        }
    }

    #[test]
    fn natural_order_request_is_not_transposed() {
        let w = counting_wave(&[4, 5, 6]);
        let reg = ExecutorRegistry::new();
        let res = reg
            .make_wave(&w, &[AxisRef::Axis(1), AxisRef::Axis(2)])
            .unwrap();
        assert_eq!(res.data.shape(), &[5, 6]);
        assert_eq!(res.data[IxDyn(&[2, 3])], w.data[IxDyn(&[0, 2, 3])]);
    }

    #[test]
    fn free_line_cut_over_a_plane() {
        let w = counting_wave(&[4, 5]);
        let mut reg = ExecutorRegistry::new();
        let id = reg.add_free_line([0, 1], [[0.0, 0.0], [3.0, 4.0]]);
        let res = reg.make_wave(&w, &[AxisRef::Line(id)]).unwrap();
        assert_eq!(res.data.shape(), &[6]);
        let coord = res.axes[0].as_ref().unwrap();
        assert_eq!(coord.len(), 6);
        assert!((coord[5] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn free_line_axes_shift_past_removed_axes() {
        // Line over axes (1, 2); axis 0 collapses via Default, so the
        // line's axes sit at (0, 1) of the intermediate wave.
        let w = counting_wave(&[3, 4, 5]);
        let mut reg = ExecutorRegistry::new();
        let id = reg.add_free_line([1, 2], [[0.0, 0.0], [3.0, 4.0]]);
        let res = reg.make_wave(&w, &[AxisRef::Line(id)]).unwrap();
        assert_eq!(res.data.shape(), &[6]);
        // First sample is the corner value of the axis-0=0 plane.
        assert_eq!(res.data[IxDyn(&[0])], w.data[IxDyn(&[0, 0, 0])]);
    }

    #[test]
    fn literal_then_line_request_is_transposed() {
        let w = counting_wave(&[4, 5, 3]);
        let mut reg = ExecutorRegistry::new();
        let id = reg.add_free_line([0, 1], [[0.0, 0.0], [3.0, 4.0]]);
        let res = reg
            .make_wave(&w, &[AxisRef::Axis(2), AxisRef::Line(id)])
            .unwrap();
        // Natural order puts the synthetic line axis first; the request
        // asked for axis 2 first, so the result is transposed.
        assert_eq!(res.data.shape(), &[3, 6]);
        let res2 = reg
            .make_wave(&w, &[AxisRef::Line(id), AxisRef::Axis(2)])
            .unwrap();
        assert_eq!(res2.data.shape(), &[6, 3]);
    }

    #[test]
    fn malformed_requests_are_rejected() {
        let w = counting_wave(&[3, 3]);
        let reg = ExecutorRegistry::new();
        assert!(matches!(
            reg.make_wave(&w, &[]),
            Err(CutError::InvalidAxisCount(0))
        ));
        assert!(matches!(
            reg.make_wave(
                &w,
                &[AxisRef::Axis(0), AxisRef::Axis(1), AxisRef::Axis(0)]
            ),
            Err(CutError::InvalidAxisCount(3))
        ));
        assert!(matches!(
            reg.make_wave(&w, &[AxisRef::Axis(1), AxisRef::Axis(1)]),
            Err(CutError::DuplicateAxis(AxisRef::Axis(1)))
        ));
        assert!(matches!(
            reg.make_wave(&w, &[AxisRef::Axis(7)]),
            Err(CutError::AxisOutOfRange { axis: 7, .. })
        ));
    }

    #[test]
    fn executor_beyond_the_wave_rank_contributes_nothing() {
        let w = counting_wave(&[3, 4]);
        let mut reg = ExecutorRegistry::new();
        reg.add_point(vec![5], vec![1.0]);
        let res = reg.make_wave(&w, &[AxisRef::Axis(1)]).unwrap();
        assert_eq!(res.data.shape(), &[4]);
        assert_eq!(res.data[IxDyn(&[1])], w.data[IxDyn(&[0, 1])]);
    }

    #[test]
    fn dangling_line_reference_is_an_error() {
        let w = counting_wave(&[3, 3]);
        let mut reg = ExecutorRegistry::new();
        let id = reg.add_free_line([0, 1], [[0.0, 0.0], [1.0, 1.0]]);
        reg.remove_at(0).unwrap();
        assert!(matches!(
            reg.make_wave(&w, &[AxisRef::Line(id)]),
            Err(CutError::DanglingFreeLine(_))
        ));
    }

    #[test]
    fn disabled_free_line_is_still_cuttable() {
        // Lines are selected by reference; enablement does not gate them.
        let w = counting_wave(&[4, 5]);
        let mut reg = ExecutorRegistry::new();
        let id = reg.add_free_line([0, 1], [[0.0, 0.0], [3.0, 4.0]]);
        reg.disable_at(0).unwrap();
        let res = reg.make_wave(&w, &[AxisRef::Line(id)]).unwrap();
        assert_eq!(res.data.shape(), &[6]);
    }

    #[test]
    fn kept_axes_preserve_their_coordinates() {
        let mut w = counting_wave(&[3, 4]);
        w.axes[1] = Some(ndarray::Array1::from(vec![10.0, 20.0, 30.0, 40.0]));
        let reg = ExecutorRegistry::new();
        let res = reg.make_wave(&w, &[AxisRef::Axis(1)]).unwrap();
        assert_eq!(
            res.axes[0].as_ref().unwrap().to_vec(),
            vec![10.0, 20.0, 30.0, 40.0]
        );
    }
}

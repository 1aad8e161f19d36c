//! The engine's array abstraction: a numeric N-D buffer plus one optional
//! physical coordinate vector per dimension.
//!
//! Coordinate vectors are assumed to be uniform grids; position↔index
//! conversion is derived from the first and last coordinate values. An axis
//! with no coordinate vector uses the index itself as the coordinate.

use ndarray::{Array1, ArrayD};

use crate::error::WaveError;

/// An N-dimensional array with per-axis physical coordinates.
///
/// `axes` always has one entry per dimension; `None` means "index units".
/// The engine reads a borrowed `Wave` and produces a new, independent one.
#[derive(Debug, Clone)]
pub struct Wave {
    /// The numeric buffer.
    pub data: ArrayD<f64>,
    /// Per-dimension coordinate vectors, `None` for index units.
    pub axes: Vec<Option<Array1<f64>>>,
}

impl Wave {
    /// Create a wave from a buffer and explicit per-axis coordinates.
    ///
    /// Every `Some` vector must match its dimension's length.
    pub fn new(data: ArrayD<f64>, axes: Vec<Option<Array1<f64>>>) -> Result<Self, WaveError> {
        if axes.len() != data.ndim() {
            return Err(WaveError::AxisCountMismatch {
                expected: data.ndim(),
                got: axes.len(),
            });
        }
        for (axis, ax) in axes.iter().enumerate() {
            if let Some(v) = ax {
                if v.len() != data.shape()[axis] {
                    return Err(WaveError::AxisLengthMismatch {
                        axis,
                        expected: data.shape()[axis],
                        got: v.len(),
                    });
                }
            }
        }
        Ok(Self { data, axes })
    }

    /// Create a wave with index-unit coordinates on every axis.
    pub fn from_data(data: ArrayD<f64>) -> Self {
        let axes = vec![None; data.ndim()];
        Self { data, axes }
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Shape of the buffer.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Whether the axis carries an explicit coordinate vector.
    pub fn axis_is_valid(&self, axis: usize) -> bool {
        self.axes.get(axis).is_some_and(|a| a.is_some())
    }

    /// Coordinate vector for an axis, falling back to `0, 1, 2, ...`.
    pub fn axis_values(&self, axis: usize) -> Array1<f64> {
        match self.axes.get(axis) {
            Some(Some(v)) => v.clone(),
            _ => Array1::from_iter((0..self.shape()[axis]).map(|i| i as f64)),
        }
    }

    /// Convert a physical position on `axis` to the nearest integer index.
    ///
    /// The result is not clamped; callers that need a valid index clamp it
    /// to the axis bounds themselves.
    pub fn pos_to_point(&self, pos: f64, axis: usize) -> i64 {
        match self.axes.get(axis) {
            Some(Some(v)) if v.len() > 1 => {
                let x0 = v[0];
                let x1 = v[v.len() - 1];
                let dx = (x1 - x0) / (v.len() - 1) as f64;
                if dx == 0.0 {
                    0
                } else {
                    ((pos - x0) / dx).round() as i64
                }
            }
            Some(Some(_)) => 0,
            _ => pos.round() as i64,
        }
    }

    /// Convert an integer index on `axis` back to a physical position.
    pub fn point_to_pos(&self, point: i64, axis: usize) -> f64 {
        match self.axes.get(axis) {
            Some(Some(v)) if v.len() > 1 => {
                let x0 = v[0];
                let x1 = v[v.len() - 1];
                let dx = (x1 - x0) / (v.len() - 1) as f64;
                point as f64 * dx + x0
            }
            Some(Some(v)) => v[0],
            _ => point as f64,
        }
    }

    /// Index on `axis` nearest to `pos`, clamped into the axis bounds.
    pub(crate) fn pos_to_point_clamped(&self, pos: f64, axis: usize) -> usize {
        let len = self.shape()[axis] as i64;
        self.pos_to_point(pos, axis).clamp(0, len - 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    fn wave_2d() -> Wave {
        // 3x3 buffer, x axis = [1, 2, 3], y axis = [3, 4, 5]
        Wave::new(
            ArrayD::ones(IxDyn(&[3, 3])),
            vec![
                Some(Array1::from(vec![1.0, 2.0, 3.0])),
                Some(Array1::from(vec![3.0, 4.0, 5.0])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn pos_to_point_uses_axis_scaling() {
        let w = wave_2d();
        assert_eq!(w.pos_to_point(2.0, 0), 1);
        assert_eq!(w.pos_to_point(4.0, 1), 1);
        // Outside the grid: unclamped
        assert_eq!(w.pos_to_point(0.0, 0), -1);
        assert_eq!(w.pos_to_point(9.0, 1), 6);
    }

    #[test]
    fn point_to_pos_round_trips() {
        let w = wave_2d();
        assert_eq!(w.point_to_pos(1, 0), 2.0);
        assert_eq!(w.point_to_pos(1, 1), 4.0);
        assert_eq!(w.point_to_pos(w.pos_to_point(3.0, 0), 0), 3.0);
    }

    #[test]
    fn index_units_without_axis_vector() {
        let w = Wave::from_data(ArrayD::zeros(IxDyn(&[2, 4])));
        assert!(!w.axis_is_valid(0));
        assert_eq!(w.pos_to_point(2.4, 1), 2);
        assert_eq!(w.point_to_pos(3, 1), 3.0);
        assert_eq!(
            w.axis_values(1).to_vec(),
            vec![0.0, 1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn axis_values_prefers_explicit_vector() {
        let w = wave_2d();
        assert!(w.axis_is_valid(0));
        assert_eq!(w.axis_values(1).to_vec(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn rejects_mismatched_axes() {
        let data = ArrayD::<f64>::zeros(IxDyn(&[3, 2]));
        let err = Wave::new(data.clone(), vec![None]).unwrap_err();
        assert!(matches!(err, WaveError::AxisCountMismatch { .. }));

        let err = Wave::new(
            data,
            vec![Some(Array1::from(vec![1.0, 2.0])), None],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WaveError::AxisLengthMismatch { axis: 0, .. }
        ));
    }

    #[test]
    fn clamped_lookup_stays_in_bounds() {
        let w = wave_2d();
        assert_eq!(w.pos_to_point_clamped(-10.0, 0), 0);
        assert_eq!(w.pos_to_point_clamped(99.0, 0), 2);
    }
}

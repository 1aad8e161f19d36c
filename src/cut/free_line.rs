//! Arbitrary-angle line cuts across two axes.
//!
//! A free line is defined by two endpoints in the physical units of its two
//! axes plus an odd sample width. Executing it replaces the two axes with a
//! single synthetic axis whose coordinate is arc length along the line;
//! every plane spanned by the two axes is sampled by bilinear interpolation
//! along the line path, with `width` parallel offset lines (half-pixel
//! perpendicular spacing) summed into each output sample.

use ndarray::{Array1, ArrayD, ArrayView2, Ix2, IxDyn, SliceInfoElem};

use super::axes::LineId;
use crate::wave::Wave;

/// Spans exactly two axes; selected by reference (its [`LineId`]), so it is
/// exempt from the registry's per-axis mutual exclusion.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeLineExecutor {
    id: LineId,
    axes: [usize; 2],
    line: [[f64; 2]; 2],
    width: usize,
}

impl FreeLineExecutor {
    /// Ids come from the owning registry's allocator; see
    /// [`ExecutorRegistry::add_free_line`](super::registry::ExecutorRegistry::add_free_line)
    /// for the usual construction path.
    pub fn new(id: LineId, axes: [usize; 2], line: [[f64; 2]; 2]) -> Self {
        Self {
            id,
            axes,
            line,
            width: 1,
        }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn axes(&self) -> &[usize; 2] {
        &self.axes
    }

    /// Endpoints `[(x1, y1), (x2, y2)]` in the two axes' physical units.
    pub fn line(&self) -> &[[f64; 2]; 2] {
        &self.line
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Interactive update path (endpoint drag).
    pub fn set_line(&mut self, line: [[f64; 2]; 2]) {
        self.line = line;
    }

    /// Number of parallel offset lines summed per sample. Expected odd so
    /// the set is centered on the drawn line; stored as given.
    pub fn set_width(&mut self, width: usize) {
        self.width = width.max(1);
    }

    /// Apply the line cut to `wave`.
    ///
    /// `axes` are the executor's two axes *adjusted to the positions they
    /// occupy in `wave`* (the engine shifts them for axes already removed
    /// by the slice/sum pass). The two axes are replaced by one new axis at
    /// the position of the lower one.
    pub fn execute(&self, wave: &Wave, axes: [usize; 2]) -> Wave {
        let (a0, a1) = (axes[0], axes[1]);
        let lo = a0.min(a1);
        let hi = a0.max(a1);

        // Endpoint indices, each coordinate through its own axis scaling.
        let x1 = wave.pos_to_point(self.line[0][0], a0);
        let x2 = wave.pos_to_point(self.line[1][0], a0);
        let y1 = wave.pos_to_point(self.line[0][1], a1);
        let y2 = wave.pos_to_point(self.line[1][1], a1);

        let dx = (x2 - x1) as f64;
        let dy = (y2 - y1) as f64;
        let len_px = dx.hypot(dy);
        let size = len_px.floor() as usize + 1;
        // Unit perpendicular; degenerate lines sample a single point.
        let (px, py) = if len_px > 0.0 {
            (dy / len_px, -dx / len_px)
        } else {
            (0.0, 0.0)
        };

        let ndim = wave.ndim();
        let other: Vec<usize> = (0..ndim).filter(|&ax| ax != lo && ax != hi).collect();
        let other_shape: Vec<usize> = other.iter().map(|&ax| wave.shape()[ax]).collect();

        let mut out_shape: Vec<usize> = Vec::with_capacity(ndim - 1);
        for ax in 0..ndim {
            if ax == hi {
                continue;
            }
            out_shape.push(if ax == lo { size } else { wave.shape()[ax] });
        }
        let mut out = ArrayD::<f64>::zeros(IxDyn(&out_shape));

        let offsets: Vec<f64> = {
            let w = self.width.max(1) as i64;
            ((1 - w)..w).step_by(2).map(|j| j as f64 * 0.5).collect()
        };
        let lerp = |a: i64, b: i64, k: usize| {
            if size > 1 {
                a as f64 + (b - a) as f64 * k as f64 / (size - 1) as f64
            } else {
                a as f64
            }
        };

        for combo in ndarray::indices(IxDyn(&other_shape)) {
            let elems: Vec<SliceInfoElem> = (0..ndim)
                .map(|ax| {
                    if ax == lo || ax == hi {
                        SliceInfoElem::Slice {
                            start: 0,
                            end: None,
                            step: 1,
                        }
                    } else {
                        let pos = other.iter().position(|&o| o == ax).unwrap();
                        SliceInfoElem::Index(combo[pos] as isize)
                    }
                })
                .collect();
            let plane = wave
                .data
                .slice(elems.as_slice())
                .into_dimensionality::<Ix2>()
                .expect("two line axes remain after fixing the others");

            // Output index template: `other` values with the line axis slot
            // left to vary over k.
            let mut out_idx: Vec<usize> = Vec::with_capacity(ndim - 1);
            for ax in 0..ndim {
                if ax == hi {
                    continue;
                }
                if ax == lo {
                    out_idx.push(0);
                } else {
                    let pos = other.iter().position(|&o| o == ax).unwrap();
                    out_idx.push(combo[pos]);
                }
            }
            // `hi > lo`, so dropping `hi` leaves `lo` at its own position.
            let line_slot = lo;

            for k in 0..size {
                let mut acc = 0.0;
                for &off in &offsets {
                    let cx = lerp(x1, x2, k) + px * off;
                    let cy = lerp(y1, y2, k) + py * off;
                    // The plane's rows run along the lower axis.
                    let (r, c) = if a0 == lo { (cx, cy) } else { (cy, cx) };
                    acc += sample_bilinear(&plane, r, c);
                }
                out_idx[line_slot] = k;
                out[IxDyn(&out_idx)] = acc;
            }
        }

        // Arc-length coordinate from the physical span between the snapped
        // endpoints.
        let av0 = wave.axis_values(a0);
        let av1 = wave.axis_values(a1);
        let clamp = |i: i64, len: usize| i.clamp(0, len as i64 - 1) as usize;
        let dxp = av0[clamp(x1, av0.len())] - av0[clamp(x2, av0.len())];
        let dyp = av1[clamp(y1, av1.len())] - av1[clamp(y2, av1.len())];
        let new_axis = Array1::linspace(0.0, dxp.hypot(dyp), size);

        let mut out_axes: Vec<Option<Array1<f64>>> = Vec::with_capacity(ndim - 1);
        for ax in 0..ndim {
            if ax == hi {
                continue;
            }
            if ax == lo {
                out_axes.push(Some(new_axis.clone()));
            } else {
                out_axes.push(wave.axes[ax].clone());
            }
        }

        Wave {
            data: out,
            axes: out_axes,
        }
    }
}

/// Order-1 interpolation at fractional coordinates; contributions outside
/// the plane count as zero, matching constant-mode boundary handling.
fn sample_bilinear(plane: &ArrayView2<'_, f64>, r: f64, c: f64) -> f64 {
    let (nr, nc) = plane.dim();
    let r0 = r.floor();
    let c0 = c.floor();
    let fr = r - r0;
    let fc = c - c0;
    let mut acc = 0.0;
    for (dr, wr) in [(0i64, 1.0 - fr), (1, fr)] {
        for (dc, wc) in [(0i64, 1.0 - fc), (1, fc)] {
            let w = wr * wc;
            if w == 0.0 {
                continue;
            }
            let ri = r0 as i64 + dr;
            let ci = c0 as i64 + dc;
            if ri >= 0 && (ri as usize) < nr && ci >= 0 && (ci as usize) < nc {
                acc += w * plane[[ri as usize, ci as usize]];
            }
        }
    }
    acc
}

//! Reduction policies bound to one or more axes.
//!
//! Ordinary executors (Default, All, Point, Region) contribute directives
//! to the slice/sum plan; the free-line executor is applied in a second
//! pass (see [`free_line`](super::free_line)) because it spans two axes
//! jointly and interpolates instead of slicing.

use std::collections::BTreeSet;
use std::fmt;

use super::axes::AxisRef;
use super::free_line::FreeLineExecutor;
use super::plan::AxisDirective;
use crate::wave::Wave;

// ---------- Variant structs ----------

/// Collapses one axis by taking index 0. Also inserted implicitly for
/// every axis no enabled executor claims.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultExecutor {
    axis: usize,
}

impl DefaultExecutor {
    pub fn new(axis: usize) -> Self {
        Self { axis }
    }

    pub fn axis(&self) -> usize {
        self.axis
    }
}

/// Collapses one axis by summing over its entire range.
#[derive(Debug, Clone, PartialEq)]
pub struct AllExecutor {
    axis: usize,
}

impl AllExecutor {
    pub fn new(axis: usize) -> Self {
        Self { axis }
    }

    pub fn axis(&self) -> usize {
        self.axis
    }
}

/// Collapses one or two axes by selecting the index nearest a physical
/// position on each.
#[derive(Debug, Clone, PartialEq)]
pub struct PointExecutor {
    axes: Vec<usize>,
    position: Vec<f64>,
}

impl PointExecutor {
    /// `position` holds one physical coordinate per entry of `axes`.
    pub fn new(axes: Vec<usize>, position: Vec<f64>) -> Self {
        Self { axes, position }
    }

    pub fn axes(&self) -> &[usize] {
        &self.axes
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    /// Interactive update path (crosshair drag).
    pub fn set_position(&mut self, position: Vec<f64>) {
        self.position = position;
    }
}

/// Collapses one or two axes by summing over an index range derived from a
/// physical interval, clamped so the slice is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionExecutor {
    axes: Vec<usize>,
    ranges: Vec<[f64; 2]>,
}

impl RegionExecutor {
    /// `ranges` holds one `[lo, hi]` physical interval per entry of `axes`.
    pub fn new(axes: Vec<usize>, ranges: Vec<[f64; 2]>) -> Self {
        Self { axes, ranges }
    }

    pub fn axes(&self) -> &[usize] {
        &self.axes
    }

    pub fn ranges(&self) -> &[[f64; 2]] {
        &self.ranges
    }

    /// Interactive update path (region drag).
    pub fn set_range(&mut self, ranges: Vec<[f64; 2]>) {
        self.ranges = ranges;
    }

    /// Index bounds for one axis, clamped into the axis.
    ///
    /// `p1` is clamped into `[0, len-2]` and `p2` into `[.., len-1]`, then a
    /// final guard keeps the half-open slice non-empty. The asymmetric
    /// clamp order is long-standing observed behavior.
    fn clamped_bounds(&self, wave: &Wave, axis: usize, range: [f64; 2]) -> (usize, usize) {
        let len = wave.shape()[axis] as i64;
        let i1 = wave.pos_to_point(range[0], axis);
        let i2 = wave.pos_to_point(range[1], axis);
        let mut p1 = i1.min(i2);
        let mut p2 = i1.max(i2);
        if p1 < 0 {
            p1 = 0;
        }
        if p2 < 0 {
            p2 = p1 + 1;
        }
        if p1 > len - 2 {
            p1 = len - 2;
        }
        if p2 > len - 1 {
            p2 = len - 1;
        }
        if p1 < 0 {
            p1 = 0;
        }
        if p2 <= p1 {
            p2 = p1 + 1;
        }
        (p1 as usize, p2 as usize)
    }
}

// ---------- Tagged variant ----------

/// A reduction policy over one or more axes.
#[derive(Debug, Clone)]
pub enum Executor {
    Default(DefaultExecutor),
    All(AllExecutor),
    Point(PointExecutor),
    Region(RegionExecutor),
    FreeLine(FreeLineExecutor),
}

impl Executor {
    /// The literal source-array axes this executor touches.
    pub fn axes(&self) -> Vec<usize> {
        match self {
            Executor::Default(e) => vec![e.axis],
            Executor::All(e) => vec![e.axis],
            Executor::Point(e) => e.axes.clone(),
            Executor::Region(e) => e.axes.clone(),
            Executor::FreeLine(e) => e.axes().to_vec(),
        }
    }

    /// The touched axes as notification payload.
    pub fn axis_refs(&self) -> Vec<AxisRef> {
        self.axes().into_iter().map(AxisRef::Axis).collect()
    }

    pub fn is_free_line(&self) -> bool {
        matches!(self, Executor::FreeLine(_))
    }

    pub fn as_free_line(&self) -> Option<&FreeLineExecutor> {
        match self {
            Executor::FreeLine(e) => Some(e),
            _ => None,
        }
    }

    /// Variant name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Executor::Default(_) => "default",
            Executor::All(_) => "all",
            Executor::Point(_) => "point",
            Executor::Region(_) => "region",
            Executor::FreeLine(_) => "free line",
        }
    }

    /// Plan contributions for this executor, skipping axes in `ignore` and
    /// axes beyond the wave's rank (stale executors from a higher-rank
    /// dataset contribute nothing).
    ///
    /// Free lines contribute nothing here; the engine applies them in the
    /// interpolation pass after the plan is resolved.
    pub(crate) fn directives(
        &self,
        wave: &Wave,
        ignore: &BTreeSet<usize>,
    ) -> Vec<(usize, AxisDirective)> {
        let skip = |axis: &usize| ignore.contains(axis) || *axis >= wave.ndim();
        match self {
            Executor::Default(e) => {
                if skip(&e.axis) {
                    Vec::new()
                } else {
                    vec![(e.axis, AxisDirective::SelectIndex(0))]
                }
            }
            Executor::All(e) => {
                if skip(&e.axis) {
                    Vec::new()
                } else {
                    vec![(e.axis, AxisDirective::SumAll)]
                }
            }
            Executor::Point(e) => e
                .axes
                .iter()
                .zip(&e.position)
                .filter(|(ax, _)| !skip(ax))
                .map(|(&ax, &pos)| {
                    (ax, AxisDirective::SelectIndex(wave.pos_to_point_clamped(pos, ax)))
                })
                .collect(),
            Executor::Region(e) => e
                .axes
                .iter()
                .zip(&e.ranges)
                .filter(|(ax, _)| !skip(ax))
                .map(|(&ax, &range)| {
                    let (p1, p2) = e.clamped_bounds(wave, ax, range);
                    (ax, AxisDirective::SumRange(p1, p2))
                })
                .collect(),
            Executor::FreeLine(_) => Vec::new(),
        }
    }
}

impl fmt::Display for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Executor::Default(e) => write!(f, "Default executor for axis {}", e.axis),
            Executor::All(e) => write!(f, "All executor for axis {}", e.axis),
            Executor::Point(e) => write!(f, "Point executor for axes {:?}", e.axes),
            Executor::Region(e) => write!(f, "Region executor for axes {:?}", e.axes),
            Executor::FreeLine(e) => {
                write!(f, "Line{} (width = {})", e.id().ordinal(), e.width())
            }
        }
    }
}

impl From<DefaultExecutor> for Executor {
    fn from(e: DefaultExecutor) -> Self {
        Executor::Default(e)
    }
}

impl From<AllExecutor> for Executor {
    fn from(e: AllExecutor) -> Self {
        Executor::All(e)
    }
}

impl From<PointExecutor> for Executor {
    fn from(e: PointExecutor) -> Self {
        Executor::Point(e)
    }
}

impl From<RegionExecutor> for Executor {
    fn from(e: RegionExecutor) -> Self {
        Executor::Region(e)
    }
}

impl From<FreeLineExecutor> for Executor {
    fn from(e: FreeLineExecutor) -> Self {
        Executor::FreeLine(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, ArrayD, IxDyn};

    fn wave(shape: &[usize]) -> Wave {
        Wave::from_data(ArrayD::zeros(IxDyn(shape)))
    }

    fn directive_for(exe: &Executor, w: &Wave, axis: usize) -> AxisDirective {
        let ds = exe.directives(w, &BTreeSet::new());
        ds.into_iter()
            .find(|(ax, _)| *ax == axis)
            .map(|(_, d)| d)
            .expect("no directive for axis")
    }

    #[test]
    fn default_selects_index_zero_unless_ignored() {
        let w = wave(&[5]);
        let exe: Executor = DefaultExecutor::new(0).into();
        assert_eq!(directive_for(&exe, &w, 0), AxisDirective::SelectIndex(0));

        let ignore: BTreeSet<usize> = [0].into_iter().collect();
        assert!(exe.directives(&w, &ignore).is_empty());
    }

    #[test]
    fn all_sums_whole_axis() {
        let w = wave(&[5]);
        let exe: Executor = AllExecutor::new(0).into();
        assert_eq!(directive_for(&exe, &w, 0), AxisDirective::SumAll);
    }

    #[test]
    fn point_picks_nearest_index_and_clamps() {
        let w = Wave::new(
            ArrayD::zeros(IxDyn(&[4])),
            vec![Some(Array1::from(vec![10.0, 20.0, 30.0, 40.0]))],
        )
        .unwrap();
        let exe: Executor = PointExecutor::new(vec![0], vec![24.0]).into();
        assert_eq!(directive_for(&exe, &w, 0), AxisDirective::SelectIndex(1));

        let exe: Executor = PointExecutor::new(vec![0], vec![-100.0]).into();
        assert_eq!(directive_for(&exe, &w, 0), AxisDirective::SelectIndex(0));
        let exe: Executor = PointExecutor::new(vec![0], vec![1e6]).into();
        assert_eq!(directive_for(&exe, &w, 0), AxisDirective::SelectIndex(3));
    }

    #[test]
    fn region_clamps_low_bound_to_zero() {
        let w = wave(&[6]);
        let exe: Executor = RegionExecutor::new(vec![0], vec![[-3.0, 2.0]]).into();
        assert_eq!(directive_for(&exe, &w, 0), AxisDirective::SumRange(0, 2));
    }

    #[test]
    fn region_clamps_high_bound_to_last_index() {
        let w = wave(&[6]);
        let exe: Executor = RegionExecutor::new(vec![0], vec![[3.0, 99.0]]).into();
        assert_eq!(directive_for(&exe, &w, 0), AxisDirective::SumRange(3, 5));
    }

    #[test]
    fn region_single_point_is_never_empty() {
        let w = wave(&[6]);
        let exe: Executor = RegionExecutor::new(vec![0], vec![[2.0, 2.0]]).into();
        assert_eq!(directive_for(&exe, &w, 0), AxisDirective::SumRange(2, 3));

        // At the top edge the lower bound backs off instead.
        let exe: Executor = RegionExecutor::new(vec![0], vec![[5.0, 5.0]]).into();
        assert_eq!(directive_for(&exe, &w, 0), AxisDirective::SumRange(4, 5));
    }

    #[test]
    fn region_on_length_one_axis() {
        let w = wave(&[1]);
        let exe: Executor = RegionExecutor::new(vec![0], vec![[0.0, 0.0]]).into();
        assert_eq!(directive_for(&exe, &w, 0), AxisDirective::SumRange(0, 1));
    }

    #[test]
    fn region_entirely_below_range() {
        let w = wave(&[6]);
        let exe: Executor = RegionExecutor::new(vec![0], vec![[-9.0, -5.0]]).into();
        // p1 -> 0, p2 -> p1 + 1
        assert_eq!(directive_for(&exe, &w, 0), AxisDirective::SumRange(0, 1));
    }

    #[test]
    fn two_axis_region_skips_ignored_axis() {
        let w = wave(&[4, 4]);
        let exe: Executor =
            RegionExecutor::new(vec![0, 1], vec![[0.0, 2.0], [1.0, 3.0]]).into();
        let ignore: BTreeSet<usize> = [0].into_iter().collect();
        let ds = exe.directives(&w, &ignore);
        assert_eq!(ds, vec![(1, AxisDirective::SumRange(1, 3))]);
    }

    #[test]
    fn display_names_match_variant() {
        let exe: Executor = RegionExecutor::new(vec![1], vec![[0.0, 1.0]]).into();
        assert_eq!(exe.to_string(), "Region executor for axes [1]");
        assert_eq!(exe.kind_name(), "region");
    }
}

//! The ordered executor collection with enable/disable state.
//!
//! Enabling a non-free-line executor silently disables every other enabled
//! non-free-line executor sharing an axis with it, so the slice/sum plan
//! never receives two directives for the same ordinary axis. Free lines
//! are exempt: they are selected by reference, not by being "the" reducer
//! for an axis, so several may coexist and stay enabled.

use super::axes::{AxisRef, LineId, LineIdAllocator};
use super::executor::{DefaultExecutor, Executor, PointExecutor, RegionExecutor};
use super::free_line::FreeLineExecutor;
use crate::error::CutError;
use crate::events::{ChangeKind, UpdateController, UpdateEvent};

/// One registry slot.
#[derive(Debug, Clone)]
struct Entry {
    executor: Executor,
    enabled: bool,
    /// Display surface that created the executor, if any; used to drop all
    /// of a closed surface's executors at once.
    owner: Option<String>,
}

/// Ordered, named collection of executors with mutual-exclusion rules.
pub struct ExecutorRegistry {
    entries: Vec<Entry>,
    ids: LineIdAllocator,
    updates: UpdateController,
    saved_enabled: Option<Vec<bool>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            ids: LineIdAllocator::new(),
            updates: UpdateController::new(),
            saved_enabled: None,
        }
    }

    /// Handle for subscribing to change notifications.
    pub fn updates(&self) -> UpdateController {
        self.updates.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Executor> {
        self.entries.get(index).map(|e| &e.executor)
    }

    pub fn is_enabled(&self, index: usize) -> Option<bool> {
        self.entries.get(index).map(|e| e.enabled)
    }

    /// All entries with their enabled flags, in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&Executor, bool)> {
        self.entries.iter().map(|e| (&e.executor, e.enabled))
    }

    fn check_index(&self, index: usize) -> Result<(), CutError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(CutError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }

    // ---------- Insertion / removal ----------

    /// Append an executor; it starts enabled, which triggers the
    /// mutual-exclusion pass against existing entries.
    ///
    /// Returns the new entry's index.
    pub fn append(&mut self, executor: impl Into<Executor>) -> usize {
        self.append_entry(executor.into(), None)
    }

    /// Append an executor tagged with the display surface that owns it.
    pub fn append_owned(&mut self, executor: impl Into<Executor>, owner: &str) -> usize {
        self.append_entry(executor.into(), Some(owner.to_string()))
    }

    fn append_entry(&mut self, executor: Executor, owner: Option<String>) -> usize {
        log::debug!("append {executor}");
        let refs = executor.axis_refs();
        self.entries.push(Entry {
            executor,
            enabled: false,
            owner,
        });
        let index = self.entries.len() - 1;
        self.updates.emit(UpdateEvent::new(ChangeKind::APPENDED, refs));
        // Cannot fail: the entry was just pushed.
        let _ = self.enable_at(index);
        index
    }

    /// Allocate an id and append a free line over `axes` with the given
    /// endpoints. Returns the new line's id.
    pub fn add_free_line(&mut self, axes: [usize; 2], line: [[f64; 2]; 2]) -> LineId {
        let id = self.ids.next_id();
        self.append(FreeLineExecutor::new(id, axes, line));
        id
    }

    /// Allocate a free-line id without appending, for callers that build
    /// the executor themselves.
    pub fn alloc_line_id(&mut self) -> LineId {
        self.ids.next_id()
    }

    /// Remove the entry at `index`, notifying observers that its axes'
    /// cached cuts are stale.
    pub fn remove_at(&mut self, index: usize) -> Result<Executor, CutError> {
        self.check_index(index)?;
        let entry = self.entries.remove(index);
        log::debug!("remove {}", entry.executor);
        self.updates
            .emit(UpdateEvent::new(ChangeKind::REMOVED, entry.executor.axis_refs()));
        Ok(entry.executor)
    }

    /// Remove every executor appended for `owner` (a closed display
    /// surface). Returns how many were removed.
    pub fn remove_owned(&mut self, owner: &str) -> usize {
        let mut removed = 0;
        for index in (0..self.entries.len()).rev() {
            if self.entries[index].owner.as_deref() == Some(owner) {
                // Index is valid by construction.
                let _ = self.remove_at(index);
                removed += 1;
            }
        }
        removed
    }

    // ---------- Enable / disable ----------

    /// Enable the entry at `index`.
    ///
    /// If it is not a free line, every other enabled non-free-line executor
    /// sharing one of its axes is disabled first (last-enabled-wins).
    pub fn enable_at(&mut self, index: usize) -> Result<(), CutError> {
        self.check_index(index)?;
        self.entries[index].enabled = true;
        let executor = self.entries[index].executor.clone();
        if !executor.is_free_line() {
            let axes = executor.axes();
            for i in 0..self.entries.len() {
                if i == index {
                    continue;
                }
                let other = &self.entries[i];
                if other.enabled
                    && !other.executor.is_free_line()
                    && other.executor.axes().iter().any(|a| axes.contains(a))
                {
                    self.entries[i].enabled = false;
                    let refs = self.entries[i].executor.axis_refs();
                    log::debug!("conflict: disabling {}", self.entries[i].executor);
                    self.updates.emit(UpdateEvent::new(ChangeKind::DISABLED, refs));
                }
            }
        }
        self.updates
            .emit(UpdateEvent::new(ChangeKind::ENABLED, executor.axis_refs()));
        Ok(())
    }

    /// Disable the entry at `index`.
    pub fn disable_at(&mut self, index: usize) -> Result<(), CutError> {
        self.check_index(index)?;
        self.entries[index].enabled = false;
        let refs = self.entries[index].executor.axis_refs();
        self.updates.emit(UpdateEvent::new(ChangeKind::DISABLED, refs));
        Ok(())
    }

    /// Snapshot the enabled flags for a transient
    /// disable-during-reconfiguration workflow.
    pub fn save_enabled_state(&mut self) {
        self.saved_enabled = Some(self.entries.iter().map(|e| e.enabled).collect());
    }

    /// Reapply the snapshot taken by [`save_enabled_state`], in registry
    /// order (re-running the exclusivity pass for each enable).
    ///
    /// [`save_enabled_state`]: Self::save_enabled_state
    pub fn restore_enabled_state(&mut self) {
        let Some(saved) = self.saved_enabled.take() else {
            return;
        };
        for (index, enabled) in saved.into_iter().enumerate().take(self.entries.len()) {
            if enabled {
                let _ = self.enable_at(index);
            } else {
                let _ = self.disable_at(index);
            }
        }
    }

    // ---------- Free-line lookup ----------

    /// All free lines regardless of enabled state; they are selected by
    /// reference, so enablement does not gate them.
    pub fn free_lines(&self) -> impl Iterator<Item = &FreeLineExecutor> {
        self.entries
            .iter()
            .filter_map(|e| e.executor.as_free_line())
    }

    pub fn find_free_line(&self, id: LineId) -> Option<&FreeLineExecutor> {
        self.free_lines().find(|fl| fl.id() == id)
    }

    // ---------- Geometry updates (the interactive callback path) ----------

    /// Push a new crosshair position into a point executor.
    pub fn set_position(&mut self, index: usize, position: Vec<f64>) -> Result<(), CutError> {
        self.check_index(index)?;
        match &mut self.entries[index].executor {
            Executor::Point(e) => {
                e.set_position(position);
                let refs = self.entries[index].executor.axis_refs();
                self.updates.emit(UpdateEvent::new(ChangeKind::GEOMETRY, refs));
                Ok(())
            }
            other => Err(CutError::ExecutorMismatch {
                index,
                expected: "point",
                found: other.kind_name(),
            }),
        }
    }

    /// Push new interval bounds into a region executor.
    pub fn set_range(&mut self, index: usize, ranges: Vec<[f64; 2]>) -> Result<(), CutError> {
        self.check_index(index)?;
        match &mut self.entries[index].executor {
            Executor::Region(e) => {
                e.set_range(ranges);
                let refs = self.entries[index].executor.axis_refs();
                self.updates.emit(UpdateEvent::new(ChangeKind::GEOMETRY, refs));
                Ok(())
            }
            other => Err(CutError::ExecutorMismatch {
                index,
                expected: "region",
                found: other.kind_name(),
            }),
        }
    }

    /// Push new endpoints into a free-line executor.
    pub fn set_line(&mut self, index: usize, line: [[f64; 2]; 2]) -> Result<(), CutError> {
        self.check_index(index)?;
        match &mut self.entries[index].executor {
            Executor::FreeLine(e) => {
                e.set_line(line);
                let id = e.id();
                self.updates.emit(UpdateEvent::new(
                    ChangeKind::GEOMETRY,
                    vec![AxisRef::Line(id)],
                ));
                Ok(())
            }
            other => Err(CutError::ExecutorMismatch {
                index,
                expected: "free line",
                found: other.kind_name(),
            }),
        }
    }

    /// Set a free line's parallel sample width.
    pub fn set_line_width(&mut self, index: usize, width: usize) -> Result<(), CutError> {
        self.check_index(index)?;
        match &mut self.entries[index].executor {
            Executor::FreeLine(e) => {
                if width % 2 == 0 {
                    log::warn!("free line width {width} is even; the offset set is not centered");
                }
                e.set_width(width);
                let id = e.id();
                self.updates.emit(UpdateEvent::new(
                    ChangeKind::GEOMETRY,
                    vec![AxisRef::Line(id)],
                ));
                Ok(())
            }
            other => Err(CutError::ExecutorMismatch {
                index,
                expected: "free line",
                found: other.kind_name(),
            }),
        }
    }

    // ---------- Execution list ----------

    /// Enabled non-free-line executors plus an implicit Default for every
    /// axis no enabled executor claims, so every ordinary axis of an
    /// `ndim`-dimensional wave gets exactly one directive.
    pub fn build_execution_list(&self, ndim: usize) -> Vec<Executor> {
        let mut claimed: Vec<usize> = Vec::new();
        let mut list: Vec<Executor> = Vec::new();
        for entry in &self.entries {
            if entry.enabled && !entry.executor.is_free_line() {
                claimed.extend(entry.executor.axes());
                list.push(entry.executor.clone());
            }
        }
        for axis in 0..ndim {
            if !claimed.contains(&axis) {
                list.push(DefaultExecutor::new(axis).into());
            }
        }
        list
    }

    /// Entries currently enabled on a literal axis, free lines excluded.
    /// (Diagnostic helper for the display layer's context menus.)
    pub fn enabled_on_axis(&self, axis: usize) -> Vec<&Executor> {
        self.entries
            .iter()
            .filter(|e| {
                e.enabled && !e.executor.is_free_line() && e.executor.axes().contains(&axis)
            })
            .map(|e| &e.executor)
            .collect()
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Convenience constructors for the common GUI gestures.
impl ExecutorRegistry {
    /// Append a point executor at `position` over `axes`.
    pub fn add_point(&mut self, axes: Vec<usize>, position: Vec<f64>) -> usize {
        self.append(PointExecutor::new(axes, position))
    }

    /// Append a region executor over `axes` with physical `ranges`.
    pub fn add_region(&mut self, axes: Vec<usize>, ranges: Vec<[f64; 2]>) -> usize {
        self.append(RegionExecutor::new(axes, ranges))
    }
}

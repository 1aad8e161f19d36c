//! Update notifications for the executor registry.
//!
//! Display-layer observers subscribe to an [`UpdateController`] to learn
//! which axes' cached cuts went stale. Each event carries a set of
//! [`ChangeKind`] flags (bitflags-style) plus the affected axis
//! identifiers; subscribers pass an [`UpdateFilter`] OR-mask to receive
//! only the categories they care about.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::cut::axes::AxisRef;

// ─────────────────────────────────────────────────────────────────────────────
// ChangeKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the categories a registry change belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeKind(pub u32);

impl ChangeKind {
    /// An executor was appended to the registry.
    pub const APPENDED: Self = Self(1 << 0);
    /// An executor was removed from the registry.
    pub const REMOVED: Self = Self(1 << 1);
    /// An executor was enabled (possibly disabling conflicting ones).
    pub const ENABLED: Self = Self(1 << 2);
    /// An executor was disabled.
    pub const DISABLED: Self = Self(1 << 3);
    /// An executor's geometry (position, range, line, width) changed.
    pub const GEOMETRY: Self = Self(1 << 4);

    /// Wildcard: matches every change kind.
    pub const ALL: Self = Self(u32::MAX);

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ChangeKind {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ChangeKind {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "EMPTY");
        }
        if *self == ChangeKind::ALL {
            return write!(f, "ALL");
        }
        let pairs: &[(ChangeKind, &str)] = &[
            (ChangeKind::APPENDED, "APPENDED"),
            (ChangeKind::REMOVED, "REMOVED"),
            (ChangeKind::ENABLED, "ENABLED"),
            (ChangeKind::DISABLED, "DISABLED"),
            (ChangeKind::GEOMETRY, "GEOMETRY"),
        ];
        let mut names = Vec::new();
        let mut known: u32 = 0;
        for (kind, name) in pairs {
            known |= kind.0;
            if self.contains(*kind) {
                names.push((*name).to_string());
            }
        }
        let extra = self.0 & !known;
        if extra != 0 {
            names.push(format!("0x{extra:x}"));
        }
        write!(f, "{}", names.join("|"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UpdateEvent / UpdateFilter
// ─────────────────────────────────────────────────────────────────────────────

/// A registry change, with the axis identifiers whose cuts are now stale.
#[derive(Debug, Clone)]
pub struct UpdateEvent {
    /// Bitflag set of categories this event belongs to.
    pub kinds: ChangeKind,
    /// Affected axes: literal axes for ordinary executors, the line id for
    /// free-line geometry changes.
    pub axes: Vec<AxisRef>,
}

impl UpdateEvent {
    pub fn new(kinds: ChangeKind, axes: Vec<AxisRef>) -> Self {
        Self { kinds, axes }
    }
}

/// OR-mask selecting which change categories a subscriber receives.
#[derive(Debug, Clone, Copy)]
pub struct UpdateFilter {
    pub mask: ChangeKind,
}

impl UpdateFilter {
    pub const fn all() -> Self {
        Self {
            mask: ChangeKind::ALL,
        }
    }

    pub const fn only(mask: ChangeKind) -> Self {
        Self { mask }
    }

    #[inline]
    pub fn matches(&self, event: &UpdateEvent) -> bool {
        event.kinds.intersects(self.mask)
    }
}

impl Default for UpdateFilter {
    fn default() -> Self {
        Self::all()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UpdateController
// ─────────────────────────────────────────────────────────────────────────────

struct Subscriber {
    filter: UpdateFilter,
    sender: Sender<UpdateEvent>,
}

/// Collects and distributes registry change events to subscribers.
///
/// Handles are cheap clones sharing one subscriber list; the registry emits
/// through its own handle. Subscribers whose receiver was dropped are
/// pruned on the next matching emit.
#[derive(Clone)]
pub struct UpdateController {
    inner: Arc<Mutex<Vec<Subscriber>>>,
}

impl UpdateController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Subscribe to events matching the given filter.
    pub fn subscribe(&self, filter: UpdateFilter) -> Receiver<UpdateEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut inner = self.inner.lock().unwrap();
        inner.push(Subscriber { filter, sender: tx });
        rx
    }

    /// Subscribe to every event.
    pub fn subscribe_all(&self) -> Receiver<UpdateEvent> {
        self.subscribe(UpdateFilter::all())
    }

    /// Emit an event to all matching subscribers.
    pub fn emit(&self, event: UpdateEvent) {
        let mut inner = self.inner.lock().unwrap();
        inner.retain(|sub| {
            if sub.filter.matches(&event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }
}

impl Default for UpdateController {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────

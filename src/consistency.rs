//! Channel consistency tracker.
//!
//! Growing the channel mask widens every per-channel array requirement at
//! once; each of the nine arrays stays inconsistent until the operator
//! re-enters it at the new width. The tracker remembers, per parameter, how
//! many values the last full entry populated and derives the needs-update
//! flags from that count and the current width.

use crate::model::ParamId;

#[derive(Debug, Clone)]
pub struct ChannelTracker {
    width: usize,
    populated: [usize; 9],
}

impl ChannelTracker {
    /// A tracker for a freshly loaded file: every array was read at `width`
    /// values, so everything starts consistent.
    pub fn new(width: usize) -> Self {
        ChannelTracker {
            width,
            populated: [width; 9],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Called when the channel mask changes. Flags recompute against the new
    /// width; arrays entered at a larger width stay consistent when the mask
    /// shrinks back.
    pub fn set_channel_width(&mut self, width: usize) {
        self.width = width;
    }

    /// Called after a full all-or-nothing re-entry of one array.
    pub fn mark_updated(&mut self, param: ParamId) {
        self.populated[param.index()] = self.width;
    }

    pub fn needs_update(&self, param: ParamId) -> bool {
        self.populated[param.index()] < self.width
    }

    pub fn all_consistent(&self) -> bool {
        ParamId::ALL.iter().all(|&p| !self.needs_update(p))
    }

    /// Inconsistent parameters in canonical reporting order.
    pub fn inconsistent(&self) -> Vec<ParamId> {
        ParamId::ALL
            .iter()
            .copied()
            .filter(|&p| self.needs_update(p))
            .collect()
    }

    /// Comma-joined names of the inconsistent parameters, for menus and
    /// warnings. Empty when everything is consistent.
    pub fn inconsistent_names(&self) -> String {
        self.inconsistent()
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

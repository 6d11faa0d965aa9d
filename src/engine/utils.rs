use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{Overrides, Step};

pub fn now_ms() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    now as u64
}

/// One pending timer. Arming replaces whatever was scheduled before, so a
/// slot never holds more than one outstanding task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct Deadline {
    due_at_ms: Option<u64>,
}

impl Deadline {
    pub(super) fn arm(&mut self, due_at_ms: u64) {
        self.due_at_ms = Some(due_at_ms);
    }

    pub(super) fn cancel(&mut self) {
        self.due_at_ms = None;
    }

    pub(super) fn is_armed(&self) -> bool {
        self.due_at_ms.is_some()
    }

    pub(super) fn due_at(&self) -> Option<u64> {
        self.due_at_ms
    }

    /// Disarms and reports true once `now_ms` has reached the deadline.
    pub(super) fn take_due(&mut self, now_ms: u64) -> bool {
        match self.due_at_ms {
            Some(due) if now_ms >= due => {
                self.due_at_ms = None;
                true
            }
            _ => false,
        }
    }
}

/// Canonical step with transient overrides layered on top: positions merge
/// per player, balls are replaced as a whole list.
pub(super) fn merge_overrides(step: &Step, overrides: Option<&Overrides>) -> Step {
    let mut merged = step.clone();
    if let Some(overrides) = overrides {
        for (player_id, position) in &overrides.positions {
            merged.positions.insert(player_id.clone(), *position);
        }
        merged.balls = overrides.balls.clone();
    }
    merged
}

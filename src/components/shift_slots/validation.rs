//! Set-level rules for a worker's chosen slots.

use super::notation::normalize_slot;
use super::time::TimeInterval;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Slots chosen in the current edit session.
///
/// Members are canonical interval strings, unique, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    slots: Vec<String>,
}

/// What a successful toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a slot after normalizing it; returns false if already present
    pub fn insert(&mut self, slot: &str) -> bool {
        let slot = normalize_slot(slot);
        if slot.is_empty() || self.slots.contains(&slot) {
            return false;
        }
        self.slots.push(slot);
        true
    }

    /// Remove a slot; returns false if it was not selected
    pub fn remove(&mut self, slot: &str) -> bool {
        let slot = normalize_slot(slot);
        let before = self.slots.len();
        self.slots.retain(|s| *s != slot);
        self.slots.len() != before
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.slots.contains(&normalize_slot(slot))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(String::as_str)
    }

    /// Value handed to the persistence collaborator
    pub fn to_submission(&self) -> String {
        self.slots.join(", ")
    }

    pub fn as_slice(&self) -> &[String] {
        &self.slots
    }
}

impl<S: AsRef<str>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for slot in iter {
            selection.insert(slot.as_ref());
        }
        selection
    }
}

/// Whether two slot strings may not be selected together.
///
/// Back-to-back slots, where one ends at the minute the other starts, never
/// conflict. Slots that do not parse never conflict either; the duration rule
/// rejects them first.
pub fn slots_conflict(a: &str, b: &str) -> bool {
    match (TimeInterval::parse(a), TimeInterval::parse(b)) {
        (Some(a), Some(b)) => a.conflicts_with(&b),
        _ => false,
    }
}

fn check_duration(slot: &str) -> Result<TimeInterval, ValidationError> {
    TimeInterval::parse(slot)
        .filter(TimeInterval::meets_minimum)
        .ok_or_else(|| ValidationError::DurationTooShort {
            slot: slot.to_string(),
        })
}

/// Validate a whole selection before it is saved
pub fn validate(selection: &Selection) -> Result<(), ValidationError> {
    if selection.is_empty() {
        return Err(ValidationError::Empty);
    }

    let intervals = selection
        .iter()
        .map(check_duration)
        .collect::<Result<Vec<_>, _>>()?;

    for (i, a) in intervals.iter().enumerate() {
        for b in &intervals[i + 1..] {
            if a.conflicts_with(b) {
                return Err(ValidationError::Overlap {
                    candidate: b.to_string(),
                    existing: a.to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Check whether a slot not yet selected may be added
pub fn check_candidate(selection: &Selection, candidate: &str) -> Result<(), ValidationError> {
    let candidate = normalize_slot(candidate);
    let interval = check_duration(&candidate)?;

    for existing in selection.iter() {
        let Some(other) = TimeInterval::parse(existing) else {
            continue;
        };
        if interval.conflicts_with(&other) {
            debug!("Candidate {} conflicts with {}", candidate, existing);
            return Err(ValidationError::Overlap {
                candidate,
                existing: existing.to_string(),
            });
        }
    }

    Ok(())
}

/// Add or remove a slot. Removal always succeeds; a rejected add leaves the selection untouched.
pub fn toggle(selection: &mut Selection, candidate: &str) -> Result<ToggleOutcome, ValidationError> {
    if selection.remove(candidate) {
        return Ok(ToggleOutcome::Removed);
    }

    check_candidate(selection, candidate)?;
    selection.insert(candidate);
    Ok(ToggleOutcome::Added)
}

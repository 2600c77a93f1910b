//! Keeping a selection consistent with the active department's catalog.

use super::models::{PersistedUser, SlotCatalogEntry, SlotOption};
use super::notation::{decode_intervals, normalize_slot};
use super::validation::{slots_conflict, Selection};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Build the starting selection from a worker's stored primary and weekend fields
pub fn load_persisted(user: &PersistedUser) -> Selection {
    let fields = [
        user.selected_slot.as_ref(),
        user.selected_weekend_slot.as_ref(),
    ];

    fields
        .into_iter()
        .flatten()
        .flat_map(decode_intervals)
        .filter(|interval| {
            let valid = interval.meets_minimum();
            if !valid {
                debug!("Dropping stored slot {} below the minimum duration", interval);
            }
            valid
        })
        .map(|interval| interval.to_string())
        .collect()
}

/// Drop every selected slot the catalog no longer offers
pub fn reconcile(selection: &Selection, catalog: &[SlotCatalogEntry]) -> Selection {
    let offered: HashSet<String> = catalog.iter().map(SlotCatalogEntry::canonical).collect();

    selection
        .iter()
        // Older records may hold several slots in one member
        .flat_map(|slot| slot.split(',').map(normalize_slot).collect::<Vec<_>>())
        .filter(|slot| {
            let keep = offered.contains(slot);
            if !keep {
                debug!("Slot {} is not in the current catalog", slot);
            }
            keep
        })
        .collect()
}

/// Whether a catalog slot must be greyed out given what is already selected
pub fn is_disabled(candidate: &str, selection: &Selection) -> bool {
    let candidate = normalize_slot(candidate);
    if candidate.is_empty() || selection.contains(&candidate) {
        return false;
    }
    selection
        .iter()
        .any(|existing| slots_conflict(&candidate, existing))
}

/// Catalog rows annotated with selection state
pub fn catalog_options(catalog: &[SlotCatalogEntry], selection: &Selection) -> Vec<SlotOption> {
    catalog
        .iter()
        .map(|entry| {
            let canonical = entry.canonical();
            SlotOption {
                selected: selection.contains(&canonical),
                disabled: is_disabled(&canonical, selection),
                label: entry.label(),
                slot_type: entry.slot_type_label().to_string(),
                canonical,
            }
        })
        .collect()
}

/// Department-keyed catalog cache owned by a session
#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    entries: HashMap<String, Vec<SlotCatalogEntry>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, department: &str) -> Option<&[SlotCatalogEntry]> {
        self.entries.get(department).map(Vec::as_slice)
    }

    pub fn insert(&mut self, department: impl Into<String>, catalog: Vec<SlotCatalogEntry>) {
        self.entries.insert(department.into(), catalog);
    }

    /// Forget one department's catalog
    pub fn invalidate(&mut self, department: &str) -> bool {
        self.entries.remove(department).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::shift_slots::notation::PersistedSlots;

    fn catalog() -> Vec<SlotCatalogEntry> {
        vec![
            SlotCatalogEntry::new("9 AM", "1 PM", "Weekday"),
            SlotCatalogEntry::new("12 PM", "4 PM", "Weekday"),
            SlotCatalogEntry::new("1 PM", "5 PM", "Weekday"),
            SlotCatalogEntry::new("10 PM", "6 AM", ""),
        ]
    }

    #[test]
    fn test_load_persisted_merges_and_dedupes() {
        let user = PersistedUser {
            selected_slot: Some(PersistedSlots::from("9 AM - 1 PM, 1 PM - 5 PM")),
            selected_weekend_slot: Some(PersistedSlots::from("['1 PM - 5 PM', '0 - 0']")),
        };
        let selection = load_persisted(&user);
        assert_eq!(
            selection.as_slice(),
            ["9:00 AM - 1:00 PM".to_string(), "1:00 PM - 5:00 PM".to_string()]
        );
    }

    #[test]
    fn test_load_persisted_drops_short_and_garbage() {
        let user = PersistedUser {
            selected_slot: Some(PersistedSlots::from("9 AM - 9:30 AM, nonsense, 6 PM - 10 PM")),
            selected_weekend_slot: None,
        };
        assert_eq!(
            load_persisted(&user).as_slice(),
            ["6:00 PM - 10:00 PM".to_string()]
        );
    }

    #[test]
    fn test_load_persisted_reads_interval_object() {
        let user = PersistedUser {
            selected_slot: Some(PersistedSlots::Interval {
                start_time: "10 PM".to_string(),
                end_time: "6 AM".to_string(),
            }),
            selected_weekend_slot: Some(PersistedSlots::from("9:00 AM -- 1:00 PM")),
        };
        assert_eq!(
            load_persisted(&user).as_slice(),
            ["10:00 PM - 6:00 AM".to_string(), "9:00 AM - 1:00 PM".to_string()]
        );
    }

    #[test]
    fn test_reconcile_drops_missing_slots() {
        let selection: Selection = ["9:00 AM - 5:00 PM"].iter().collect();
        assert!(reconcile(&selection, &catalog()).is_empty());

        let selection: Selection = ["9:00 AM - 1:00 PM", "9:00 AM - 5:00 PM"].iter().collect();
        assert_eq!(
            reconcile(&selection, &catalog()).as_slice(),
            ["9:00 AM - 1:00 PM".to_string()]
        );
    }

    #[test]
    fn test_reconcile_against_empty_catalog() {
        let selection: Selection = ["9:00 AM - 1:00 PM"].iter().collect();
        assert!(reconcile(&selection, &[]).is_empty());
    }

    #[test]
    fn test_is_disabled() {
        let selection: Selection = ["9:00 AM - 1:00 PM"].iter().collect();
        assert!(is_disabled("12 PM - 4 PM", &selection));
        assert!(!is_disabled("1 PM - 5 PM", &selection));
        assert!(!is_disabled("9 AM - 1 PM", &selection));
        assert!(!is_disabled("10 PM - 6 AM", &selection));
    }

    #[test]
    fn test_catalog_options() {
        let selection: Selection = ["9:00 AM - 1:00 PM"].iter().collect();
        let options = catalog_options(&catalog(), &selection);

        assert_eq!(options.len(), 4);
        assert!(options[0].selected && !options[0].disabled);
        assert!(!options[1].selected && options[1].disabled);
        assert!(!options[2].disabled);
        assert_eq!(options[3].slot_type, "All days");
        assert_eq!(options[3].label, "10 PM to 6 AM");
    }

    #[test]
    fn test_cache_invalidation() {
        let mut cache = CatalogCache::new();
        cache.insert("Retail", catalog());
        assert_eq!(cache.get("Retail").map(|c| c.len()), Some(4));
        assert!(cache.get("Warehouse").is_none());

        assert!(cache.invalidate("Retail"));
        assert!(!cache.invalidate("Retail"));
        assert!(cache.is_empty());
    }
}

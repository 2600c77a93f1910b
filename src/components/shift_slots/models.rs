use super::notation::{normalize_slot, PersistedSlots};
use serde::{Deserialize, Serialize};

/// Slot type shown when the catalog leaves it blank
pub const DEFAULT_SLOT_TYPE: &str = "All days";

/// One selectable slot in a department's catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SlotCatalogEntry {
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub slot_type: String,
}

impl SlotCatalogEntry {
    pub fn new(
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        slot_type: impl Into<String>,
    ) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            slot_type: slot_type.into(),
        }
    }

    /// Canonical interval string for this entry
    pub fn canonical(&self) -> String {
        normalize_slot(&format!("{} - {}", self.start_time, self.end_time))
    }

    /// Human-readable "start to end" label
    pub fn label(&self) -> String {
        format!("{} to {}", self.start_time.trim(), self.end_time.trim())
    }

    /// Slot type, defaulting to "All days"
    pub fn slot_type_label(&self) -> &str {
        if self.slot_type.trim().is_empty() {
            DEFAULT_SLOT_TYPE
        } else {
            &self.slot_type
        }
    }
}

/// Catalog row as the presentation layer shows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotOption {
    pub canonical: String,
    pub label: String,
    pub slot_type: String,
    pub selected: bool,
    pub disabled: bool,
}

/// Slot fields stored on a worker's record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedUser {
    #[serde(rename = "selectedSlot", default)]
    pub selected_slot: Option<PersistedSlots>,
    #[serde(rename = "selectedWeekendSlot", default)]
    pub selected_weekend_slot: Option<PersistedSlots>,
}

impl PersistedUser {
    /// First-time users have never committed a slot
    pub fn is_first_time(&self) -> bool {
        self.selected_slot
            .as_ref()
            .map_or(true, PersistedSlots::is_unset)
    }
}

/// Body of the catalog request
#[derive(Debug, Clone, Serialize)]
pub struct CatalogRequest<'a> {
    pub department: &'a str,
}

/// Body of the catalog response
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "timeSlots", default)]
    pub time_slots: Option<Vec<SlotCatalogEntry>>,
}

/// Body of the apply request
#[derive(Debug, Clone, Serialize)]
pub struct ApplyRequest<'a> {
    pub shifttime: &'a str,
    pub job_id: &'a str,
}

/// Body of the apply response
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApplyResponse {
    #[serde(default)]
    pub shifttime: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Human-readable form of a canonical slot string
pub fn display_slot(slot: &str) -> String {
    normalize_slot(slot).replace(" - ", " to ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_canonical_and_labels() {
        let entry = SlotCatalogEntry::new("1 PM", "5 PM", "");
        assert_eq!(entry.canonical(), "1:00 PM - 5:00 PM");
        assert_eq!(entry.label(), "1 PM to 5 PM");
        assert_eq!(entry.slot_type_label(), DEFAULT_SLOT_TYPE);

        let entry = SlotCatalogEntry::new("9:00 AM", "1:00 PM", "Weekend");
        assert_eq!(entry.slot_type_label(), "Weekend");
    }

    #[test]
    fn test_catalog_response_parses_wire_shape() {
        let body = r#"{"success": true, "timeSlots": [{"start_time": "1 PM", "end_time": "5 PM", "slot_type": "Weekday"}, {"start_time": "6 PM", "end_time": "10 PM"}]}"#;
        let response: CatalogResponse = serde_json::from_str(body).unwrap();
        assert!(response.success);
        let slots = response.time_slots.unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].slot_type, "");
    }

    #[test]
    fn test_persisted_user_shapes() {
        let user: PersistedUser = serde_json::from_str(
            r#"{"selectedSlot": "['1 PM - 5 PM']", "selectedWeekendSlot": ["9 AM - 1 PM"]}"#,
        )
        .unwrap();
        assert!(!user.is_first_time());
        assert!(matches!(user.selected_weekend_slot, Some(PersistedSlots::List(_))));

        let user: PersistedUser = serde_json::from_str(r#"{"selectedSlot": "0 - 0"}"#).unwrap();
        assert!(user.is_first_time());
        assert!(PersistedUser::default().is_first_time());
    }

    #[test]
    fn test_display_slot() {
        assert_eq!(display_slot("1:00 PM - 5:00 PM"), "1:00 PM to 5:00 PM");
    }
}

//! Decoding of persisted slot fields into canonical interval strings.
//!
//! Legacy records store chosen slots as a comma-joined string, as a bracketed
//! pseudo-list with single quotes, as a real list, or as a `{start_time,
//! end_time}` object. All of them are decoded once here.

use super::time::{ClockTime, TimeInterval};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Placeholders meaning "no slot chosen"
pub const SENTINEL_SLOTS: [&str; 2] = ["0 - 0", "00 - 00"];

/// A persisted slot field in any of its historical shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistedSlots {
    Interval { start_time: String, end_time: String },
    List(Vec<String>),
    Text(String),
}

impl PersistedSlots {
    /// Whether the field records no choice at all
    pub fn is_unset(&self) -> bool {
        match self {
            PersistedSlots::Interval { .. } => false,
            PersistedSlots::List(items) => items.is_empty(),
            PersistedSlots::Text(text) => {
                let text = normalize_slot(text);
                text.is_empty() || is_sentinel(&text)
            }
        }
    }
}

impl From<&str> for PersistedSlots {
    fn from(text: &str) -> Self {
        PersistedSlots::Text(text.to_string())
    }
}

impl From<Vec<String>> for PersistedSlots {
    fn from(items: Vec<String>) -> Self {
        PersistedSlots::List(items)
    }
}

/// Bring a slot string to canonical `"h:mm AM - h:mm PM"` form.
///
/// Non-time text is cleaned up but otherwise kept, so sentinels survive to be
/// filtered by the caller.
pub fn normalize_slot(raw: &str) -> String {
    // Collapse whitespace and turn a standalone "to" into a dash
    let words: Vec<&str> = raw
        .split_whitespace()
        .map(|word| if word.eq_ignore_ascii_case("to") { "-" } else { word })
        .collect();
    let joined = words.join(" ");

    let dashed: String = joined
        .chars()
        .map(|c| match c {
            '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
            other => other,
        })
        .collect();

    if !dashed.contains('-') {
        return normalize_clock(&dashed);
    }

    dashed
        .split('-')
        .map(normalize_clock)
        .filter(|side| !side.is_empty())
        .collect::<Vec<_>>()
        .join(" - ")
}

/// Canonical text for one side of an interval
fn normalize_clock(side: &str) -> String {
    let side = side.trim();
    match ClockTime::parse(side) {
        Some(time) => time.to_string(),
        None => side.to_string(),
    }
}

/// Whether a normalized value is a "no slot" placeholder
pub fn is_sentinel(normalized: &str) -> bool {
    SENTINEL_SLOTS.contains(&normalized)
}

/// Decode a persisted field into unique canonical slot strings, first occurrence first
pub fn decode_slots(slots: &PersistedSlots) -> Vec<String> {
    let raw = match slots {
        PersistedSlots::Interval {
            start_time,
            end_time,
        } => vec![format!("{} - {}", start_time, end_time)],
        PersistedSlots::List(items) => items.clone(),
        PersistedSlots::Text(text) => split_text(text),
    };

    let mut seen = HashSet::new();
    raw.iter()
        .map(|slot| normalize_slot(slot))
        .filter(|slot| !slot.is_empty() && !is_sentinel(slot))
        .filter(|slot| seen.insert(slot.clone()))
        .collect()
}

/// Decode a persisted field straight into intervals, skipping what does not parse
pub fn decode_intervals(slots: &PersistedSlots) -> Vec<TimeInterval> {
    decode_slots(slots)
        .iter()
        .filter_map(|slot| {
            let interval = TimeInterval::parse(slot);
            if interval.is_none() {
                debug!("Skipping unparseable slot {:?}", slot);
            }
            interval
        })
        .collect()
}

/// Decode a plain persisted string
pub fn parse_slots(text: &str) -> Vec<String> {
    decode_slots(&PersistedSlots::Text(text.to_string()))
}

/// Split a persisted string into raw slot elements
fn split_text(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.starts_with('[') {
        let quoted = trimmed.replace('\'', "\"");
        match serde_json::from_str::<Vec<Value>>(&quoted) {
            Ok(items) => {
                return items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(slot) => Some(slot.clone()),
                        Value::Object(_) => {
                            serde_json::from_value::<PersistedSlots>(item.clone())
                                .ok()
                                .and_then(|slots| match slots {
                                    PersistedSlots::Interval {
                                        start_time,
                                        end_time,
                                    } => Some(format!("{} - {}", start_time, end_time)),
                                    _ => None,
                                })
                        }
                        _ => None,
                    })
                    .collect();
            }
            Err(e) => {
                warn!("Falling back to comma split for bracketed slots {:?}: {}", text, e);
                return trimmed
                    .split(',')
                    .map(|part| {
                        part.trim()
                            .trim_matches(|c: char| matches!(c, '[' | ']' | '\'' | '"'))
                            .to_string()
                    })
                    .collect();
            }
        }
    }

    trimmed.split(',').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_slot() {
        assert_eq!(normalize_slot("1 PM - 5 PM"), "1:00 PM - 5:00 PM");
        assert_eq!(normalize_slot("  9:00 AM   to  5:00 PM "), "9:00 AM - 5:00 PM");
        assert_eq!(normalize_slot("9:00 AM-5:00 PM"), "9:00 AM - 5:00 PM");
        assert_eq!(normalize_slot("9:00 am \u{2013} 5:00 pm"), "9:00 AM - 5:00 PM");
        assert_eq!(normalize_slot("09:30AM - 13:30"), "9:30 AM - 1:30 PM");
        assert_eq!(normalize_slot("0-0"), "0 - 0");
        assert_eq!(normalize_slot("9:00 AM -- 5:00 PM"), "9:00 AM - 5:00 PM");
        assert_eq!(normalize_slot("9 AM \u{2014}- 5 PM"), "9:00 AM - 5:00 PM");
        assert_eq!(normalize_slot(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "1 PM - 5 PM",
            "9:00 AM to 5:00 PM",
            "10 pm-6 am",
            "0 - 0",
            "00-00",
            "whatever text",
            "9:00 AM",
            "9:00 AM -- 5:00 PM",
        ];
        for input in inputs {
            let once = normalize_slot(input);
            assert_eq!(normalize_slot(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn test_to_inside_words_is_kept() {
        assert_eq!(normalize_slot("tomorrow"), "tomorrow");
    }

    #[test]
    fn test_sentinel_filtering() {
        assert!(parse_slots("0 - 0").is_empty());
        assert!(parse_slots("00 - 00").is_empty());
        assert_eq!(
            parse_slots("['0 - 0','1 PM - 5 PM']"),
            vec!["1:00 PM - 5:00 PM".to_string()]
        );
    }

    #[test]
    fn test_comma_string_dedupes_in_order() {
        assert_eq!(
            parse_slots("1 PM - 5 PM, 9 AM - 1 PM, 1:00 PM - 5:00 PM"),
            vec!["1:00 PM - 5:00 PM".to_string(), "9:00 AM - 1:00 PM".to_string()]
        );
    }

    #[test]
    fn test_malformed_bracketed_string_falls_back_to_comma_split() {
        assert_eq!(
            parse_slots("['9 AM - 1 PM', '1 PM - 5 PM'"),
            vec!["9:00 AM - 1:00 PM".to_string(), "1:00 PM - 5:00 PM".to_string()]
        );
        assert!(parse_slots("[").is_empty());
    }

    #[test]
    fn test_decode_object_and_list() {
        let interval = PersistedSlots::Interval {
            start_time: "10 PM".to_string(),
            end_time: "6 AM".to_string(),
        };
        assert_eq!(decode_slots(&interval), vec!["10:00 PM - 6:00 AM".to_string()]);

        let list = PersistedSlots::from(vec!["0 - 0".to_string(), "9 AM to 1 PM".to_string()]);
        assert_eq!(decode_slots(&list), vec!["9:00 AM - 1:00 PM".to_string()]);
    }

    #[test]
    fn test_decode_intervals_skips_unparseable() {
        let slots = PersistedSlots::from("9 AM - 1 PM, soon - later");
        let intervals = decode_intervals(&slots);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].to_string(), "9:00 AM - 1:00 PM");
    }

    #[test]
    fn test_is_unset() {
        assert!(PersistedSlots::from("0 - 0").is_unset());
        assert!(PersistedSlots::from("").is_unset());
        assert!(PersistedSlots::List(Vec::new()).is_unset());
        assert!(!PersistedSlots::from("9 AM - 1 PM").is_unset());
    }
}

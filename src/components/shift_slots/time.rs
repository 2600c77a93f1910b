//! Minute-of-day arithmetic for shift slots.
//!
//! Times are points in a 24-hour cycle with no date. An interval whose end is
//! earlier than its start crosses midnight.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minutes in a day
pub const MINUTES_PER_DAY: u32 = 1440;
/// Shortest shift a worker may pick, in minutes
pub const MIN_SHIFT_MINUTES: u32 = 60;

/// Half of the 12-hour clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// Parse "AM"/"PM" in any letter case
    pub fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("am") {
            Some(Meridiem::Am)
        } else if text.eq_ignore_ascii_case("pm") {
            Some(Meridiem::Pm)
        } else {
            None
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Meridiem::Am => f.write_str("AM"),
            Meridiem::Pm => f.write_str("PM"),
        }
    }
}

/// A 12-hour clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
    meridiem: Meridiem,
}

impl ClockTime {
    /// Create a clock time, hour in 1..=12 and minute in 0..=59
    pub fn new(hour: u8, minute: u8, meridiem: Meridiem) -> Option<Self> {
        if !(1..=12).contains(&hour) || minute > 59 {
            return None;
        }
        Some(Self {
            hour,
            minute,
            meridiem,
        })
    }

    /// Parse "h:mm AM", "h AM", "h:mmpm" or a 24-hour "HH:MM"
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        // Split off a trailing meridiem, attached or separated by whitespace
        let (clock, meridiem) = match text.len().checked_sub(2).and_then(|i| text.get(i..)) {
            Some(suffix) => match Meridiem::parse(suffix) {
                Some(meridiem) => (text[..text.len() - 2].trim_end(), Some(meridiem)),
                None => (text, None),
            },
            None => (text, None),
        };

        match meridiem {
            Some(meridiem) => {
                let (hour, minute) = match clock.split_once(':') {
                    Some((hour, minute)) => (hour, minute),
                    None => (clock, "0"),
                };
                let hour = hour.trim().parse::<u8>().ok()?;
                let minute = minute.trim().parse::<u8>().ok()?;
                Self::new(hour, minute, meridiem)
            }
            None => {
                // 24-hour legacy form needs the colon to tell it apart from a sentinel
                if !clock.contains(':') {
                    return None;
                }
                let time = NaiveTime::parse_from_str(clock, "%H:%M").ok()?;
                Some(Self::from_naive_time(time))
            }
        }
    }

    /// Build from a chrono time, dropping seconds
    pub fn from_naive_time(time: NaiveTime) -> Self {
        let (is_pm, hour) = time.hour12();
        Self {
            hour: hour as u8,
            minute: time.minute() as u8,
            meridiem: if is_pm { Meridiem::Pm } else { Meridiem::Am },
        }
    }

    /// Minutes since midnight; 12 AM is 0 and 12 PM is 720
    pub fn minutes(&self) -> u32 {
        let hour = u32::from(self.hour % 12);
        let base = match self.meridiem {
            Meridiem::Am => 0,
            Meridiem::Pm => 720,
        };
        base + hour * 60 + u32::from(self.minute)
    }

    /// Same instant as a chrono time
    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_num_seconds_from_midnight_opt(self.minutes() * 60, 0)
            .unwrap_or(NaiveTime::MIN)
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn meridiem(&self) -> Meridiem {
        self.meridiem
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02} {}", self.hour, self.minute, self.meridiem)
    }
}

/// A span between two clock times, possibly crossing midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeInterval {
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    /// Parse "start - end"; either side may use any form `ClockTime::parse` accepts
    pub fn parse(text: &str) -> Option<Self> {
        let (start, end) = text.split_once('-')?;
        Some(Self {
            start: ClockTime::parse(start)?,
            end: ClockTime::parse(end)?,
        })
    }

    /// Whether the interval crosses midnight
    pub fn wraps(&self) -> bool {
        self.end.minutes() < self.start.minutes()
    }

    /// Length in minutes, counting across midnight for wrapping intervals
    pub fn duration_minutes(&self) -> u32 {
        let start = self.start.minutes();
        let end = self.end.minutes();
        if end < start {
            (MINUTES_PER_DAY - start) + end
        } else {
            end - start
        }
    }

    /// Whether the interval meets the minimum shift length
    pub fn meets_minimum(&self) -> bool {
        self.duration_minutes() >= MIN_SHIFT_MINUTES
    }

    /// Whether the two intervals share time. Touching endpoints do not count.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        let (start_a, end_a) = (self.start.minutes(), self.end.minutes());
        let (start_b, end_b) = (other.start.minutes(), other.end.minutes());

        match (self.wraps(), other.wraps()) {
            // Both contain midnight
            (true, true) => true,
            (true, false) => !(end_a <= start_b && start_a >= end_b),
            (false, true) => !(end_b <= start_a && start_b >= end_a),
            (false, false) => !(end_a <= start_b || start_a >= end_b),
        }
    }

    /// Whether one interval ends at the exact minute the other starts
    pub fn chains_with(&self, other: &TimeInterval) -> bool {
        self.end.minutes() == other.start.minutes() || other.end.minutes() == self.start.minutes()
    }

    /// Overlap that is not excused by back-to-back chaining
    pub fn conflicts_with(&self, other: &TimeInterval) -> bool {
        !self.chains_with(other) && self.overlaps(other)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Minutes since midnight for a clock string
pub fn to_minutes(clock: &str) -> Option<u32> {
    ClockTime::parse(clock).map(|time| time.minutes())
}

/// Wraparound-aware duration of an interval string
pub fn duration(interval: &str) -> Option<u32> {
    TimeInterval::parse(interval).map(|interval| interval.duration_minutes())
}

/// Whether an interval string parses and lasts at least an hour
pub fn duration_valid(interval: &str) -> bool {
    TimeInterval::parse(interval).is_some_and(|interval| interval.meets_minimum())
}

/// Whether two interval strings overlap; unparseable input never overlaps
pub fn overlaps(a: &str, b: &str) -> bool {
    match (TimeInterval::parse(a), TimeInterval::parse(b)) {
        (Some(a), Some(b)) => a.overlaps(&b),
        _ => false,
    }
}

/// Whether two interval strings are back-to-back, compared by minute value
pub fn chained(a: &str, b: &str) -> bool {
    match (TimeInterval::parse(a), TimeInterval::parse(b)) {
        (Some(a), Some(b)) => a.chains_with(&b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minutes() {
        assert_eq!(to_minutes("12:00 AM"), Some(0));
        assert_eq!(to_minutes("12:00 PM"), Some(720));
        assert_eq!(to_minutes("1:30 PM"), Some(810));
        assert_eq!(to_minutes("11:59 PM"), Some(1439));
        assert_eq!(to_minutes("9 am"), Some(540));
        assert_eq!(to_minutes("9:15pm"), Some(1275));
        assert_eq!(to_minutes("13:30"), Some(810));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(to_minutes(""), None);
        assert_eq!(to_minutes("0"), None);
        assert_eq!(to_minutes("00"), None);
        assert_eq!(to_minutes("13:00 PM"), None);
        assert_eq!(to_minutes("0:30 AM"), None);
        assert_eq!(to_minutes("9:75 AM"), None);
        assert_eq!(to_minutes("noon"), None);
    }

    #[test]
    fn test_clock_display_is_canonical() {
        let time = ClockTime::parse("09:05 pm").unwrap();
        assert_eq!(time.to_string(), "9:05 PM");
        assert_eq!(ClockTime::parse("00:00").unwrap().to_string(), "12:00 AM");
        assert_eq!(time.to_naive_time().format("%H:%M").to_string(), "21:05");
    }

    #[test]
    fn test_duration() {
        assert_eq!(duration("9:00 AM - 5:00 PM"), Some(480));
        assert_eq!(duration("10:00 PM - 6:00 AM"), Some(480));
        assert_eq!(duration("9:00 AM - 9:30 AM"), Some(30));
        assert_eq!(duration("9:00 AM - 9:00 AM"), Some(0));
        assert_eq!(duration("9:00 AM - later"), None);
        assert_eq!(duration("0 - 0"), None);
    }

    #[test]
    fn test_duration_valid() {
        assert!(duration_valid("9:00 AM - 10:00 AM"));
        assert!(duration_valid("11:30 PM - 12:30 AM"));
        assert!(!duration_valid("9:00 AM - 9:59 AM"));
        assert!(!duration_valid("garbage"));
    }

    #[test]
    fn test_overlap_without_wraparound() {
        assert!(overlaps("9:00 AM - 1:00 PM", "12:00 PM - 4:00 PM"));
        assert!(overlaps("9:00 AM - 5:00 PM", "10:00 AM - 11:00 AM"));
        assert!(!overlaps("9:00 AM - 1:00 PM", "1:00 PM - 5:00 PM"));
        assert!(!overlaps("9:00 AM - 11:00 AM", "2:00 PM - 5:00 PM"));
    }

    #[test]
    fn test_overlap_with_wraparound() {
        assert!(overlaps("10:00 PM - 6:00 AM", "2:00 AM - 4:00 AM"));
        assert!(overlaps("10:00 PM - 6:00 AM", "11:00 PM - 2:00 AM"));
        assert!(overlaps("10:00 PM - 6:00 AM", "9:00 PM - 11:00 PM"));
        assert!(!overlaps("10:00 PM - 6:00 AM", "6:00 AM - 2:00 PM"));
        assert!(!overlaps("10:00 PM - 6:00 AM", "2:00 PM - 10:00 PM"));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let slots = [
            "9:00 AM - 1:00 PM",
            "12:00 PM - 4:00 PM",
            "1:00 PM - 5:00 PM",
            "10:00 PM - 6:00 AM",
            "2:00 AM - 4:00 AM",
            "11:00 PM - 2:00 AM",
            "6:00 AM - 2:00 PM",
        ];
        for a in slots {
            for b in slots {
                assert_eq!(overlaps(a, b), overlaps(b, a), "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_chained_compares_minutes_not_text() {
        assert!(chained("9:00 AM - 1:00 PM", "1:00 pm - 5:00 PM"));
        assert!(chained("1:00 PM - 5:00 PM", "09:00 AM - 13:00"));
        assert!(!chained("9:00 AM - 1:00 PM", "12:00 PM - 4:00 PM"));
    }

    #[test]
    fn test_conflicts_with() {
        let a = TimeInterval::parse("9:00 AM - 1:00 PM").unwrap();
        let b = TimeInterval::parse("12:00 PM - 4:00 PM").unwrap();
        let c = TimeInterval::parse("1:00 PM - 5:00 PM").unwrap();
        assert!(a.conflicts_with(&b));
        assert!(!a.conflicts_with(&c));
    }
}

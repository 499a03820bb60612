use std::collections::BTreeSet;

use chrono::Duration;

use crate::models::{Slot, TimeRange};

/// Expands open ranges into consecutive fixed-length slots.
///
/// Each range is walked from its start in `duration` steps; a slot is kept only
/// if it ends at or before the range end, so a short tail is dropped rather
/// than rounded. Ranges may overlap: a slot produced by more than one range is
/// returned once. The result is ordered by start time.
pub fn generate_slots(ranges: &[TimeRange], duration: Duration) -> Vec<Slot> {
    if duration <= Duration::zero() {
        return vec![];
    }

    let mut seen = BTreeSet::new();

    for range in ranges.iter().filter(|r| r.is_chronological()) {
        let mut start = range.start;
        loop {
            let (end, wrapped) = start.overflowing_add_signed(duration);
            // past midnight
            if wrapped != 0 || end > range.end {
                break;
            }
            seen.insert(TimeRange::new(start, end));
            start = end;
        }
    }

    seen.into_iter()
        .map(|r| Slot {
            start_time: r.start,
            end_time: r.end,
            is_available: true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn range(start: &str, end: &str) -> TimeRange {
        TimeRange::new(t(start), t(end))
    }

    fn starts(slots: &[Slot]) -> Vec<String> {
        slots
            .iter()
            .map(|s| s.start_time.format("%H:%M").to_string())
            .collect()
    }

    #[test]
    fn test_full_day_thirty_minute_slots() {
        let slots = generate_slots(&[range("09:00", "17:00")], Duration::minutes(30));

        assert_eq!(slots.len(), 16);
        assert_eq!(slots[0].start_time, t("09:00"));
        assert_eq!(slots[0].end_time, t("09:30"));
        assert_eq!(slots[15].start_time, t("16:30"));
        assert_eq!(slots[15].end_time, t("17:00"));
        for pair in slots.windows(2) {
            assert_eq!(pair[1].start_time - pair[0].start_time, Duration::minutes(30));
        }
        assert!(slots.iter().all(|s| s.is_available));
    }

    #[test]
    fn test_partial_tail_dropped() {
        let slots = generate_slots(&[range("09:00", "10:45")], Duration::minutes(30));
        assert_eq!(starts(&slots), vec!["09:00", "09:30", "10:00"]);
        assert_eq!(slots.last().unwrap().end_time, t("10:30"));
    }

    #[test]
    fn test_range_shorter_than_duration() {
        let slots = generate_slots(&[range("09:00", "09:20")], Duration::minutes(30));
        assert!(slots.is_empty());
    }

    #[test]
    fn test_overlapping_ranges_deduplicated() {
        let slots = generate_slots(
            &[range("09:00", "11:00"), range("10:00", "12:00")],
            Duration::minutes(30),
        );
        assert_eq!(
            starts(&slots),
            vec!["09:00", "09:30", "10:00", "10:30", "11:00", "11:30"]
        );
    }

    #[test]
    fn test_disjoint_ranges_sorted() {
        let slots = generate_slots(
            &[range("14:00", "15:00"), range("09:00", "10:00")],
            Duration::minutes(30),
        );
        assert_eq!(starts(&slots), vec!["09:00", "09:30", "14:00", "14:30"]);
    }

    #[test]
    fn test_misaligned_overlap_keeps_distinct_slots() {
        let slots = generate_slots(
            &[range("09:00", "10:00"), range("09:15", "09:45")],
            Duration::minutes(30),
        );
        assert_eq!(starts(&slots), vec!["09:00", "09:15", "09:30"]);
    }

    #[test]
    fn test_range_ending_at_midnight_edge() {
        let slots = generate_slots(&[range("23:00", "23:59")], Duration::minutes(30));
        assert_eq!(starts(&slots), vec!["23:00"]);
    }

    #[test]
    fn test_zero_duration_yields_nothing() {
        assert!(generate_slots(&[range("09:00", "17:00")], Duration::zero()).is_empty());
    }

    #[test]
    fn test_pure() {
        let ranges = [range("09:00", "12:00")];
        assert_eq!(
            generate_slots(&ranges, Duration::minutes(45)),
            generate_slots(&ranges, Duration::minutes(45))
        );
    }
}

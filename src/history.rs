use crate::types::DetectionRecord;
use chrono::Local;
use std::collections::VecDeque;

/// The backend reports this when the OCR stage could not read a full plate.
pub const INVALID_PLATE: &str = "Invalid Plate";

/// Oldest entries beyond this are dropped.
pub const MAX_HISTORY: usize = 10;

/// Bounded, newest-first list of observed plates. Owned by exactly one task;
/// there is no shared mutable state anywhere in the watch loop.
#[derive(Debug, Default)]
pub struct DetectionHistory {
    records: VecDeque<DetectionRecord>,
}

impl DetectionHistory {
    pub fn new() -> Self {
        Self {
            records: VecDeque::with_capacity(MAX_HISTORY),
        }
    }

    /// Admits a plate to the front of the history, stamping it with the
    /// current local time. Empty input and the backend's "no detection"
    /// sentinel are ignored. Returns whether the history changed.
    pub fn record_detection(&mut self, plate: &str) -> bool {
        self.record_detection_at(plate, Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
    }

    fn record_detection_at(&mut self, plate: &str, observed_at: String) -> bool {
        let plate = plate.trim();
        if plate.is_empty() || plate == INVALID_PLATE {
            return false;
        }
        self.records.push_front(DetectionRecord {
            plate: plate.to_string(),
            observed_at,
        });
        self.records.truncate(MAX_HISTORY);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectionRecord> {
        self.records.iter()
    }

    /// Display lines in history order, one per record.
    pub fn render(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| format!("{} - {}", r.plate, r.observed_at))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(history: &mut DetectionHistory, plate: &str) -> bool {
        history.record_detection_at(plate, "2026-01-01 00:00:00".to_string())
    }

    #[test]
    fn newest_first_ordering() {
        let mut history = DetectionHistory::new();
        insert(&mut history, "A");
        insert(&mut history, "B");
        insert(&mut history, "C");

        let plates: Vec<&str> = history.iter().map(|r| r.plate.as_str()).collect();
        assert_eq!(plates, vec!["C", "B", "A"]);
    }

    #[test]
    fn length_never_exceeds_bound() {
        let mut history = DetectionHistory::new();
        for i in 0..12 {
            insert(&mut history, &format!("PLATE-{:02}", i));
        }

        assert_eq!(history.len(), MAX_HISTORY);
        // The ten most recent survive; PLATE-00 and PLATE-01 dropped.
        let plates: Vec<&str> = history.iter().map(|r| r.plate.as_str()).collect();
        assert_eq!(plates.first(), Some(&"PLATE-11"));
        assert_eq!(plates.last(), Some(&"PLATE-02"));
        assert!(!plates.contains(&"PLATE-00"));
        assert!(!plates.contains(&"PLATE-01"));
    }

    #[test]
    fn sentinel_and_empty_are_ignored() {
        let mut history = DetectionHistory::new();
        assert!(!insert(&mut history, ""));
        assert!(!insert(&mut history, "   "));
        assert!(!insert(&mut history, INVALID_PLATE));
        assert!(history.is_empty());

        insert(&mut history, "REDP12");
        assert!(!insert(&mut history, INVALID_PLATE));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let mut history = DetectionHistory::new();
        assert!(insert(&mut history, "  REDP12 "));
        assert_eq!(history.iter().next().unwrap().plate, "REDP12");
    }

    #[test]
    fn render_matches_history_order() {
        let mut history = DetectionHistory::new();
        history.record_detection_at("A1", "2026-01-01 08:00:00".to_string());
        history.record_detection_at("B2", "2026-01-01 08:00:05".to_string());

        assert_eq!(
            history.render(),
            vec![
                "B2 - 2026-01-01 08:00:05".to_string(),
                "A1 - 2026-01-01 08:00:00".to_string(),
            ]
        );
    }
}

//! High score leaderboard system
//!
//! Persisted through a `KeyValueStore`, tracks top 10 scores.

use serde::{Deserialize, Serialize};

use crate::consts::STORAGE_KEY_PREFIX;
use crate::platform::storage::{KeyValueStore, StorageError};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Ticks survived
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a score and keep the best `MAX_HIGH_SCORES`.
    /// Returns the rank achieved (1-indexed) or None if it fell off the end.
    pub fn add_score(&mut self, score: u64, timestamp: f64) -> Option<usize> {
        // Ties keep the older entry first
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, HighScoreEntry { score, timestamp });

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        (pos < MAX_HIGH_SCORES).then_some(pos + 1)
    }

    /// Restore the sort and size invariants on data read from storage
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Splash screen lines: "1. 420 - 2 days ago", or a placeholder
    pub fn display_lines(&self, now_ms: f64) -> Vec<String> {
        if self.entries.is_empty() {
            return vec!["No scores yet".to_string()];
        }
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {} - {}", i + 1, e.score, format_date(e.timestamp, now_ms)))
            .collect()
    }
}

/// The leaderboard bound to a storage backend.
///
/// Storage failures are logged and treated as an empty board (on read) or a
/// lost save (on write); they never reach the caller.
#[derive(Debug)]
pub struct ScoreBoard<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ScoreBoard<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn storage_key() -> String {
        format!("{}HighScores", STORAGE_KEY_PREFIX)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn try_load(&self) -> Result<HighScores, StorageError> {
        let Some(json) = self.store.get(&Self::storage_key())? else {
            return Ok(HighScores::new());
        };
        let mut scores: HighScores = serde_json::from_str(&json)?;
        scores.normalize();
        Ok(scores)
    }

    /// Current leaderboard, at most `MAX_HIGH_SCORES` entries, best first
    pub fn get(&self) -> HighScores {
        match self.try_load() {
            Ok(scores) => scores,
            Err(e) => {
                log::warn!("Could not read high scores: {}", e);
                HighScores::new()
            }
        }
    }

    /// Record a finished run. Returns the rank achieved, if any.
    pub fn add(&mut self, score: u64, timestamp: f64) -> Option<usize> {
        let mut scores = self.get();
        let rank = scores.add_score(score, timestamp);

        let saved = serde_json::to_string(&scores)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(&Self::storage_key(), &json));
        match saved {
            Ok(()) => log::info!("High scores saved ({} entries)", scores.len()),
            Err(e) => log::warn!("Could not save high score {}: {}", score, e),
        }
        rank
    }
}

const MS_PER_MIN: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 60.0 * MS_PER_MIN;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;

/// Format a timestamp relative to `now_ms`
pub fn format_date(timestamp: f64, now_ms: f64) -> String {
    let diff_ms = now_ms - timestamp;
    let diff_mins = diff_ms / MS_PER_MIN;
    let diff_hours = diff_ms / MS_PER_HOUR;
    let diff_days = diff_ms / MS_PER_DAY;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i64;
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            let (year, month, day) = calendar_date(timestamp);
            format!("{}/{}/{:02}", month, day, year.rem_euclid(100))
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i64;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i64;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

/// Local calendar (year, month, day) of a timestamp
#[cfg(target_arch = "wasm32")]
fn calendar_date(timestamp: f64) -> (i64, u32, u32) {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
    (date.get_full_year() as i64, date.get_month() + 1, date.get_date())
}

/// UTC calendar (year, month, day) of a timestamp
#[cfg(not(target_arch = "wasm32"))]
fn calendar_date(timestamp: f64) -> (i64, u32, u32) {
    civil_from_days((timestamp / MS_PER_DAY).floor() as i64)
}

/// (year, month, day) in UTC for a day count since 1970-01-01
#[cfg(not(target_arch = "wasm32"))]
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::MemoryStore;

    fn scores(board: &ScoreBoard<MemoryStore>) -> Vec<u64> {
        board.get().entries.iter().map(|e| e.score).collect()
    }

    #[test]
    fn test_sorted_descending() {
        let mut board = ScoreBoard::new(MemoryStore::new());
        board.add(50, 1.0);
        board.add(200, 2.0);
        board.add(75, 3.0);
        assert_eq!(scores(&board), vec![200, 75, 50]);
    }

    #[test]
    fn test_eleventh_score_drops_lowest() {
        let mut board = ScoreBoard::new(MemoryStore::new());
        for s in 1..=10 {
            board.add(s * 10, s as f64);
        }
        assert_eq!(board.add(55, 11.0), Some(6));

        let kept = scores(&board);
        assert_eq!(kept.len(), 10);
        assert!(!kept.contains(&10));
        assert_eq!(kept.first(), Some(&100));
        assert_eq!(kept.last(), Some(&20));

        // Too low to rank
        assert_eq!(board.add(5, 12.0), None);
        assert_eq!(scores(&board).len(), 10);
    }

    #[test]
    fn test_ties_keep_older_entry_first() {
        let mut hs = HighScores::new();
        hs.add_score(100, 1.0);
        assert_eq!(hs.add_score(100, 2.0), Some(2));
        assert_eq!(hs.entries[0].timestamp, 1.0);
    }

    #[test]
    fn test_storage_key_uses_prefix() {
        let mut board = ScoreBoard::new(MemoryStore::new());
        board.add(42, 1000.0);
        let json = board.store().get("cabinetShooterHighScores").unwrap().unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("42"));
    }

    #[test]
    fn test_corrupt_storage_reads_as_empty() {
        let mut store = MemoryStore::new();
        store
            .set(&ScoreBoard::<MemoryStore>::storage_key(), "{not json")
            .unwrap();
        let mut board = ScoreBoard::new(store);
        assert!(board.get().is_empty());

        // Next save overwrites the bad data
        board.add(7, 1.0);
        assert_eq!(scores(&board), vec![7]);
    }

    #[test]
    fn test_unsorted_storage_is_normalized() {
        let mut store = MemoryStore::new();
        let json = r#"[{"score":1,"timestamp":0},{"score":9,"timestamp":0},{"score":5,"timestamp":0}]"#;
        store.set(&ScoreBoard::<MemoryStore>::storage_key(), json).unwrap();
        let board = ScoreBoard::new(store);
        assert_eq!(scores(&board), vec![9, 5, 1]);
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> crate::platform::storage::Result<Option<String>> {
            Err(StorageError::Unavailable)
        }

        fn set(&mut self, _key: &str, _value: &str) -> crate::platform::storage::Result<()> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn test_unavailable_storage_degrades() {
        let mut board = ScoreBoard::new(BrokenStore);
        assert!(board.get().is_empty());
        assert_eq!(board.add(10, 0.0), Some(1));
        assert!(board.get().is_empty());
    }

    #[test]
    fn test_display_lines() {
        let now = 1_700_000_000_000.0;
        assert_eq!(HighScores::new().display_lines(now), vec!["No scores yet"]);

        let mut hs = HighScores::new();
        hs.add_score(300, now - 2.0 * MS_PER_DAY);
        hs.add_score(120, now - 1000.0);
        assert_eq!(hs.display_lines(now), vec!["1. 300 - 2 days ago", "2. 120 - Just now"]);
    }

    #[test]
    fn test_format_date() {
        let now = 1_700_000_000_000.0;
        assert_eq!(format_date(now - 90.0 * 1000.0, now), "1 min ago");
        assert_eq!(format_date(now - 5.0 * MS_PER_MIN, now), "5 mins ago");
        assert_eq!(format_date(now - 3.5 * MS_PER_HOUR, now), "3 hours ago");
        assert_eq!(format_date(now - 1.2 * MS_PER_DAY, now), "Yesterday");
        // 2023-11-14 22:13 UTC minus ten days
        assert_eq!(format_date(now - 10.0 * MS_PER_DAY, now), "11/4/23");
    }

    #[test]
    fn test_civil_from_days() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(19_716), (2023, 12, 25));
        assert_eq!(civil_from_days(-1), (1969, 12, 31));
    }

    #[test]
    fn test_calendar_date_uses_timestamp_day() {
        // 2023-11-04 23:59:59 and 2023-11-05 00:00:00 UTC
        let midnight = 1_699_142_400_000.0;
        assert_eq!(calendar_date(midnight - 1000.0), (2023, 11, 4));
        assert_eq!(calendar_date(midnight), (2023, 11, 5));
    }
}

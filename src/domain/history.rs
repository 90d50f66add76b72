//! Undo/redo history of feature collections
//!
//! The history is an append-only log of full snapshots with a movable
//! cursor. It never computes status: callers take the snapshot under the
//! cursor and hand its features to the resolution engine.
//!
//! Invariants:
//! - the log is never empty
//! - `cursor < len`
//! - pushing while the cursor is in the past discards every later snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::feature::Feature;

#[derive(Debug, Error, PartialEq)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("History is empty")]
    Empty,

    #[error("Failed to fingerprint snapshot: {0}")]
    Fingerprint(String),
}

/// One recorded feature collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub recorded_at: DateTime<Utc>,

    /// Short description of what produced the snapshot
    pub action: String,

    pub features: Vec<Feature>,
}

impl Snapshot {
    pub fn new(action: impl Into<String>, features: Vec<Feature>) -> Self {
        Self {
            recorded_at: Utc::now(),
            action: action.into(),
            features,
        }
    }

    /// Content hash of the feature collection (ignores time and action)
    pub fn fingerprint(&self) -> Result<String, HistoryError> {
        let mut hasher = blake3::Hasher::new();
        serde_json::to_writer(&mut hasher, &self.features)
            .map_err(|e| HistoryError::Fingerprint(e.to_string()))?;
        Ok(hasher.finalize().to_hex().to_string())
    }

    /// First 7 hex characters of the fingerprint
    pub fn short_fingerprint(&self) -> Result<String, HistoryError> {
        Ok(self.fingerprint()?[..7].to_string())
    }
}

/// Snapshot log with cursor
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,
    /// Maximum snapshots retained, 0 for unlimited
    limit: usize,
}

impl History {
    /// Starts a history with a single snapshot
    pub fn new(initial: Snapshot) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
            limit: 0,
        }
    }

    /// Rebuilds a history from stored parts, clamping the cursor
    pub fn from_parts(snapshots: Vec<Snapshot>, cursor: Option<usize>) -> Result<Self, HistoryError> {
        if snapshots.is_empty() {
            return Err(HistoryError::Empty);
        }

        let last = snapshots.len() - 1;
        let cursor = cursor.map_or(last, |c| c.min(last));

        Ok(Self {
            snapshots,
            cursor,
            limit: 0,
        })
    }

    /// Sets the retention limit and trims immediately
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self.enforce_limit();
        self
    }

    /// The snapshot under the cursor
    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.cursor]
    }

    /// Features of the snapshot under the cursor
    pub fn current_features(&self) -> &[Feature] {
        &self.current().features
    }

    /// Records a new snapshot after the cursor
    ///
    /// Returns false (and changes nothing) if the features are identical to
    /// the current snapshot.
    pub fn push(&mut self, snapshot: Snapshot) -> Result<bool, HistoryError> {
        if snapshot.fingerprint()? == self.current().fingerprint()? {
            return Ok(false);
        }

        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;
        self.enforce_limit();
        Ok(true)
    }

    /// Moves the cursor one step back
    pub fn undo(&mut self) -> Result<&Snapshot, HistoryError> {
        if !self.can_undo() {
            return Err(HistoryError::NothingToUndo);
        }
        self.cursor -= 1;
        Ok(self.current())
    }

    /// Moves the cursor one step forward
    pub fn redo(&mut self) -> Result<&Snapshot, HistoryError> {
        if !self.can_redo() {
            return Err(HistoryError::NothingToRedo);
        }
        self.cursor += 1;
        Ok(self.current())
    }

    /// Discards the whole log, keeping only `snapshot`
    pub fn reset(&mut self, snapshot: Snapshot) {
        self.snapshots = vec![snapshot];
        self.cursor = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false; a history holds at least one snapshot
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    fn enforce_limit(&mut self) {
        if self.limit == 0 || self.snapshots.len() <= self.limit {
            return;
        }
        let excess = self.snapshots.len() - self.limit;
        self.snapshots.drain(..excess);
        self.cursor = self.cursor.saturating_sub(excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(action: &str, flags: &[(&str, bool)]) -> Snapshot {
        Snapshot::new(
            action,
            flags
                .iter()
                .map(|(id, on)| Feature::new(id.parse().unwrap(), *on))
                .collect(),
        )
    }

    #[test]
    fn starts_with_single_snapshot() {
        let history = History::new(snapshot("init", &[("a", true)]));
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.is_empty());
    }

    #[test]
    fn push_moves_cursor_to_end() {
        let mut history = History::new(snapshot("init", &[("a", true)]));
        assert!(history.push(snapshot("disable a", &[("a", false)])).unwrap());

        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 1);
        assert!(!history.current_features()[0].enabled);
    }

    #[test]
    fn identical_push_is_noop() {
        let mut history = History::new(snapshot("init", &[("a", true)]));
        assert!(!history.push(snapshot("sync", &[("a", true)])).unwrap());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn undo_and_redo() {
        let mut history = History::new(snapshot("init", &[("a", true)]));
        history.push(snapshot("off", &[("a", false)])).unwrap();

        let undone = history.undo().unwrap();
        assert!(undone.features[0].enabled);
        assert!(history.can_redo());

        let redone = history.redo().unwrap();
        assert!(!redone.features[0].enabled);
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_at_start_fails() {
        let mut history = History::new(snapshot("init", &[("a", true)]));
        assert_eq!(history.undo().unwrap_err(), HistoryError::NothingToUndo);
    }

    #[test]
    fn redo_at_end_fails() {
        let mut history = History::new(snapshot("init", &[("a", true)]));
        assert_eq!(history.redo().unwrap_err(), HistoryError::NothingToRedo);
    }

    #[test]
    fn push_after_undo_truncates_future() {
        let mut history = History::new(snapshot("init", &[("a", true), ("b", true)]));
        history.push(snapshot("a off", &[("a", false), ("b", true)])).unwrap();
        history.push(snapshot("b off", &[("a", false), ("b", false)])).unwrap();
        history.undo().unwrap();
        history.undo().unwrap();

        history.push(snapshot("b off only", &[("a", true), ("b", false)])).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 1);
        assert!(!history.can_redo());
        assert_eq!(history.current().action, "b off only");
    }

    #[test]
    fn reset_discards_everything() {
        let mut history = History::new(snapshot("init", &[("a", true)]));
        history.push(snapshot("off", &[("a", false)])).unwrap();
        history.reset(snapshot("reset", &[("a", true)]));

        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.current().action, "reset");
    }

    #[test]
    fn limit_drops_oldest_and_shifts_cursor() {
        let mut history = History::new(snapshot("s0", &[("a", true)])).with_limit(3);
        history.push(snapshot("s1", &[("a", false)])).unwrap();
        history.push(snapshot("s2", &[("a", true), ("b", true)])).unwrap();
        history.push(snapshot("s3", &[("a", true), ("b", false)])).unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.snapshots()[0].action, "s1");
    }

    #[test]
    fn zero_limit_is_unlimited() {
        let mut history = History::new(snapshot("s0", &[("a", true)])).with_limit(0);
        for i in 0..20 {
            let id = format!("f{}", i);
            history.push(snapshot(&format!("s{}", i + 1), &[(id.as_str(), true)])).unwrap();
        }
        assert_eq!(history.len(), 21);
    }

    #[test]
    fn from_parts_clamps_cursor() {
        let snapshots = vec![snapshot("s0", &[("a", true)]), snapshot("s1", &[("a", false)])];

        let history = History::from_parts(snapshots.clone(), Some(9)).unwrap();
        assert_eq!(history.cursor(), 1);

        let history = History::from_parts(snapshots.clone(), None).unwrap();
        assert_eq!(history.cursor(), 1);

        let history = History::from_parts(snapshots, Some(0)).unwrap();
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn from_parts_rejects_empty() {
        assert_eq!(
            History::from_parts(vec![], None).unwrap_err(),
            HistoryError::Empty
        );
    }

    #[test]
    fn fingerprint_ignores_action_and_time() {
        let a = snapshot("one", &[("a", true)]);
        let b = snapshot("two", &[("a", true)]);
        let c = snapshot("one", &[("a", false)]);

        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_ne!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
        assert_eq!(a.short_fingerprint().unwrap().len(), 7);
    }

    #[test]
    fn fingerprint_hashes_the_full_payload() {
        let plain = snapshot("plain", &[("a", true)]);
        let mut tuned = plain.clone();
        tuned.features[0]
            .config
            .insert("MAX_RETRIES".into(), serde_json::Value::from(3));

        let expected = blake3::hash(&serde_json::to_vec(&plain.features).unwrap());
        assert_eq!(plain.fingerprint().unwrap(), expected.to_hex().to_string());
        assert_ne!(
            plain.fingerprint().unwrap(),
            blake3::hash(b"").to_hex().to_string()
        );

        // A config-only change is a real change and gets recorded
        let mut history = History::new(plain);
        assert!(history.push(tuned).unwrap());
        assert_eq!(history.len(), 2);
    }
}

//! JSONL storage for feature history
//!
//! Snapshots are stored in `.flagdeck/history.jsonl`, one JSON object per
//! line, oldest first. The undo/redo cursor lives next to it in
//! `.flagdeck/HEAD` as a bare index. Uses file locking for concurrent
//! access safety.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::project::PROJECT_DIR;
use crate::domain::{History, HistoryError, Snapshot};

/// Store for the snapshot log and its cursor
pub struct HistoryStore {
    path: PathBuf,
    head_path: PathBuf,
}

impl HistoryStore {
    /// Creates a store with the log at `path` and the cursor beside it
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let head_path = path.with_file_name("HEAD");
        Self { path, head_path }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(PROJECT_DIR).join("history.jsonl"))
    }

    /// Returns the path to the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true once a history has been written
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads every snapshot, oldest first
    pub fn read_snapshots(&self) -> Result<Vec<Snapshot>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open history: {}", self.path.display()))?;

        file.lock_shared()
            .context("Failed to acquire read lock on history")?;

        let reader = BufReader::new(&file);
        let mut snapshots = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let snapshot: Snapshot = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse snapshot at line {}", line_num + 1))?;

            snapshots.push(snapshot);
        }

        Ok(snapshots)
    }

    /// Reads the cursor; a missing or unreadable HEAD yields `None`
    pub fn read_cursor(&self) -> Option<usize> {
        fs::read_to_string(&self.head_path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }

    /// Loads the full history, applying the retention limit
    pub fn load(&self, limit: usize) -> Result<History> {
        let snapshots = self.read_snapshots()?;
        let cursor = self.read_cursor();

        let history = History::from_parts(snapshots, cursor)
            .map_err(|e| match e {
                HistoryError::Empty => anyhow::anyhow!(
                    "No history at {}. Run 'flagdeck init' first.",
                    self.path.display()
                ),
                other => other.into(),
            })?;

        Ok(history.with_limit(limit))
    }

    /// Writes the whole history (full rewrite) and its cursor
    pub fn save(&self, history: &History) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on history")?;

            let mut writer = BufWriter::new(&file);

            for snapshot in history.snapshots() {
                let line = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;
                writeln!(writer, "{}", line).context("Failed to write snapshot")?;
            }

            writer.flush().context("Failed to flush history")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        self.write_cursor(history.cursor())
    }

    fn write_cursor(&self, cursor: usize) -> Result<()> {
        let temp_path = self.head_path.with_extension("tmp");

        fs::write(&temp_path, format!("{}\n", cursor))
            .with_context(|| format!("Failed to write cursor: {}", temp_path.display()))?;

        fs::rename(&temp_path, &self.head_path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.head_path.display()
            )
        })
    }
}

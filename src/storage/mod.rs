//! # Storage Layer
//!
//! Persistence layer for flagdeck with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | History | JSONL (one snapshot per line) | `.flagdeck/history.jsonl` |
//! | Cursor | Plain integer | `.flagdeck/HEAD` |
//! | Config | TOML | `.flagdeck/config.toml` |
//! | Features | JSON array | project root, `source` in config |
//!
//! ## Concurrency Safety
//!
//! - [`HistoryStore`] uses file locking (`fs2`) for concurrent access
//! - All writes are atomic (temp file + rename)
//!
//! ## Project Structure
//!
//! ```text
//! .flagdeck/
//! ├── history.jsonl         # Snapshot log, oldest first
//! ├── HEAD                  # Undo/redo cursor
//! ├── config.toml           # Project configuration
//! └── .gitignore
//! ```
//!
//! Only plain feature collections are written; computed status is always
//! derived again on load.

mod config;
mod history_store;
mod project;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, PreviewConfig, ProjectConfig};
pub use history_store::HistoryStore;
pub use project::{Project, ProjectError, PROJECT_DIR};

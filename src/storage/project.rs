//! Project management
//!
//! Handles project initialization and provides access to the history store
//! and the codebase's feature definition file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, HistoryStore};
use crate::domain::{parse_features, Feature, History, Snapshot};

/// Name of the per-project state directory
pub const PROJECT_DIR: &str = ".flagdeck";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a flagdeck project. Run 'flagdeck init' first.")]
    NotInProject,

    #[error("Feature source not found: {0}")]
    SourceNotFound(PathBuf),
}

/// A flagdeck project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a project at the given path
    ///
    /// Seeds the history from the feature source when it exists, otherwise
    /// from an empty collection. Existing config and history are left alone.
    pub fn init(root: impl Into<PathBuf>, source: Option<&str>) -> Result<Self> {
        let root = root.into();
        let dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {} directory: {}", PROJECT_DIR, dir.display()))?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() {
            let source = source.unwrap_or("features.json");
            let default_config = format!(
                r#"# flagdeck configuration

# Feature definition file, relative to the project root
source = "{}"

# Snapshots kept for undo/redo (0 keeps everything)
history_limit = 100

[preview]
# Features shown by 'flagdeck preview' (empty shows all)
features = []
"#,
                source.replace('\\', "\\\\").replace('"', "\\\"")
            );
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = r#"# Interrupted writes
*.tmp
"#;
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let project = Self::open(root)?;

        let store = project.history_store();
        if !store.exists() {
            let features = if project.source_path().exists() {
                project.load_source()?
            } else {
                Vec::new()
            };
            let history = History::new(Snapshot::new("init", features));
            store.save(&history)?;
        }

        Ok(project)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .flagdeck directory path
    pub fn dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the history store
    pub fn history_store(&self) -> HistoryStore {
        HistoryStore::for_project(&self.root)
    }

    /// Loads the history with the configured retention limit
    pub fn load_history(&self) -> Result<History> {
        self.history_store().load(self.config.project.history_limit)
    }

    /// Persists the history
    pub fn save_history(&self, history: &History) -> Result<()> {
        self.history_store().save(history)
    }

    /// Path of the codebase's feature definition file
    pub fn source_path(&self) -> PathBuf {
        self.root.join(&self.config.project.source)
    }

    /// Reads and validates the codebase's feature definition file
    pub fn load_source(&self) -> Result<Vec<Feature>> {
        let path = self.source_path();
        if !path.exists() {
            return Err(ProjectError::SourceNotFound(path).into());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read feature source: {}", path.display()))?;

        parse_features(&content)
            .with_context(|| format!("Invalid feature source: {}", path.display()))
    }
}

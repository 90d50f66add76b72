//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{feature_cmd, history_cmd, portability, query, tui};
use crate::domain::FeatureStatus;
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "flagdeck")]
#[command(author, version, about = "Local-first feature flag administration")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new flagdeck project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Feature definition file, relative to the project root
        #[arg(long)]
        source: Option<String>,
    },

    /// List features with their status
    List {
        /// Only features whose id, name or description contains TEXT
        #[arg(long, short)]
        search: Option<String>,

        /// Only features with this status (active, manual, blocked)
        #[arg(long)]
        status: Option<FeatureStatus>,
    },

    /// Show feature details
    Show {
        /// Feature ID
        id: String,
    },

    /// Switch a feature on
    Enable {
        /// Feature ID
        id: String,
    },

    /// Switch a feature off
    Disable {
        /// Feature ID
        id: String,
    },

    /// Flip a feature's manual switch
    Toggle {
        /// Feature ID
        id: String,
    },

    /// Show status counts and undo/redo availability
    Status,

    /// Show features blocked by their dependencies
    Blocked,

    /// Explain why a feature is not active
    Why {
        /// Feature ID
        id: String,
    },

    /// Show what users of each feature would see
    Preview,

    /// Show the dependency graph
    Graph {
        /// Emit Graphviz DOT instead of a tree
        #[arg(long)]
        dot: bool,
    },

    /// Report dependency cycles and unknown dependency IDs
    Check,

    /// Step back to the previous snapshot
    Undo,

    /// Step forward to the next snapshot
    Redo,

    /// List recorded snapshots
    History,

    /// Discard history and restore the feature source
    Reset,

    /// Record the feature source as a new snapshot
    Sync,

    /// Export the current features as JSON
    Export {
        /// Write to FILE instead of stdout
        #[arg(long, short)]
        output: Option<String>,
    },

    /// Import features from JSON and record them as a new snapshot
    Import {
        /// JSON file (reads stdin when omitted or '-')
        file: Option<String>,
    },

    /// Export feature state for AI agents
    Context,

    /// Open the interactive dashboard
    Dashboard,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("flagdeck starting");

    match cli.command {
        Commands::Init { path, source } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path, source.as_deref())?;
            let history = project.load_history()?;
            output.verbose_ctx("init", &format!("Created {}", project.dir().display()));
            output.success(&format!(
                "Initialized flagdeck project at {} ({} features)",
                project.root().display(),
                history.current_features().len()
            ));
        }

        Commands::List { search, status } => {
            output.verbose_ctx("list", &format!("search={:?}, status={:?}", search, status));
            feature_cmd::list(&output, search.as_deref(), status)?
        }
        Commands::Show { id } => feature_cmd::show(&output, &id)?,
        Commands::Enable { id } => feature_cmd::set_enabled(&output, &id, Some(true))?,
        Commands::Disable { id } => feature_cmd::set_enabled(&output, &id, Some(false))?,
        Commands::Toggle { id } => feature_cmd::set_enabled(&output, &id, None)?,

        Commands::Status => {
            output.verbose("Gathering feature status");
            query::status(&output)?
        }
        Commands::Blocked => query::blocked(&output)?,
        Commands::Why { id } => query::why(&output, &id)?,
        Commands::Preview => query::preview(&output)?,
        Commands::Graph { dot } => query::graph(&output, dot)?,
        Commands::Check => query::check(&output)?,

        Commands::Undo => history_cmd::undo(&output)?,
        Commands::Redo => history_cmd::redo(&output)?,
        Commands::History => history_cmd::list(&output)?,
        Commands::Reset => history_cmd::reset(&output)?,
        Commands::Sync => history_cmd::sync(&output)?,

        Commands::Export { output: path } => portability::export(&output, path.as_deref())?,
        Commands::Import { file } => portability::import(&output, file.as_deref())?,
        Commands::Context => portability::context(&output)?,

        Commands::Dashboard => tui::run(&output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

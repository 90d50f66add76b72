//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Features | Inspect and switch features | `list`, `show`, `enable`, `disable`, `toggle` |
//! | Query | Read resolved status | `status`, `blocked`, `why`, `preview`, `graph`, `check` |
//! | History | Snapshot log | `undo`, `redo`, `history`, `reset`, `sync` |
//! | Portability | JSON handoff | `export`, `import`, `context` |
//! | Interactive | Terminal dashboard | `dashboard` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! flagdeck --verbose toggle user-auth
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod feature_cmd;
mod history_cmd;
mod portability;
mod query;
mod tui;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};

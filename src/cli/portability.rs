//! Import, export and AI context commands
//!
//! Exports carry plain feature records only; status is derived again by
//! whoever loads them.

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};

use super::history_cmd::record;
use super::output::Output;
use crate::domain::{parse_features, resolve, Snapshot, StatusSummary};
use crate::storage::Project;

/// Write the current features as pretty JSON
pub fn export(output: &Output, path: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let history = project.load_history()?;
    let features = history.current_features();

    let json =
        serde_json::to_string_pretty(features).context("Failed to serialize features")?;

    match path {
        Some(path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write export: {}", path))?;
            output.verbose_ctx("export", &format!("Wrote {} bytes", json.len() + 1));
            output.success(&format!("Exported {} features to {}", features.len(), path));
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Validate a JSON feature array and record it as a new snapshot
pub fn import(output: &Output, file: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let mut history = project.load_history()?;

    let (content, origin) = match file {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read features from stdin")?;
            (buf, "stdin".to_string())
        }
        Some(path) => (
            fs::read_to_string(path).with_context(|| format!("Failed to read import: {}", path))?,
            path.to_string(),
        ),
    };
    output.verbose_ctx("import", &format!("Read {} bytes from {}", content.len(), origin));

    let features =
        parse_features(&content).with_context(|| format!("Invalid import from {}", origin))?;
    let count = features.len();
    let summary = StatusSummary::from_computed(&resolve(&features));

    let recorded = record(
        &project,
        &mut history,
        Snapshot::new(format!("import {}", origin), features),
        output,
    )?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "imported": recorded,
            "features": count,
            "summary": summary,
        }));
    } else if recorded {
        println!(
            "Imported {} features ({} active, {} manual, {} blocked)",
            count, summary.active, summary.manual, summary.blocked
        );
    } else {
        println!("Import matches the current features; nothing recorded");
    }

    Ok(())
}

/// Compact machine-readable state for AI agents
///
/// Always JSON, regardless of `--format`.
pub fn context(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let history = project.load_history()?;
    let computed = resolve(history.current_features());
    output.verbose_ctx("context", &format!("Resolved {} features", computed.len()));

    let features: Vec<_> = computed
        .iter()
        .map(|c| {
            serde_json::json!({
                "id": c.id,
                "enabled": c.enabled,
                "status": c.status,
                "blockedBy": c.blocked_by,
                "requires": c.requires(),
            })
        })
        .collect();

    let doc = serde_json::json!({
        "summary": StatusSummary::from_computed(&computed),
        "features": features,
        "history": {
            "cursor": history.cursor(),
            "len": history.len(),
        },
    });

    println!("{}", serde_json::to_string(&doc).context("Failed to serialize context")?);
    Ok(())
}

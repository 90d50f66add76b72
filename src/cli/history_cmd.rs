//! History commands (undo, redo, history, reset, sync)

use anyhow::Result;

use super::output::Output;
use crate::domain::{resolve, History, HistoryError, Snapshot, StatusSummary};
use crate::storage::Project;

/// Pushes a snapshot and persists the history
///
/// Returns false when the snapshot matched the current one and nothing
/// was written.
pub(super) fn record(
    project: &Project,
    history: &mut History,
    snapshot: Snapshot,
    output: &Output,
) -> Result<bool> {
    let action = snapshot.action.clone();

    if !history.push(snapshot)? {
        output.verbose_ctx("history", &format!("'{}' changed nothing, not recorded", action));
        return Ok(false);
    }

    project.save_history(history)?;
    output.verbose_ctx(
        "history",
        &format!(
            "Recorded '{}' as snapshot {} of {}",
            action,
            history.cursor() + 1,
            history.len()
        ),
    );
    Ok(true)
}

fn summary_of(snapshot: &Snapshot) -> StatusSummary {
    StatusSummary::from_computed(&resolve(&snapshot.features))
}

fn report_position(output: &Output, verb: &str, history: &History) {
    let current = history.current();
    let summary = summary_of(current);

    if output.is_json() {
        output.data(&serde_json::json!({
            "cursor": history.cursor(),
            "len": history.len(),
            "action": current.action,
            "recorded_at": current.recorded_at,
            "summary": summary,
            "can_undo": history.can_undo(),
            "can_redo": history.can_redo(),
        }));
    } else {
        println!(
            "{} to snapshot {} of {}: {} ({} active, {} manual, {} blocked)",
            verb,
            history.cursor() + 1,
            history.len(),
            current.action,
            summary.active,
            summary.manual,
            summary.blocked
        );
    }
}

/// Step back one snapshot
pub fn undo(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let mut history = project.load_history()?;

    history.undo()?;
    project.save_history(&history)?;
    output.verbose_ctx("undo", &format!("Cursor moved to {}", history.cursor()));

    report_position(output, "Undid", &history);
    Ok(())
}

/// Step forward one snapshot
pub fn redo(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let mut history = project.load_history()?;

    history.redo()?;
    project.save_history(&history)?;
    output.verbose_ctx("redo", &format!("Cursor moved to {}", history.cursor()));

    report_position(output, "Redid", &history);
    Ok(())
}

/// List every snapshot, marking the current one
pub fn list(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let history = project.load_history()?;
    output.verbose_ctx("history", &format!("Loaded {} snapshots", history.len()));

    if output.is_json() {
        let items: Vec<serde_json::Value> = history
            .snapshots()
            .iter()
            .enumerate()
            .map(|(index, snapshot)| -> Result<serde_json::Value, HistoryError> {
                Ok(serde_json::json!({
                    "index": index,
                    "current": index == history.cursor(),
                    "recorded_at": snapshot.recorded_at,
                    "action": snapshot.action,
                    "fingerprint": snapshot.fingerprint()?,
                    "summary": summary_of(snapshot),
                }))
            })
            .collect::<Result<_, _>>()?;
        output.data(&items);
        return Ok(());
    }

    println!("History ({} snapshots):", history.len());
    println!(
        "  {:<4} {:<20} {:<8} {:<14} ACTION",
        "#", "RECORDED", "HASH", "ON/OFF/BLOCK"
    );
    println!("{}", "-".repeat(70));
    for (index, snapshot) in history.snapshots().iter().enumerate() {
        let marker = if index == history.cursor() { "*" } else { " " };
        let summary = summary_of(snapshot);
        println!(
            "{} {:<4} {:<20} {:<8} {:<14} {}",
            marker,
            index + 1,
            snapshot.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            snapshot.short_fingerprint()?,
            format!("{}/{}/{}", summary.active, summary.manual, summary.blocked),
            snapshot.action
        );
    }

    Ok(())
}

/// Replace the whole history with the feature source
pub fn reset(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let mut history = project.load_history()?;
    let features = project.load_source()?;
    output.verbose_ctx(
        "reset",
        &format!(
            "Loaded {} features from {}",
            features.len(),
            project.source_path().display()
        ),
    );

    let discarded = history.len();
    history.reset(Snapshot::new("reset", features));
    project.save_history(&history)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "reset": true,
            "discarded": discarded,
            "features": history.current_features().len(),
        }));
    } else {
        println!(
            "Reset to {} ({} features, {} snapshots discarded)",
            project.config().project.source,
            history.current_features().len(),
            discarded
        );
    }

    Ok(())
}

/// Record the feature source as a new snapshot
pub fn sync(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let mut history = project.load_history()?;
    let features = project.load_source()?;
    let count = features.len();
    output.verbose_ctx(
        "sync",
        &format!("Loaded {} features from {}", count, project.source_path().display()),
    );

    let recorded = record(&project, &mut history, Snapshot::new("sync", features), output)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "synced": recorded,
            "features": count,
            "cursor": history.cursor(),
        }));
    } else if recorded {
        println!(
            "Synced {} features from {}",
            count,
            project.config().project.source
        );
    } else {
        println!("Already in sync with {}", project.config().project.source);
    }

    Ok(())
}

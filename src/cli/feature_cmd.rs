//! Feature commands (list, show, enable, disable, toggle)

use anyhow::{anyhow, Result};

use super::history_cmd::record;
use super::output::Output;
use crate::domain::{
    resolve, with_enabled, ComputedFeature, DependencyGraph, FeatureFilter, FeatureStatus,
    Snapshot,
};
use crate::storage::Project;

/// List features, optionally filtered by text and status
pub fn list(output: &Output, search: Option<&str>, status: Option<FeatureStatus>) -> Result<()> {
    let project = Project::open_current()?;
    output.verbose_ctx("list", &format!("Opened project at: {}", project.root().display()));

    let history = project.load_history()?;
    let features = history.current_features();
    let computed = resolve(features);
    let graph = DependencyGraph::from_features(features);

    let filter = FeatureFilter::new(search, status);
    let matched = filter.apply(&computed);
    output.verbose_ctx(
        "list",
        &format!("{} of {} features match", matched.len(), computed.len()),
    );

    if output.is_json() {
        let items: Vec<_> = matched
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "name": c.name,
                    "status": c.status,
                    "blockedBy": c.blocked_by,
                    "dependents": graph.dependents(c.id.as_str()),
                })
            })
            .collect();
        output.data(&items);
    } else if matched.is_empty() {
        println!("No features found.");
    } else {
        println!("Features ({}):", matched.len());
        println!("{:<4}{:<24} {:<28} {:<5} BLOCKED BY", "", "ID", "NAME", "DEPS");
        println!("{}", "-".repeat(80));
        for c in matched {
            println!(
                "{:<4}{:<24} {:<28} {:<5} {}",
                c.status.indicator(),
                c.id,
                c.display_name(),
                graph.dependents(c.id.as_str()).len(),
                c.blocked_by.join(", ")
            );
        }
    }

    Ok(())
}

/// Show everything known about one feature
pub fn show(output: &Output, id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let history = project.load_history()?;
    let features = history.current_features();
    let computed = resolve(features);
    let graph = DependencyGraph::from_features(features);

    let feature = find(&computed, id)?;
    let dependents = graph.dependents(id);

    if output.is_json() {
        output.data(&serde_json::json!({
            "feature": feature,
            "dependents": dependents,
        }));
        return Ok(());
    }

    println!("{} {}", feature.status.indicator(), feature.display_name());
    println!("{}", "-".repeat(60));
    println!("{:<14} {}", "ID:", feature.id);
    if !feature.version.is_empty() {
        println!("{:<14} {}", "Version:", feature.version);
    }
    println!("{:<14} {}", "Enabled:", feature.enabled);
    println!("{:<14} {}", "Status:", feature.status);
    if !feature.blocked_by.is_empty() {
        println!("{:<14} {}", "Blocked by:", feature.blocked_by.join(", "));
    }
    if let Some(fallback) = &feature.fallback {
        println!("{:<14} {}", "Fallback:", fallback);
    }
    if !feature.description.is_empty() {
        println!();
        println!("{}", feature.description);
    }

    if !feature.requires().is_empty() {
        println!();
        println!("Requires:");
        for dep in feature.requires() {
            let status = computed
                .iter()
                .find(|c| c.id == dep.as_str())
                .map_or("missing", |c| c.status.as_str());
            println!("  {:<24} {}", dep, status);
        }
    }

    if !dependents.is_empty() {
        println!();
        println!("Required by:");
        for dependent in &dependents {
            println!("  {}", dependent);
        }
    }

    if !feature.backend.routes.is_empty() {
        println!();
        println!("Routes:");
        for route in &feature.backend.routes {
            println!("  {:<7} {:<32} {}", route.method, route.path, route.handler);
        }
    }

    if !feature.health.endpoint.is_empty() {
        println!();
        println!("Health:");
        println!("  {:<14} {}", "Endpoint:", feature.health.endpoint);
        if let Some(timeout) = feature.health.timeout {
            println!("  {:<14} {}ms", "Timeout:", timeout);
        }
        if let Some(failures) = feature.health.auto_disable {
            println!("  {:<14} after {} failures", "Auto-disable:", failures);
        }
        if let Some(breaker) = &feature.health.circuit_breaker {
            println!(
                "  {:<14} {} (threshold {})",
                "Breaker:",
                if breaker.enabled { "on" } else { "off" },
                breaker.failure_threshold
            );
        }
    }

    if !feature.config.is_empty() {
        println!();
        println!("Config:");
        for (key, value) in &feature.config {
            println!("  {:<24} {}", key, value);
        }
    }

    if let Some(limits) = feature.security.as_ref().and_then(|s| s.rate_limit.as_ref()) {
        println!();
        println!("Rate limits:");
        for (key, value) in limits {
            println!("  {:<24} {}", key, value);
        }
    }

    if let Some(metrics) = feature.monitoring.as_ref().and_then(|m| m.metrics.as_ref()) {
        println!();
        println!("Metrics: {}", metrics.join(", "));
    }

    Ok(())
}

/// Set a feature's manual flag (`None` flips it)
pub fn set_enabled(output: &Output, id: &str, enabled: Option<bool>) -> Result<()> {
    let project = Project::open_current()?;
    let mut history = project.load_history()?;

    let current = history
        .current_features()
        .iter()
        .find(|f| f.id == id)
        .ok_or_else(|| anyhow!("Feature not found: {}", id))?;
    let target = enabled.unwrap_or(!current.enabled);
    let word = if target { "enabled" } else { "disabled" };

    if current.enabled == target {
        output.verbose_ctx("toggle", &format!("{} unchanged", id));
        output.success(&format!("{} is already {}", id, word));
        return Ok(());
    }

    let before = resolve(history.current_features());
    let features = with_enabled(history.current_features(), id, target)
        .ok_or_else(|| anyhow!("Feature not found: {}", id))?;
    let after = resolve(&features);

    let action = format!("{} {}", if target { "enable" } else { "disable" }, id);
    record(&project, &mut history, Snapshot::new(action, features), output)?;

    let status = find(&after, id)?.status;
    let changed: Vec<&ComputedFeature> = before
        .iter()
        .zip(&after)
        .filter(|(b, a)| a.id != id && b.status != a.status)
        .map(|(_, a)| a)
        .collect();
    output.verbose_ctx("toggle", &format!("{} dependents changed status", changed.len()));

    if output.is_json() {
        let items: Vec<_> = changed
            .iter()
            .map(|c| serde_json::json!({"id": c.id, "status": c.status}))
            .collect();
        output.data(&serde_json::json!({
            "id": id,
            "enabled": target,
            "status": status,
            "changed": items,
        }));
    } else {
        println!("{} {}: {} ({})", status.indicator(), id, word, status);
        for c in changed {
            println!("  {} {} is now {}", c.status.indicator(), c.id, c.status);
        }
    }

    Ok(())
}

fn find<'a>(computed: &'a [ComputedFeature], id: &str) -> Result<&'a ComputedFeature> {
    computed
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| anyhow!("Feature not found: {}", id))
}

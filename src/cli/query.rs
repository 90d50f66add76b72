//! Query commands (status, blocked, why, preview, graph, check)
//!
//! Every command resolves the current snapshot once and reads the result.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use anyhow::{anyhow, bail, Result};

use super::output::Output;
use crate::domain::{
    dangling_references, explain, resolve, Availability, ChainLink, ComputedFeature,
    DependencyGraph, FeatureStatus, StatusSummary,
};
use crate::storage::Project;

/// Show status counts and undo/redo availability
pub fn status(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let history = project.load_history()?;
    let computed = resolve(history.current_features());
    let summary = StatusSummary::from_computed(&computed);

    if output.is_json() {
        output.data(&serde_json::json!({
            "summary": summary,
            "history": {
                "cursor": history.cursor(),
                "len": history.len(),
                "can_undo": history.can_undo(),
                "can_redo": history.can_redo(),
            },
        }));
        return Ok(());
    }

    println!("Feature Status");
    println!("{}", "=".repeat(40));
    println!();
    println!("Features: {} total", summary.total);
    println!("  [+] Active:   {}", summary.active);
    println!("  [-] Manual:   {}", summary.manual);
    println!("  [!] Blocked:  {}", summary.blocked);
    println!();
    println!(
        "History: snapshot {} of {} ({})",
        history.cursor() + 1,
        history.len(),
        history.current().action
    );
    println!(
        "  Undo: {}  Redo: {}",
        if history.can_undo() { "yes" } else { "no" },
        if history.can_redo() { "yes" } else { "no" }
    );

    Ok(())
}

/// Show features blocked by their dependencies
pub fn blocked(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let history = project.load_history()?;
    let computed = resolve(history.current_features());

    let blocked: Vec<&ComputedFeature> = computed.iter().filter(|c| c.is_blocked()).collect();
    output.verbose_ctx("blocked", &format!("Found {} blocked features", blocked.len()));

    if output.is_json() {
        let items: Vec<_> = blocked
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "name": c.name,
                    "blockedBy": c.blocked_by,
                })
            })
            .collect();
        output.data(&items);
    } else if blocked.is_empty() {
        println!("No blocked features.");
    } else {
        println!("Blocked features ({}):", blocked.len());
        println!("{:<24} {:<28} BLOCKED BY", "ID", "NAME");
        println!("{}", "-".repeat(80));
        for c in blocked {
            println!("{:<24} {:<28} {}", c.id, c.display_name(), c.blocked_by.join(", "));
        }
    }

    Ok(())
}

/// Explain the blocking chain of one feature
pub fn why(output: &Output, id: &str) -> Result<()> {
    let project = Project::open_current()?;
    let history = project.load_history()?;
    let computed = resolve(history.current_features());

    let chain = explain(&computed, id);
    if chain.is_empty() {
        bail!("Feature not found: {}", id);
    }
    output.verbose_ctx("why", &format!("Chain has {} links", chain.len()));

    if output.is_json() {
        let links: Vec<_> = chain
            .iter()
            .map(|link| match link {
                ChainLink::BlockedBy { id, dependency } => {
                    serde_json::json!({"id": id, "reason": "blocked", "dependency": dependency})
                }
                ChainLink::Manual(id) => serde_json::json!({"id": id, "reason": "manual"}),
                ChainLink::Missing(id) => serde_json::json!({"id": id, "reason": "missing"}),
                ChainLink::Cycle(id) => serde_json::json!({"id": id, "reason": "cycle"}),
                ChainLink::Active(id) => serde_json::json!({"id": id, "reason": "active"}),
            })
            .collect();
        output.data(&links);
        return Ok(());
    }

    for (depth, link) in chain.iter().enumerate() {
        let indent = "  ".repeat(depth);
        match link {
            ChainLink::BlockedBy { id, dependency } => {
                println!("{}{} is blocked by {}", indent, id, dependency)
            }
            ChainLink::Manual(id) => println!("{}{} is disabled by administrator", indent, id),
            ChainLink::Missing(id) => println!("{}{} does not exist", indent, id),
            ChainLink::Cycle(id) => println!("{}{} closes a dependency cycle", indent, id),
            ChainLink::Active(id) => println!("{}{} is active", indent, id),
        }
    }

    Ok(())
}

/// Show what a user of each feature would see
pub fn preview(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let history = project.load_history()?;
    let computed = resolve(history.current_features());
    let by_id: HashMap<&str, &ComputedFeature> =
        computed.iter().map(|c| (c.id.as_str(), c)).collect();

    let selected = &project.config().project.preview.features;
    let ids: Vec<&str> = if selected.is_empty() {
        computed.iter().map(|c| c.id.as_str()).collect()
    } else {
        selected.iter().map(String::as_str).collect()
    };
    output.verbose_ctx("preview", &format!("Previewing {} features", ids.len()));

    let mut items = Vec::new();
    for id in ids {
        let Some(feature) = by_id.get(id) else {
            output.verbose_ctx("preview", &format!("Configured feature {} does not exist", id));
            items.push((id, None, None));
            continue;
        };

        let fallback = feature
            .fallback
            .as_deref()
            .filter(|fb| by_id.get(fb).is_some_and(|c| c.is_active()));
        items.push((id, Some(feature.availability()), fallback));
    }

    if output.is_json() {
        let json: Vec<_> = items
            .iter()
            .map(|(id, availability, fallback)| {
                serde_json::json!({
                    "id": id,
                    "available": matches!(availability, Some(Availability::Available)),
                    "message": availability.map_or("unknown feature".to_string(), |a| a.to_string()),
                    "fallback": fallback,
                })
            })
            .collect();
        output.data(&json);
        return Ok(());
    }

    println!("Live preview");
    println!("{}", "-".repeat(60));
    for (id, availability, fallback) in items {
        match availability {
            None => println!("[?] {:<24} unknown feature", id),
            Some(Availability::Available) => {
                print!("[+] {:<24} available", id);
                match fallback {
                    Some(fb) => println!(" (fallback {} ready)", fb),
                    None => println!(),
                }
            }
            Some(unavailable) => {
                println!("[x] {:<24} {}", id, unavailable);
                if let Some(fb) = fallback {
                    println!("    {:<24} fallback {} is active", "", fb);
                }
            }
        }
    }

    Ok(())
}

/// Show the dependency graph as a tree or as DOT
pub fn graph(output: &Output, dot: bool) -> Result<()> {
    let project = Project::open_current()?;
    let history = project.load_history()?;
    let features = history.current_features();
    let computed = resolve(features);
    let graph = DependencyGraph::from_features(features);
    output.verbose_ctx(
        "graph",
        &format!("{} nodes, {} edges", graph.len(), graph.edge_count()),
    );

    if dot {
        print!("{}", graph.to_dot(&computed));
        return Ok(());
    }

    if output.is_json() {
        let nodes: Vec<_> = computed
            .iter()
            .map(|c| serde_json::json!({"id": c.id, "status": c.status}))
            .collect();
        let edges: Vec<_> = computed
            .iter()
            .flat_map(|c| {
                graph
                    .dependencies(c.id.as_str())
                    .into_iter()
                    .map(move |dep| serde_json::json!({"from": c.id, "to": dep}))
            })
            .collect();
        // Dependencies before dependents; null when a cycle rules out an order
        let order = match graph.topological_order() {
            Ok(order) => Some(order),
            Err(e) => {
                output.verbose_ctx("graph", &e.to_string());
                None
            }
        };
        output.data(&serde_json::json!({"nodes": nodes, "edges": edges, "order": order}));
        return Ok(());
    }

    if computed.is_empty() {
        println!("No features.");
    } else {
        print!("{}", render_tree(&computed, &graph));
    }

    Ok(())
}

/// Renders features as a tree: each dependency lists the features that
/// require it. Features already printed, and cycle edges, are shown but
/// not expanded again.
pub(super) fn render_tree(computed: &[ComputedFeature], graph: &DependencyGraph) -> String {
    let statuses: HashMap<&str, FeatureStatus> =
        computed.iter().map(|c| (c.id.as_str(), c.status)).collect();

    let mut out = String::new();
    let mut printed: HashSet<String> = HashSet::new();

    let roots = computed
        .iter()
        .filter(|c| graph.dependencies(c.id.as_str()).is_empty())
        .map(|c| c.id.as_str());
    // Features that only sit on cycles have no root above them
    let leftovers: Vec<&str> = computed.iter().map(|c| c.id.as_str()).collect();

    for id in roots.chain(leftovers) {
        if printed.contains(id) {
            continue;
        }
        let mut path = Vec::new();
        render_node(id, "", "", &statuses, graph, &mut printed, &mut path, &mut out);
    }

    out
}

#[allow(clippy::too_many_arguments)]
fn render_node(
    id: &str,
    lead: &str,
    child_lead: &str,
    statuses: &HashMap<&str, FeatureStatus>,
    graph: &DependencyGraph,
    printed: &mut HashSet<String>,
    path: &mut Vec<String>,
    out: &mut String,
) {
    let indicator = statuses.get(id).map_or("[?]", |s| s.indicator());

    if path.iter().any(|p| p == id) {
        let _ = writeln!(out, "{}{} {} (cycle)", lead, indicator, id);
        return;
    }
    if !printed.insert(id.to_string()) {
        let _ = writeln!(out, "{}{} {} (see above)", lead, indicator, id);
        return;
    }

    let _ = writeln!(out, "{}{} {}", lead, indicator, id);

    path.push(id.to_string());
    let children = graph.dependents(id);
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let (branch, next) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
        render_node(
            child.as_str(),
            &format!("{}{}", child_lead, branch),
            &format!("{}{}", child_lead, next),
            statuses,
            graph,
            printed,
            path,
            out,
        );
    }
    path.pop();
}

/// Report cycles and dangling references; fails if any are found
pub fn check(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let history = project.load_history()?;
    let features = history.current_features();
    let graph = DependencyGraph::from_features(features);

    let cycles = graph.cycles();
    let dangling = dangling_references(features);
    let problems = cycles.len() + dangling.len();
    output.verbose_ctx(
        "check",
        &format!("{} cycles, {} dangling references", cycles.len(), dangling.len()),
    );

    if output.is_json() {
        let dangling_json: Vec<_> = dangling
            .iter()
            .map(|d| serde_json::json!({"feature": d.feature, "missing": d.missing}))
            .collect();
        output.data(&serde_json::json!({
            "ok": problems == 0,
            "cycles": cycles,
            "dangling": dangling_json,
        }));
    } else if problems == 0 {
        println!("No dependency problems found ({} features).", features.len());
    } else {
        for cycle in &cycles {
            let members: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
            println!("cycle:   {}", members.join(" <-> "));
        }
        for d in &dangling {
            println!("missing: {} requires unknown feature {}", d.feature, d.missing);
        }
    }

    if problems > 0 {
        return Err(anyhow!("{} dependency problem(s) found", problems));
    }

    Ok(())
}

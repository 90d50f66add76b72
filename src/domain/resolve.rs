//! Status resolution engine
//!
//! Derives, for every feature, exactly one of three effective statuses:
//!
//! 1. `disabled-manual` when the administrator switched it off. This is
//!    checked first and always wins over dependency state.
//! 2. `disabled-dependency` when it is enabled but some *direct* dependency
//!    is not active (transitively, through any number of levels). Missing
//!    dependency IDs and cycles count as not active.
//! 3. `active` otherwise.
//!
//! Resolution is a depth-first walk per feature. Cycle detection is
//! branch-local: each dependency is explored with its own [`Trail`] of the
//! IDs on the current path, so a diamond (two siblings sharing a dependency)
//! is never mistaken for a cycle.
//!
//! The engine is a pure function: no I/O, no errors, no state between calls.

use std::collections::HashMap;

use super::feature::Feature;
use super::status::{ComputedFeature, FeatureStatus, CIRCULAR_DEPENDENCY, MISSING_FEATURE};

/// Outcome of resolving a single ID
#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolution {
    status: FeatureStatus,
    blocked_by: Vec<String>,
}

impl Resolution {
    fn active() -> Self {
        Self {
            status: FeatureStatus::Active,
            blocked_by: Vec::new(),
        }
    }

    fn manual() -> Self {
        Self {
            status: FeatureStatus::DisabledManual,
            blocked_by: Vec::new(),
        }
    }

    fn blocked(blocked_by: Vec<String>) -> Self {
        Self {
            status: FeatureStatus::DisabledDependency,
            blocked_by,
        }
    }
}

/// IDs on the current resolution path, innermost first
///
/// Each frame borrows its parent, so extending the trail for one dependency
/// never affects the trail seen by its siblings.
#[derive(Clone, Copy)]
struct Trail<'t> {
    id: &'t str,
    parent: Option<&'t Trail<'t>>,
}

impl<'t> Trail<'t> {
    fn contains(&self, id: &str) -> bool {
        let mut frame = Some(self);
        while let Some(t) = frame {
            if t.id == id {
                return true;
            }
            frame = t.parent;
        }
        false
    }
}

/// Per-call resolver state
struct Resolver<'a> {
    lookup: HashMap<&'a str, &'a Feature>,
    /// Full resolutions already computed during this call
    memo: HashMap<&'a str, Resolution>,
}

impl<'a> Resolver<'a> {
    fn new(features: &'a [Feature]) -> Self {
        // Later duplicates overwrite earlier ones
        let lookup = features.iter().map(|f| (f.id.as_str(), f)).collect();
        Self {
            lookup,
            memo: HashMap::new(),
        }
    }

    fn status(&mut self, id: &str, trail: Option<&Trail<'_>>) -> Resolution {
        if trail.is_some_and(|t| t.contains(id)) {
            return Resolution::blocked(vec![CIRCULAR_DEPENDENCY.to_string()]);
        }

        let Some(&feature) = self.lookup.get(id) else {
            return Resolution::blocked(vec![MISSING_FEATURE.to_string()]);
        };

        // A feature's resolution does not depend on the path it was reached
        // by, so a memoised result is valid for every later visit.
        if let Some(resolution) = self.memo.get(feature.id.as_str()) {
            return resolution.clone();
        }

        let resolution = self.evaluate(feature, trail);
        self.memo.insert(feature.id.as_str(), resolution.clone());
        resolution
    }

    /// Resolves one record: manual flag first, then each direct dependency
    fn evaluate(&mut self, feature: &'a Feature, trail: Option<&Trail<'_>>) -> Resolution {
        if !feature.enabled {
            return Resolution::manual();
        }

        let here = Trail {
            id: feature.id.as_str(),
            parent: trail,
        };

        let blockers: Vec<String> = feature
            .requires()
            .iter()
            .filter(|dep| !self.status(dep, Some(&here)).status.is_active())
            .cloned()
            .collect();

        if blockers.is_empty() {
            Resolution::active()
        } else {
            Resolution::blocked(blockers)
        }
    }
}

/// Resolves the effective status of every feature
///
/// Returns one [`ComputedFeature`] per input record, in input order. The
/// input is not modified. Never fails: cycles and dangling dependency IDs
/// resolve to `disabled-dependency`.
pub fn resolve(features: &[Feature]) -> Vec<ComputedFeature> {
    let mut resolver = Resolver::new(features);

    features
        .iter()
        .map(|feature| {
            // Every record is resolved through the lookup, so with duplicate
            // IDs all of them take the status of the last one.
            let Resolution { status, blocked_by } = resolver.status(feature.id.as_str(), None);

            ComputedFeature {
                feature: feature.clone(),
                status,
                blocked_by,
            }
        })
        .collect()
}

/// One step in a blocking chain produced by [`explain`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainLink {
    /// A blocked feature and the dependency the chain follows next
    BlockedBy { id: String, dependency: String },
    /// The chain ends at a manually disabled feature
    Manual(String),
    /// The chain ends at an ID absent from the collection
    Missing(String),
    /// The chain revisits an ID already on it
    Cycle(String),
    /// The feature is active (only ever the first and only link)
    Active(String),
}

/// Walks from `id` along first blockers to the root cause
///
/// Uses already-computed statuses; does not re-resolve. Returns an empty
/// chain if `id` is not in `computed`.
pub fn explain(computed: &[ComputedFeature], id: &str) -> Vec<ChainLink> {
    let by_id: HashMap<&str, &ComputedFeature> =
        computed.iter().map(|c| (c.id.as_str(), c)).collect();

    if !by_id.contains_key(id) {
        return Vec::new();
    }

    let mut chain = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    let mut current = id;

    loop {
        if seen.contains(&current) {
            chain.push(ChainLink::Cycle(current.to_string()));
            break;
        }
        seen.push(current);

        let Some(feature) = by_id.get(current) else {
            chain.push(ChainLink::Missing(current.to_string()));
            break;
        };

        match feature.status {
            FeatureStatus::Active => {
                chain.push(ChainLink::Active(current.to_string()));
                break;
            }
            FeatureStatus::DisabledManual => {
                chain.push(ChainLink::Manual(current.to_string()));
                break;
            }
            FeatureStatus::DisabledDependency => {
                let Some(next) = feature.blocked_by.first() else {
                    break;
                };
                chain.push(ChainLink::BlockedBy {
                    id: current.to_string(),
                    dependency: next.clone(),
                });
                current = next;
            }
        }
    }

    chain
}

//! Derived feature status
//!
//! These types are produced by [`resolve`](super::resolve::resolve) and read
//! by every consumer (lists, detail views, graph colouring, live preview).
//! Consumers never construct a status themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

use super::feature::Feature;

/// Blocker token for a dependency that loops back onto the resolution path
pub const CIRCULAR_DEPENDENCY: &str = "circular-dependency";

/// Blocker token for a dependency ID absent from the collection
pub const MISSING_FEATURE: &str = "missing-feature-id";

/// Effective status of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureStatus {
    /// Enabled and every dependency is active
    Active,
    /// Switched off by an administrator
    DisabledManual,
    /// Enabled, but at least one direct dependency is not active
    DisabledDependency,
}

impl FeatureStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, FeatureStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureStatus::Active => "active",
            FeatureStatus::DisabledManual => "disabled-manual",
            FeatureStatus::DisabledDependency => "disabled-dependency",
        }
    }

    /// Compact marker used in trees and tables
    pub fn indicator(&self) -> &'static str {
        match self {
            FeatureStatus::Active => "[+]",
            FeatureStatus::DisabledManual => "[-]",
            FeatureStatus::DisabledDependency => "[!]",
        }
    }
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeatureStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" | "on" => Ok(FeatureStatus::Active),
            "disabled-manual" | "manual" | "off" => Ok(FeatureStatus::DisabledManual),
            "disabled-dependency" | "blocked" => Ok(FeatureStatus::DisabledDependency),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// A feature annotated with its resolved status
///
/// `blocked_by` is non-empty exactly when `status` is
/// [`FeatureStatus::DisabledDependency`], and then lists only direct
/// dependencies of this feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedFeature {
    #[serde(flatten)]
    pub feature: Feature,

    pub status: FeatureStatus,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<String>,
}

impl ComputedFeature {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_blocked(&self) -> bool {
        self.status == FeatureStatus::DisabledDependency
    }

    /// How a user-facing surface should treat this feature
    pub fn availability(&self) -> Availability<'_> {
        match self.status {
            FeatureStatus::Active => Availability::Available,
            FeatureStatus::DisabledManual => Availability::DisabledByAdmin,
            FeatureStatus::DisabledDependency => Availability::DependencyOffline(
                self.blocked_by.first().map(String::as_str).unwrap_or(MISSING_FEATURE),
            ),
        }
    }
}

impl Deref for ComputedFeature {
    type Target = Feature;

    fn deref(&self) -> &Feature {
        &self.feature
    }
}

/// Live-preview projection of a computed status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability<'a> {
    Available,
    DisabledByAdmin,
    /// Names the first direct dependency that is not active
    DependencyOffline(&'a str),
}

impl fmt::Display for Availability<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => f.write_str("available"),
            Availability::DisabledByAdmin => {
                f.write_str("Feature is currently disabled by administrator.")
            }
            Availability::DependencyOffline(dep) => {
                write!(f, "Unavailable: Dependency {} is offline.", dep)
            }
        }
    }
}

/// Counts per status, as shown in headers and history listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusSummary {
    pub active: usize,
    pub manual: usize,
    pub blocked: usize,
    pub total: usize,
}

impl StatusSummary {
    pub fn from_computed(computed: &[ComputedFeature]) -> Self {
        computed.iter().fold(Self::default(), |mut acc, c| {
            match c.status {
                FeatureStatus::Active => acc.active += 1,
                FeatureStatus::DisabledManual => acc.manual += 1,
                FeatureStatus::DisabledDependency => acc.blocked += 1,
            }
            acc.total += 1;
            acc
        })
    }
}

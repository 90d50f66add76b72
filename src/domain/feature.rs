//! Feature domain model
//!
//! A feature is a named capability unit with a manual `enabled` flag and a
//! list of feature IDs it requires. Everything else on the record (routes,
//! health checks, config, security and monitoring blocks) is descriptive
//! payload: it is carried through unchanged and never inspected when
//! computing status.
//!
//! The JSON shape uses camelCase field names so that exported collections
//! can be handed to (and pasted back from) other tools verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

use super::id::FeatureId;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid JSON: {0}")]
    Json(String),

    #[error("Expected a JSON array of features")]
    NotAnArray,

    #[error("Feature list is empty")]
    Empty,

    #[error("Feature at index {index} is invalid: {reason}")]
    InvalidFeature { index: usize, reason: String },

    #[error("Duplicate feature ID: {0}")]
    DuplicateId(FeatureId),
}

/// A single HTTP route served by a feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub method: String,
    pub path: String,
    pub handler: String,
}

/// Backend surface of a feature
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Backend {
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// Circuit breaker settings attached to a health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitBreaker {
    pub enabled: bool,
    pub failure_threshold: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// Health check configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    #[serde(default)]
    pub endpoint: String,
    /// Probe timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Consecutive failures before the feature should be switched off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_disable: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_breaker: Option<CircuitBreaker>,
}

/// Dependency declaration
///
/// `requires` is kept as raw strings: unknown, duplicate and self
/// references are all legal and resolved by the engine, not rejected here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dependencies {
    #[serde(default)]
    pub requires: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Monitoring {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<String>>,
}

/// A feature flag record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: FeatureId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    /// Manual override set by an administrator
    pub enabled: bool,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub backend: Backend,

    #[serde(default)]
    pub config: Map<String, Value>,

    #[serde(default)]
    pub health: Health,

    #[serde(default)]
    pub dependencies: Dependencies,

    /// ID of a feature that can stand in for this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<Monitoring>,
}

impl Feature {
    /// Creates a bare feature with no payload and no dependencies
    pub fn new(id: FeatureId, enabled: bool) -> Self {
        Self {
            id,
            name: String::new(),
            version: String::new(),
            enabled,
            description: String::new(),
            backend: Backend::default(),
            config: Map::new(),
            health: Health::default(),
            dependencies: Dependencies::default(),
            fallback: None,
            security: None,
            monitoring: None,
        }
    }

    /// Sets the required feature IDs (builder style)
    pub fn with_requires<I, S>(mut self, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.requires = requires.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the display name (builder style)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// IDs this feature depends on, in declaration order
    pub fn requires(&self) -> &[String] {
        &self.dependencies.requires
    }

    /// Name for display, falling back to the ID
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}

/// Parses and validates a JSON array of features
///
/// Used at every boundary where features enter the system (import, sync,
/// init). The resolution engine itself never rejects a collection.
pub fn parse_features(json: &str) -> Result<Vec<Feature>, ValidationError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ValidationError::Json(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        _ => return Err(ValidationError::NotAnArray),
    };

    if items.is_empty() {
        return Err(ValidationError::Empty);
    }

    let features = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Feature>(item).map_err(|e| ValidationError::InvalidFeature {
                index,
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    validate_features(&features)?;
    Ok(features)
}

/// Checks collection-level constraints (unique IDs)
pub fn validate_features(features: &[Feature]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for feature in features {
        if !seen.insert(feature.id.as_str()) {
            return Err(ValidationError::DuplicateId(feature.id.clone()));
        }
    }
    Ok(())
}

/// Returns a copy of `features` with one feature's manual flag set
///
/// Returns `None` if no feature has the given ID.
pub fn with_enabled(features: &[Feature], id: &str, enabled: bool) -> Option<Vec<Feature>> {
    if !features.iter().any(|f| f.id == id) {
        return None;
    }

    Some(
        features
            .iter()
            .map(|f| {
                if f.id == id {
                    Feature {
                        enabled,
                        ..f.clone()
                    }
                } else {
                    f.clone()
                }
            })
            .collect(),
    )
}

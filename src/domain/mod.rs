//! Domain models for flagdeck
//!
//! Contains the core business logic without any I/O concerns. The
//! resolution engine in [`resolve`](fn@resolve) is the only place feature
//! status is computed; everything else here either feeds it (features,
//! history) or reads its output (graph, search).

mod id;
mod feature;
mod status;
mod resolve;
mod graph;
mod history;
mod search;

pub use id::{FeatureId, IdError};
pub use feature::{
    parse_features, validate_features, with_enabled, Backend, CircuitBreaker, Dependencies,
    Feature, Health, Monitoring, Route, Security, ValidationError,
};
pub use status::{
    Availability, ComputedFeature, FeatureStatus, StatusSummary, CIRCULAR_DEPENDENCY,
    MISSING_FEATURE,
};
pub use resolve::{explain, resolve, ChainLink};
pub use graph::{dangling_references, DanglingReference, DependencyGraph, GraphError};
pub use history::{History, HistoryError, Snapshot};
pub use search::FeatureFilter;

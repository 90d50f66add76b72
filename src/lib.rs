//! flagdeck - A local-first feature flag administration tool
//!
//! Features carry a manual on/off flag and a list of features they require.
//! flagdeck resolves every feature to one effective status (`active`,
//! `disabled-manual` or `disabled-dependency`), keeps an undo/redo history
//! of the whole collection, and exports state for AI-assisted editing.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{resolve, ComputedFeature, Feature, FeatureId, FeatureStatus};

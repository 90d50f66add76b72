//! Text and status filtering over computed features

use super::status::{ComputedFeature, FeatureStatus};

/// Filter applied by list views
#[derive(Debug, Clone, Default)]
pub struct FeatureFilter {
    /// Case-insensitive substring matched against id, name and description
    pub text: Option<String>,
    pub status: Option<FeatureStatus>,
}

impl FeatureFilter {
    pub fn new(text: Option<&str>, status: Option<FeatureStatus>) -> Self {
        Self {
            text: text
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_lowercase),
            status,
        }
    }

    pub fn matches(&self, feature: &ComputedFeature) -> bool {
        if let Some(status) = self.status {
            if feature.status != status {
                return false;
            }
        }

        match &self.text {
            None => true,
            Some(needle) => {
                feature.id.as_str().to_lowercase().contains(needle)
                    || feature.name.to_lowercase().contains(needle)
                    || feature.description.to_lowercase().contains(needle)
            }
        }
    }

    /// Keeps matching features, preserving order
    pub fn apply<'a>(&self, features: &'a [ComputedFeature]) -> Vec<&'a ComputedFeature> {
        features.iter().filter(|f| self.matches(f)).collect()
    }
}

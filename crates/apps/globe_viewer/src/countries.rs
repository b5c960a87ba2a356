use std::collections::BTreeMap;

use formats::BoundaryFeature;

/// Loaded country features by code, kept with the configured name and code
/// so other views can look them up.
#[derive(Debug, Default, Clone)]
pub struct CountryRegistry {
    features: BTreeMap<String, Vec<BoundaryFeature>>,
}

impl CountryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: BoundaryFeature) {
        self.features
            .entry(feature.code.clone())
            .or_default()
            .push(feature);
    }

    pub fn get(&self, code: &str) -> &[BoundaryFeature] {
        self.features.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn name(&self, code: &str) -> Option<&str> {
        self.get(code).first().map(|f| f.name.as_str())
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

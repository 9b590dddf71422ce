//! Marker filtering.

use k8s_openapi::api::core::v1::Pod;

use crate::document::render;
use crate::error::ControllerError;

/// Case-sensitive substring filter over a pod's YAML.
#[derive(Debug, Clone)]
pub struct MarkerFilter {
    marker: String,
}

impl MarkerFilter {
    /// Creates a filter; an empty marker would match everything and is rejected.
    pub fn new(marker: impl Into<String>) -> Result<Self, ControllerError> {
        let marker = marker.into();
        if marker.is_empty() {
            return Err(ControllerError::InvalidConfig("marker must not be empty".to_string()));
        }
        Ok(Self { marker })
    }

    /// The configured marker
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Tests already rendered YAML for the marker.
    pub fn matches_document(&self, yaml: &str) -> bool {
        yaml.contains(&self.marker)
    }

    /// Renders the pod and returns its YAML if it contains the marker.
    pub fn matching_document(&self, pod: &Pod) -> Result<Option<String>, ControllerError> {
        let yaml = render(pod)?;
        Ok(self.matches_document(&yaml).then_some(yaml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{pod, pod_with_annotation};

    fn matches(filter: &MarkerFilter, pod: &Pod) -> bool {
        filter.matching_document(pod).expect("pod renders").is_some()
    }

    #[test]
    fn test_matches_value_anywhere() {
        let filter = MarkerFilter::new("DEBUG_MODE").expect("valid marker");

        assert!(matches(&filter, &pod_with_annotation("default", "a", "debug", "DEBUG_MODE=1")));
        assert!(!matches(&filter, &pod("default", "b", "nginx")));
    }

    #[test]
    fn test_matches_is_case_sensitive() {
        let filter = MarkerFilter::new("debug_mode").expect("valid marker");
        assert!(!matches(&filter, &pod_with_annotation("default", "a", "x", "DEBUG_MODE")));
    }

    #[test]
    fn test_matches_structural_field_names() {
        // Field names are part of the rendered YAML, so they match too
        let filter = MarkerFilter::new("containers:").expect("valid marker");
        assert!(matches(&filter, &pod("default", "a", "nginx")));
    }

    #[test]
    fn test_matches_substring_within_token() {
        let filter = MarkerFilter::new("ngin").expect("valid marker");
        assert!(filter.matches_document("image: nginx:1.27\n"));
        assert!(!filter.matches_document("image: ng-inx\n"));
    }

    #[test]
    fn test_matching_document_returns_rendered_yaml() {
        let filter = MarkerFilter::new("web-0").expect("valid marker");
        let p = pod("default", "web-0", "nginx");

        let yaml = filter.matching_document(&p).expect("renders").expect("matches");
        assert_eq!(yaml, render(&p).expect("renders"));
    }

    #[test]
    fn test_empty_marker_rejected() {
        assert!(matches!(MarkerFilter::new(""), Err(ControllerError::InvalidConfig(_))));
    }
}

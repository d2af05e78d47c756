//! Template descriptor definitions.
//!
//! A descriptor is what a provider hands back: where the archive lives and
//! how to unpack it. Registry documents deserialize straight into it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolved metadata for one template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    /// Template name, used for cache paths and the default directory.
    #[serde(default)]
    pub name: String,

    /// Archive URL.
    #[serde(default)]
    pub tar: String,

    /// Version or git ref; part of the cache key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Path inside the archive to treat as the extraction root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdir: Option<String>,

    /// Human-facing page for the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Directory name used when the caller does not pick one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_dir: Option<String>,

    /// Extra request headers for the archive download.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Option<String>>,

    /// Provider-specific fields that have no typed home.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TemplateDescriptor {
    /// Create a descriptor with the two required fields.
    pub fn new(name: impl Into<String>, tar: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tar: tar.into(),
            ..Default::default()
        }
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the subdirectory remap.
    pub fn with_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = Some(subdir.into());
        self
    }

    /// Set the browsable URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Add a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), Some(value.into()));
        self
    }

    /// Check that both required fields are present.
    pub fn validate(&self) -> Result<(), String> {
        match (self.name.trim().is_empty(), self.tar.trim().is_empty()) {
            (false, false) => Ok(()),
            (true, true) => Err("name and tar fields are missing".to_string()),
            (true, false) => Err("name field is missing".to_string()),
            (false, true) => Err("tar field is missing".to_string()),
        }
    }

    /// Sanitize `name` and fill `default_dir` from it when absent.
    pub fn sanitized(mut self) -> Self {
        self.name = sanitize_name(&self.name);
        let default_dir = self.default_dir.take().unwrap_or_else(|| self.name.clone());
        self.default_dir = Some(sanitize_name(&default_dir));
        self
    }

    /// The directory name to extract into when none is given.
    pub fn default_dir(&self) -> &str {
        self.default_dir.as_deref().unwrap_or(&self.name)
    }

    /// The subdirectory without leading or trailing slashes, if non-empty.
    pub fn normalized_subdir(&self) -> Option<&str> {
        self.subdir
            .as_deref()
            .map(|s| s.trim_matches('/'))
            .filter(|s| !s.is_empty())
    }
}

/// Replace every character outside `[A-Za-z0-9-]` with `-`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize_name("org/repo"), "org-repo");
        assert_eq!(sanitize_name("My.Template_v2"), "My-Template-v2");
        assert_eq!(sanitize_name("plain-name"), "plain-name");
    }

    #[test]
    fn sanitized_fills_default_dir() {
        let descriptor = TemplateDescriptor::new("unjs/template", "https://x").sanitized();

        assert_eq!(descriptor.name, "unjs-template");
        assert_eq!(descriptor.default_dir(), "unjs-template");
    }

    #[test]
    fn sanitized_keeps_explicit_default_dir() {
        let mut descriptor = TemplateDescriptor::new("nuxt", "https://x");
        descriptor.default_dir = Some("my app".to_string());

        let descriptor = descriptor.sanitized();
        assert_eq!(descriptor.default_dir(), "my-app");
    }

    #[test]
    fn validate_requires_name_and_tar() {
        assert!(TemplateDescriptor::new("a", "b").validate().is_ok());
        assert_eq!(
            TemplateDescriptor::new("", "b").validate().unwrap_err(),
            "name field is missing"
        );
        assert_eq!(
            TemplateDescriptor::new("a", " ").validate().unwrap_err(),
            "tar field is missing"
        );
        assert!(TemplateDescriptor::default().validate().is_err());
    }

    #[test]
    fn normalized_subdir_trims_slashes() {
        let d = TemplateDescriptor::new("a", "b").with_subdir("/examples/basic/");
        assert_eq!(d.normalized_subdir(), Some("examples/basic"));

        let root = TemplateDescriptor::new("a", "b").with_subdir("/");
        assert_eq!(root.normalized_subdir(), None);
    }

    #[test]
    fn deserializes_registry_document_with_extras() {
        let json = r#"{
            "name": "nuxt",
            "tar": "https://codeload.github.com/nuxt/starter/tar.gz/refs/heads/v3",
            "defaultDir": "nuxt-app",
            "url": "https://nuxt.com",
            "headers": { "X-Trace": "1", "X-Null": null },
            "docs": "https://nuxt.com/docs"
        }"#;

        let d: TemplateDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(d.name, "nuxt");
        assert_eq!(d.default_dir(), "nuxt-app");
        assert_eq!(d.headers.get("X-Trace"), Some(&Some("1".to_string())));
        assert_eq!(d.headers.get("X-Null"), Some(&None));
        assert_eq!(d.extra["docs"], "https://nuxt.com/docs");
    }

    #[test]
    fn missing_fields_deserialize_to_empty_and_fail_validation() {
        let d: TemplateDescriptor = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert!(d.tar.is_empty());
        assert!(d.validate().is_err());
    }
}

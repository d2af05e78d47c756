//! Environment variable configuration layer.
//!
//! Only the command-line entry point reads the process environment; the
//! library receives the resulting settings explicitly.

use super::schema::{GititConfig, RegistryConfig};
use std::path::PathBuf;

/// Registry endpoint override (`false` disables the registry, `true`
/// selects the default one).
pub const ENV_REGISTRY: &str = "GITIT_REGISTRY";
/// Bearer token override.
pub const ENV_AUTH: &str = "GITIT_AUTH";
/// Verbose logging toggle.
pub const ENV_DEBUG: &str = "GITIT_DEBUG";
/// Generic debug toggle, honoured as a fallback for [`ENV_DEBUG`].
pub const ENV_DEBUG_FALLBACK: &str = "DEBUG";
/// Cache directory override.
pub const ENV_CACHE_DIR: &str = "GITIT_CACHE_DIR";
/// XDG base directory for caches; `gitit/` is appended.
pub const ENV_XDG_CACHE_HOME: &str = "XDG_CACHE_HOME";

/// Read the configuration layer from the process environment.
pub fn config_from_env() -> GititConfig {
    config_from_vars(|name| std::env::var(name).ok())
}

/// Build the configuration layer from a variable lookup.
pub fn config_from_vars<F>(var: F) -> GititConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

    let registry = non_empty(ENV_REGISTRY).map(|value| {
        match value.trim().to_ascii_lowercase().as_str() {
            "false" | "0" => RegistryConfig::Enabled(false),
            "true" | "1" => RegistryConfig::Enabled(true),
            _ => RegistryConfig::Endpoint(value),
        }
    });

    let verbose = non_empty(ENV_DEBUG)
        .or_else(|| non_empty(ENV_DEBUG_FALLBACK))
        .map(|value| is_truthy(&value));

    GititConfig {
        registry,
        auth: non_empty(ENV_AUTH),
        verbose,
        cache_dir: non_empty(ENV_CACHE_DIR)
            .map(PathBuf::from)
            .or_else(|| non_empty(ENV_XDG_CACHE_HOME).map(|d| PathBuf::from(d).join("gitit"))),
        ..Default::default()
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> GititConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config_from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment() {
        assert_eq!(from(&[]), GititConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = from(&[
            ("GITIT_REGISTRY", "https://r.example.com"),
            ("GITIT_AUTH", "tok"),
            ("GITIT_DEBUG", "1"),
            ("GITIT_CACHE_DIR", "/tmp/c"),
        ]);

        assert_eq!(
            config.registry,
            Some(RegistryConfig::Endpoint("https://r.example.com".into()))
        );
        assert_eq!(config.auth.as_deref(), Some("tok"));
        assert_eq!(config.verbose, Some(true));
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/c")));
    }

    #[test]
    fn registry_false_disables() {
        let config = from(&[("GITIT_REGISTRY", "false")]);
        assert_eq!(config.registry, Some(RegistryConfig::Enabled(false)));
    }

    #[test]
    fn registry_true_selects_default_endpoint() {
        for value in ["true", "1", "TRUE"] {
            let config = from(&[("GITIT_REGISTRY", value)]);
            assert_eq!(config.registry, Some(RegistryConfig::Enabled(true)), "{}", value);
            assert_eq!(
                config.download_options(None).registry.endpoint(),
                Some(crate::registry::DEFAULT_REGISTRY)
            );
        }
    }

    #[test]
    fn debug_fallback_and_falsy_values() {
        assert_eq!(from(&[("DEBUG", "true")]).verbose, Some(true));
        assert_eq!(from(&[("GITIT_DEBUG", "0")]).verbose, Some(false));
        assert_eq!(
            from(&[("GITIT_DEBUG", "off"), ("DEBUG", "1")]).verbose,
            Some(false)
        );
    }

    #[test]
    fn xdg_cache_home_is_fallback() {
        let config = from(&[("XDG_CACHE_HOME", "/home/u/.cache")]);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/home/u/.cache/gitit")));

        let config = from(&[("XDG_CACHE_HOME", "/home/u/.cache"), ("GITIT_CACHE_DIR", "/c")]);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/c")));
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = from(&[("GITIT_AUTH", "  "), ("GITIT_CACHE_DIR", "")]);
        assert_eq!(config.auth, None);
        assert_eq!(config.cache_dir, None);
    }
}

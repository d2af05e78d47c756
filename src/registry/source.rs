//! Template identifier parsing.
//!
//! An identifier has the form `[<provider>:]<source>`. Hosting providers
//! further parse their source as `org/repo[/subpath][#ref]`.

use regex::Regex;
use std::sync::LazyLock;

/// Leading `scheme:` prefix of an identifier.
static PROVIDER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w.-]+):").expect("PROVIDER_PREFIX must compile"));

/// `org/repo[/subpath][#ref]`
static GIT_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<repo>[\w.-]+/[\w.-]+)(?P<subdir>[^#]+)?(?P<ref>#[\w./@-]+)?")
        .expect("GIT_URI must compile")
});

/// A parsed `[<provider>:]<source>` identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateIdentifier {
    /// Provider name, explicit or defaulted.
    pub provider: String,
    /// The source handed to the provider.
    pub source: String,
}

impl TemplateIdentifier {
    /// Parse an identifier, using `default_provider` when no prefix is present.
    ///
    /// For `http`/`https` the whole input, scheme included, is the source.
    pub fn parse(input: &str, default_provider: &str) -> Self {
        match PROVIDER_PREFIX.captures(input) {
            Some(caps) => {
                let provider = caps[1].to_string();
                let source = if provider == "http" || provider == "https" {
                    input.to_string()
                } else {
                    input[caps[0].len()..].to_string()
                };
                Self { provider, source }
            }
            None => Self {
                provider: default_provider.to_string(),
                source: input.to_string(),
            },
        }
    }
}

/// Parsed hosting-provider source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitInfo {
    /// `org/repo`
    pub repo: String,
    /// Path inside the repository, `/` when absent.
    pub subdir: String,
    /// Branch, tag or commit, `main` when absent.
    pub git_ref: String,
}

/// Parse `org/repo[/subpath][#ref]`.
pub fn parse_git_uri(input: &str) -> Result<GitInfo, String> {
    let caps = GIT_URI
        .captures(input)
        .ok_or_else(|| format!("'{}' is not of the form org/repo[/subdir][#ref]", input))?;

    Ok(GitInfo {
        repo: caps["repo"].to_string(),
        subdir: caps
            .name("subdir")
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "/".to_string()),
        git_ref: caps
            .name("ref")
            .map(|m| m.as_str()[1..].to_string())
            .unwrap_or_else(|| "main".to_string()),
    })
}

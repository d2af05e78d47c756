//! Built-in template providers.
//!
//! Hosting providers turn `org/repo[/subdir][#ref]` into the host's archive
//! endpoint. The `http` provider takes a literal archive (or descriptor) URL.

use crate::registry::fetch::{bearer_header, HttpFetcher};
use crate::registry::resolver::{ProviderContext, ProviderRegistry, TemplateProvider};
use crate::registry::source::{parse_git_uri, GitInfo};
use crate::registry::template::TemplateDescriptor;
use anyhow::{anyhow, Result};
use std::sync::Arc;

/// Supported git hosting services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHost {
    /// github.com, archives from the REST API tarball endpoint.
    Github,
    /// gitlab.com
    Gitlab,
    /// bitbucket.org
    Bitbucket,
    /// git.sr.ht
    Sourcehut,
}

impl GitHost {
    /// Public base URL of the host.
    pub fn default_base_url(self) -> &'static str {
        match self {
            GitHost::Github => "https://github.com",
            GitHost::Gitlab => "https://gitlab.com",
            GitHost::Bitbucket => "https://bitbucket.org",
            GitHost::Sourcehut => "https://git.sr.ht",
        }
    }
}

/// Provider for a git hosting service's archive endpoint.
#[derive(Debug, Clone)]
pub struct HostingProvider {
    host: GitHost,
    base_url: String,
    api_url: String,
}

impl HostingProvider {
    /// Create a provider against the host's public endpoints.
    pub fn new(host: GitHost) -> Self {
        let base_url = host.default_base_url().to_string();
        let api_url = match host {
            GitHost::Github => "https://api.github.com".to_string(),
            _ => base_url.clone(),
        };
        Self {
            host,
            base_url,
            api_url,
        }
    }

    /// Point the provider at a different server (self-hosted instances, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        self.api_url = base_url.clone();
        self.base_url = base_url;
        self
    }

    fn archive_url(&self, info: &GitInfo) -> String {
        match self.host {
            GitHost::Github => format!("{}/repos/{}/tarball/{}", self.api_url, info.repo, info.git_ref),
            GitHost::Gitlab => format!("{}/{}/-/archive/{}.tar.gz", self.base_url, info.repo, info.git_ref),
            GitHost::Bitbucket => format!("{}/{}/get/{}.tar.gz", self.base_url, info.repo, info.git_ref),
            GitHost::Sourcehut => format!("{}/~{}/archive/{}.tar.gz", self.base_url, info.repo, info.git_ref),
        }
    }

    fn web_url(&self, info: &GitInfo) -> String {
        match self.host {
            GitHost::Github | GitHost::Gitlab => {
                format!("{}/{}/tree/{}{}", self.base_url, info.repo, info.git_ref, info.subdir)
            }
            GitHost::Bitbucket => {
                format!("{}/{}/src/{}{}", self.base_url, info.repo, info.git_ref, info.subdir)
            }
            GitHost::Sourcehut => {
                format!("{}/~{}/tree/{}/item{}", self.base_url, info.repo, info.git_ref, info.subdir)
            }
        }
    }
}

impl TemplateProvider for HostingProvider {
    fn resolve(&self, source: &str, ctx: &ProviderContext) -> Result<TemplateDescriptor> {
        let info = parse_git_uri(source).map_err(|e| anyhow!(e))?;

        let mut descriptor = TemplateDescriptor::new(info.repo.clone(), self.archive_url(&info))
            .with_version(info.git_ref.clone())
            .with_subdir(info.subdir.clone())
            .with_url(self.web_url(&info));

        for (name, value) in bearer_header(ctx.auth.as_deref()) {
            descriptor = descriptor.with_header(name, value);
        }

        match self.host {
            GitHost::Github => {
                descriptor = descriptor
                    .with_header("accept", "application/vnd.github+json")
                    .with_header("x-github-api-version", "2022-11-28");
            }
            GitHost::Gitlab => {
                descriptor = descriptor.with_header("sec-fetch-mode", "same-origin");
            }
            GitHost::Bitbucket | GitHost::Sourcehut => {}
        }

        Ok(descriptor)
    }
}

/// Provider for literal `http(s)://` archive URLs.
///
/// URLs ending in `.json` are fetched and read as a template descriptor
/// document instead of an archive.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    fetcher: HttpFetcher,
}

impl HttpProvider {
    /// Create a provider using the given fetcher.
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }
}

impl TemplateProvider for HttpProvider {
    fn resolve(&self, source: &str, ctx: &ProviderContext) -> Result<TemplateDescriptor> {
        let headers = bearer_header(ctx.auth.as_deref());
        let path = url_path(source);

        if path.ends_with(".json") {
            return self.fetcher.fetch_json(source, &headers);
        }

        let mut descriptor = TemplateDescriptor::new(name_from_path(path), source);
        for (name, value) in headers {
            descriptor = descriptor.with_header(name, value);
        }
        Ok(descriptor)
    }
}

/// Strip scheme, query and fragment from a URL.
fn url_path(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let end = without_scheme
        .find(['?', '#'])
        .unwrap_or(without_scheme.len());
    let host_and_path = &without_scheme[..end];
    host_and_path
        .find('/')
        .map_or("", |idx| &host_and_path[idx..])
}

/// Derive a template name from the last path segment of an archive URL.
fn name_from_path(path: &str) -> String {
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    let stem = [".tar.gz", ".tgz", ".tar"]
        .iter()
        .find_map(|ext| segment.strip_suffix(ext))
        .unwrap_or(segment);

    if stem.is_empty() {
        "template".to_string()
    } else {
        stem.to_string()
    }
}

/// Register every built-in provider.
///
/// The `registry` provider is not included; it depends on configuration and
/// is added by the pipeline when enabled.
pub fn builtin_providers(fetcher: &HttpFetcher) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    let github = Arc::new(HostingProvider::new(GitHost::Github));
    registry.insert("github", github.clone());
    registry.insert("gh", github);
    registry.insert("gitlab", Arc::new(HostingProvider::new(GitHost::Gitlab)));
    registry.insert("bitbucket", Arc::new(HostingProvider::new(GitHost::Bitbucket)));
    registry.insert("sourcehut", Arc::new(HostingProvider::new(GitHost::Sourcehut)));

    let http = Arc::new(HttpProvider::new(fetcher.clone()));
    registry.insert("http", http.clone());
    registry.insert("https", http);

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn ctx(auth: Option<&str>) -> ProviderContext {
        ProviderContext {
            auth: auth.map(String::from),
        }
    }

    #[test]
    fn github_descriptor() {
        let provider = HostingProvider::new(GitHost::Github);
        let d = provider.resolve("unjs/template/src#v2", &ctx(Some("tok"))).unwrap();

        assert_eq!(d.name, "unjs/template");
        assert_eq!(d.tar, "https://api.github.com/repos/unjs/template/tarball/v2");
        assert_eq!(d.version.as_deref(), Some("v2"));
        assert_eq!(d.subdir.as_deref(), Some("/src"));
        assert_eq!(d.url.as_deref(), Some("https://github.com/unjs/template/tree/v2/src"));
        assert_eq!(d.headers["authorization"].as_deref(), Some("Bearer tok"));
        assert_eq!(d.headers["x-github-api-version"].as_deref(), Some("2022-11-28"));
    }

    #[test]
    fn gitlab_archive_url_and_headers() {
        let d = HostingProvider::new(GitHost::Gitlab)
            .resolve("group/project", &ctx(None))
            .unwrap();

        assert_eq!(d.tar, "https://gitlab.com/group/project/-/archive/main.tar.gz");
        assert_eq!(d.headers["sec-fetch-mode"].as_deref(), Some("same-origin"));
        assert!(!d.headers.contains_key("authorization"));
    }

    #[test]
    fn bitbucket_and_sourcehut_archive_urls() {
        let bb = HostingProvider::new(GitHost::Bitbucket)
            .resolve("team/repo#dev", &ctx(None))
            .unwrap();
        assert_eq!(bb.tar, "https://bitbucket.org/team/repo/get/dev.tar.gz");

        let sh = HostingProvider::new(GitHost::Sourcehut)
            .resolve("user/repo", &ctx(None))
            .unwrap();
        assert_eq!(sh.tar, "https://git.sr.ht/~user/repo/archive/main.tar.gz");
    }

    #[test]
    fn custom_base_url() {
        let d = HostingProvider::new(GitHost::Github)
            .with_base_url("http://127.0.0.1:9000/")
            .resolve("org/repo", &ctx(None))
            .unwrap();

        assert_eq!(d.tar, "http://127.0.0.1:9000/repos/org/repo/tarball/main");
    }

    #[test]
    fn malformed_source_is_error() {
        let err = HostingProvider::new(GitHost::Github)
            .resolve("not-a-repo", &ctx(None))
            .unwrap_err();
        assert!(err.to_string().contains("org/repo"));
    }

    #[test]
    fn http_archive_name_from_url() {
        let provider = HttpProvider::new(HttpFetcher::new());
        let d = provider
            .resolve("https://example.com/files/starter-kit.tar.gz?token=1", &ctx(None))
            .unwrap();

        assert_eq!(d.name, "starter-kit");
        assert_eq!(d.tar, "https://example.com/files/starter-kit.tar.gz?token=1");
    }

    #[test]
    fn http_name_falls_back_to_template() {
        assert_eq!(name_from_path(""), "template");
        assert_eq!(name_from_path("/"), "template");
        assert_eq!(name_from_path("/a/b.tgz"), "b");
    }

    #[test]
    fn http_json_document_is_fetched() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/templates/demo.json")
                .header("authorization", "Bearer abc");
            then.status(200)
                .body(r#"{"name":"demo","tar":"https://example.com/demo.tar.gz"}"#);
        });

        let provider = HttpProvider::new(HttpFetcher::new());
        let d = provider
            .resolve(&server.url("/templates/demo.json"), &ctx(Some("abc")))
            .unwrap();

        mock.assert();
        assert_eq!(d.name, "demo");
        assert_eq!(d.tar, "https://example.com/demo.tar.gz");
    }

    #[test]
    fn builtin_table_has_aliases() {
        let registry = builtin_providers(&HttpFetcher::new());
        for name in ["github", "gh", "gitlab", "bitbucket", "sourcehut", "http", "https"] {
            assert!(registry.has(name), "missing provider {}", name);
        }
        assert!(!registry.has("registry"));
    }
}

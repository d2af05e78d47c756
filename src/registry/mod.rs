//! Template providers for gitit.
//!
//! This module turns a template identifier into a [`TemplateDescriptor`]:
//! - Hosting providers (`github`/`gh`, `gitlab`, `bitbucket`, `sourcehut`)
//! - Literal archive URLs (`http`, `https`)
//! - A remote JSON registry (`registry`)
//!
//! # Resolution Order
//!
//! Providers are layered, later layers replacing earlier ones by name:
//! 1. Built-in
//! 2. Plugins, in declaration order
//! 3. Caller-supplied
//!
//! # Example
//!
//! ```
//! use gitit::registry::{builtin_providers, HttpFetcher, ProviderContext, TemplateIdentifier};
//!
//! let providers = builtin_providers(&HttpFetcher::new());
//! let id = TemplateIdentifier::parse("gh:unjs/template#v1", "github");
//! let descriptor = providers.resolve(&id, &ProviderContext::default()).unwrap();
//!
//! assert_eq!(descriptor.tar, "https://api.github.com/repos/unjs/template/tarball/v1");
//! ```

pub mod builtin;
pub mod fetch;
pub mod remote;
pub mod resolver;
pub mod source;
pub mod template;

// Re-exports
pub use builtin::{builtin_providers, GitHost, HostingProvider, HttpProvider};
pub use fetch::{FetchResponse, Headers, HttpFetcher};
pub use remote::{RegistryProvider, DEFAULT_REGISTRY};
pub use resolver::{provider_fn, Provider, ProviderContext, ProviderRegistry, TemplateProvider};
pub use source::{parse_git_uri, GitInfo, TemplateIdentifier};
pub use template::{sanitize_name, TemplateDescriptor};

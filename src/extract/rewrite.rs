//! Archive entry path rewriting.

use std::sync::Arc;

/// Maps an archive entry path to its destination-relative path.
///
/// Returning `None` excludes the entry.
pub type PathRewrite = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Strip the wrapper directory, optionally remapping `subdir` to the root.
///
/// Hosting services wrap archive contents in one synthetic top-level
/// directory (`repo-main/`), which is always dropped. With a subdir, only
/// entries below it are kept and the subdir prefix is removed.
///
/// ```
/// use gitit::extract::strip_root;
///
/// let rewrite = strip_root(Some("examples/basic"));
/// assert_eq!(rewrite("pkg-main/examples/basic/index.js").as_deref(), Some("index.js"));
/// assert_eq!(rewrite("pkg-main/examples/other/index.js"), None);
/// ```
pub fn strip_root(subdir: Option<&str>) -> PathRewrite {
    let prefix = subdir
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .map(|s| format!("{}/", s));

    Arc::new(move |path: &str| {
        let (_, rest) = path.split_once('/')?;
        let rest = match &prefix {
            Some(prefix) => rest.strip_prefix(prefix.as_str())?,
            None => rest,
        };
        let rest = rest.trim_end_matches('/');
        (!rest.is_empty()).then(|| rest.to_string())
    })
}

//! Path globs for filtering a crawled inventory.
//!
//! Matching is prefix/segment based over slash-delimited paths; no metacharacters
//! other than a trailing `*` or `**` are interpreted:
//! - `""` matches everything
//! - `/` matches top-level nodes (`/alpha`, `/beta`)
//! - `/alpha` matches exactly `/alpha`
//! - `/alpha/` and `/alpha/*` match immediate children of `/alpha`
//! - `/alpha/**` matches every descendant of `/alpha`
//!
//! A glob is applied after the crawl, never to decide whether to expand a folder.

/// A compiled path glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathGlob {
    /// Empty pattern
    All,
    /// `/`
    TopLevel,
    /// `prefix/**`; holds `prefix/`
    Descendants(String),
    /// `prefix/*` or `prefix/`; holds `prefix/`
    Children(String),
    Exact(String),
}

impl PathGlob {
    /// Compile a pattern. The most specific form wins: `/**`, then `/*`, then `/`,
    /// then a trailing slash, then an exact path.
    ///
    /// # Examples
    /// ```
    /// use boxwalk::glob::PathGlob;
    ///
    /// let glob = PathGlob::compile("/alpha/*");
    /// assert!(glob.matches("/alpha/photos"));
    /// assert!(!glob.matches("/alpha/photos/new"));
    /// ```
    pub fn compile(pattern: &str) -> Self {
        if let Some(prefix) = pattern.strip_suffix("**") {
            if prefix.ends_with('/') {
                return PathGlob::Descendants(prefix.to_string());
            }
        }
        if let Some(prefix) = pattern.strip_suffix('*') {
            if prefix.ends_with('/') {
                return PathGlob::Children(prefix.to_string());
            }
        }
        if pattern == "/" {
            return PathGlob::TopLevel;
        }
        if pattern.ends_with('/') {
            return PathGlob::Children(pattern.to_string());
        }
        if pattern.is_empty() {
            return PathGlob::All;
        }
        PathGlob::Exact(pattern.to_string())
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathGlob::All => true,
            PathGlob::TopLevel => {
                path.len() > 1 && path.starts_with('/') && !path[1..].contains('/')
            }
            PathGlob::Descendants(prefix) => path.starts_with(prefix.as_str()),
            PathGlob::Children(prefix) => path
                .strip_prefix(prefix.as_str())
                .map(|rest| !rest.is_empty() && !rest.contains('/'))
                .unwrap_or(false),
            PathGlob::Exact(exact) => path == exact,
        }
    }
}

impl Default for PathGlob {
    fn default() -> Self {
        PathGlob::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PATHS: [&str; 9] = [
        "/",
        "/alpha",
        "/alpha/pending",
        "/alpha/photos",
        "/alpha/photos/new",
        "/alpha/photos/new/today",
        "/beta",
        "/beta/pending",
        "/beta/photos",
    ];

    fn matching(pattern: &str) -> Vec<&'static str> {
        let glob = PathGlob::compile(pattern);
        PATHS.iter().copied().filter(|p| glob.matches(p)).collect()
    }

    #[test]
    fn test_empty_pattern_matches_all() {
        assert_eq!(matching(""), PATHS.to_vec());
    }

    #[test]
    fn test_root_matches_top_level_only() {
        assert_eq!(matching("/"), vec!["/alpha", "/beta"]);
    }

    #[test]
    fn test_exact_path() {
        assert_eq!(matching("/alpha"), vec!["/alpha"]);
    }

    #[test]
    fn test_trailing_slash_matches_children() {
        assert_eq!(matching("/alpha/"), vec!["/alpha/pending", "/alpha/photos"]);
    }

    #[test]
    fn test_single_star_same_as_trailing_slash() {
        assert_eq!(matching("/alpha/*"), matching("/alpha/"));
    }

    #[test]
    fn test_double_star_matches_descendants() {
        assert_eq!(
            matching("/alpha/**"),
            vec![
                "/alpha/pending",
                "/alpha/photos",
                "/alpha/photos/new",
                "/alpha/photos/new/today",
            ]
        );
    }

    #[test]
    fn test_nested_children() {
        assert_eq!(matching("/alpha/photos/"), vec!["/alpha/photos/new"]);
    }

    #[test]
    fn test_root_star_excludes_root_itself() {
        assert_eq!(matching("/*"), vec!["/alpha", "/beta"]);
    }

    #[test]
    fn test_star_without_slash_is_exact() {
        assert_eq!(PathGlob::compile("/al*"), PathGlob::Exact("/al*".to_string()));
        assert!(matching("/al*").is_empty());
    }

    proptest! {
        #[test]
        fn children_are_one_level_of_descendants(
            segments in proptest::collection::vec("[a-z]{1,4}", 1..5),
            depth in 0usize..4,
        ) {
            let path = format!("/{}", segments.join("/"));
            let prefix_len = depth.min(segments.len() - 1);
            let prefix = format!("/{}", segments[..prefix_len].join("/"));
            let prefix = if prefix == "/" { String::new() } else { prefix };

            let children = PathGlob::compile(&format!("{}/*", prefix));
            let descendants = PathGlob::compile(&format!("{}/**", prefix));
            prop_assert!(descendants.matches(&path));
            // children only reach one segment past the prefix
            prop_assert_eq!(
                children.matches(&path),
                segments.len() - prefix_len == 1
            );
        }
    }
}

use std::ffi::OsStr;
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::error::{ErrorKind, PathResolveError, PathResolveResult};

/* 📖 # Which wildcards does a pattern leaf support?

Only `*` (any run of characters) and `?` (exactly one character). Every other
character is literal, so names such as `report[1].txt` or `{draft}.md` match
themselves. The leaf is translated into a globset glob by escaping the glob
metacharacters globset would otherwise interpret.

A trailing `.*` is optional, the way Windows treats it: `*.*` lists every
entry, including `README`, and `report.*` also matches a bare `report`.
*/

/// Matches directory entry names against the leaf of a path pattern.
#[derive(Debug, Clone)]
pub struct EntryMatcher {
    leaf: String,
    matcher: GlobMatcher,
}

impl EntryMatcher {
    /// Compile a matcher for the given pattern leaf.
    pub fn new(leaf: &OsStr, case_insensitive: bool) -> PathResolveResult<Self> {
        let leaf = leaf.to_string_lossy().into_owned();
        let glob = GlobBuilder::new(&leaf_glob(&leaf))
            .literal_separator(true)
            .backslash_escape(false)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| {
                debug!(pattern = %leaf, error = %e, "failed to compile entry pattern");
                Box::new(PathResolveError::new(ErrorKind::Pattern {
                    pattern: leaf.clone(),
                    message: e.to_string(),
                }))
            })?;
        Ok(Self {
            leaf,
            matcher: glob.compile_matcher(),
        })
    }

    /// The leaf text this matcher was built from.
    pub fn leaf(&self) -> &str {
        &self.leaf
    }

    pub fn has_wildcards(&self) -> bool {
        self.leaf.contains(['*', '?'])
    }

    pub fn is_match(&self, name: &OsStr) -> bool {
        self.matcher.is_match(Path::new(name))
    }
}

fn leaf_glob(leaf: &str) -> String {
    match leaf.strip_suffix(".*") {
        Some(stem) if !stem.is_empty() => {
            format!("{{{},{}}}", leaf_to_glob(leaf), leaf_to_glob(stem))
        }
        _ => leaf_to_glob(leaf),
    }
}

fn leaf_to_glob(leaf: &str) -> String {
    let mut glob = String::with_capacity(leaf.len());
    let mut previous_star = false;
    for c in leaf.chars() {
        match c {
            // runs of `*` collapse; globset rejects `**` inside a component
            '*' if previous_star => continue,
            '[' | ']' | '{' | '}' | ',' => {
                glob.push('[');
                glob.push(c);
                glob.push(']');
            }
            _ => glob.push(c),
        }
        previous_star = c == '*';
    }
    glob
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(leaf: &str) -> EntryMatcher {
        EntryMatcher::new(OsStr::new(leaf), false).unwrap()
    }

    #[test]
    fn test_star_matches_extension() {
        let m = matcher("*.txt");
        assert!(m.is_match(OsStr::new("a.txt")));
        assert!(m.is_match(OsStr::new(".txt")));
        assert!(!m.is_match(OsStr::new("a.txt.bak")));
        assert!(!m.is_match(OsStr::new("a.rs")));
    }

    #[test]
    fn test_question_mark_matches_one_character() {
        let m = matcher("file?.log");
        assert!(m.is_match(OsStr::new("file1.log")));
        assert!(!m.is_match(OsStr::new("file.log")));
        assert!(!m.is_match(OsStr::new("file12.log")));
    }

    #[test]
    fn test_literal_name_matches_only_itself() {
        let m = matcher("notes.txt");
        assert!(m.is_match(OsStr::new("notes.txt")));
        assert!(!m.is_match(OsStr::new("notes.txt2")));
        assert!(!m.has_wildcards());
    }

    #[test]
    fn test_brackets_and_braces_are_literal() {
        let m = matcher("report[1]{a,b}.txt");
        assert!(m.is_match(OsStr::new("report[1]{a,b}.txt")));
        assert!(!m.is_match(OsStr::new("report1a.txt")));
    }

    #[test]
    fn test_double_star_collapses() {
        let m = matcher("a**b");
        assert!(m.is_match(OsStr::new("ab")));
        assert!(m.is_match(OsStr::new("axyzb")));
    }

    #[test]
    fn test_case_sensitivity() {
        assert!(!matcher("*.TXT").is_match(OsStr::new("a.txt")));
        let insensitive = EntryMatcher::new(OsStr::new("*.TXT"), true).unwrap();
        assert!(insensitive.is_match(OsStr::new("a.txt")));
    }

    #[test]
    fn test_leaf_to_glob_escaping() {
        assert_eq!(leaf_to_glob("x[1]"), "x[[]1[]]");
        assert_eq!(leaf_to_glob("***.rs"), "*.rs");
        assert_eq!(leaf_to_glob("{a}"), "[{]a[}]");
        assert_eq!(leaf_to_glob("a,b"), "a[,]b");
        assert_eq!(leaf_glob("*.*"), "{*.*,*}");
    }

    #[test]
    fn test_star_dot_star_matches_names_without_extension() {
        let m = matcher("*.*");
        assert!(m.is_match(OsStr::new("a.txt")));
        assert!(m.is_match(OsStr::new("README")));
    }

    #[test]
    fn test_trailing_dot_star_is_optional() {
        let m = matcher("report.*");
        assert!(m.is_match(OsStr::new("report")));
        assert!(m.is_match(OsStr::new("report.txt")));
        assert!(!m.is_match(OsStr::new("reporter")));

        let commas = matcher("a,b.*");
        assert!(commas.is_match(OsStr::new("a,b")));
        assert!(commas.is_match(OsStr::new("a,b.md")));
        assert!(!commas.is_match(OsStr::new("a")));
    }
}
